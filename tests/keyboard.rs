//! Scancode ring and decode pipeline tests. Set-1 scancodes: make codes
//! below 0x80, break codes with the high bit set, 0xE0-prefixed sequences
//! for augmented keys.

use kerncore::keyboard::{KeyboardState, ScancodeQueue};

#[test]
fn queue_pops_in_fifo_order() {
    let mut queue = ScancodeQueue::new();
    for byte in [0x1e, 0x30, 0x2e, 0x9e] {
        queue.push(byte).unwrap();
    }
    assert_eq!(queue.len(), 4);
    assert_eq!(queue.pop(), Some(0x1e));
    assert_eq!(queue.pop(), Some(0x30));
    assert_eq!(queue.pop(), Some(0x2e));
    assert_eq!(queue.pop(), Some(0x9e));
    assert_eq!(queue.pop(), None);
}

#[test]
fn queue_indices_wrap_around() {
    let mut queue = ScancodeQueue::new();
    let cap = queue.capacity();
    // Drive head/tail past the end of the backing array a few times
    for round in 0..3 {
        for i in 0..cap {
            queue.push((i % 251) as u8).unwrap();
        }
        for i in 0..cap {
            assert_eq!(queue.pop(), Some((i % 251) as u8), "round {round}");
        }
        assert!(queue.is_empty());
    }
}

#[test]
fn full_queue_drops_the_newest_byte() {
    let mut queue = ScancodeQueue::new();
    let cap = queue.capacity();
    for i in 0..cap {
        queue.push((i % 256) as u8).unwrap();
    }
    assert_eq!(queue.len(), cap);
    // The (cap + 1)th byte is refused and lost
    assert_eq!(queue.push(0xab), Err(()));
    assert_eq!(queue.len(), cap);

    for i in 0..cap {
        assert_eq!(queue.pop(), Some((i % 256) as u8));
    }
    assert_eq!(queue.pop(), None);
}

#[test]
fn empty_queue_underflows_to_none() {
    let mut queue = ScancodeQueue::new();
    assert!(queue.is_empty());
    assert_eq!(queue.pop(), None);
    assert_eq!(queue.len(), 0);
}

#[test]
fn poll_on_an_empty_buffer_returns_none() {
    let mut keyboard = KeyboardState::new();
    assert_eq!(keyboard.poll_char(), None);
}

#[test]
fn a_make_code_decodes_to_its_character() {
    let mut keyboard = KeyboardState::new();
    keyboard.push_scancode(0x1e); // 'a' press
    assert_eq!(keyboard.poll_char(), Some('a'));
    assert_eq!(keyboard.poll_char(), None);
}

#[test]
fn a_break_code_carries_no_character() {
    let mut keyboard = KeyboardState::new();
    keyboard.push_scancode(0x1e); // press
    keyboard.push_scancode(0x9e); // release
    assert_eq!(keyboard.poll_char(), Some('a'));
    assert_eq!(keyboard.poll_char(), None);
    assert_eq!(keyboard.poll_char(), None);
}

#[test]
fn shift_modifies_the_next_make_code() {
    let mut keyboard = KeyboardState::new();
    keyboard.push_scancode(0x2a); // left shift press
    keyboard.push_scancode(0x1e); // 'a' press
    keyboard.push_scancode(0xaa); // left shift release
    keyboard.push_scancode(0x1e); // 'a' press again

    let mut decoded = Vec::new();
    for _ in 0..4 {
        if let Some(ch) = keyboard.poll_char() {
            decoded.push(ch);
        }
    }
    assert_eq!(decoded, ['A', 'a']);
}

#[test]
fn a_partial_augmented_sequence_yields_nothing_yet() {
    let mut keyboard = KeyboardState::new();
    keyboard.push_scancode(0xe0); // extended prefix only
    assert_eq!(keyboard.poll_char(), None);
}

#[test]
fn a_completed_augmented_key_without_data_yields_none() {
    let mut keyboard = KeyboardState::new();
    keyboard.push_scancode(0xe0);
    keyboard.push_scancode(0x48); // cursor-up make
    assert_eq!(keyboard.poll_char(), None);
    assert_eq!(keyboard.poll_char(), None);
}

#[test]
fn decode_state_survives_across_polls() {
    let mut keyboard = KeyboardState::new();
    keyboard.push_scancode(0xe0);
    assert_eq!(keyboard.poll_char(), None);
    // The prefix is retained; bytes typed afterwards still decode
    keyboard.push_scancode(0x48);
    assert_eq!(keyboard.poll_char(), None);
    keyboard.push_scancode(0x1e);
    assert_eq!(keyboard.poll_char(), Some('a'));
}
