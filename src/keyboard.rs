use pc_keyboard::{layouts, DecodedKey, HandleControl, Keyboard, ScancodeSet1};
use spin::Mutex;
use x86_64::instructions::interrupts;

use crate::interrupts::IrqContext;

/// Scancode buffer capacity for interrupt-driven keyboard input
const SCANCODE_QUEUE_SIZE: usize = 512;

/// Bounded ring of raw scancodes. The keyboard ISR is the only producer,
/// the polling decoder the only consumer.
pub struct ScancodeQueue {
    buffer: [u8; SCANCODE_QUEUE_SIZE],
    head: usize,
    tail: usize,
    count: usize,
}

impl ScancodeQueue {
    pub const fn new() -> ScancodeQueue {
        ScancodeQueue {
            buffer: [0; SCANCODE_QUEUE_SIZE],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Stores one scancode, failing when the ring is full. The producer runs
    /// in interrupt context and cannot block, so a full ring means the byte
    /// is lost.
    pub fn push(&mut self, scancode: u8) -> Result<(), ()> {
        if self.count == SCANCODE_QUEUE_SIZE {
            return Err(());
        }
        self.buffer[self.head] = scancode;
        self.head = (self.head + 1) % SCANCODE_QUEUE_SIZE;
        self.count += 1;
        Ok(())
    }

    /// Removes the oldest scancode, if any.
    pub fn pop(&mut self) -> Option<u8> {
        if self.count == 0 {
            return None;
        }
        let scancode = self.buffer[self.tail];
        self.tail = (self.tail + 1) % SCANCODE_QUEUE_SIZE;
        self.count -= 1;
        Some(scancode)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub const fn capacity(&self) -> usize {
        SCANCODE_QUEUE_SIZE
    }
}

/// Scancode ring plus the set-1 decode state machine that turns raw bytes
/// into key events.
pub struct KeyboardState {
    queue: ScancodeQueue,
    decoder: Keyboard<layouts::Us104Key, ScancodeSet1>,
}

impl KeyboardState {
    pub const fn new() -> KeyboardState {
        KeyboardState {
            queue: ScancodeQueue::new(),
            decoder: Keyboard::new(ScancodeSet1::new(), layouts::Us104Key, HandleControl::Ignore),
        }
    }

    /// Producer half: queue one raw scancode. Overflow drops the newest byte
    /// silently; the ISR has no channel to report it.
    pub fn push_scancode(&mut self, scancode: u8) {
        let _ = self.queue.push(scancode);
    }

    /// Consumer half: pop at most one byte from the ring and run it through
    /// the decoder. Returns a character only for a completed key-press event
    /// that carries one; an empty ring, a partial multi-byte sequence, a key
    /// release and a non-printable key all yield `None`. Never blocks.
    ///
    /// A multi-byte sequence truncated by ring overflow is simply abandoned:
    /// the decoder processes bytes as they arrive and does not resynchronize.
    pub fn poll_char(&mut self) -> Option<char> {
        let scancode = self.queue.pop()?;
        let event = self.decoder.add_byte(scancode).ok().flatten()?;
        match self.decoder.process_keyevent(event) {
            Some(DecodedKey::Unicode(ch)) => Some(ch),
            _ => None,
        }
    }
}

static KEYBOARD: Mutex<KeyboardState> = Mutex::new(KeyboardState::new());

/// Called by the interrupt dispatcher for every keyboard interrupt.
pub fn handle_scancode(_irq: IrqContext, scancode: u8) {
    KEYBOARD.lock().push_scancode(scancode);
}

/// Non-blocking poll for one decoded character. Application-thread only;
/// the lock is taken with interrupts masked so the keyboard ISR can never
/// find it held.
pub fn read_char() -> Option<char> {
    interrupts::without_interrupts(|| KEYBOARD.lock().poll_char())
}
