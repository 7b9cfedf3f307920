//! Tick counter and callback delivery tests.

use std::sync::atomic::{AtomicU64, Ordering};

use kerncore::interrupts::IrqContext;
use kerncore::timer::Timer;

fn irq() -> IrqContext {
    // Tests stand in for the dispatcher here
    unsafe { IrqContext::enter() }
}

#[test]
fn ticks_start_at_zero() {
    let timer = Timer::new();
    assert_eq!(timer.ticks(), 0);
}

#[test]
fn each_tick_increments_exactly_once() {
    let mut timer = Timer::new();
    for expected in 1..=250u64 {
        assert_eq!(timer.tick(irq()), expected);
        assert_eq!(timer.ticks(), expected);
    }
}

#[test]
fn ticks_advance_without_a_handler() {
    let mut timer = Timer::new();
    timer.tick(irq());
    timer.tick(irq());
    assert_eq!(timer.ticks(), 2);
}

static LAST_SEEN: AtomicU64 = AtomicU64::new(0);
static CALLS: AtomicU64 = AtomicU64::new(0);

fn record(_irq: IrqContext, ticks: u64) {
    LAST_SEEN.store(ticks, Ordering::SeqCst);
    CALLS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn the_handler_sees_the_current_count() {
    let mut timer = Timer::new();
    timer.set_handler(record);
    for expected in 1..=5u64 {
        timer.tick(irq());
        assert_eq!(LAST_SEEN.load(Ordering::SeqCst), expected);
        assert_eq!(CALLS.load(Ordering::SeqCst), expected);
    }
}

static REPLACEMENT_CALLS: AtomicU64 = AtomicU64::new(0);

fn replacement(_irq: IrqContext, _ticks: u64) {
    REPLACEMENT_CALLS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn installing_a_handler_replaces_the_previous_one() {
    static FIRST_CALLS: AtomicU64 = AtomicU64::new(0);
    fn first(_irq: IrqContext, _ticks: u64) {
        FIRST_CALLS.fetch_add(1, Ordering::SeqCst);
    }

    let mut timer = Timer::new();
    timer.set_handler(first);
    timer.tick(irq());
    timer.set_handler(replacement);
    timer.tick(irq());
    timer.tick(irq());

    assert_eq!(FIRST_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(REPLACEMENT_CALLS.load(Ordering::SeqCst), 2);
    // Replacing the handler never resets the count
    assert_eq!(timer.ticks(), 3);
}
