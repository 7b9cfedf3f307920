use spin::Mutex;
use x86_64::instructions::interrupts;
use x86_64::instructions::port::Port;

use crate::constants::timer::{CHANNEL_0_PORT, MODE_PORT, SQUARE_WAVE_CMD, TICKS_PER_SEC, TIMER_RATE};
use crate::interrupts::IrqContext;

/// Periodic tick callback. Runs synchronously inside the timer interrupt:
/// it must not block, allocate or re-enter the console or keyboard APIs.
/// The `IrqContext` token it receives grants access to interrupt-safe
/// operations only.
pub type TickHandler = fn(IrqContext, u64);

/// Monotonic tick count plus the registered callback. The count is never
/// reset; reinstalling only replaces the callback.
pub struct Timer {
    ticks: u64,
    handler: Option<TickHandler>,
}

impl Timer {
    pub const fn new() -> Timer {
        Timer {
            ticks: 0,
            handler: None,
        }
    }

    pub fn set_handler(&mut self, handler: TickHandler) {
        self.handler = Some(handler);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One timer interrupt: bump the counter exactly once, then hand the new
    /// count to the callback if one is registered.
    pub fn tick(&mut self, irq: IrqContext) -> u64 {
        self.ticks += 1;
        if let Some(handler) = self.handler {
            handler(irq, self.ticks);
        }
        self.ticks
    }
}

static TIMER: Mutex<Timer> = Mutex::new(Timer::new());

/// Program PIT channel 0 for the fixed tick rate: square-wave mode, then the
/// divisor low byte followed by the high byte.
pub(crate) fn program_pit() {
    let divisor = (TIMER_RATE / TICKS_PER_SEC) as u16;
    let mut mode: Port<u8> = Port::new(MODE_PORT);
    let mut channel0: Port<u8> = Port::new(CHANNEL_0_PORT);
    unsafe {
        mode.write(SQUARE_WAVE_CMD);
        channel0.write((divisor & 0xff) as u8);
        channel0.write((divisor >> 8) as u8);
    }
}

/// Programs the timer hardware for 100 ticks per second and registers the
/// tick callback, replacing any previous one.
pub fn install(handler: TickHandler) {
    program_pit();
    interrupts::without_interrupts(|| TIMER.lock().set_handler(handler));
}

/// Application-side read of the tick counter.
pub fn ticks() -> u64 {
    interrupts::without_interrupts(|| TIMER.lock().ticks())
}

/// Called by the interrupt dispatcher for every timer interrupt.
pub fn handle_tick(irq: IrqContext) {
    TIMER.lock().tick(irq);
}
