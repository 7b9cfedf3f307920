//! Hardware-facing kernel core: interrupt dispatch for a programmable timer
//! and a PS/2 keyboard, plus a memory-mapped VGA text console.
//!
//! The crate bridges asynchronous hardware events into a form a
//! single-threaded application loop can consume. Two interrupt service
//! routines preempt that loop: the timer ISR bumps a tick counter and runs a
//! registered callback, the keyboard ISR queues raw scancodes into a bounded
//! ring. The application polls [`keyboard::read_char`] for decoded key
//! presses and drives the [`console`] to render output. Process management,
//! scheduling and boot setup are out of scope.

#![no_std]
#![feature(abi_x86_interrupt)]

pub mod console;
pub mod constants;
pub mod gdt;
pub mod interrupts;
pub mod keyboard;
pub mod serial;
pub mod timer;

/// One-time startup: segment tables, serial diagnostics, then the gate
/// table, PIC remap, timer programming and interrupt delivery. Must run
/// before any device interrupt can fire.
pub fn init() {
    gdt::init();
    serial::init();
    interrupts::init();
}
