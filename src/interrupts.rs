use core::marker::PhantomData;

use lazy_static::lazy_static;
use pic8259::ChainedPics;
use spin::Mutex;
use x86_64::instructions::hlt;
use x86_64::instructions::port::Port;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame};

use crate::constants::interrupts::{PIC_1_DATA_PORT, PIC_1_OFFSET, PIC_2_OFFSET};
use crate::constants::keyboard::DATA_PORT;
use crate::serial_println;
use crate::{keyboard, timer};

/// Proof of interrupt context. Minted only by the dispatcher on entry to an
/// interrupt handler and threaded through every interrupt-side operation, so
/// those operations cannot be reached from ordinary application code by
/// accident. `!Send` keeps a token from leaking out of the handler.
#[derive(Clone, Copy)]
pub struct IrqContext {
    _not_send: PhantomData<*mut ()>,
}

impl IrqContext {
    /// # Safety
    ///
    /// The caller must be executing inside an interrupt handler with
    /// interrupt delivery disabled.
    pub unsafe fn enter() -> IrqContext {
        IrqContext {
            _not_send: PhantomData,
        }
    }
}

/// Hardware interrupt numbers (after remapping)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InterruptIndex {
    Timer = PIC_1_OFFSET,
    Keyboard,
    // PIC 1 (master) IRQs 2-7
    Cascade,
    COM2,
    COM1,
    LPT2,
    FloppyDisk,
    LPT1,
    // PIC 2 (slave) IRQs 8-15
    RTC = PIC_2_OFFSET,
    ACPI,
    Available1,
    Available2,
    Mouse,
    CoProcessor,
    PrimaryATA,
    SecondaryATA,
}

impl InterruptIndex {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// The two devices this dispatcher services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Timer,
    Keyboard,
}

/// Routes a vector number to its device handler, if it has one.
pub fn device_for_vector(vector: u8) -> Option<Device> {
    if vector == InterruptIndex::Timer.as_u8() {
        Some(Device::Timer)
    } else if vector == InterruptIndex::Keyboard.as_u8() {
        Some(Device::Keyboard)
    } else {
        None
    }
}

/// Programmable Interrupt Controller (PIC) setup
pub static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

/// Single routing point for every serviced vector. Device vectors run their
/// handler and then acknowledge the PIC exactly once; a vector with no
/// device handler is logged and returns unacknowledged, since it means the
/// gate table is misconfigured, not that the application can recover.
fn dispatch(vector: u8) {
    let irq = unsafe { IrqContext::enter() };
    match device_for_vector(vector) {
        Some(Device::Timer) => {
            timer::handle_tick(irq);
            end_of_interrupt(vector);
        }
        Some(Device::Keyboard) => {
            // Exactly one scancode per firing
            let mut port = Port::new(DATA_PORT);
            let scancode: u8 = unsafe { port.read() };
            keyboard::handle_scancode(irq, scancode);
            end_of_interrupt(vector);
        }
        None => {
            serial_println!("int: vector {} has no installed handler", vector);
        }
    }
}

fn end_of_interrupt(vector: u8) {
    unsafe {
        PICS.lock().notify_end_of_interrupt(vector);
    }
}

extern "x86-interrupt" fn timer_interrupt_handler(_stack_frame: InterruptStackFrame) {
    dispatch(InterruptIndex::Timer.as_u8());
}

extern "x86-interrupt" fn keyboard_interrupt_handler(_stack_frame: InterruptStackFrame) {
    dispatch(InterruptIndex::Keyboard.as_u8());
}

/// Gates for the PIC vectors without a device handler. Each one still enters
/// the dispatcher so the unknown-vector diagnostic fires with the right
/// vector number.
macro_rules! unexpected_handler {
    ($name:ident, $index:expr) => {
        extern "x86-interrupt" fn $name(_stack_frame: InterruptStackFrame) {
            dispatch($index.as_u8());
        }
    };
}

unexpected_handler!(cascade_handler, InterruptIndex::Cascade);
unexpected_handler!(com2_handler, InterruptIndex::COM2);
unexpected_handler!(com1_handler, InterruptIndex::COM1);
unexpected_handler!(lpt2_handler, InterruptIndex::LPT2);
unexpected_handler!(floppy_handler, InterruptIndex::FloppyDisk);
unexpected_handler!(lpt1_handler, InterruptIndex::LPT1);
unexpected_handler!(rtc_handler, InterruptIndex::RTC);
unexpected_handler!(acpi_handler, InterruptIndex::ACPI);
unexpected_handler!(available1_handler, InterruptIndex::Available1);
unexpected_handler!(available2_handler, InterruptIndex::Available2);
unexpected_handler!(mouse_handler, InterruptIndex::Mouse);
unexpected_handler!(coprocessor_handler, InterruptIndex::CoProcessor);
unexpected_handler!(primary_ata_handler, InterruptIndex::PrimaryATA);
unexpected_handler!(secondary_ata_handler, InterruptIndex::SecondaryATA);

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();

        // CPU exceptions
        idt.breakpoint.set_handler_fn(breakpoint_handler);

        // Double fault handler with separate stack (IST)
        unsafe {
            idt.double_fault
                .set_handler_fn(double_fault_handler)
                .set_stack_index(crate::gdt::DOUBLE_FAULT_IST_INDEX);
        }

        // Device gates: exactly the timer and keyboard
        idt[InterruptIndex::Timer.as_u8()].set_handler_fn(timer_interrupt_handler);
        idt[InterruptIndex::Keyboard.as_u8()].set_handler_fn(keyboard_interrupt_handler);

        // Remaining PIC vectors route into the unknown-vector diagnostic
        idt[InterruptIndex::Cascade.as_u8()].set_handler_fn(cascade_handler);
        idt[InterruptIndex::COM2.as_u8()].set_handler_fn(com2_handler);
        idt[InterruptIndex::COM1.as_u8()].set_handler_fn(com1_handler);
        idt[InterruptIndex::LPT2.as_u8()].set_handler_fn(lpt2_handler);
        idt[InterruptIndex::FloppyDisk.as_u8()].set_handler_fn(floppy_handler);
        idt[InterruptIndex::LPT1.as_u8()].set_handler_fn(lpt1_handler);
        idt[InterruptIndex::RTC.as_u8()].set_handler_fn(rtc_handler);
        idt[InterruptIndex::ACPI.as_u8()].set_handler_fn(acpi_handler);
        idt[InterruptIndex::Available1.as_u8()].set_handler_fn(available1_handler);
        idt[InterruptIndex::Available2.as_u8()].set_handler_fn(available2_handler);
        idt[InterruptIndex::Mouse.as_u8()].set_handler_fn(mouse_handler);
        idt[InterruptIndex::CoProcessor.as_u8()].set_handler_fn(coprocessor_handler);
        idt[InterruptIndex::PrimaryATA.as_u8()].set_handler_fn(primary_ata_handler);
        idt[InterruptIndex::SecondaryATA.as_u8()].set_handler_fn(secondary_ata_handler);

        idt
    };
}

/// One-time startup: load the gate table, remap and initialize the PICs,
/// program the timer, unmask the two device IRQs and enable delivery.
/// Re-invocation re-programs the hardware rather than failing.
pub fn init() {
    IDT.load();

    unsafe {
        PICS.lock().initialize();
    }

    timer::program_pit();

    // Unmask timer (IRQ0) and keyboard (IRQ1) on the master PIC
    unsafe {
        let mut pic1_data: Port<u8> = Port::new(PIC_1_DATA_PORT);
        let mask = pic1_data.read();
        pic1_data.write(mask & !0b11);
    }

    x86_64::instructions::interrupts::enable();
}

// Exception handlers

extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    serial_println!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    serial_println!("EXCEPTION: DOUBLE FAULT\n{:#?}", stack_frame);
    loop {
        hlt();
    }
}
