/// System-wide hardware constants to avoid magic numbers

/// VGA text mode constants
pub mod vga {
    /// VGA text buffer physical address
    pub const BUFFER_ADDR: usize = 0xb8000;

    /// VGA text mode dimensions
    pub const BUFFER_HEIGHT: usize = 25;
    pub const BUFFER_WIDTH: usize = 80;

    /// CRT controller ports
    pub const CRTC_INDEX_PORT: u16 = 0x3D4;
    pub const CRTC_DATA_PORT: u16 = 0x3D5;

    /// Cursor location registers (high/low byte of the linear cell offset)
    pub const CURSOR_LOCATION_HIGH: u8 = 0x0E;
    pub const CURSOR_LOCATION_LOW: u8 = 0x0F;

    /// One cell past the grid; pointing the cursor location register here
    /// parks the blinking cursor off-screen.
    pub const CURSOR_PARK_OFFSET: u16 = (BUFFER_HEIGHT * BUFFER_WIDTH) as u16 + 1;

    /// Color codes occupy a single attribute byte
    pub const COLOR_LIMIT: u16 = 0x100;
}

/// PS/2 keyboard controller constants
pub mod keyboard {
    /// PS/2 keyboard data port
    pub const DATA_PORT: u16 = 0x60;
}

/// Interrupt constants
pub mod interrupts {
    /// PIC (Programmable Interrupt Controller) offsets.
    /// PIC interrupts are remapped to start at 32 to avoid conflicts with
    /// CPU exceptions.
    pub const PIC_1_OFFSET: u8 = 32;
    pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

    /// Master PIC interrupt mask port
    pub const PIC_1_DATA_PORT: u16 = 0x21;
}

/// Programmable interval timer (8253/8254) constants
pub mod timer {
    /// PIT input clock in Hz
    pub const TIMER_RATE: u32 = 1_193_182;

    /// Tick frequency the timer is programmed for
    pub const TICKS_PER_SEC: u32 = 100;

    /// Channel 0 data port and mode/command port
    pub const CHANNEL_0_PORT: u16 = 0x40;
    pub const MODE_PORT: u16 = 0x43;

    /// Channel 0, lobyte/hibyte access, square-wave mode, binary counting
    pub const SQUARE_WAVE_CMD: u8 = 0x36;
}

/// Serial port constants
pub mod serial {
    /// COM1 base port
    pub const COM1_PORT: u16 = 0x3F8;
}
