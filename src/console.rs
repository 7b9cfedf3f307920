use core::fmt;
use lazy_static::lazy_static;
use spin::Mutex;
use volatile::Volatile;
use x86_64::instructions::port::Port;

use crate::constants::vga::{
    BUFFER_ADDR, BUFFER_HEIGHT, BUFFER_WIDTH, COLOR_LIMIT, CRTC_DATA_PORT, CRTC_INDEX_PORT,
    CURSOR_LOCATION_HIGH, CURSOR_LOCATION_LOW, CURSOR_PARK_OFFSET,
};

/// Errors reported by the fallible console operations. Every failure leaves
/// the console state completely untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// Color code outside `[0, 0x100)`
    InvalidColor,
    /// Cursor or cell coordinates outside the grid
    OutOfBounds,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

/// One foreground/background attribute byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    /// Validates a raw color code. Anything that does not fit the attribute
    /// byte is rejected.
    pub fn new(raw: u16) -> Result<ColorCode, ConsoleError> {
        if raw < COLOR_LIMIT {
            Ok(ColorCode(raw as u8))
        } else {
            Err(ConsoleError::InvalidColor)
        }
    }

    pub const fn from_colors(foreground: Color, background: Color) -> ColorCode {
        ColorCode((foreground as u8) | ((background as u8) << 4))
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

/// One character cell: ASCII byte plus attribute byte, exactly as the VGA
/// hardware lays them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ScreenChar {
    pub ascii_character: u8,
    pub color_code: ColorCode,
}

/// The memory-mapped character grid.
#[repr(transparent)]
pub struct Buffer {
    chars: [[Volatile<ScreenChar>; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

/// Where the blinking hardware cursor is told to go. The CRT controller is
/// the real target; tests substitute a recording stub.
pub trait CursorHandle {
    /// Point the hardware cursor at a linear cell offset.
    fn set_offset(&mut self, offset: u16);
}

/// CRT controller cursor-location registers behind the index/data port pair.
pub struct CrtCursor {
    index: Port<u8>,
    data: Port<u8>,
}

impl CrtCursor {
    pub const fn new() -> CrtCursor {
        CrtCursor {
            index: Port::new(CRTC_INDEX_PORT),
            data: Port::new(CRTC_DATA_PORT),
        }
    }
}

impl CursorHandle for CrtCursor {
    fn set_offset(&mut self, offset: u16) {
        unsafe {
            self.index.write(CURSOR_LOCATION_HIGH);
            self.data.write((offset >> 8) as u8);
            self.index.write(CURSOR_LOCATION_LOW);
            self.data.write((offset & 0xff) as u8);
        }
    }
}

/// Text console over a character grid: logical cursor, active color and the
/// hidden/shown state of the hardware cursor.
///
/// Single-threaded access is a precondition, not an enforced lock: all
/// operations are meant to be called from the application thread only, never
/// from interrupt context.
pub struct Console<H: CursorHandle> {
    row: usize,
    col: usize,
    color: ColorCode,
    hidden: bool,
    buffer: &'static mut Buffer,
    cursor_hw: H,
}

impl Console<CrtCursor> {
    /// Console over the VGA text-mode buffer.
    ///
    /// # Safety
    ///
    /// Requires the VGA buffer to be identity-mapped at its physical address
    /// and at most one live console over it.
    pub unsafe fn vga() -> Console<CrtCursor> {
        Console::new(&mut *(BUFFER_ADDR as *mut Buffer), CrtCursor::new())
    }
}

impl<H: CursorHandle> Console<H> {
    pub fn new(buffer: &'static mut Buffer, cursor_hw: H) -> Console<H> {
        Console {
            row: 0,
            col: 0,
            color: ColorCode::from_colors(Color::LightGray, Color::Black),
            hidden: false,
            buffer,
            cursor_hw,
        }
    }

    fn blank(&self) -> ScreenChar {
        ScreenChar {
            ascii_character: b' ',
            color_code: self.color,
        }
    }

    /// Push the logical cursor position out to the hardware. A hidden cursor
    /// stays parked off-screen; it only reappears via `show_cursor`.
    fn sync_cursor(&mut self) {
        if !self.hidden {
            let offset = (self.row * BUFFER_WIDTH + self.col) as u16;
            self.cursor_hw.set_offset(offset);
        }
    }

    /// Prints one byte at the cursor.
    ///
    /// `\n` moves to column 0 of the next row (scrolling off the last row),
    /// `\r` to column 0 of the current row. `\b` steps the cursor back one
    /// cell, clamped at the first cell, and blanks that cell in the current
    /// color; only the immediately preceding cell is erased, there is no
    /// deeper history. Any other byte lands at the cursor in the current
    /// color and the cursor advances, wrapping and scrolling as needed.
    pub fn put_byte(&mut self, byte: u8) {
        match byte {
            b'\n' => {
                self.col = 0;
                self.row += 1;
                if self.row >= BUFFER_HEIGHT {
                    self.row = BUFFER_HEIGHT - 1;
                    self.scroll();
                }
            }
            b'\r' => {
                self.col = 0;
            }
            0x08 => {
                // Linear step back, so backspace crosses wrapped lines
                let mut pos = self.row * BUFFER_WIDTH + self.col;
                pos = pos.saturating_sub(1);
                self.row = pos / BUFFER_WIDTH;
                self.col = pos % BUFFER_WIDTH;
                let blank = self.blank();
                self.buffer.chars[self.row][self.col].write(blank);
            }
            _ => {
                self.buffer.chars[self.row][self.col].write(ScreenChar {
                    ascii_character: byte,
                    color_code: self.color,
                });
                let pos = self.row * BUFFER_WIDTH + self.col + 1;
                self.row = pos / BUFFER_WIDTH;
                self.col = pos % BUFFER_WIDTH;
                if self.row >= BUFFER_HEIGHT {
                    self.row = BUFFER_HEIGHT - 1;
                    self.scroll();
                }
            }
        }
        self.sync_cursor();
    }

    /// Prints a byte slice via `put_byte`. An empty slice has no effect.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.put_byte(byte);
        }
    }

    pub fn put_str(&mut self, s: &str) {
        self.put_bytes(s.as_bytes());
    }

    /// Changes the color applied to subsequent writes. An invalid code
    /// leaves the active color unchanged.
    pub fn set_color(&mut self, raw: u16) -> Result<(), ConsoleError> {
        self.color = ColorCode::new(raw)?;
        Ok(())
    }

    pub fn get_color(&self) -> u8 {
        self.color.as_u8()
    }

    /// Moves the logical cursor. Out-of-range coordinates fail without
    /// mutating anything.
    pub fn set_cursor(&mut self, row: usize, col: usize) -> Result<(), ConsoleError> {
        if row >= BUFFER_HEIGHT || col >= BUFFER_WIDTH {
            return Err(ConsoleError::OutOfBounds);
        }
        self.row = row;
        self.col = col;
        self.sync_cursor();
        Ok(())
    }

    pub fn get_cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Parks the hardware cursor off-screen. Cursor movement keeps being
    /// tracked logically but stays invisible until `show_cursor`.
    pub fn hide_cursor(&mut self) {
        self.hidden = true;
        self.cursor_hw.set_offset(CURSOR_PARK_OFFSET);
    }

    /// Makes the hardware cursor visible at the logical position again.
    pub fn show_cursor(&mut self) {
        self.hidden = false;
        self.sync_cursor();
    }

    /// Copies every row except the first up by one and blanks the last row
    /// in the current color. The first row's contents are discarded.
    pub fn scroll(&mut self) {
        for row in 1..BUFFER_HEIGHT {
            for col in 0..BUFFER_WIDTH {
                let character = self.buffer.chars[row][col].read();
                self.buffer.chars[row - 1][col].write(character);
            }
        }
        self.clear_row(BUFFER_HEIGHT - 1);
    }

    fn clear_row(&mut self, row: usize) {
        let blank = self.blank();
        for col in 0..BUFFER_WIDTH {
            self.buffer.chars[row][col].write(blank);
        }
    }

    /// Blanks the whole grid in the current color and homes the cursor.
    /// The hidden/shown state survives the clear.
    pub fn clear(&mut self) {
        for row in 0..BUFFER_HEIGHT {
            self.clear_row(row);
        }
        self.row = 0;
        self.col = 0;
        self.sync_cursor();
    }

    /// Writes one cell directly, bypassing the cursor. A no-op if any
    /// argument is out of range.
    pub fn draw_char(&mut self, row: usize, col: usize, ch: u8, color: u16) {
        if row >= BUFFER_HEIGHT || col >= BUFFER_WIDTH {
            return;
        }
        let color_code = match ColorCode::new(color) {
            Ok(code) => code,
            Err(_) => return,
        };
        self.buffer.chars[row][col].write(ScreenChar {
            ascii_character: ch,
            color_code,
        });
    }

    /// Reads the character at a cell. Unchecked: coordinates are assumed to
    /// be in range.
    pub fn char_at(&self, row: usize, col: usize) -> u8 {
        self.cell_at(row, col).ascii_character
    }

    pub fn cell_at(&self, row: usize, col: usize) -> ScreenChar {
        self.buffer.chars[row][col].read()
    }
}

impl<H: CursorHandle> fmt::Write for Console<H> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            match byte {
                0x20..=0x7e | b'\n' | b'\r' | 0x08 => self.put_byte(byte),
                _ => self.put_byte(0xfe),
            }
        }
        Ok(())
    }
}

lazy_static! {
    pub static ref CONSOLE: Mutex<Console<CrtCursor>> = Mutex::new(unsafe { Console::vga() });
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::console::_print(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    let _ = CONSOLE.lock().write_fmt(args);
}

/// helpers over the global console
pub fn put_char(ch: u8) {
    CONSOLE.lock().put_byte(ch);
}

pub fn put_str(s: &str) {
    CONSOLE.lock().put_str(s);
}

pub fn set_color(raw: u16) -> Result<(), ConsoleError> {
    CONSOLE.lock().set_color(raw)
}

pub fn get_color() -> u8 {
    CONSOLE.lock().get_color()
}

pub fn set_cursor(row: usize, col: usize) -> Result<(), ConsoleError> {
    CONSOLE.lock().set_cursor(row, col)
}

pub fn get_cursor() -> (usize, usize) {
    CONSOLE.lock().get_cursor()
}

pub fn hide_cursor() {
    CONSOLE.lock().hide_cursor();
}

pub fn show_cursor() {
    CONSOLE.lock().show_cursor();
}

pub fn clear_screen() {
    CONSOLE.lock().clear();
}

pub fn draw_char(row: usize, col: usize, ch: u8, color: u16) {
    CONSOLE.lock().draw_char(row, col, ch, color);
}

pub fn char_at(row: usize, col: usize) -> u8 {
    CONSOLE.lock().char_at(row, col)
}
