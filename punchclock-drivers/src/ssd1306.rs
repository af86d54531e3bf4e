//! SSD1306 OLED display driver
//!
//! Drives a 128×64 SSD1306 over I2C as an 8×21 character grid. There is no
//! frame buffer: each glyph is rasterized into a 6×8 cell and sent straight
//! to the controller, which advances its own write pointer.

use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;

use punchclock_display::{DisplayError, GlyphDisplay, GRID_COLS, GRID_ROWS};

/// Default SSD1306 I2C address (0x3D with SA0 high)
pub const SSD1306_ADDR: u8 = 0x3C;

/// Display dimensions
const WIDTH: usize = 128;
const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// Pixels per character cell: 5 glyph columns plus 1 spacing
const CELL_WIDTH: usize = 6;

/// Control bytes
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const RESUME_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
    initialized: bool,
}

impl<I2C: I2c> Ssd1306<I2C> {
    /// Create a new SSD1306 driver
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            initialized: false,
        }
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn commands(&mut self, cmds: &[u8]) -> Result<(), DisplayError> {
        let mut buf = [0u8; 32];
        let len = cmds.len().min(buf.len() - 1);
        buf[0] = CONTROL_COMMAND;
        buf[1..=len].copy_from_slice(&cmds[..len]);
        self.i2c
            .write(self.address, &buf[..=len])
            .map_err(|_| DisplayError::Communication)
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        let mut buf = [0u8; WIDTH + 1];
        let len = bytes.len().min(WIDTH);
        buf[0] = CONTROL_DATA;
        buf[1..=len].copy_from_slice(&bytes[..len]);
        self.i2c
            .write(self.address, &buf[..=len])
            .map_err(|_| DisplayError::Communication)
    }

    fn check_ready(&self) -> Result<(), DisplayError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DisplayError::NotInitialized)
        }
    }
}

impl<I2C: I2c> GlyphDisplay for Ssd1306<I2C> {
    fn init(&mut self) -> Result<(), DisplayError> {
        self.commands(&[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80, // Default clock
            cmd::SET_MUX_RATIO,
            (HEIGHT - 1) as u8,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
            cmd::SET_MEMORY_MODE,
            0x00,                  // Horizontal addressing
            cmd::SET_SEG_REMAP,    // Flip horizontally
            cmd::SET_COM_SCAN_DEC, // Flip vertically
            cmd::SET_COM_PINS,
            0x12, // Alternative COM config
            cmd::SET_CONTRAST,
            0xCF, // High contrast
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::RESUME_RAM,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ])?;
        self.initialized = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.check_ready()?;
        self.commands(&[
            cmd::SET_COLUMN_ADDR,
            0,
            (WIDTH - 1) as u8,
            cmd::SET_PAGE_ADDR,
            0,
            (PAGES - 1) as u8,
        ])?;
        let blank = [0u8; WIDTH];
        for _ in 0..PAGES {
            self.data(&blank)?;
        }
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        self.check_ready()?;
        if col as usize >= GRID_COLS || row as usize >= GRID_ROWS {
            return Err(DisplayError::InvalidCoordinates);
        }
        self.commands(&[
            cmd::SET_COLUMN_ADDR,
            col * CELL_WIDTH as u8,
            (WIDTH - 1) as u8,
            cmd::SET_PAGE_ADDR,
            row,
            (PAGES - 1) as u8,
        ])
    }

    fn write_glyph(&mut self, ch: char) -> Result<(), DisplayError> {
        self.check_ready()?;
        let cell = GlyphCell::render(ch);
        self.data(&cell.columns)
    }
}

/// One character cell in controller page format: a byte per pixel column,
/// least significant bit at the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct GlyphCell {
    columns: [u8; CELL_WIDTH],
}

impl GlyphCell {
    fn render(ch: char) -> Self {
        let mut cell = GlyphCell::default();
        let mut utf8 = [0u8; 4];
        let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
        // Drawing into a cell cannot fail
        let _ = Text::with_baseline(ch.encode_utf8(&mut utf8), Point::zero(), style, Baseline::Top)
            .draw(&mut cell);
        cell
    }
}

impl OriginDimensions for GlyphCell {
    fn size(&self) -> Size {
        Size::new(CELL_WIDTH as u32, 8)
    }
}

impl DrawTarget for GlyphCell {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (x, y) = (point.x, point.y);
            if !(0..CELL_WIDTH as i32).contains(&x) || !(0..8).contains(&y) {
                continue;
            }
            let bit = 1u8 << y;
            if color.is_on() {
                self.columns[x as usize] |= bit;
            } else {
                self.columns[x as usize] &= !bit;
            }
        }
        Ok(())
    }
}
