//! Display backend trait
//!
//! Defines the interface the render pipeline drives. Implementations are
//! synchronous and blocking: each call is one device transaction that either
//! succeeds or fails, and failures are not retried here.

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Invalid coordinates or dimensions
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
}

/// Character-grid display
///
/// Coordinates are in character cells: `col` in `0..GRID_COLS`,
/// `row` in `0..GRID_ROWS`.
pub trait GlyphDisplay {
    /// Bring the controller up (power, addressing mode, contrast)
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Blank the whole display
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the write cursor to a character cell
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError>;

    /// Draw one character at the cursor and advance it by one cell
    fn write_glyph(&mut self, ch: char) -> Result<(), DisplayError>;

    /// Draw `text` starting at (`col`, `row`)
    fn write_text(&mut self, col: u8, row: u8, text: &str) -> Result<(), DisplayError> {
        self.set_cursor(col, row)?;
        for ch in text.chars() {
            self.write_glyph(ch)?;
        }
        Ok(())
    }
}

impl<T: GlyphDisplay + ?Sized> GlyphDisplay for &mut T {
    fn init(&mut self) -> Result<(), DisplayError> {
        (**self).init()
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        (**self).set_cursor(col, row)
    }

    fn write_glyph(&mut self, ch: char) -> Result<(), DisplayError> {
        (**self).write_glyph(ch)
    }

    fn write_text(&mut self, col: u8, row: u8, text: &str) -> Result<(), DisplayError> {
        (**self).write_text(col, row, text)
    }
}
