//! In-memory character grid
//!
//! `TextGrid` implements `GlyphDisplay` without hardware. It keeps the drawn
//! characters and counts device operations, which makes it the display of
//! choice for host tests and for mirroring what a panel shows.

use heapless::String;

use crate::backend::{DisplayError, GlyphDisplay};

/// Number of character rows
pub const GRID_ROWS: usize = 8;

/// Number of character columns
pub const GRID_COLS: usize = 21;

/// Maximum characters per line
pub const LINE_LEN: usize = GRID_COLS;

/// Counters of operations that reached the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GridStats {
    pub inits: u32,
    pub clears: u32,
    pub cursor_moves: u32,
    pub glyphs: u32,
}

/// Character grid held in RAM
#[derive(Clone)]
pub struct TextGrid {
    cells: [[u8; GRID_COLS]; GRID_ROWS],
    cursor: (usize, usize),
    initialized: bool,
    /// Number of upcoming glyph writes that should fail
    failing_glyphs: u32,
    /// Number of upcoming clears that should fail
    failing_clears: u32,
    stats: GridStats,
}

impl Default for TextGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl TextGrid {
    /// Create a blank, uninitialized grid
    pub const fn new() -> Self {
        Self {
            cells: [[b' '; GRID_COLS]; GRID_ROWS],
            cursor: (0, 0),
            initialized: false,
            failing_glyphs: 0,
            failing_clears: 0,
            stats: GridStats {
                inits: 0,
                clears: 0,
                cursor_moves: 0,
                glyphs: 0,
            },
        }
    }

    /// Make the next `count` glyph writes report a communication error
    pub fn fail_next_glyphs(&mut self, count: u32) {
        self.failing_glyphs = count;
    }

    /// Make the next `count` clears report a communication error
    pub fn fail_next_clears(&mut self, count: u32) {
        self.failing_clears = count;
    }

    /// Text of a row with trailing blanks removed
    pub fn line(&self, row: usize) -> String<LINE_LEN> {
        let mut line = String::new();
        if let Some(cells) = self.cells.get(row) {
            for &b in cells {
                let _ = line.push(b as char);
            }
        }
        let trimmed = line.trim_end().len();
        line.truncate(trimmed);
        line
    }

    /// Operation counters
    pub fn stats(&self) -> GridStats {
        self.stats
    }

    /// Reset operation counters, keeping the content
    pub fn reset_stats(&mut self) {
        self.stats = GridStats::default();
    }

    /// Check if `init` has been called
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn check_ready(&self) -> Result<(), DisplayError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DisplayError::NotInitialized)
        }
    }
}

impl GlyphDisplay for TextGrid {
    fn init(&mut self) -> Result<(), DisplayError> {
        self.initialized = true;
        self.stats.inits += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.check_ready()?;
        if self.failing_clears > 0 {
            self.failing_clears -= 1;
            return Err(DisplayError::Communication);
        }
        self.cells = [[b' '; GRID_COLS]; GRID_ROWS];
        self.cursor = (0, 0);
        self.stats.clears += 1;
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        self.check_ready()?;
        let (col, row) = (col as usize, row as usize);
        if col >= GRID_COLS || row >= GRID_ROWS {
            return Err(DisplayError::InvalidCoordinates);
        }
        self.cursor = (col, row);
        self.stats.cursor_moves += 1;
        Ok(())
    }

    fn write_glyph(&mut self, ch: char) -> Result<(), DisplayError> {
        self.check_ready()?;
        if self.failing_glyphs > 0 {
            self.failing_glyphs -= 1;
            return Err(DisplayError::Communication);
        }
        let (col, row) = self.cursor;
        if row >= GRID_ROWS {
            return Err(DisplayError::InvalidCoordinates);
        }
        self.cells[row][col] = if ch.is_ascii() && !ch.is_ascii_control() {
            ch as u8
        } else {
            b'?'
        };
        self.stats.glyphs += 1;

        // Same wrap as a page-addressed controller: end of row continues on the next
        self.cursor = if col + 1 == GRID_COLS {
            (0, row + 1)
        } else {
            (col + 1, row)
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_init() {
        let mut grid = TextGrid::new();
        assert_eq!(grid.clear(), Err(DisplayError::NotInitialized));
        assert_eq!(grid.write_glyph('a'), Err(DisplayError::NotInitialized));
        grid.init().unwrap();
        assert!(grid.is_initialized());
        assert!(grid.clear().is_ok());
    }

    #[test]
    fn test_write_text_at_position() {
        let mut grid = TextGrid::new();
        grid.init().unwrap();
        grid.write_text(0, 0, "12:00:05").unwrap();
        grid.write_text(14, 0, "working").unwrap();

        assert_eq!(grid.line(0).as_str(), "12:00:05      working");
        assert_eq!(grid.stats().glyphs, 15);
        assert_eq!(grid.stats().cursor_moves, 2);
    }

    #[test]
    fn test_cursor_bounds() {
        let mut grid = TextGrid::new();
        grid.init().unwrap();
        assert_eq!(
            grid.set_cursor(GRID_COLS as u8, 0),
            Err(DisplayError::InvalidCoordinates)
        );
        assert_eq!(
            grid.set_cursor(0, GRID_ROWS as u8),
            Err(DisplayError::InvalidCoordinates)
        );
    }

    #[test]
    fn test_glyph_wraps_to_next_row() {
        let mut grid = TextGrid::new();
        grid.init().unwrap();
        grid.write_text(20, 3, "ab").unwrap();
        assert_eq!(grid.line(3).as_str(), "                    a");
        assert_eq!(grid.line(4).as_str(), "b");

        // Past the last cell there is nowhere left to draw
        grid.set_cursor(20, 7).unwrap();
        grid.write_glyph('x').unwrap();
        assert_eq!(grid.write_glyph('y'), Err(DisplayError::InvalidCoordinates));
    }

    #[test]
    fn test_injected_failures() {
        let mut grid = TextGrid::new();
        grid.init().unwrap();
        grid.fail_next_glyphs(1);
        assert_eq!(grid.write_text(0, 1, "hi"), Err(DisplayError::Communication));
        assert!(grid.write_text(0, 1, "hi").is_ok());
        assert_eq!(grid.line(1).as_str(), "hi");
    }

    #[test]
    fn test_clear_blanks_content() {
        let mut grid = TextGrid::new();
        grid.init().unwrap();
        grid.write_text(0, 2, "net work: 01:00:00").unwrap();
        grid.clear().unwrap();
        assert_eq!(grid.line(2).as_str(), "");
        assert_eq!(grid.stats().clears, 1);
    }

    #[test]
    fn test_injected_clear_failure() {
        let mut grid = TextGrid::new();
        grid.init().unwrap();
        grid.write_text(0, 0, "kept").unwrap();
        grid.fail_next_clears(1);
        assert_eq!(grid.clear(), Err(DisplayError::Communication));
        assert_eq!(grid.line(0).as_str(), "kept");
        assert_eq!(grid.stats().clears, 0);
        assert!(grid.clear().is_ok());
    }

    #[test]
    fn test_non_ascii_replaced() {
        let mut grid = TextGrid::new();
        grid.init().unwrap();
        grid.write_text(0, 0, "°C").unwrap();
        assert_eq!(grid.line(0).as_str(), "?C");
    }
}
