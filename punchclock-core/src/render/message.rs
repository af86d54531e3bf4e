//! Render messages

use heapless::String;
use punchclock_display::{GRID_COLS, GRID_ROWS, LINE_LEN};

/// Render errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    /// Row or column outside the grid
    OutOfBounds,
    /// Queue full, message dropped
    QueueFull,
}

/// Queue a message travels through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Priority {
    /// Status changes: stamps, view switches, work time
    High,
    /// Periodic clock redraws
    Normal,
}

/// Text to draw at a grid position
///
/// The text is clipped at the right edge of the grid, so a message can
/// never write past the end of its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderMessage {
    row: u8,
    column: u8,
    text: String<LINE_LEN>,
    clipped: bool,
}

impl RenderMessage {
    pub fn new(row: u8, column: u8, text: &str) -> Result<Self, RenderError> {
        if row as usize >= GRID_ROWS || column as usize >= GRID_COLS {
            return Err(RenderError::OutOfBounds);
        }

        let room = GRID_COLS - column as usize;
        let mut clipped = false;
        let mut s = String::new();
        for (i, ch) in text.chars().enumerate() {
            if i == room || s.push(ch).is_err() {
                clipped = true;
                break;
            }
        }

        Ok(Self {
            row,
            column,
            text: s,
            clipped,
        })
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// True if the text did not fit and was cut at the grid edge
    pub fn was_clipped(&self) -> bool {
        self.clipped
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RenderMessage {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "({}, {}) \"{=str}\"",
            self.row,
            self.column,
            self.text.as_str()
        );
    }
}

/// Unit of work for the render consumer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderCommand {
    /// Draw text
    Text(RenderMessage),
    /// Blank the whole display
    Clear,
}

impl RenderCommand {
    pub fn text(row: u8, column: u8, text: &str) -> Result<Self, RenderError> {
        RenderMessage::new(row, column, text).map(RenderCommand::Text)
    }
}
