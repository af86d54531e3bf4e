//! Character-grid display abstraction for Punchclock
//!
//! This crate provides:
//! - `GlyphDisplay` trait: cursor addressing and glyph transmission
//! - `DisplayError` shared by every display implementation
//! - `TextGrid`: an in-memory grid that records what was drawn
//!
//! # Grid
//!
//! Every display is driven as a fixed grid of 8 rows × 21 columns. On a
//! 128×64 OLED that is one 8-pixel page per row and a 6-pixel glyph cell
//! (5 pixels of glyph plus 1 pixel spacing) per column.

#![no_std]

pub mod backend;
pub mod grid;

// Re-export key types
pub use backend::{DisplayError, GlyphDisplay};
pub use grid::{TextGrid, GRID_COLS, GRID_ROWS, LINE_LEN};
