//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in punchclock-display:
//!
//! - SSD1306 128×64 OLED in character mode over I2C

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod ssd1306;

pub use ssd1306::{Ssd1306, SSD1306_ADDR};
