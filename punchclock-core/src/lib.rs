//! Board-agnostic core logic for the Punchclock work timestamper
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Event flags coupling the tasks
//! - Button debouncing
//! - Work session state machine
//! - Wall clock, time zone and fixed-width formatting
//! - Two-priority render queues, arbitration and write suppression
//! - Screens, time sync procedure and task-level operations
//! - Configuration types and parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod app;
pub mod config;
pub mod debounce;
pub mod flags;
pub mod format;
pub mod render;
pub mod session;
pub mod sync;
pub mod time;
pub mod view;

#[cfg(test)]
mod testing;
