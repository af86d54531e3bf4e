//! Configuration
//!
//! Types for the appliance settings and a parser for the TOML file that
//! is embedded in the firmware image.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
