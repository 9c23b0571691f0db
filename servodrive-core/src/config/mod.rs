//! Servo configuration
//!
//! Types, validation, relay pin identifiers and the `servo.toml` reader.

pub mod parse;
pub mod pin;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use pin::{PinError, PinSpec, MAX_GPIO};
pub use types::*;
