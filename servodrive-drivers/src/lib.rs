//! Motion control for a relay-driven servo drive
//!
//! This crate turns the board-agnostic pieces in `servodrive-core` into a
//! running controller on top of the `servodrive-hal` traits:
//!
//! - Relay interlock (never both relays on)
//! - Timed, interruptible moves with position estimation
//! - Desync recovery (baseline run and re-center)
//! - Command inbox and status publication

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod calibration;
pub mod channels;
pub mod controller;
pub mod relay;

#[cfg(test)]
mod mock;

pub use calibration::CalibrationRoutine;
pub use channels::ServoChannels;
pub use controller::{MotionController, MotionSettings, MoveOutcome, ServoError};
pub use relay::RelayPair;
