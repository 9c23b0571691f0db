//! Board-agnostic core logic for the servodrive controller
//!
//! This crate contains all application logic that does not depend on
//! timers, relays or storage:
//!
//! - Position type and travel-time estimation
//! - Motion state machine, commands and status snapshots
//! - Configuration types, parsing and validation

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod motion;
pub mod state;
