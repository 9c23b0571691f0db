//! Host link protocol
//!
//! The board is driven by a home-automation host over UART. This crate
//! defines the byte-level framing, the command/status messages carried in
//! those frames, and the mapping from the host's cover-entity services onto
//! controller commands.
//!
//! # Frame format
//!
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 0–32B       │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The host only ever talks in commands; all motion logic stays on the
//! board.

#![no_std]
#![deny(unsafe_code)]

pub mod entity;
pub mod frame;
pub mod messages;

pub use entity::{CoverFeatures, CoverState, ServiceCall, ServiceError};
pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{DeviceMessage, HostMessage};
