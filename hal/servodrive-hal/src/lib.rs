//! Servodrive Hardware Abstraction Layer
//!
//! This crate defines the two capabilities the motion controller consumes
//! from its environment. Board HALs (RP2040) and host bridges implement them;
//! the controller never talks to hardware directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  servodrive-drivers (MotionController)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  servodrive-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ servodrive-   │       │  host bridge  │
//! │  hal-rp2040   │       │  (entities)   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`relay::RelayOutput`] - Plus/minus relay dispatch
//! - [`store::PositionStore`] - Durable numeric position value

#![no_std]
#![deny(unsafe_code)]

pub mod relay;
pub mod store;

// Re-export key traits at crate root for convenience
pub use relay::{Relay, RelayError, RelayOutput};
pub use store::{PositionStore, StorageKey, StoreError};
