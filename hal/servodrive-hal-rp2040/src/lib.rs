//! RP2040-specific HAL for the servodrive firmware
//!
//! Implements the `servodrive-hal` traits on RP2040 peripherals:
//!
//! - GPIO relay outputs (implements `servodrive_hal::RelayOutput`)
//! - Flash position store (implements `servodrive_hal::PositionStore`)
//! - Pin allocation by number for config-driven relay assignment

#![no_std]

pub mod flash;
pub mod pins;
pub mod relay;

pub use flash::FlashPositionStore;
pub use pins::{BoardPeripherals, PinBank};
pub use relay::GpioRelays;
pub use servodrive_hal::StorageKey;
