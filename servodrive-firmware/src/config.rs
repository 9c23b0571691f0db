//! Boot-time configuration loading
//!
//! A TOML blob stored in flash overrides the `servo.toml` compiled into the
//! firmware. A stored blob that fails to parse is logged and ignored.

use defmt::*;

use servodrive_core::config::{parse_config, ParseError, ServoConfig};
use servodrive_hal_rp2040::flash::MAX_CONFIG_SIZE;
use servodrive_hal_rp2040::FlashPositionStore;

/// Embedded default configuration
/// Edit servo.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../servo.toml");

/// Load the configuration, preferring a copy stored in flash
pub async fn load_config(store: &mut FlashPositionStore<'_>) -> Result<ServoConfig, ParseError> {
    let mut buf = [0u8; MAX_CONFIG_SIZE];

    match store.read_config(&mut buf).await {
        Ok(Some(len)) => match core::str::from_utf8(&buf[..len]) {
            Ok(text) => match parse_config(text) {
                Ok(config) => {
                    info!("Loaded configuration from flash");
                    return Ok(config);
                }
                Err(e) => warn!("Stored configuration invalid: {}", e),
            },
            Err(_) => warn!("Stored configuration is not UTF-8"),
        },
        Ok(None) => info!("No configuration in flash, using embedded defaults"),
        Err(e) => warn!("Failed to read stored configuration: {}", e),
    }

    parse_config(EMBEDDED_CONFIG)
}
