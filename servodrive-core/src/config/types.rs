//! Configuration type definitions
//!
//! Read once at startup. Required relay identifiers are never defaulted;
//! everything else falls back to the values below.

use heapless::String;

use crate::motion::{Position, TravelRate};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum display name length
pub const MAX_NAME_LEN: usize = 32;

/// Maximum relay / store identifier length
pub const MAX_ID_LEN: usize = 64;

/// Default display name
pub const DEFAULT_NAME: &str = "Meibes Servo Drive";

/// Default durable-store key for the position estimate
pub const DEFAULT_POSITION_ENTITY: &str = "input_number.meibes_servo_position";

/// Default full-stroke time in seconds
pub const DEFAULT_MAX_TIME_TO_MOVE_S: u16 = 30;

/// Default re-center target after calibration
pub const DEFAULT_CALIBRATION_CENTER: u8 = 50;

/// Default late-wake tolerance before an overshoot is logged
pub const DEFAULT_OVERSHOOT_TOLERANCE_MS: u32 = 250;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `switch_plus` was not given
    MissingSwitchPlus,
    /// `switch_minus` was not given
    MissingSwitchMinus,
    /// Both relays point at the same output
    SameSwitch,
    /// `max_time_to_move` is zero
    ZeroTravelTime,
    /// An identifier does not fit its buffer
    ValueTooLong,
    /// `calibration_center` is outside 0..=100
    InvalidCenter,
}

/// Validated servo configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoConfig {
    /// Display name
    pub name: String<MAX_NAME_LEN>,
    /// Identifier of the extend relay
    pub switch_plus: String<MAX_ID_LEN>,
    /// Identifier of the retract relay
    pub switch_minus: String<MAX_ID_LEN>,
    /// Full-stroke travel time (seconds)
    pub max_time_to_move_s: u16,
    /// Durable-store key for the position estimate
    pub position_entity: String<MAX_ID_LEN>,
    /// Re-center target after calibration
    pub calibration_center: u8,
    /// Late-wake tolerance before an overshoot is logged (ms)
    pub overshoot_tolerance_ms: u32,
}

impl ServoConfig {
    /// Start building a configuration
    pub fn builder() -> ServoConfigBuilder {
        ServoConfigBuilder::default()
    }

    /// Travel rate derived from `max_time_to_move_s`
    pub fn travel_rate(&self) -> Result<TravelRate, ConfigError> {
        TravelRate::from_secs(self.max_time_to_move_s).ok_or(ConfigError::ZeroTravelTime)
    }

    /// Re-center target as a position
    pub fn center(&self) -> Position {
        Position::new(self.calibration_center)
    }

    /// Check invariants a hand-assembled config might violate
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.switch_plus.is_empty() {
            return Err(ConfigError::MissingSwitchPlus);
        }
        if self.switch_minus.is_empty() {
            return Err(ConfigError::MissingSwitchMinus);
        }
        if self.switch_plus == self.switch_minus {
            return Err(ConfigError::SameSwitch);
        }
        if self.max_time_to_move_s == 0 {
            return Err(ConfigError::ZeroTravelTime);
        }
        if self.calibration_center > 100 {
            return Err(ConfigError::InvalidCenter);
        }
        Ok(())
    }
}

/// Builder for [`ServoConfig`]
///
/// Optional fields start at their defaults; `build` fails if a relay
/// identifier is missing.
#[derive(Debug, Clone)]
pub struct ServoConfigBuilder {
    name: Option<String<MAX_NAME_LEN>>,
    switch_plus: Option<String<MAX_ID_LEN>>,
    switch_minus: Option<String<MAX_ID_LEN>>,
    max_time_to_move_s: u16,
    position_entity: Option<String<MAX_ID_LEN>>,
    calibration_center: u8,
    overshoot_tolerance_ms: u32,
    overflow: bool,
}

impl Default for ServoConfigBuilder {
    fn default() -> Self {
        Self {
            name: None,
            switch_plus: None,
            switch_minus: None,
            max_time_to_move_s: DEFAULT_MAX_TIME_TO_MOVE_S,
            position_entity: None,
            calibration_center: DEFAULT_CALIBRATION_CENTER,
            overshoot_tolerance_ms: DEFAULT_OVERSHOOT_TOLERANCE_MS,
            overflow: false,
        }
    }
}

impl ServoConfigBuilder {
    pub fn name(mut self, name: &str) -> Self {
        self.name = self.copy_str(name);
        self
    }

    pub fn switch_plus(mut self, id: &str) -> Self {
        self.switch_plus = self.copy_str(id);
        self
    }

    pub fn switch_minus(mut self, id: &str) -> Self {
        self.switch_minus = self.copy_str(id);
        self
    }

    pub fn max_time_to_move_s(mut self, secs: u16) -> Self {
        self.max_time_to_move_s = secs;
        self
    }

    pub fn position_entity(mut self, key: &str) -> Self {
        self.position_entity = self.copy_str(key);
        self
    }

    pub fn calibration_center(mut self, center: u8) -> Self {
        self.calibration_center = center;
        self
    }

    pub fn overshoot_tolerance_ms(mut self, ms: u32) -> Self {
        self.overshoot_tolerance_ms = ms;
        self
    }

    /// Validate and produce the configuration
    pub fn build(self) -> Result<ServoConfig, ConfigError> {
        if self.overflow {
            return Err(ConfigError::ValueTooLong);
        }

        let switch_plus = self
            .switch_plus
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSwitchPlus)?;
        let switch_minus = self
            .switch_minus
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSwitchMinus)?;

        let config = ServoConfig {
            name: match self.name {
                Some(name) => name,
                None => copy_default(DEFAULT_NAME)?,
            },
            switch_plus,
            switch_minus,
            max_time_to_move_s: self.max_time_to_move_s,
            position_entity: match self.position_entity {
                Some(key) => key,
                None => copy_default(DEFAULT_POSITION_ENTITY)?,
            },
            calibration_center: self.calibration_center,
            overshoot_tolerance_ms: self.overshoot_tolerance_ms,
        };

        config.validate()?;
        Ok(config)
    }

    fn copy_str<const N: usize>(&mut self, value: &str) -> Option<String<N>> {
        let mut s = String::new();
        if s.push_str(value).is_err() {
            self.overflow = true;
            return None;
        }
        Some(s)
    }
}

fn copy_default<const N: usize>(value: &str) -> Result<String<N>, ConfigError> {
    let mut s = String::new();
    s.push_str(value).map_err(|_| ConfigError::ValueTooLong)?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ServoConfigBuilder {
        ServoConfig::builder()
            .switch_plus("switch.servo_plus")
            .switch_minus("switch.servo_minus")
    }

    #[test]
    fn test_defaults() {
        let config = minimal().build().unwrap();
        assert_eq!(config.name.as_str(), DEFAULT_NAME);
        assert_eq!(config.max_time_to_move_s, 30);
        assert_eq!(config.position_entity.as_str(), DEFAULT_POSITION_ENTITY);
        assert_eq!(config.calibration_center, 50);
        assert_eq!(config.overshoot_tolerance_ms, 250);
        assert_eq!(config.travel_rate().unwrap().full_travel_ms(), 30_000);
        assert_eq!(config.center(), Position::CENTER);
    }

    #[test]
    fn test_missing_relays() {
        let err = ServoConfig::builder()
            .switch_minus("switch.minus")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingSwitchPlus);

        let err = ServoConfig::builder()
            .switch_plus("switch.plus")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingSwitchMinus);

        let err = ServoConfig::builder()
            .switch_plus("")
            .switch_minus("switch.minus")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingSwitchPlus);
    }

    #[test]
    fn test_same_relay_rejected() {
        let err = ServoConfig::builder()
            .switch_plus("gpio14")
            .switch_minus("gpio14")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::SameSwitch);
    }

    #[test]
    fn test_zero_travel_time_rejected() {
        let err = minimal().max_time_to_move_s(0).build().unwrap_err();
        assert_eq!(err, ConfigError::ZeroTravelTime);
    }

    #[test]
    fn test_invalid_center_rejected() {
        let err = minimal().calibration_center(101).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidCenter);
    }

    #[test]
    fn test_overlong_identifier_rejected() {
        let long = "switch.xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx";
        assert!(long.len() > MAX_ID_LEN);
        let err = ServoConfig::builder()
            .switch_plus(long)
            .switch_minus("switch.minus")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ValueTooLong);
    }
}
