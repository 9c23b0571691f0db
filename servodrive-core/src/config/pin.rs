//! Relay pin identifiers
//!
//! On the board `switch_plus` / `switch_minus` name GPIOs as `"gpioN"`,
//! optionally prefixed with `!` for active-low relay modules.

/// Highest GPIO number on the RP2040
pub const MAX_GPIO: u8 = 29;

/// Pin identifier errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Not of the form `gpioN`
    InvalidFormat,
    /// GPIO number out of range
    OutOfRange,
}

/// Parsed relay pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinSpec {
    /// GPIO number
    pub pin: u8,
    /// Relay energises on a low output
    pub inverted: bool,
}

impl PinSpec {
    /// Parse `"gpio14"` or `"!gpio14"`
    pub fn parse(value: &str) -> Result<Self, PinError> {
        let (inverted, rest) = match value.trim().strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, value.trim()),
        };

        let digits = rest.strip_prefix("gpio").ok_or(PinError::InvalidFormat)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PinError::InvalidFormat);
        }

        let pin: u8 = digits.parse().map_err(|_| PinError::OutOfRange)?;
        if pin > MAX_GPIO {
            return Err(PinError::OutOfRange);
        }

        Ok(Self { pin, inverted })
    }
}
