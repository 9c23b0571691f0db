//! Minimal TOML reader for `servo.toml`
//!
//! Handles only the subset the servo configuration needs:
//! - `key = value` pairs (quoted or bare strings, integers)
//! - an optional `[servo]` section header
//! - comments (`# ...`), including trailing ones
//!
//! Anything else (arrays, inline tables, multi-line strings) is rejected.

use super::types::{ConfigError, ServoConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Section other than `[servo]`, or a malformed header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Key is not part of the servo configuration
    UnknownKey,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Parsed values failed validation
    Config(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Config(e)
    }
}

/// Parse the servo configuration
pub fn parse_config(input: &str) -> Result<ServoConfig, ParseError> {
    let mut builder = ServoConfig::builder();

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') || header[1..header.len() - 1].trim() != "servo" {
                return Err(ParseError::InvalidSection);
            }
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;

        builder = match key {
            "name" => builder.name(parse_string(value)?),
            "switch_plus" => builder.switch_plus(parse_string(value)?),
            "switch_minus" => builder.switch_minus(parse_string(value)?),
            "max_time_to_move" => builder.max_time_to_move_s(parse_int(value)?),
            "position_entity" => builder.position_entity(parse_string(value)?),
            "calibration_center" => builder.calibration_center(parse_int(value)?),
            "overshoot_tolerance_ms" => builder.overshoot_tolerance_ms(parse_int(value)?),
            _ => return Err(ParseError::UnknownKey),
        };
    }

    Ok(builder.build()?)
}

/// Drop a trailing comment that is not inside a string
fn strip_comment(s: &str) -> &str {
    let mut in_string = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return s[..i].trim(),
            _ => {}
        }
    }
    s
}

/// Split `key = value`, removing inline comments
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.starts_with('"') {
        if value.len() >= 2 && value.ends_with('"') {
            Ok(&value[1..value.len() - 1])
        } else {
            Err(ParseError::InvalidValue)
        }
    } else if value.starts_with('[') || value.starts_with('{') {
        Err(ParseError::InvalidValue)
    } else {
        // Allow unquoted strings for simple identifiers
        Ok(value)
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}
