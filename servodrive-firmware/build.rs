//! Build script for servodrive-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates servo.toml at compile time, with the same rules the
//!   firmware's own reader applies at boot

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use servodrive_core::config::{parse_config, MAX_GPIO, MAX_ID_LEN, MAX_NAME_LEN};

/// Keys understood by the servo configuration
const SERVO_KEYS: [&str; 7] = [
    "name",
    "switch_plus",
    "switch_minus",
    "max_time_to_move",
    "position_entity",
    "calibration_center",
    "overshoot_tolerance_ms",
];

/// GPIOs taken by the host link UART
const RESERVED_PINS: [i64; 2] = [0, 1];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate servo.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=servo.toml");

    let config_path = Path::new("servo.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: servo.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds servo.toml as its default configuration.    ║\n\
            ║  Please create one in the servodrive-firmware directory.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read servo.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in servo.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let servo = collect_servo_keys(&config);
    validate_servo(&servo);

    // Final gate: the reader the firmware runs at boot
    if let Err(e) = parse_config(&config_content) {
        report(
            "servo.toml rejected by the firmware config reader",
            vec![format!("{:?}", e)],
        );
    }

    println!("cargo:warning=servo.toml validated successfully");
}

/// Merge root keys and the `[servo]` table; any other table is an error
fn collect_servo_keys(config: &toml::Value) -> toml::Table {
    let mut servo = toml::Table::new();
    let mut errors = Vec::new();

    let root = config.as_table().cloned().unwrap_or_default();
    for (key, value) in root {
        match (key.as_str(), value) {
            ("servo", toml::Value::Table(table)) => servo.extend(table),
            ("servo", _) => errors.push("[servo] must be a table".to_string()),
            (_, toml::Value::Table(_)) => {
                errors.push(format!("[{}] is not a known section, only [servo] is", key))
            }
            (_, value) => {
                servo.insert(key, value);
            }
        }
    }

    for (key, value) in &servo {
        if value.is_table() {
            errors.push(format!("[servo.{}] nested tables are not supported", key));
        } else if !SERVO_KEYS.contains(&key.as_str()) {
            errors.push(format!("unknown key '{}'", key));
        }
    }

    if !errors.is_empty() {
        report("Invalid servo.toml layout", errors);
    }
    servo
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check the servo keys
fn validate_servo(servo: &toml::Table) {
    let mut errors = Vec::new();

    let plus = validate_pin(servo, "switch_plus", &mut errors);
    let minus = validate_pin(servo, "switch_minus", &mut errors);
    if let (Some(plus), Some(minus)) = (plus, minus) {
        if plus == minus {
            errors.push(format!("switch_plus and switch_minus both use gpio{}", plus));
        }
    }

    match servo.get("max_time_to_move") {
        Some(toml::Value::Integer(secs)) if *secs <= 0 || *secs > u16::MAX as i64 => {
            errors.push("max_time_to_move must be 1-65535 seconds".to_string());
        }
        Some(toml::Value::Integer(_)) | None => {}
        Some(_) => errors.push("max_time_to_move must be an integer".to_string()),
    }

    match servo.get("calibration_center") {
        Some(toml::Value::Integer(center)) if !(0..=100).contains(center) => {
            errors.push("calibration_center must be 0-100".to_string());
        }
        Some(toml::Value::Integer(_)) | None => {}
        Some(_) => errors.push("calibration_center must be an integer".to_string()),
    }

    match servo.get("overshoot_tolerance_ms") {
        Some(toml::Value::Integer(ms)) if *ms < 0 || *ms > u32::MAX as i64 => {
            errors.push(format!("overshoot_tolerance_ms must be 0-{}", u32::MAX));
        }
        Some(toml::Value::Integer(_)) | None => {}
        Some(_) => errors.push("overshoot_tolerance_ms must be an integer".to_string()),
    }

    let limits = [
        ("name", MAX_NAME_LEN),
        ("switch_plus", MAX_ID_LEN),
        ("switch_minus", MAX_ID_LEN),
        ("position_entity", MAX_ID_LEN),
    ];
    for (key, max_len) in limits {
        match servo.get(key) {
            Some(toml::Value::String(s)) if s.len() > max_len => {
                errors.push(format!("{} longer than {} bytes", key, max_len));
            }
            // Relay pins are type-checked by validate_pin
            Some(_) if !key.starts_with("switch_") => {
                errors.push(format!("{} must be a string", key));
            }
            _ => {}
        }
    }

    if !errors.is_empty() {
        report("Invalid servo configuration", errors);
    }
}

/// Check a relay pin entry, returning its GPIO number
fn validate_pin(servo: &toml::Table, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    let value = match servo.get(key) {
        Some(toml::Value::String(s)) => s,
        Some(_) => {
            errors.push(format!("{} must be a string like \"gpio14\"", key));
            return None;
        }
        None => {
            errors.push(format!("Missing '{}' - both relay pins are required", key));
            return None;
        }
    };

    let name = value.strip_prefix('!').unwrap_or(value);
    let pin = match name.strip_prefix("gpio").and_then(|n| n.parse::<u8>().ok()).map(i64::from) {
        Some(pin) => pin,
        None => {
            errors.push(format!("{} '{}' is not a gpioN pin", key, value));
            return None;
        }
    };

    if pin > MAX_GPIO as i64 {
        errors.push(format!("{} gpio{} out of range (0-{})", key, pin, MAX_GPIO));
    } else if RESERVED_PINS.contains(&pin) {
        errors.push(format!("{} gpio{} is reserved for the host UART", key, pin));
    }

    Some(pin)
}

fn report(title: &str, errors: Vec<String>) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
