//! Minimal TOML parser for the appliance configuration
//!
//! Handles only the subset the configuration file needs and allocates
//! nothing, so it runs on the target at boot.
//!
//! Supported:
//! - `[section]` headers
//! - `key = value` pairs (string and integer; hex integers as `0x..`)
//! - Comments (`# ...`), also at the end of a line
//!
//! Unknown keys are ignored; unknown sections are an error.

use heapless::String;

use crate::session::SummaryStampPolicy;
use crate::time::DstRule;

use super::types::{AppConfig, PinConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value of the wrong type or a malformed line
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// Value outside its allowed range
    OutOfRange,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Buttons,
    Display,
    Timezone,
    Sync,
    Render,
    Tracker,
    Clock,
}

/// Parse TOML configuration, starting from the defaults
pub fn parse_config(input: &str) -> Result<AppConfig, ParseError> {
    let mut config = AppConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            let header = header
                .strip_prefix('[')
                .and_then(|h| h.strip_suffix(']'))
                .ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        apply_value(section, key, value, &mut config)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "buttons" => Ok(Section::Buttons),
        "display" => Ok(Section::Display),
        "timezone" => Ok(Section::Timezone),
        "sync" => Ok(Section::Sync),
        "render" => Ok(Section::Render),
        "tracker" => Ok(Section::Tracker),
        "clock" => Ok(Section::Clock),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Drop a trailing comment unless the `#` sits inside a string
fn strip_comment(s: &str) -> &str {
    let mut in_string = false;
    for (i, ch) in s.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return s[..i].trim(),
            _ => {}
        }
    }
    s.trim()
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = strip_comment(value);

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse a decimal or `0x` hex integer within `min..=max`
fn parse_int<T>(value: &str, min: i64, max: i64) -> Result<T, ParseError>
where
    T: TryFrom<i64>,
{
    let digits = strip_separators(value);
    let n = match digits.as_str().strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.as_str().parse::<i64>(),
    }
    .map_err(|_| ParseError::InvalidValue)?;

    if n < min || n > max {
        return Err(ParseError::OutOfRange);
    }
    T::try_from(n).map_err(|_| ParseError::OutOfRange)
}

/// Integer literal with TOML digit separators (`400_000`) removed
fn strip_separators(value: &str) -> String<24> {
    let mut out = String::new();
    for ch in value.chars().filter(|&c| c != '_') {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Parse a pin string like "gpio14", "^gpio14", "!gpio2"
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let mut s = parse_string(value)?;
    let mut pin = PinConfig::default();

    // Check for modifiers
    loop {
        if let Some(rest) = s.strip_prefix('!') {
            pin.inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pin.pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    // RP2040 has GPIO 0-29
    let number = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    pin.pin = number.parse().map_err(|_| ParseError::InvalidPin)?;
    if pin.pin > 29 {
        return Err(ParseError::InvalidPin);
    }
    Ok(pin)
}

fn parse_dst(value: &str) -> Result<DstRule, ParseError> {
    match parse_string(value)? {
        "none" => Ok(DstRule::None),
        "eu" => Ok(DstRule::Eu),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_policy(value: &str) -> Result<SummaryStampPolicy, ParseError> {
    match parse_string(value)? {
        "ignore" => Ok(SummaryStampPolicy::Ignore),
        "apply" => Ok(SummaryStampPolicy::Apply),
        _ => Err(ParseError::InvalidValue),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut AppConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {} // No top-level keys
        Section::Buttons => {
            let b = &mut config.buttons;
            match key {
                "stamp_pin" => b.stamp_pin = parse_pin(value)?,
                "switch_pin" => b.switch_pin = parse_pin(value)?,
                _ => {} // Ignore unknown keys
            }
        }
        Section::Display => {
            let d = &mut config.display;
            match key {
                "sda_pin" => d.sda_pin = parse_pin(value)?.pin,
                "scl_pin" => d.scl_pin = parse_pin(value)?.pin,
                "address" => d.address = parse_int(value, 0x08, 0x77)?,
                "frequency_hz" => d.frequency_hz = parse_int(value, 10_000, 1_000_000)?,
                _ => {}
            }
        }
        Section::Timezone => {
            let tz = &mut config.timezone;
            match key {
                "utc_offset_min" => tz.utc_offset_min = parse_int(value, -720, 840)?,
                "dst" => tz.dst = parse_dst(value)?,
                _ => {}
            }
        }
        Section::Sync => {
            let s = &mut config.sync;
            match key {
                "retries" => s.retries = parse_int(value, 1, 20)?,
                "retry_interval_ms" => s.retry_interval_ms = parse_int(value, 0, 60_000)?,
                "settle_ms" => s.settle_ms = parse_int(value, 0, 10_000)?,
                _ => {}
            }
        }
        Section::Render => {
            let r = &mut config.render;
            match key {
                "high_burst" => r.high_burst = parse_int(value, 1, 20)?,
                "idle_ms" => r.idle_ms = parse_int(value, 1, 1000)?,
                _ => {}
            }
        }
        Section::Tracker => {
            let t = &mut config.tracker;
            match key {
                "summary_stamp" => t.summary_stamp = parse_policy(value)?,
                "daily_target_min" => t.daily_target_min = parse_int(value, 1, 24 * 60)?,
                _ => {}
            }
        }
        Section::Clock => {
            if key == "tick_ms" {
                config.clock.tick_ms = parse_int(value, 10, 1000)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeZone;

    const SAMPLE: &str = r#"
# Punchclock configuration

[buttons]
stamp_pin = "^gpio14"   # left
switch_pin = "^gpio15"  # right

[display]
sda_pin = "gpio4"
scl_pin = "gpio5"
address = 0x3C
frequency_hz = 400_000

[timezone]
utc_offset_min = 60
dst = "eu"

[sync]
retries = 5
retry_interval_ms = 2000

[render]
high_burst = 3
idle_ms = 10

[tracker]
summary_stamp = "ignore"
daily_target_min = 480

[clock]
tick_ms = 100
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.buttons.stamp_pin.pin, 14);
        assert!(config.buttons.stamp_pin.pull_up);
        assert_eq!(config.buttons.map().switch_pin, 15);
        assert_eq!(config.display.address, 0x3C);
        assert_eq!(config.display.frequency_hz, 400_000);
        assert_eq!(config.timezone, TimeZone::CENTRAL_EUROPE);
        assert_eq!(config.tracker.daily_target_min, 480);
        assert_eq!(config.tracker.daily_target().as_secs(), 8 * 3600);
        assert_eq!(config.render.high_burst, 3);
    }

    #[test]
    fn test_empty_is_default() {
        assert_eq!(parse_config("").unwrap(), AppConfig::default());
        assert_eq!(parse_config("# nothing\n\n").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_parse_pin() {
        let pin = parse_pin("gpio11").unwrap();
        assert_eq!(pin.pin, 11);
        assert!(!pin.inverted);
        assert!(!pin.pull_up);

        let pin = parse_pin("\"^!gpio5\"").unwrap();
        assert_eq!(pin.pin, 5);
        assert!(pin.inverted);
        assert!(pin.pull_up);

        assert_eq!(parse_pin("pin5"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("gpio30"), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert_eq!(
            parse_config("[wifi]\nssid = \"x\""),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_unknown_key_ignored() {
        let config = parse_config("[clock]\nblink = true\ntick_ms = 250").unwrap();
        assert_eq!(config.clock.tick_ms, 250);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            parse_config("[render]\nhigh_burst = 0"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(
            parse_config("[timezone]\nutc_offset_min = 900"),
            Err(ParseError::OutOfRange)
        );
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[tracker]\nsummary_stamp = \"maybe\""),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(parse_config("[sync]\nretries"), Err(ParseError::InvalidValue));
        assert_eq!(
            parse_config("[sync]\nretries = many"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_comment_inside_string_kept() {
        assert_eq!(parse_key_value("k = \"a#b\" # c"), Some(("k", "\"a#b\"")));
    }
}
