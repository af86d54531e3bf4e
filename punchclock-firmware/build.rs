//! Build script for punchclock-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates punchclock.toml at compile time
//! - Exports the build time for the offline time source

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    setup_linker();
    validate_config();
    export_build_epoch();
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
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Build timestamp, reproducible when SOURCE_DATE_EPOCH is set
fn export_build_epoch() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let epoch = match env::var("SOURCE_DATE_EPOCH") {
        Ok(value) => value.trim().parse::<u64>().unwrap_or_else(|_| {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: SOURCE_DATE_EPOCH is not a number of seconds             ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n"
            )
        }),
        Err(_) => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
    };

    println!("cargo:rustc-env=PUNCHCLOCK_BUILD_EPOCH={}", epoch);
}

/// Validate punchclock.toml configuration at compile time
fn validate_config() {
    // Re-run if punchclock.toml changes
    println!("cargo:rerun-if-changed=punchclock.toml");

    let config_path = Path::new("punchclock.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: punchclock.toml not found!                               ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a punchclock.toml configuration file.     ║\n\
            ║  Please create one in the punchclock-firmware directory.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read punchclock.toml                           ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in punchclock.toml                   ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                error_msg
                    .lines()
                    .map(|l| format!("║  {:<64}║", l))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_buttons(&config, &mut errors);
    validate_ranges(&config, &mut errors);
    validate_choices(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid punchclock.toml                                  ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

const SECTIONS: &[&str] = &[
    "buttons", "display", "timezone", "sync", "render", "tracker", "clock",
];

/// Every top-level key must be a known section table
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        errors.push("top level must be a table".to_string());
        return;
    };

    for (name, value) in table {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }

    if config.get("buttons").is_none() {
        errors.push("missing [buttons] section".to_string());
    }
}

/// Parse a pin string like "^gpio14" or "!gpio3" into its GPIO number
fn parse_pin(s: &str) -> Option<u8> {
    let s = s.trim_start_matches(['!', '^']);
    let num = s.strip_prefix("gpio")?.parse::<u8>().ok()?;
    (num <= 29).then_some(num)
}

fn validate_buttons(config: &toml::Value, errors: &mut Vec<String>) {
    let mut pins = Vec::new();

    for (section, key) in [
        ("buttons", "stamp_pin"),
        ("buttons", "switch_pin"),
        ("display", "sda_pin"),
        ("display", "scl_pin"),
    ] {
        let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
            continue;
        };
        match value.as_str().and_then(parse_pin) {
            Some(pin) => {
                if pins.contains(&pin) {
                    errors.push(format!("[{}] {} reuses gpio{}", section, key, pin));
                }
                pins.push(pin);
            }
            None => errors.push(format!("[{}] {} must be \"gpio0\"..\"gpio29\"", section, key)),
        }
    }
}

/// Integer keys and their allowed ranges, matching the on-target parser
const RANGES: &[(&str, &str, i64, i64)] = &[
    ("display", "address", 0x08, 0x77),
    ("display", "frequency_hz", 10_000, 1_000_000),
    ("timezone", "utc_offset_min", -720, 840),
    ("sync", "retries", 1, 20),
    ("sync", "retry_interval_ms", 0, 60_000),
    ("sync", "settle_ms", 0, 10_000),
    ("render", "high_burst", 1, 20),
    ("render", "idle_ms", 1, 1000),
    ("tracker", "daily_target_min", 1, 24 * 60),
    ("clock", "tick_ms", 10, 1000),
];

fn validate_ranges(config: &toml::Value, errors: &mut Vec<String>) {
    for &(section, key, min, max) in RANGES {
        let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
            continue;
        };
        match value.as_integer() {
            Some(v) if (min..=max).contains(&v) => {}
            Some(v) => errors.push(format!(
                "[{}] {} = {} must be {}-{}",
                section, key, v, min, max
            )),
            None => errors.push(format!("[{}] {} must be an integer", section, key)),
        }
    }
}

fn validate_choices(config: &toml::Value, errors: &mut Vec<String>) {
    for (section, key, allowed) in [
        ("timezone", "dst", &["none", "eu"][..]),
        ("tracker", "summary_stamp", &["ignore", "apply"][..]),
    ] {
        let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
            continue;
        };
        match value.as_str() {
            Some(v) if allowed.contains(&v) => {}
            _ => errors.push(format!(
                "[{}] {} must be one of {:?}",
                section, key, allowed
            )),
        }
    }
}
