//! Punchclock - Two-button Work Timestamper Firmware
//!
//! Main firmware binary for RP2040 boards with two push buttons and an
//! SSD1306 OLED. The left button stamps work sessions in and out, the
//! right button flips between the live clock and the day's summary.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use punchclock_core::app::Appliance;
use punchclock_core::config::{parse_config, AppConfig, PinConfig};
use punchclock_core::debounce::PinId;
use punchclock_drivers::Ssd1306;

mod channels;
mod clock;
mod tasks;

use crate::channels::{DROPPED_EDGES, EVENTS, RENDER, TRACKER};
use crate::clock::SystemClock;
use crate::tasks::App;

/// Embedded configuration (compiled into firmware)
/// Edit punchclock.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../punchclock.toml");

/// Board wiring
const STAMP_GPIO: PinId = 14;
const SWITCH_GPIO: PinId = 15;
const SDA_GPIO: PinId = 4;
const SCL_GPIO: PinId = 5;

static APP: StaticCell<App> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Punchclock firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    check_wiring(&config);

    // Display on I2C0 (board-specific: SDA=GPIO4, SCL=GPIO5)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = config.display.frequency_hz;
    let bus = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let display = Ssd1306::new(bus, config.display.address);
    info!(
        "I2C initialized for display at {=u8:#x}, {} Hz",
        config.display.address, config.display.frequency_hz
    );

    // Buttons (board-specific: stamp=GPIO14, switch=GPIO15)
    let stamp_pin = config.buttons.stamp_pin;
    let switch_pin = config.buttons.switch_pin;
    let stamp = Input::new(p.PIN_14, pull_for(&stamp_pin));
    let switch = Input::new(p.PIN_15, pull_for(&switch_pin));

    let app: &'static App = APP.init(Appliance::new(
        &EVENTS,
        &RENDER,
        &TRACKER,
        SystemClock,
        config.timezone,
    ));
    app.configure(&config.tracker);
    info!("Session tracker configured: {}", config.tracker);

    // Spawn tasks
    spawner.spawn(tasks::render_task(display, config.render)).unwrap();
    spawner
        .spawn(tasks::edge_watch_task(stamp, stamp_pin.pin, stamp_pin.press_edge()))
        .unwrap();
    spawner
        .spawn(tasks::edge_watch_task(switch, switch_pin.pin, switch_pin.press_edge()))
        .unwrap();
    spawner.spawn(tasks::debounce_task(config.buttons.map())).unwrap();
    spawner.spawn(tasks::time_sync_task(config.sync)).unwrap();
    spawner
        .spawn(tasks::startup_task(
            spawner,
            app,
            config.sync.settle_ms,
            config.clock.tick_ms,
        ))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - report lost edges now and then
    let mut reported = 0;
    loop {
        embassy_time::Timer::after_secs(60).await;
        let dropped = DROPPED_EDGES.load(core::sync::atomic::Ordering::Relaxed);
        if dropped != reported {
            warn!("{} button edges dropped since boot", dropped);
            reported = dropped;
        }
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> AppConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            // build.rs validates punchclock.toml, so this is a parser mismatch
            error!("Failed to parse embedded config: {}", e);
            error!("Using default configuration");
            AppConfig::default()
        }
    }
}

/// The pins are fixed by the board. Configured pin numbers only tag the
/// edges, so a mismatch is worth a warning but still works.
fn check_wiring(config: &AppConfig) {
    let wired = [
        ("stamp_pin", config.buttons.stamp_pin.pin, STAMP_GPIO),
        ("switch_pin", config.buttons.switch_pin.pin, SWITCH_GPIO),
        ("sda_pin", config.display.sda_pin, SDA_GPIO),
        ("scl_pin", config.display.scl_pin, SCL_GPIO),
    ];
    for (key, configured, board) in wired {
        if configured != board {
            warn!(
                "{} configured as gpio{} but the board wires gpio{}",
                key, configured, board
            );
        }
    }
}

fn pull_for(pin: &PinConfig) -> Pull {
    if pin.pull_up {
        Pull::Up
    } else {
        Pull::None
    }
}
