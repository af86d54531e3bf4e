//! Configuration type definitions

use core::time::Duration;

use crate::debounce::{ButtonMap, PinId};
use crate::render::{DEFAULT_HIGH_BURST, DEFAULT_IDLE_MS};
use crate::session::{SummaryStampPolicy, DEFAULT_DAILY_TARGET};
use crate::time::TimeZone;

/// GPIO pin with modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO number
    pub pin: PinId,
    /// Active-low (`!` prefix), pressed on the falling edge
    pub inverted: bool,
    /// Internal pull-up (`^` prefix)
    pub pull_up: bool,
}

/// Edge that means "pressed"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressEdge {
    /// Button pulls the pin low
    Falling,
    /// Button pulls the pin high
    Rising,
}

impl PinConfig {
    pub const fn pull_up(pin: PinId) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }

    /// A pulled-up pin can only be pulled low by its button, and `!` marks
    /// an active-low pin explicitly
    pub const fn press_edge(&self) -> PressEdge {
        if self.inverted || self.pull_up {
            PressEdge::Falling
        } else {
            PressEdge::Rising
        }
    }
}

/// `[buttons]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonsConfig {
    pub stamp_pin: PinConfig,
    pub switch_pin: PinConfig,
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            stamp_pin: PinConfig::pull_up(14),
            switch_pin: PinConfig::pull_up(15),
        }
    }
}

impl ButtonsConfig {
    pub fn map(&self) -> ButtonMap {
        ButtonMap {
            stamp_pin: self.stamp_pin.pin,
            switch_pin: self.switch_pin.pin,
        }
    }
}

/// `[display]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    pub sda_pin: PinId,
    pub scl_pin: PinId,
    /// 7-bit I2C address
    pub address: u8,
    pub frequency_hz: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sda_pin: 4,
            scl_pin: 5,
            address: 0x3C,
            frequency_hz: 400_000,
        }
    }
}

/// `[sync]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncConfig {
    /// Attempts before running unsynced
    pub retries: u8,
    /// Pause between attempts
    pub retry_interval_ms: u32,
    /// Time the sync result stays on screen
    pub settle_ms: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retries: 5,
            retry_interval_ms: 2000,
            settle_ms: 1000,
        }
    }
}

/// `[render]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderConfig {
    /// High-priority commands served before a normal one gets a turn
    pub high_burst: u8,
    /// Consumer sleep when both queues are empty
    pub idle_ms: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            high_burst: DEFAULT_HIGH_BURST,
            idle_ms: DEFAULT_IDLE_MS,
        }
    }
}

/// `[tracker]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackerConfig {
    pub summary_stamp: SummaryStampPolicy,
    pub daily_target_min: u16,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            summary_stamp: SummaryStampPolicy::Ignore,
            daily_target_min: (DEFAULT_DAILY_TARGET.as_secs() / 60) as u16,
        }
    }
}

impl TrackerConfig {
    pub fn daily_target(&self) -> Duration {
        Duration::from_secs(u64::from(self.daily_target_min) * 60)
    }
}

/// `[clock]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// Poll interval of the clock task
    pub tick_ms: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { tick_ms: 100 }
    }
}

/// Complete appliance configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
    pub buttons: ButtonsConfig,
    pub display: DisplayConfig,
    pub timezone: TimeZone,
    pub sync: SyncConfig,
    pub render: RenderConfig,
    pub tracker: TrackerConfig,
    pub clock: ClockConfig,
}
