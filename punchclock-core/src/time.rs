//! Wall-clock time
//!
//! Timestamps are whole seconds since the Unix epoch. The board has no RTC,
//! so [`WallClock`] pairs a synced epoch time with the uptime at which it
//! was taken and extrapolates from there.

use core::cell::Cell;
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// 2020-01-01T00:00:00Z; anything earlier is an unsynced clock
pub const MIN_VALID_EPOCH: u64 = 1_577_836_800;

const SECS_PER_DAY: i64 = 86_400;

/// Seconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp(u64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        Duration::from_secs(self.0.saturating_sub(earlier.0))
    }

    pub fn saturating_add(self, d: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(d.as_secs()))
    }

    /// Check if this looks like a real, synced time of day
    pub fn is_plausible(self) -> bool {
        self.0 >= MIN_VALID_EPOCH
    }
}

/// Source of the current time
pub trait Clock {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Daylight saving rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DstRule {
    /// Fixed offset all year
    None,
    /// +1h from 01:00 UTC on the last Sunday of March
    /// to 01:00 UTC on the last Sunday of October
    #[default]
    Eu,
}

/// Local time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeZone {
    /// Standard offset from UTC in minutes
    pub utc_offset_min: i16,
    pub dst: DstRule,
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::CENTRAL_EUROPE
    }
}

impl TimeZone {
    pub const UTC: TimeZone = TimeZone {
        utc_offset_min: 0,
        dst: DstRule::None,
    };

    /// CET/CEST
    pub const CENTRAL_EUROPE: TimeZone = TimeZone {
        utc_offset_min: 60,
        dst: DstRule::Eu,
    };

    /// Offset from UTC in effect at `ts`, in seconds
    pub fn offset_secs_at(&self, ts: Timestamp) -> i64 {
        let base = i64::from(self.utc_offset_min) * 60;
        match self.dst {
            DstRule::None => base,
            DstRule::Eu if eu_summer_time(ts) => base + 3600,
            DstRule::Eu => base,
        }
    }

    /// Convert to broken-down local time
    pub fn local(&self, ts: Timestamp) -> LocalTime {
        LocalTime::from_unix(ts.0 as i64 + self.offset_secs_at(ts))
    }
}

fn eu_summer_time(ts: Timestamp) -> bool {
    let utc = ts.0 as i64;
    let year = civil_from_days(utc.div_euclid(SECS_PER_DAY)).0;
    let start = last_sunday(year, 3) * SECS_PER_DAY + 3600;
    let end = last_sunday(year, 10) * SECS_PER_DAY + 3600;
    utc >= start && utc < end
}

/// Broken-down calendar time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocalTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl LocalTime {
    /// Split seconds since 1970-01-01T00:00 (already offset to local time)
    pub fn from_unix(secs: i64) -> Self {
        let days = secs.div_euclid(SECS_PER_DAY);
        let rem = secs.rem_euclid(SECS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        Self {
            year,
            month,
            day,
            hour: (rem / 3600) as u8,
            minute: (rem % 3600 / 60) as u8,
            second: (rem % 60) as u8,
        }
    }
}

/// Days since 1970-01-01 to (year, month, day), proleptic Gregorian
fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year as i32, month, day)
}

/// (year, month, day) to days since 1970-01-01
fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let yoe = y.rem_euclid(400);
    let m = i64::from(month);
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Day number of the last Sunday of a 31-day month
fn last_sunday(year: i32, month: u8) -> i64 {
    let last = days_from_civil(year, month, 31);
    // 1970-01-01 was a Thursday; 0 = Sunday
    let weekday = (last + 4).rem_euclid(7);
    last - weekday
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    epoch: Timestamp,
    uptime_ms: u64,
}

/// Wall clock derived from uptime and a one-time sync
///
/// Before the first sync it counts seconds of uptime from the epoch, which
/// keeps durations right even though the time of day is meaningless.
pub struct WallClock<M: RawMutex> {
    anchor: Mutex<M, Cell<Option<Anchor>>>,
}

impl<M: RawMutex> Default for WallClock<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> WallClock<M> {
    pub const fn new() -> Self {
        Self {
            anchor: Mutex::new(Cell::new(None)),
        }
    }

    /// Record that the wall time was `now` at `uptime_ms`
    pub fn set(&self, now: Timestamp, uptime_ms: u64) {
        self.anchor.lock(|a| {
            a.set(Some(Anchor {
                epoch: now,
                uptime_ms,
            }))
        });
    }

    /// Wall time at `uptime_ms`
    pub fn now_at(&self, uptime_ms: u64) -> Timestamp {
        match self.anchor.lock(|a| a.get()) {
            Some(anchor) => {
                let elapsed = uptime_ms.saturating_sub(anchor.uptime_ms) / 1000;
                Timestamp(anchor.epoch.0.saturating_add(elapsed))
            }
            None => Timestamp(uptime_ms / 1000),
        }
    }

    pub fn is_synced(&self) -> bool {
        self.anchor.lock(|a| a.get().is_some())
    }
}
