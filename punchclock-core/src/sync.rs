//! One-shot time synchronization at boot
//!
//! The network side is a [`TimeSource`]. [`run_time_sync`] connects, asks
//! for the time a bounded number of times, and always ends by raising
//! `SyncDone`, synced or not, so the rest of the appliance can start.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::config::SyncConfig;
use crate::flags::{EventBus, EventFlag};
use crate::time::{Timestamp, WallClock};

/// Time sync errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// Link could not be established
    Connect,
    /// No answer from the time server
    Fetch,
    /// Answer was not a plausible time of day
    InvalidTime,
}

impl SyncError {
    /// Short text for the boot screen
    pub fn label(&self) -> &'static str {
        match self {
            SyncError::Connect => "no link",
            SyncError::Fetch => "no answer",
            SyncError::InvalidTime => "bad time",
        }
    }
}

/// Where the wall-clock time comes from
#[allow(async_fn_in_trait)]
pub trait TimeSource {
    /// Bring up the link
    async fn connect(&mut self) -> Result<(), SyncError>;

    /// Current UTC time
    async fn fetch_time(&mut self) -> Result<Timestamp, SyncError>;

    /// Tear the link down again
    async fn disconnect(&mut self);
}

/// Progress reports while syncing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncProgress {
    Attempt { attempt: u8, of: u8 },
    Connected,
    Failed { attempt: u8, error: SyncError },
    Synced(Timestamp),
    GaveUp,
}

/// How the sync ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncOutcome {
    Synced { time: Timestamp, attempts: u8 },
    /// Running on uptime-based time
    Degraded { last_error: SyncError },
}

/// Sync the wall clock, then raise `SyncDone`
///
/// `uptime_ms` is read right after a good answer arrives, to anchor the
/// wall clock. `WifiConnected` follows the link state.
pub async fn run_time_sync<M, S, D, U, P>(
    source: &mut S,
    bus: &EventBus<M>,
    wall: &WallClock<M>,
    config: &SyncConfig,
    delay: &mut D,
    uptime_ms: U,
    mut progress: P,
) -> SyncOutcome
where
    M: RawMutex,
    S: TimeSource,
    D: DelayNs,
    U: Fn() -> u64,
    P: FnMut(SyncProgress),
{
    let attempts = config.retries.max(1);
    let mut connected = false;
    let mut outcome = SyncOutcome::Degraded {
        last_error: SyncError::Connect,
    };

    for attempt in 1..=attempts {
        progress(SyncProgress::Attempt {
            attempt,
            of: attempts,
        });

        match try_once(source, bus, &mut connected, &mut progress).await {
            Ok(time) => {
                wall.set(time, uptime_ms());
                progress(SyncProgress::Synced(time));
                outcome = SyncOutcome::Synced {
                    time,
                    attempts: attempt,
                };
                break;
            }
            Err(error) => {
                progress(SyncProgress::Failed { attempt, error });
                outcome = SyncOutcome::Degraded { last_error: error };
                if attempt < attempts {
                    delay.delay_ms(config.retry_interval_ms).await;
                }
            }
        }
    }

    if connected {
        source.disconnect().await;
        bus.clear(EventFlag::WifiConnected);
    }
    if matches!(outcome, SyncOutcome::Degraded { .. }) {
        progress(SyncProgress::GaveUp);
    }

    bus.set(EventFlag::SyncDone);
    outcome
}

async fn try_once<M: RawMutex, S: TimeSource, P: FnMut(SyncProgress)>(
    source: &mut S,
    bus: &EventBus<M>,
    connected: &mut bool,
    progress: &mut P,
) -> Result<Timestamp, SyncError> {
    if !*connected {
        source.connect().await?;
        *connected = true;
        bus.set(EventFlag::WifiConnected);
        progress(SyncProgress::Connected);
    }

    let time = source.fetch_time().await?;
    if time.is_plausible() {
        Ok(time)
    } else {
        Err(SyncError::InvalidTime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InstantDelay;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use std::vec::Vec;

    const GOOD: u64 = 1_719_835_200;

    /// Scripted time source
    struct Script {
        connect_failures: usize,
        answers: Vec<Result<u64, SyncError>>,
        connects: usize,
        disconnects: usize,
    }

    impl Script {
        fn new(connect_failures: usize, answers: Vec<Result<u64, SyncError>>) -> Self {
            Self {
                connect_failures,
                answers,
                connects: 0,
                disconnects: 0,
            }
        }
    }

    impl TimeSource for Script {
        async fn connect(&mut self) -> Result<(), SyncError> {
            if self.connect_failures > 0 {
                self.connect_failures -= 1;
                return Err(SyncError::Connect);
            }
            self.connects += 1;
            Ok(())
        }

        async fn fetch_time(&mut self) -> Result<Timestamp, SyncError> {
            if self.answers.is_empty() {
                return Err(SyncError::Fetch);
            }
            self.answers.remove(0).map(Timestamp::from_secs)
        }

        async fn disconnect(&mut self) {
            self.disconnects += 1;
        }
    }

    fn config(retries: u8) -> SyncConfig {
        SyncConfig {
            retries,
            retry_interval_ms: 2000,
            settle_ms: 0,
        }
    }

    #[test]
    fn test_sync_first_try() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        let wall: WallClock<NoopRawMutex> = WallClock::new();
        let mut source = Script::new(0, std::vec![Ok(GOOD)]);
        let mut delay = InstantDelay::default();
        let mut seen = Vec::new();

        let outcome = block_on(run_time_sync(
            &mut source,
            &bus,
            &wall,
            &config(5),
            &mut delay,
            || 3_000,
            |p| seen.push(p),
        ));

        assert_eq!(
            outcome,
            SyncOutcome::Synced {
                time: Timestamp::from_secs(GOOD),
                attempts: 1
            }
        );
        assert!(bus.is_set(EventFlag::SyncDone));
        assert!(!bus.is_set(EventFlag::WifiConnected));
        assert_eq!(wall.now_at(5_000), Timestamp::from_secs(GOOD + 2));
        assert_eq!(source.disconnects, 1);
        assert_eq!(delay.calls, 0);
        assert_eq!(
            seen,
            [
                SyncProgress::Attempt { attempt: 1, of: 5 },
                SyncProgress::Connected,
                SyncProgress::Synced(Timestamp::from_secs(GOOD)),
            ]
        );
    }

    #[test]
    fn test_sync_retries_implausible_time() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        let wall: WallClock<NoopRawMutex> = WallClock::new();
        let mut source = Script::new(1, std::vec![Ok(12), Err(SyncError::Fetch), Ok(GOOD)]);
        let mut delay = InstantDelay::default();

        let outcome = block_on(run_time_sync(
            &mut source,
            &bus,
            &wall,
            &config(5),
            &mut delay,
            || 0,
            |_| {},
        ));

        assert!(matches!(outcome, SyncOutcome::Synced { attempts: 4, .. }));
        // One link for all fetch attempts
        assert_eq!(source.connects, 1);
        assert_eq!(source.disconnects, 1);
        assert_eq!(delay.total_ms, 3 * 2000);
        assert!(wall.is_synced());
    }

    #[test]
    fn test_sync_gives_up() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        let wall: WallClock<NoopRawMutex> = WallClock::new();
        let mut source = Script::new(10, Vec::new());
        let mut delay = InstantDelay::default();
        let mut seen = Vec::new();

        let outcome = block_on(run_time_sync(
            &mut source,
            &bus,
            &wall,
            &config(3),
            &mut delay,
            || 0,
            |p| seen.push(p),
        ));

        assert_eq!(
            outcome,
            SyncOutcome::Degraded {
                last_error: SyncError::Connect
            }
        );
        assert!(bus.is_set(EventFlag::SyncDone));
        assert!(!wall.is_synced());
        assert_eq!(source.disconnects, 0);
        assert_eq!(delay.calls, 2);
        assert_eq!(seen.last(), Some(&SyncProgress::GaveUp));
    }
}
