//! Board time
//!
//! The wall clock is anchored to the Embassy uptime counter. This board has
//! no radio, so the only time source is the moment the firmware was built.

use embassy_time::Instant;

use punchclock_core::sync::{SyncError, TimeSource};
use punchclock_core::time::{Clock, Timestamp};

use crate::channels::WALL_CLOCK;

/// Milliseconds since boot
pub fn uptime_ms() -> u64 {
    Instant::now().as_millis()
}

/// Wall clock driven by the Embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        WALL_CLOCK.now_at(uptime_ms())
    }
}

/// Time source that answers with the build time
///
/// Good enough to get the date and an approximate time of day on a board
/// flashed shortly before use.
#[derive(Debug, Default)]
pub struct BuildTimeSource {
    linked: bool,
}

impl TimeSource for BuildTimeSource {
    async fn connect(&mut self) -> Result<(), SyncError> {
        self.linked = true;
        Ok(())
    }

    async fn fetch_time(&mut self) -> Result<Timestamp, SyncError> {
        if !self.linked {
            return Err(SyncError::Connect);
        }
        env!("PUNCHCLOCK_BUILD_EPOCH")
            .parse::<u64>()
            .map(Timestamp::from_secs)
            .map_err(|_| SyncError::InvalidTime)
    }

    async fn disconnect(&mut self) {
        self.linked = false;
    }
}
