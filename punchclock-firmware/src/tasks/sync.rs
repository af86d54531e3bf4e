//! Time sync task
//!
//! Runs once at boot. Progress goes to the log and to the boot screen,
//! one line per report.

use core::fmt::Write;

use defmt::{debug, info, warn};
use embassy_time::Delay;
use heapless::String;

use punchclock_core::config::SyncConfig;
use punchclock_core::sync::{run_time_sync, SyncOutcome, SyncProgress};
use punchclock_core::view;
use punchclock_display::{GRID_ROWS, LINE_LEN};

use crate::channels::{EVENTS, RENDER, WALL_CLOCK};
use crate::clock::{uptime_ms, BuildTimeSource};

#[embassy_executor::task]
pub async fn time_sync_task(config: SyncConfig) {
    info!("Time sync task started");

    let mut source = BuildTimeSource::default();
    let mut delay = Delay;
    let mut row: u8 = 0;

    let outcome = run_time_sync(
        &mut source,
        &EVENTS,
        &WALL_CLOCK,
        &config,
        &mut delay,
        uptime_ms,
        |progress| {
            debug!("Sync: {}", progress);
            let line = boot_line(progress);
            let posted = view::render_boot_line(&RENDER, row, &line);
            if posted.dropped > 0 {
                warn!("Boot line {} dropped", row);
            }
            row = (row + 1).min(GRID_ROWS as u8 - 1);
        },
    )
    .await;

    match outcome {
        SyncOutcome::Synced { time, attempts } => {
            info!("Wall clock set to {} after {} attempt(s)", time.as_secs(), attempts)
        }
        SyncOutcome::Degraded { last_error } => {
            warn!("Time sync failed ({}), running on uptime", last_error)
        }
    }
}

fn boot_line(progress: SyncProgress) -> String<LINE_LEN> {
    let mut line = String::new();
    // A full line only truncates the text
    let _ = match progress {
        SyncProgress::Attempt { attempt, of } => write!(line, "time sync {}/{}", attempt, of),
        SyncProgress::Connected => write!(line, "link up"),
        SyncProgress::Failed { attempt, error } => {
            write!(line, "try {}: {}", attempt, error.label())
        }
        SyncProgress::Synced(_) => write!(line, "time ok"),
        SyncProgress::GaveUp => write!(line, "no sync, uptime"),
    };
    line
}
