//! Session tasks
//!
//! `startup_task` waits for the time sync, shows the tutorial and then
//! brings up the stamp and clock tasks. The switch task runs during the
//! tutorial so its presses are consumed and ignored.

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Timer;

use punchclock_core::session::StampOutcome;

use super::{clock_task, App};

/// Startup task - sync, settle, tutorial, then hand over to the session tasks
#[embassy_executor::task]
pub async fn startup_task(spawner: Spawner, app: &'static App, settle_ms: u32, tick_ms: u32) {
    info!("Startup task started");

    app.await_sync().await;
    Timer::after_millis(u64::from(settle_ms)).await;

    spawner.spawn(switch_task(app)).unwrap();

    info!("Showing tutorial");
    let posted = app.run_tutorial().await;
    if posted.dropped > 0 {
        warn!("Tutorial lost {} render commands", posted.dropped);
    }

    spawner.spawn(stamp_task(app)).unwrap();
    spawner.spawn(clock_task(app, tick_ms)).unwrap();

    info!("Session tasks running");
}

/// Stamp task - starts and stops work sessions
#[embassy_executor::task]
pub async fn stamp_task(app: &'static App) {
    info!("Stamp task started");

    loop {
        let (outcome, posted) = app.next_stamp().await;
        match outcome {
            StampOutcome::Started { index } => info!("Session {} started", index),
            StampOutcome::Stopped { index, duration } => {
                info!("Session {} stopped after {}s", index, duration.as_secs())
            }
            StampOutcome::CapacityExhausted => warn!("All session slots used, stamp ignored"),
            StampOutcome::IgnoredInSummary => debug!("Stamp ignored in summary view"),
        }
        if posted.dropped > 0 {
            warn!("Stamp redraw lost {} render commands", posted.dropped);
        }
        if posted.clipped > 0 {
            warn!("Stamp redraw clamped {} fields", posted.clipped);
        }
    }
}

/// Switch task - flips between live view and summary
#[embassy_executor::task]
pub async fn switch_task(app: &'static App) {
    info!("Switch task started");

    loop {
        match app.next_switch().await {
            Some((mode, posted)) => {
                info!("View switched to {}", mode);
                if posted.dropped > 0 {
                    warn!("View redraw lost {} render commands", posted.dropped);
                }
                if posted.clipped > 0 {
                    warn!("View redraw clamped {} fields", posted.clipped);
                }
            }
            None => debug!("Switch ignored during tutorial"),
        }
    }
}
