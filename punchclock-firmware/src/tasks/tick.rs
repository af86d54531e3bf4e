//! Clock task
//!
//! Polls the wall clock and redraws the time whenever the second changes,
//! plus the running totals while the live view is up.

use defmt::*;
use embassy_time::{Duration, Ticker};

use punchclock_core::app::ClockFace;

use super::App;

/// Clock task - periodic clock redraw
#[embassy_executor::task]
pub async fn clock_task(app: &'static App, tick_ms: u32) {
    info!("Clock task started");

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(tick_ms)));
    let mut face = ClockFace::default();

    loop {
        ticker.next().await;

        if let Some(posted) = app.tick(&mut face) {
            if posted.dropped > 0 {
                // Normal queue full; the next second redraws anyway
                trace!("Clock tick lost {} render commands", posted.dropped);
            }
            if posted.clipped > 0 {
                warn!("Clock tick clamped {} fields", posted.clipped);
            }
        }
    }
}
