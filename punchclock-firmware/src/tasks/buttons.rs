//! Button edge watchers
//!
//! One task per button pin. They only queue the edge; debouncing happens
//! in `debounce_task`.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_rp::gpio::Input;

use punchclock_core::config::PressEdge;
use punchclock_core::debounce::PinId;

use crate::channels::{DROPPED_EDGES, EDGES};

/// Edge watch task - queues a pin id for every press edge
#[embassy_executor::task(pool_size = 2)]
pub async fn edge_watch_task(mut input: Input<'static>, pin: PinId, edge: PressEdge) {
    info!("Edge watch task started on gpio{} ({})", pin, edge);

    loop {
        match edge {
            PressEdge::Falling => input.wait_for_falling_edge().await,
            PressEdge::Rising => input.wait_for_rising_edge().await,
        }

        if !EDGES.notify(pin) {
            let dropped = DROPPED_EDGES.fetch_add(1, Ordering::Relaxed) + 1;
            trace!("Edge queue full, gpio{} edge dropped ({} total)", pin, dropped);
        }
    }
}
