//! Debounce task
//!
//! Turns queued edges into button flags, one press per quiet window.

use defmt::*;
use embassy_time::Delay;

use punchclock_core::debounce::ButtonMap;

use crate::channels::{EDGES, EVENTS};

#[embassy_executor::task]
pub async fn debounce_task(map: ButtonMap) {
    info!("Debounce task started");

    let mut delay = Delay;

    loop {
        let press = EDGES.next_press(&map, &EVENTS, &mut delay).await;
        match press.button {
            Some(button) => debug!(
                "{} pressed (gpio{}, {} bounce edges discarded)",
                button, press.pin, press.discarded
            ),
            None => warn!("Edge on unmapped gpio{}", press.pin),
        }
    }
}
