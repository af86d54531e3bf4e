//! Render task
//!
//! Sole owner of the display. Drains the render queues through the
//! arbiter and writes each command via the display cache.

use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::Delay;

use punchclock_core::config::RenderConfig;
use punchclock_core::render::{DisplayWriter, RenderArbiter, RenderCommand, WriteOutcome};
use punchclock_drivers::Ssd1306;

use crate::channels::RENDER;

/// Display on the board's I2C0 bus
pub type BoardDisplay = Ssd1306<I2c<'static, I2C0, Blocking>>;

#[embassy_executor::task]
pub async fn render_task(display: BoardDisplay, config: RenderConfig) {
    info!("Render task started");

    let mut writer = DisplayWriter::new(display);
    if let Err(e) = writer.init() {
        defmt::panic!("Display init failed: {}", e);
    }
    info!("Display initialized");

    let mut arbiter = RenderArbiter::new(config.high_burst, config.idle_ms);
    let mut delay = Delay;

    loop {
        let (priority, cmd) = arbiter.next(&RENDER, &mut delay).await;

        match writer.apply(&cmd) {
            Ok(WriteOutcome::Written) | Ok(WriteOutcome::Cleared) => {}
            Ok(WriteOutcome::Suppressed) => {
                trace!("Unchanged {} write suppressed", priority);
            }
            Err(e) => match cmd {
                RenderCommand::Text(msg) => {
                    warn!("Display write failed at row {} col {}: {}", msg.row(), msg.column(), e)
                }
                RenderCommand::Clear => warn!("Display clear failed: {}", e),
            },
        }
    }
}
