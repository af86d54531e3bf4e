//! Render consumer: applies commands to the display through the cache

use punchclock_display::{DisplayError, GlyphDisplay};

use super::cache::DisplayCache;
use super::message::RenderCommand;

/// What happened to a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteOutcome {
    /// Text sent to the display
    Written,
    /// Row already shows this text
    Suppressed,
    /// Display blanked
    Cleared,
}

/// Owns the display and its cache; only the render consumer holds one
pub struct DisplayWriter<D: GlyphDisplay> {
    display: D,
    cache: DisplayCache,
}

impl<D: GlyphDisplay> DisplayWriter<D> {
    pub fn new(display: D) -> Self {
        Self {
            display,
            cache: DisplayCache::new(),
        }
    }

    /// Initialize and blank the display
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.display.init()?;
        self.display.clear()?;
        self.cache.clear();
        Ok(())
    }

    /// Apply one command
    ///
    /// A failed write is not retried; the cache forgets the affected rows so
    /// the next write to them goes through.
    pub fn apply(&mut self, cmd: &RenderCommand) -> Result<WriteOutcome, DisplayError> {
        match cmd {
            RenderCommand::Clear => match self.display.clear() {
                Ok(()) => {
                    self.cache.clear();
                    Ok(WriteOutcome::Cleared)
                }
                Err(e) => {
                    self.cache.invalidate_all();
                    Err(e)
                }
            },
            RenderCommand::Text(msg) => {
                let (row, column, text) = (msg.row(), msg.column(), msg.text());
                if !self.cache.should_write(row, column, text) {
                    return Ok(WriteOutcome::Suppressed);
                }
                match self.display.write_text(column, row, text) {
                    Ok(()) => {
                        self.cache.record(row, column, text);
                        Ok(WriteOutcome::Written)
                    }
                    Err(e) => {
                        self.cache.invalidate(row);
                        Err(e)
                    }
                }
            }
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn cache(&self) -> &DisplayCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Priority, RenderArbiter, RenderQueues};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use punchclock_display::TextGrid;

    fn writer() -> DisplayWriter<TextGrid> {
        let mut w = DisplayWriter::new(TextGrid::new());
        w.init().unwrap();
        w.display_mut().reset_stats();
        w
    }

    /// Drain the queues through the arbiter into the writer
    fn pump(
        queues: &RenderQueues<NoopRawMutex>,
        arbiter: &mut RenderArbiter,
        w: &mut DisplayWriter<TextGrid>,
    ) -> heapless::Vec<WriteOutcome, 64> {
        let mut outcomes = heapless::Vec::new();
        while let Some((_, cmd)) = arbiter.poll(queues) {
            outcomes.push(w.apply(&cmd).unwrap()).unwrap();
        }
        outcomes
    }

    #[test]
    fn test_clock_scenario() {
        let queues: RenderQueues<NoopRawMutex> = RenderQueues::new();
        let mut arbiter = RenderArbiter::default();
        let mut w = writer();

        queues.enqueue_normal(0, 0, "12:00:05").unwrap();
        assert_eq!(pump(&queues, &mut arbiter, &mut w)[..], [WriteOutcome::Written]);
        let glyphs = w.display().stats().glyphs;

        queues.enqueue_normal(0, 0, "12:00:05").unwrap();
        assert_eq!(pump(&queues, &mut arbiter, &mut w)[..], [WriteOutcome::Suppressed]);
        assert_eq!(w.display().stats().glyphs, glyphs);

        queues.enqueue_normal(0, 0, "12:00:06").unwrap();
        assert_eq!(pump(&queues, &mut arbiter, &mut w)[..], [WriteOutcome::Written]);
        assert_eq!(w.display().line(0).as_str(), "12:00:06");
    }

    #[test]
    fn test_clear_command() {
        let mut w = writer();
        let write = RenderCommand::text(2, 0, "12:00 | --:-- |--:--").unwrap();
        assert_eq!(w.apply(&write), Ok(WriteOutcome::Written));
        assert_eq!(w.apply(&write), Ok(WriteOutcome::Suppressed));

        assert_eq!(w.apply(&RenderCommand::Clear), Ok(WriteOutcome::Cleared));
        assert_eq!(w.display().line(2).as_str(), "");
        assert_eq!(w.apply(&write), Ok(WriteOutcome::Written));
    }

    #[test]
    fn test_failed_write_is_not_cached() {
        let mut w = writer();
        let write = RenderCommand::text(7, 0, "net work: 00:00:05").unwrap();

        w.display_mut().fail_next_glyphs(1);
        assert_eq!(w.apply(&write), Err(DisplayError::Communication));
        assert_eq!(w.apply(&write), Ok(WriteOutcome::Written));
        assert_eq!(w.display().line(7).as_str(), "net work: 00:00:05");
    }

    #[test]
    fn test_failed_clear_forgets_all_rows() {
        let mut w = writer();
        let clock = RenderCommand::text(0, 0, "12:00:05").unwrap();
        let total = RenderCommand::text(7, 0, "net work: 00:00:05").unwrap();
        w.apply(&clock).unwrap();
        w.apply(&total).unwrap();

        w.display_mut().fail_next_clears(1);
        assert_eq!(w.apply(&RenderCommand::Clear), Err(DisplayError::Communication));
        assert_eq!(w.cache().row(0), None);
        assert_eq!(w.cache().row(7), None);

        // Unknown screen state: identical text is sent again
        assert_eq!(w.apply(&clock), Ok(WriteOutcome::Written));
        assert_eq!(w.apply(&total), Ok(WriteOutcome::Written));
    }

    #[test]
    fn test_status_column_always_written() {
        let queues: RenderQueues<NoopRawMutex> = RenderQueues::new();
        let mut arbiter = RenderArbiter::default();
        let mut w = writer();

        for _ in 0..2 {
            queues.enqueue(Priority::High, RenderCommand::text(0, 14, "working").unwrap()).unwrap();
        }
        assert_eq!(
            pump(&queues, &mut arbiter, &mut w)[..],
            [WriteOutcome::Written, WriteOutcome::Written]
        );
    }
}
