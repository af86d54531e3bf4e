//! A single work session slot

use core::time::Duration;

use crate::time::Timestamp;

/// Start/end pair of one work session
///
/// Empty when neither is set, open while only `start` is set, closed once
/// both are set. A closed session never ends before it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WorkSession {
    start: Option<Timestamp>,
    end: Option<Timestamp>,
}

impl WorkSession {
    pub const EMPTY: WorkSession = WorkSession {
        start: None,
        end: None,
    };

    pub fn start(&self) -> Option<Timestamp> {
        self.start
    }

    pub fn end(&self) -> Option<Timestamp> {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    pub fn is_open(&self) -> bool {
        self.start.is_some() && self.end.is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Time worked in this session; an open session counts up to `now`
    pub fn duration(&self, now: Timestamp) -> Duration {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end.saturating_since(start),
            (Some(start), None) => now.saturating_since(start),
            _ => Duration::ZERO,
        }
    }

    pub(crate) fn open(&mut self, now: Timestamp) {
        self.start = Some(now);
        self.end = None;
    }

    /// Close at `now`, clamped so the end is never before the start
    pub(crate) fn close(&mut self, now: Timestamp) -> Duration {
        let start = self.start.unwrap_or(now);
        let end = now.max(start);
        self.end = Some(end);
        end.saturating_since(start)
    }
}
