//! Per-row write suppression
//!
//! Remembers the last text written at column 0 of every row. A column-0
//! write of the same text is redundant and skipped; writes at any other
//! column always go through.

use heapless::String;
use punchclock_display::{GRID_ROWS, LINE_LEN};

/// Last text written at column 0, per row
#[derive(Debug, Clone)]
pub struct DisplayCache {
    /// `None` means the row content is unknown
    rows: [Option<String<LINE_LEN>>; GRID_ROWS],
}

impl Default for DisplayCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayCache {
    /// Create a cache that knows nothing about the display
    pub fn new() -> Self {
        Self {
            rows: core::array::from_fn(|_| None),
        }
    }

    /// Check if a write would change the display
    pub fn should_write(&self, row: u8, column: u8, text: &str) -> bool {
        if column != 0 {
            return true;
        }
        match self.rows.get(row as usize) {
            Some(Some(cached)) => cached.as_str() != text,
            _ => true,
        }
    }

    /// Note a write that reached the display
    ///
    /// A write at a non-zero column that lands on the cached text makes
    /// the entry stale, so it is dropped.
    pub fn record(&mut self, row: u8, column: u8, text: &str) {
        let Some(entry) = self.rows.get_mut(row as usize) else {
            return;
        };

        if column == 0 {
            let mut line = String::new();
            *entry = match line.push_str(text) {
                Ok(()) => Some(line),
                Err(()) => None,
            };
        } else if entry
            .as_ref()
            .is_some_and(|cached| (column as usize) < cached.len())
        {
            *entry = None;
        }
    }

    /// Forget a row, e.g. after a failed write
    pub fn invalidate(&mut self, row: u8) {
        if let Some(entry) = self.rows.get_mut(row as usize) {
            *entry = None;
        }
    }

    /// Forget every row
    pub fn invalidate_all(&mut self) {
        for entry in &mut self.rows {
            *entry = None;
        }
    }

    /// The display was blanked: every row is now known to be empty
    pub fn clear(&mut self) {
        for entry in &mut self.rows {
            *entry = Some(String::new());
        }
    }

    /// Cached text for a row, if known
    pub fn row(&self, row: u8) -> Option<&str> {
        self.rows
            .get(row as usize)
            .and_then(|r| r.as_ref())
            .map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_rows_are_written() {
        let cache = DisplayCache::new();
        assert!(cache.should_write(0, 0, ""));
        assert!(cache.should_write(7, 0, "net work: 00:00:00"));
    }

    #[test]
    fn test_same_text_suppressed() {
        let mut cache = DisplayCache::new();
        cache.record(0, 0, "12:00:05");
        assert!(!cache.should_write(0, 0, "12:00:05"));
        assert!(cache.should_write(0, 0, "12:00:06"));
        // Other rows are independent
        assert!(cache.should_write(1, 0, "12:00:05"));
    }

    #[test]
    fn test_non_zero_column_never_suppressed() {
        let mut cache = DisplayCache::new();
        cache.record(0, 14, "working");
        assert!(cache.should_write(0, 14, "working"));
    }

    #[test]
    fn test_overlapping_partial_write_invalidates() {
        let mut cache = DisplayCache::new();
        cache.record(3, 0, "net work: 01:00:00");
        cache.record(3, 10, "02");
        assert_eq!(cache.row(3), None);
        assert!(cache.should_write(3, 0, "net work: 01:00:00"));
    }

    #[test]
    fn test_partial_write_past_text_keeps_entry() {
        let mut cache = DisplayCache::new();
        cache.record(0, 0, "12:00:05");
        cache.record(0, 14, "working");
        assert_eq!(cache.row(0), Some("12:00:05"));
        assert!(!cache.should_write(0, 0, "12:00:05"));
    }

    #[test]
    fn test_clear_resets_rows() {
        let mut cache = DisplayCache::new();
        cache.record(2, 0, "start |  end  | net ");
        cache.clear();
        assert_eq!(cache.row(2), Some(""));
        assert!(cache.should_write(2, 0, "start |  end  | net "));
    }

    #[test]
    fn test_invalidate() {
        let mut cache = DisplayCache::new();
        cache.record(5, 0, "x");
        cache.invalidate(5);
        assert!(cache.should_write(5, 0, "x"));

        cache.record(6, 0, "y");
        cache.invalidate_all();
        assert!(cache.should_write(6, 0, "y"));
    }
}
