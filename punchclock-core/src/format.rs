//! Fixed-width text fields
//!
//! Every value that ends up on the grid has a fixed width. Values that would
//! not fit are clamped to the largest printable value and flagged, so a
//! field never spills into its neighbour's cells.

use core::fmt::{self, Write};
use core::time::Duration;

use heapless::String;
use punchclock_display::LINE_LEN;

use crate::session::{LeaveBy, WorkSession};
use crate::time::{LocalTime, TimeZone};

/// Largest hour count a two-digit field can show
pub const MAX_FIELD_HOURS: u64 = 99;

/// Formatted text plus whether anything was clamped to make it fit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<const N: usize> {
    text: String<N>,
    clamped: bool,
}

impl<const N: usize> Field<N> {
    fn new() -> Self {
        Self {
            text: String::new(),
            clamped: false,
        }
    }

    fn write(&mut self, args: fmt::Arguments) {
        if write_to_string(&mut self.text, args).is_err() {
            self.clamped = true;
        }
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// True if a value was clamped or the text cut short
    pub fn is_clamped(&self) -> bool {
        self.clamped
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for Field<N> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.text.as_str());
        if self.clamped {
            defmt::write!(f, " (clamped)");
        }
    }
}

/// Format into a heapless string, failing once the capacity is reached
pub fn write_to_string<const N: usize>(s: &mut String<N>, args: fmt::Arguments) -> fmt::Result {
    s.write_fmt(args)
}

/// Hours, minutes and seconds of `d`, capped at 99:59:59
fn split_hms(d: Duration) -> (u64, u64, u64, bool) {
    let secs = d.as_secs();
    let hours = secs / 3600;
    if hours > MAX_FIELD_HOURS {
        return (MAX_FIELD_HOURS, 59, 59, true);
    }
    (hours, secs % 3600 / 60, secs % 60, false)
}

/// `HH:MM:SS`
pub fn clock(t: &LocalTime) -> Field<8> {
    let mut f = Field::new();
    f.write(format_args!("{:02}:{:02}:{:02}", t.hour, t.minute, t.second));
    f
}

/// `net work: HH:MM:SS`
pub fn net_work(d: Duration) -> Field<LINE_LEN> {
    let (h, m, s, clamped) = split_hms(d);
    let mut f = Field::new();
    f.write(format_args!("net work: {:02}:{:02}:{:02}", h, m, s));
    f.clamped |= clamped;
    f
}

/// One summary table row, hours before minutes in the duration column
///
/// - closed: `HH:MM | HH:MM |HH:MM`
/// - open:   `HH:MM | --:-- |--:--`
/// - empty:  blank
pub fn session_row(session: &WorkSession, tz: &TimeZone) -> Field<LINE_LEN> {
    let mut f = Field::new();
    let Some(start) = session.start() else {
        return f;
    };
    let start = tz.local(start);

    match session.end() {
        Some(end) => {
            let (h, m, _, clamped) = split_hms(session.duration(end));
            let end = tz.local(end);
            f.write(format_args!(
                "{:02}:{:02} | {:02}:{:02} |{:02}:{:02}",
                start.hour, start.minute, end.hour, end.minute, h, m
            ));
            f.clamped |= clamped;
        }
        None => {
            f.write(format_args!(
                "{:02}:{:02} | --:-- |--:--",
                start.hour, start.minute
            ));
        }
    }
    f
}

/// `leave by:  HH:MM`, dashes once the target is met, blank before any session
pub fn leave_by(leave: LeaveBy, tz: &TimeZone) -> Field<LINE_LEN> {
    let mut f = Field::new();
    match leave {
        LeaveBy::NotStarted => {}
        LeaveBy::At(ts) => {
            let t = tz.local(ts);
            f.write(format_args!("leave by:  {:02}:{:02}", t.hour, t.minute));
        }
        LeaveBy::Reached => f.write(format_args!("leave by:  --:--")),
    }
    f
}
