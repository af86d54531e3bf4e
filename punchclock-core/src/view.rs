//! Screens
//!
//! Turns tracker state into render commands. Layout on the 8×21 grid:
//!
//! | Row | Live                       | Summary                   |
//! |-----|----------------------------|---------------------------|
//! | 0   | clock, status at col 14    | clock, `summary` at col 14 |
//! | 1   | blank                      | table header              |
//! | 2-5 | blank                      | session slots 0-3         |
//! | 6   | `leave by:  HH:MM`         | session slot 4            |
//! | 7   | `net work: HH:MM:SS`       | session slot 5            |
//!
//! Clock redraws go on the normal queue; everything else is high priority.

use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::String;
use punchclock_display::{GRID_ROWS, LINE_LEN};

use crate::format::{self, Field};
use crate::render::{Priority, RenderCommand, RenderQueues};
use crate::session::{Phase, SessionTracker, ViewMode};
use crate::time::{LocalTime, TimeZone, Timestamp};

pub const CLOCK_ROW: u8 = 0;
pub const STATUS_COL: u8 = 14;
pub const SUMMARY_HEADER_ROW: u8 = 1;
pub const SUMMARY_FIRST_ROW: u8 = 2;
pub const LEAVE_BY_ROW: u8 = 6;
pub const NET_WORK_ROW: u8 = 7;

pub const SUMMARY_HEADER: &str = "start |  end  | net ";

/// Start-up instructions shown once the clock is set
pub const TUTORIAL: [&str; GRID_ROWS] = [
    "----time synched----",
    "--main program rdy--",
    "",
    " left btn:   stamp",
    " right btn:  switch",
    "",
    "===> press left <===",
    "===>  to start  <===",
];

/// Counters for a batch of posted commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Posted {
    /// Commands accepted by a queue
    pub sent: u8,
    /// Commands dropped because a queue was full
    pub dropped: u8,
    /// Values clamped or text clipped to fit the grid
    pub clipped: u8,
}

impl Posted {
    fn merge(&mut self, other: Posted) {
        self.sent += other.sent;
        self.dropped += other.dropped;
        self.clipped += other.clipped;
    }

    fn post<M: RawMutex, const Q: usize>(
        &mut self,
        queues: &RenderQueues<M, Q>,
        priority: Priority,
        row: u8,
        column: u8,
        text: &str,
    ) {
        let cmd = match RenderCommand::text(row, column, text) {
            Ok(cmd) => cmd,
            Err(_) => {
                self.dropped += 1;
                return;
            }
        };
        if let RenderCommand::Text(msg) = &cmd {
            if msg.was_clipped() {
                self.clipped += 1;
            }
        }
        match queues.enqueue(priority, cmd) {
            Ok(()) => self.sent += 1,
            Err(_) => self.dropped += 1,
        }
    }

    /// Post a whole row, padded so it overwrites what was there
    fn post_line<M: RawMutex, const Q: usize>(
        &mut self,
        queues: &RenderQueues<M, Q>,
        row: u8,
        text: &str,
    ) {
        self.post(queues, Priority::High, row, 0, padded(text).as_str());
    }

    fn post_field<M: RawMutex, const Q: usize, const N: usize>(
        &mut self,
        queues: &RenderQueues<M, Q>,
        row: u8,
        field: &Field<N>,
    ) {
        if field.is_clamped() {
            self.clipped += 1;
        }
        self.post_line(queues, row, field.as_str());
    }
}

fn padded(text: &str) -> String<LINE_LEN> {
    let mut line = String::new();
    for ch in text.chars() {
        if line.push(ch).is_err() {
            break;
        }
    }
    while line.push(' ').is_ok() {}
    line
}

fn status_word<const S: usize>(tracker: &SessionTracker<S>) -> &'static str {
    match (tracker.view(), tracker.phase()) {
        (ViewMode::Summary, _) => "summary",
        (ViewMode::Live, Phase::Working) => "working",
        (ViewMode::Live, Phase::Paused) => "pausing",
    }
}

/// Clock at the top left
///
/// Periodic redraws use the normal queue; a redraw right after a clear goes
/// on the high queue so it cannot overtake the clear.
pub fn render_clock<M: RawMutex, const Q: usize>(
    queues: &RenderQueues<M, Q>,
    local: &LocalTime,
    priority: Priority,
) -> Posted {
    let mut posted = Posted::default();
    let clock = format::clock(local);
    posted.post(queues, priority, CLOCK_ROW, 0, clock.as_str());
    posted
}

/// Blank the display
pub fn render_clear<M: RawMutex, const Q: usize>(queues: &RenderQueues<M, Q>) -> Posted {
    let mut posted = Posted::default();
    match queues.request_clear() {
        Ok(()) => posted.sent += 1,
        Err(_) => posted.dropped += 1,
    }
    posted
}

/// Status word at the top right
pub fn render_status<M: RawMutex, const Q: usize, const S: usize>(
    queues: &RenderQueues<M, Q>,
    tracker: &SessionTracker<S>,
) -> Posted {
    let mut posted = Posted::default();
    posted.post(queues, Priority::High, CLOCK_ROW, STATUS_COL, status_word(tracker));
    posted
}

/// Live body: status, blank middle, leave-by time and net work time
pub fn render_live<M: RawMutex, const Q: usize, const S: usize>(
    queues: &RenderQueues<M, Q>,
    tracker: &SessionTracker<S>,
    now: Timestamp,
    tz: &TimeZone,
) -> Posted {
    let mut posted = render_status(queues, tracker);
    for row in SUMMARY_HEADER_ROW..LEAVE_BY_ROW {
        posted.post_line(queues, row, "");
    }
    posted.merge(render_live_tick(queues, tracker, now, tz));
    posted
}

/// Rows of the live view that change while time passes
pub fn render_live_tick<M: RawMutex, const Q: usize, const S: usize>(
    queues: &RenderQueues<M, Q>,
    tracker: &SessionTracker<S>,
    now: Timestamp,
    tz: &TimeZone,
) -> Posted {
    let mut posted = Posted::default();
    posted.post_field(queues, LEAVE_BY_ROW, &format::leave_by(tracker.leave_by(now), tz));
    posted.post_field(queues, NET_WORK_ROW, &format::net_work(tracker.work_time(now)));
    posted
}

/// Summary table: header plus one row per slot, empty slots blank
pub fn render_summary<M: RawMutex, const Q: usize, const S: usize>(
    queues: &RenderQueues<M, Q>,
    tracker: &SessionTracker<S>,
    tz: &TimeZone,
) -> Posted {
    let mut posted = render_status(queues, tracker);
    posted.post_line(queues, SUMMARY_HEADER_ROW, SUMMARY_HEADER);

    let rows = SUMMARY_FIRST_ROW..GRID_ROWS as u8;
    for (row, session) in rows.zip(tracker.sessions().iter()) {
        posted.post_field(queues, row, &format::session_row(session, tz));
    }
    posted
}

/// Everything below the clock for the current view
pub fn render_view<M: RawMutex, const Q: usize, const S: usize>(
    queues: &RenderQueues<M, Q>,
    tracker: &SessionTracker<S>,
    now: Timestamp,
    tz: &TimeZone,
) -> Posted {
    match tracker.view() {
        ViewMode::Live => render_live(queues, tracker, now, tz),
        ViewMode::Summary => render_summary(queues, tracker, tz),
    }
}

/// Full-screen instructions
pub fn render_tutorial<M: RawMutex, const Q: usize>(queues: &RenderQueues<M, Q>) -> Posted {
    let mut posted = Posted::default();
    for (row, line) in TUTORIAL.iter().enumerate() {
        posted.post_line(queues, row as u8, line);
    }
    posted
}

/// One line of boot progress
pub fn render_boot_line<M: RawMutex, const Q: usize>(
    queues: &RenderQueues<M, Q>,
    row: u8,
    text: &str,
) -> Posted {
    let mut posted = Posted::default();
    posted.post_line(queues, row % GRID_ROWS as u8, text);
    posted
}

/// Sum of several batches
pub fn total(batches: &[Posted]) -> Posted {
    let mut sum = Posted::default();
    for b in batches {
        sum.merge(*b);
    }
    sum
}
