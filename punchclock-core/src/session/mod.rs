//! Work session tracking
//!
//! A fixed number of session slots filled in order by stamp presses, plus
//! the live/summary view selection. Both axes are independent: the tracker
//! can be working or paused in either view.

pub mod tracker;
pub mod work;

pub use tracker::{
    LeaveBy, Phase, SessionTracker, StampOutcome, SummaryStampPolicy, ViewMode,
    DEFAULT_DAILY_TARGET, MAX_SESSIONS,
};
pub use work::WorkSession;
