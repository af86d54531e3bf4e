//! Session tracker state machine
//!
//! States are `{Paused, Working} × {Live, Summary}`. A stamp in the live view
//! opens the next free slot or closes the open one. The view toggle flips
//! between live and summary unless the tutorial is showing.

use core::time::Duration;

use super::work::WorkSession;
use crate::time::Timestamp;

/// Number of session slots
pub const MAX_SESSIONS: usize = 6;

/// Default daily working time
pub const DEFAULT_DAILY_TARGET: Duration = Duration::from_secs(10 * 3600);

/// Working state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Paused,
    Working,
}

/// Selected screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ViewMode {
    /// Clock, status and running net work time
    #[default]
    Live,
    /// Table of all sessions
    Summary,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Live => ViewMode::Summary,
            ViewMode::Summary => ViewMode::Live,
        }
    }
}

/// What a stamp does while the summary is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SummaryStampPolicy {
    /// Stamps are dropped
    #[default]
    Ignore,
    /// Stamps start/stop sessions as in the live view
    Apply,
}

/// Result of a stamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampOutcome {
    /// Session `index` opened
    Started { index: usize },
    /// Session `index` closed after `duration`
    Stopped { index: usize, duration: Duration },
    /// Every slot is used; nothing changed
    CapacityExhausted,
    /// Summary view is showing; nothing changed
    IgnoredInSummary,
}

#[cfg(feature = "defmt")]
impl defmt::Format for StampOutcome {
    fn format(&self, f: defmt::Formatter) {
        match self {
            StampOutcome::Started { index } => defmt::write!(f, "Started(#{})", index),
            StampOutcome::Stopped { index, duration } => {
                defmt::write!(f, "Stopped(#{}, {}s)", index, duration.as_secs())
            }
            StampOutcome::CapacityExhausted => defmt::write!(f, "CapacityExhausted"),
            StampOutcome::IgnoredInSummary => defmt::write!(f, "IgnoredInSummary"),
        }
    }
}

/// Earliest time the daily target is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LeaveBy {
    /// No session yet
    NotStarted,
    /// Target reached at this time if work continues from now
    At(Timestamp),
    /// Target already met
    Reached,
}

/// Work session state machine
#[derive(Debug, Clone)]
pub struct SessionTracker<const N: usize = MAX_SESSIONS> {
    sessions: [WorkSession; N],
    /// First slot that is empty or open; `N` once all are closed
    active: usize,
    view: ViewMode,
    policy: SummaryStampPolicy,
    daily_target: Duration,
}

impl<const N: usize> Default for SessionTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SessionTracker<N> {
    /// Create a tracker with every slot empty, paused, in the live view
    pub const fn new() -> Self {
        Self {
            sessions: [WorkSession::EMPTY; N],
            active: 0,
            view: ViewMode::Live,
            policy: SummaryStampPolicy::Ignore,
            daily_target: DEFAULT_DAILY_TARGET,
        }
    }

    pub fn set_policy(&mut self, policy: SummaryStampPolicy) {
        self.policy = policy;
    }

    pub fn set_daily_target(&mut self, target: Duration) {
        self.daily_target = target;
    }

    pub fn sessions(&self) -> &[WorkSession; N] {
        &self.sessions
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn policy(&self) -> SummaryStampPolicy {
        self.policy
    }

    pub fn daily_target(&self) -> Duration {
        self.daily_target
    }

    /// True iff the active slot holds an open session
    pub fn is_working(&self) -> bool {
        self.sessions.get(self.active).is_some_and(|s| s.is_open())
    }

    pub fn phase(&self) -> Phase {
        if self.is_working() {
            Phase::Working
        } else {
            Phase::Paused
        }
    }

    /// Handle a stamp press at `now`
    pub fn stamp(&mut self, now: Timestamp) -> StampOutcome {
        if self.view == ViewMode::Summary && self.policy == SummaryStampPolicy::Ignore {
            return StampOutcome::IgnoredInSummary;
        }

        let index = self.active;
        let Some(session) = self.sessions.get_mut(index) else {
            return StampOutcome::CapacityExhausted;
        };

        if session.is_open() {
            let duration = session.close(now);
            self.active += 1;
            StampOutcome::Stopped { index, duration }
        } else {
            session.open(now);
            StampOutcome::Started { index }
        }
    }

    /// Handle a view toggle press
    ///
    /// Returns the new view, or `None` while the tutorial is showing.
    pub fn toggle_view(&mut self, tutorial_active: bool) -> Option<ViewMode> {
        if tutorial_active {
            return None;
        }
        self.view = self.view.toggled();
        Some(self.view)
    }

    /// Net time worked: closed sessions plus the open one up to `now`
    pub fn work_time(&self, now: Timestamp) -> Duration {
        self.sessions.iter().map(|s| s.duration(now)).sum()
    }

    /// When the daily target is met if work continues from `now`
    pub fn leave_by(&self, now: Timestamp) -> LeaveBy {
        if self.sessions.first().map_or(true, |s| s.is_empty()) {
            return LeaveBy::NotStarted;
        }
        let worked = self.work_time(now);
        match self.daily_target.checked_sub(worked) {
            Some(remaining) if !remaining.is_zero() => LeaveBy::At(now.saturating_add(remaining)),
            _ => LeaveBy::Reached,
        }
    }
}
