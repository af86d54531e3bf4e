//! Appliance orchestration
//!
//! Ties the event flags, the session tracker and the render queues together
//! into the operations the firmware tasks loop on: the start-up tutorial,
//! stamp and switch handling, and the clock tick.
//!
//! The tracker sits behind a blocking mutex that is held only to apply a
//! transition and copy the tracker out. The view is rendered from the copy
//! with no await point before it is queued, so on the cooperative executor
//! the commands one task posts never interleave with another task's.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::TrackerConfig;
use crate::flags::{EventBus, EventFlag};
use crate::render::{Priority, RenderQueues};
use crate::session::{SessionTracker, StampOutcome, ViewMode};
use crate::time::{Clock, TimeZone, Timestamp};
use crate::view::{self, Posted};

/// Session tracker shared between tasks
pub type SharedTracker<M, const N: usize> = Mutex<M, RefCell<SessionTracker<N>>>;

/// Last second the clock was drawn for
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockFace {
    last: Option<Timestamp>,
}

/// Shared state and the operations on it
pub struct Appliance<'a, M: RawMutex, C: Clock, const N: usize, const Q: usize> {
    flags: &'a EventBus<M>,
    queues: &'a RenderQueues<M, Q>,
    tracker: &'a SharedTracker<M, N>,
    clock: C,
    tz: TimeZone,
}

impl<'a, M: RawMutex, C: Clock, const N: usize, const Q: usize> Appliance<'a, M, C, N, Q> {
    pub fn new(
        flags: &'a EventBus<M>,
        queues: &'a RenderQueues<M, Q>,
        tracker: &'a SharedTracker<M, N>,
        clock: C,
        tz: TimeZone,
    ) -> Self {
        Self {
            flags,
            queues,
            tracker,
            clock,
            tz,
        }
    }

    pub fn flags(&self) -> &EventBus<M> {
        self.flags
    }

    pub fn queues(&self) -> &RenderQueues<M, Q> {
        self.queues
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Apply tracker settings
    pub fn configure(&self, config: &TrackerConfig) {
        self.tracker.lock(|t| {
            let mut t = t.borrow_mut();
            t.set_policy(config.summary_stamp);
            t.set_daily_target(config.daily_target());
        });
    }

    /// Read the tracker
    pub fn with_tracker<R>(&self, f: impl FnOnce(&SessionTracker<N>) -> R) -> R {
        self.tracker.lock(|t| f(&t.borrow()))
    }

    /// Wait until the time sync has finished
    pub async fn await_sync(&self) {
        self.flags.wait(EventFlag::SyncDone).await
    }

    /// Show the instructions until the stamp button is pressed, then the
    /// main screen
    pub async fn run_tutorial(&self) -> Posted {
        // Presses from before the tutorial do not count
        self.flags.clear(EventFlag::Button1Pressed);
        self.flags.clear(EventFlag::Button2Pressed);
        self.flags.set(EventFlag::TutorialActive);

        let shown = view::total(&[view::render_clear(self.queues), view::render_tutorial(self.queues)]);

        self.flags.take(EventFlag::Button1Pressed).await;
        self.flags.clear(EventFlag::TutorialActive);

        let main = self.redraw();
        view::total(&[shown, main])
    }

    /// Copy of the tracker, taken under the lock
    fn snapshot(&self) -> SessionTracker<N> {
        self.tracker.lock(|t| t.borrow().clone())
    }

    /// Clear, then draw the clock and the view
    fn render_screen(&self, tracker: &SessionTracker<N>, now: Timestamp) -> Posted {
        view::total(&[
            view::render_clear(self.queues),
            view::render_clock(self.queues, &self.tz.local(now), Priority::High),
            view::render_view(self.queues, tracker, now, &self.tz),
        ])
    }

    /// Clear and draw the whole current screen
    pub fn redraw(&self) -> Posted {
        let now = self.clock.now();
        self.render_screen(&self.snapshot(), now)
    }

    /// Handle one stamp press
    pub fn stamp(&self) -> (StampOutcome, Posted) {
        let now = self.clock.now();
        let (outcome, tracker) = self.tracker.lock(|t| {
            let mut t = t.borrow_mut();
            (t.stamp(now), t.clone())
        });
        let posted = match outcome {
            StampOutcome::Started { .. } | StampOutcome::Stopped { .. } => {
                view::render_view(self.queues, &tracker, now, &self.tz)
            }
            StampOutcome::CapacityExhausted | StampOutcome::IgnoredInSummary => Posted::default(),
        };
        (outcome, posted)
    }

    /// Wait for the stamp button, then handle it
    pub async fn next_stamp(&self) -> (StampOutcome, Posted) {
        self.flags.take(EventFlag::Button1Pressed).await;
        self.stamp()
    }

    /// Handle one switch press
    ///
    /// Returns `None` if the press was ignored because the tutorial is up.
    pub fn switch(&self) -> Option<(ViewMode, Posted)> {
        let tutorial = self.flags.is_set(EventFlag::TutorialActive);
        let now = self.clock.now();
        let (mode, tracker) = self.tracker.lock(|t| {
            let mut t = t.borrow_mut();
            let mode = t.toggle_view(tutorial)?;
            Some((mode, t.clone()))
        })?;
        Some((mode, self.render_screen(&tracker, now)))
    }

    /// Wait for the switch button, then handle it
    pub async fn next_switch(&self) -> Option<(ViewMode, Posted)> {
        self.flags.take(EventFlag::Button2Pressed).await;
        self.switch()
    }

    /// Redraw the clock once per second, plus the running totals in the
    /// live view
    ///
    /// Returns `None` while the second has not changed.
    pub fn tick(&self, face: &mut ClockFace) -> Option<Posted> {
        let now = self.clock.now();
        if face.last == Some(now) {
            return None;
        }
        face.last = Some(now);

        let clock = view::render_clock(self.queues, &self.tz.local(now), Priority::Normal);
        let tracker = self.snapshot();
        let body = match tracker.view() {
            ViewMode::Live => view::render_live_tick(self.queues, &tracker, now, &self.tz),
            ViewMode::Summary => Posted::default(),
        };
        Some(view::total(&[clock, body]))
    }
}
