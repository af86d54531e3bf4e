//! Test doubles shared by the unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Wake, Waker};

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::time::{Clock, Timestamp};

/// Delay that completes immediately and sums the time it was asked to wait
#[derive(Default)]
pub struct InstantDelay {
    pub total_ms: u64,
    pub calls: usize,
}

impl DelayNs for InstantDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ms += u64::from(ns) / 1_000_000;
        self.calls += 1;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.total_ms += u64::from(ms);
        self.calls += 1;
    }
}

/// Clock set by hand
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(secs: u64) -> Self {
        Self { now: Cell::new(secs) }
    }

    pub fn set(&self, secs: u64) {
        self.now.set(secs);
    }

    pub fn advance(&self, secs: u64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.now.get())
    }
}

pub struct WakeCount(AtomicUsize);

impl WakeCount {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Wake for WakeCount {
    fn wake(self: Arc<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Waker that counts how often it was woken
pub fn counting_waker() -> (Waker, Arc<WakeCount>) {
    let count = Arc::new(WakeCount(AtomicUsize::new(0)));
    (Waker::from(count.clone()), count)
}

thread_local! {
    static LOCK_DEPTH: Cell<usize> = const { Cell::new(0) };
    static MAX_LOCK_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Raw mutex that records how deeply locks nest on the current thread
///
/// Provides no exclusion; only for single-threaded tests.
pub struct NestingRawMutex;

impl NestingRawMutex {
    /// Forget the deepest nesting seen so far on this thread
    pub fn reset() {
        MAX_LOCK_DEPTH.with(|m| m.set(0));
    }

    /// Deepest nesting seen on this thread since the last reset
    pub fn max_depth() -> usize {
        MAX_LOCK_DEPTH.with(|m| m.get())
    }
}

#[allow(unsafe_code)]
unsafe impl RawMutex for NestingRawMutex {
    const INIT: Self = NestingRawMutex;

    fn lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let depth = LOCK_DEPTH.with(|d| {
            d.set(d.get() + 1);
            d.get()
        });
        MAX_LOCK_DEPTH.with(|m| m.set(m.get().max(depth)));
        let result = f();
        LOCK_DEPTH.with(|d| d.set(d.get() - 1));
        result
    }
}
