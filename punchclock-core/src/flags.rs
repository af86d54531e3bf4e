//! Event flags
//!
//! Named, process-wide boolean signals used to couple otherwise independent
//! tasks. An `EventBus` is created once (usually in a `static`) and handed to
//! every task that needs it.
//!
//! Waiting is cooperative: a waiting task is parked until the flag it waits
//! on is set. Setting one flag only wakes the tasks waiting on that flag.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::MultiWakerRegistration;
use embedded_hal_async::delay::DelayNs;

/// Number of tasks that may wait on the same flag at once
pub const MAX_WAITERS_PER_FLAG: usize = 4;

const FLAG_COUNT: usize = 5;

/// Named event flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventFlag {
    /// Network link is up
    WifiConnected,
    /// Time sync finished (successfully or not)
    SyncDone,
    /// Tutorial page is on screen
    TutorialActive,
    /// Stamp button pressed
    Button1Pressed,
    /// Switch button pressed
    Button2Pressed,
}

impl EventFlag {
    /// All flags, in bit order
    pub const ALL: [EventFlag; FLAG_COUNT] = [
        EventFlag::WifiConnected,
        EventFlag::SyncDone,
        EventFlag::TutorialActive,
        EventFlag::Button1Pressed,
        EventFlag::Button2Pressed,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    const fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

struct FlagState {
    bits: u8,
    waiters: [MultiWakerRegistration<MAX_WAITERS_PER_FLAG>; FLAG_COUNT],
}

/// Set of event flags shared between tasks
pub struct EventBus<M: RawMutex> {
    state: Mutex<M, RefCell<FlagState>>,
}

impl<M: RawMutex> Default for EventBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> EventBus<M> {
    /// Create a bus with every flag cleared
    pub const fn new() -> Self {
        const IDLE: MultiWakerRegistration<MAX_WAITERS_PER_FLAG> = MultiWakerRegistration::new();
        Self {
            state: Mutex::new(RefCell::new(FlagState {
                bits: 0,
                waiters: [IDLE; FLAG_COUNT],
            })),
        }
    }

    /// Set a flag and wake the tasks waiting on it
    pub fn set(&self, flag: EventFlag) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.bits |= flag.mask();
            s.waiters[flag.index()].wake();
        });
    }

    /// Clear a flag
    pub fn clear(&self, flag: EventFlag) {
        self.state.lock(|s| s.borrow_mut().bits &= !flag.mask());
    }

    /// Check a flag without changing it
    pub fn is_set(&self, flag: EventFlag) -> bool {
        self.state.lock(|s| s.borrow().bits & flag.mask() != 0)
    }

    /// Atomically test and clear a flag
    pub fn is_set_and_clear(&self, flag: EventFlag) -> bool {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let was_set = s.bits & flag.mask() != 0;
            s.bits &= !flag.mask();
            was_set
        })
    }

    /// Wait until `flag` is set
    ///
    /// The flag is left set. Callers that want one-shot semantics clear it
    /// themselves, or use [`take`](Self::take).
    pub async fn wait(&self, flag: EventFlag) {
        self.poll_flag(flag, false).await
    }

    /// Wait until `flag` is set, then clear it in the same critical section
    pub async fn take(&self, flag: EventFlag) {
        self.poll_flag(flag, true).await
    }

    /// Wait until `flag` is set or `timeout_ms` elapses
    ///
    /// Returns whether the flag was observed set. The flag is left set.
    pub async fn wait_timeout<D: DelayNs>(
        &self,
        flag: EventFlag,
        timeout_ms: u32,
        delay: &mut D,
    ) -> bool {
        match select(self.wait(flag), delay.delay_ms(timeout_ms)).await {
            Either::First(()) => true,
            // The flag may have been set right as the timer fired
            Either::Second(()) => self.is_set(flag),
        }
    }

    async fn poll_flag(&self, flag: EventFlag, consume: bool) {
        poll_fn(|cx| {
            self.state.lock(|s| {
                let mut s = s.borrow_mut();
                if s.bits & flag.mask() != 0 {
                    if consume {
                        s.bits &= !flag.mask();
                    }
                    Poll::Ready(())
                } else {
                    s.waiters[flag.index()].register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{counting_waker, InstantDelay};
    use core::future::Future;
    use core::pin::pin;
    use core::task::Context;
    use embassy_futures::{block_on, join::join, yield_now};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_set_clear() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        for flag in EventFlag::ALL {
            assert!(!bus.is_set(flag));
        }

        bus.set(EventFlag::SyncDone);
        assert!(bus.is_set(EventFlag::SyncDone));
        assert!(!bus.is_set(EventFlag::WifiConnected));

        bus.clear(EventFlag::SyncDone);
        assert!(!bus.is_set(EventFlag::SyncDone));
    }

    #[test]
    fn test_is_set_and_clear() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        assert!(!bus.is_set_and_clear(EventFlag::Button1Pressed));

        bus.set(EventFlag::Button1Pressed);
        assert!(bus.is_set_and_clear(EventFlag::Button1Pressed));
        assert!(!bus.is_set_and_clear(EventFlag::Button1Pressed));
    }

    #[test]
    fn test_wait_leaves_flag_set() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        bus.set(EventFlag::SyncDone);
        block_on(bus.wait(EventFlag::SyncDone));
        assert!(bus.is_set(EventFlag::SyncDone));
    }

    #[test]
    fn test_take_clears_flag() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        block_on(join(bus.take(EventFlag::Button2Pressed), async {
            yield_now().await;
            bus.set(EventFlag::Button2Pressed);
        }));
        assert!(!bus.is_set(EventFlag::Button2Pressed));
    }

    #[test]
    fn test_waiter_woken_only_by_its_flag() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        let (waker, wakes) = counting_waker();
        let mut cx = Context::from_waker(&waker);

        let mut fut = pin!(bus.wait(EventFlag::Button1Pressed));
        assert!(fut.as_mut().poll(&mut cx).is_pending());

        bus.set(EventFlag::Button2Pressed);
        bus.set(EventFlag::TutorialActive);
        assert_eq!(wakes.count(), 0);

        bus.set(EventFlag::Button1Pressed);
        assert_eq!(wakes.count(), 1);
        assert!(fut.as_mut().poll(&mut cx).is_ready());
    }

    #[test]
    fn test_wait_timeout() {
        let bus: EventBus<NoopRawMutex> = EventBus::new();
        let mut delay = InstantDelay::default();

        assert!(!block_on(bus.wait_timeout(EventFlag::SyncDone, 500, &mut delay)));
        assert_eq!(delay.total_ms, 500);

        bus.set(EventFlag::SyncDone);
        assert!(block_on(bus.wait_timeout(EventFlag::SyncDone, 500, &mut delay)));
        assert!(bus.is_set(EventFlag::SyncDone));
    }
}
