//! Render queues and arbitration
//!
//! Two bounded FIFOs feed one consumer. The consumer takes up to `burst`
//! high-priority commands in a row, then gives the normal queue a turn.
//! Serving a normal command resets the streak, so with the high queue
//! constantly refilled a normal command still waits at most `burst + 1`
//! cycles.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embedded_hal_async::delay::DelayNs;

use super::message::{Priority, RenderCommand, RenderError};

/// Capacity of each render queue
pub const RENDER_QUEUE_DEPTH: usize = 20;

/// High-priority commands served before the normal queue gets a turn
pub const DEFAULT_HIGH_BURST: u8 = 3;

/// Consumer sleep when both queues are empty
pub const DEFAULT_IDLE_MS: u32 = 10;

/// High and normal priority render queues
pub struct RenderQueues<M: RawMutex, const N: usize = RENDER_QUEUE_DEPTH> {
    high: Channel<M, RenderCommand, N>,
    normal: Channel<M, RenderCommand, N>,
}

impl<M: RawMutex, const N: usize> Default for RenderQueues<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> RenderQueues<M, N> {
    pub const fn new() -> Self {
        Self {
            high: Channel::new(),
            normal: Channel::new(),
        }
    }

    /// Post a command without blocking
    ///
    /// A full queue keeps what it has and drops `cmd`.
    pub fn enqueue(&self, priority: Priority, cmd: RenderCommand) -> Result<(), RenderError> {
        let queue = match priority {
            Priority::High => &self.high,
            Priority::Normal => &self.normal,
        };
        queue.try_send(cmd).map_err(|_| RenderError::QueueFull)
    }

    /// Post text on the high-priority queue
    pub fn enqueue_high(&self, row: u8, column: u8, text: &str) -> Result<(), RenderError> {
        self.enqueue(Priority::High, RenderCommand::text(row, column, text)?)
    }

    /// Post text on the normal-priority queue
    pub fn enqueue_normal(&self, row: u8, column: u8, text: &str) -> Result<(), RenderError> {
        self.enqueue(Priority::Normal, RenderCommand::text(row, column, text)?)
    }

    /// Ask the consumer to blank the display
    pub fn request_clear(&self) -> Result<(), RenderError> {
        self.enqueue(Priority::High, RenderCommand::Clear)
    }

    /// Commands waiting in a queue
    pub fn len(&self, priority: Priority) -> usize {
        match priority {
            Priority::High => self.high.len(),
            Priority::Normal => self.normal.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.normal.is_empty()
    }

    fn try_take(&self, priority: Priority) -> Option<RenderCommand> {
        match priority {
            Priority::High => self.high.try_receive().ok(),
            Priority::Normal => self.normal.try_receive().ok(),
        }
    }
}

/// Consumer-side arbitration state
#[derive(Debug, Clone)]
pub struct RenderArbiter {
    burst: u8,
    idle_ms: u32,
    /// High-priority commands served since the last normal one
    high_streak: u8,
}

impl Default for RenderArbiter {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_BURST, DEFAULT_IDLE_MS)
    }
}

impl RenderArbiter {
    /// `burst` is raised to 1 so the high queue is always served
    pub const fn new(burst: u8, idle_ms: u32) -> Self {
        Self {
            burst: if burst == 0 { 1 } else { burst },
            idle_ms,
            high_streak: 0,
        }
    }

    /// Pick the next command, if any is ready
    pub fn poll<M: RawMutex, const N: usize>(
        &mut self,
        queues: &RenderQueues<M, N>,
    ) -> Option<(Priority, RenderCommand)> {
        if self.high_streak < self.burst {
            if let Some(cmd) = queues.try_take(Priority::High) {
                self.high_streak += 1;
                return Some((Priority::High, cmd));
            }
        }

        if let Some(cmd) = queues.try_take(Priority::Normal) {
            self.high_streak = 0;
            return Some((Priority::Normal, cmd));
        }

        // Burst spent but nothing normal is waiting
        queues
            .try_take(Priority::High)
            .map(|cmd| (Priority::High, cmd))
    }

    /// Wait for the next command, sleeping `idle_ms` between empty polls
    pub async fn next<M: RawMutex, const N: usize, D: DelayNs>(
        &mut self,
        queues: &RenderQueues<M, N>,
        delay: &mut D,
    ) -> (Priority, RenderCommand) {
        loop {
            if let Some(next) = self.poll(queues) {
                return next;
            }
            delay.delay_ms(self.idle_ms).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InstantDelay;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use proptest::prelude::*;

    fn text(cmd: &RenderCommand) -> &str {
        match cmd {
            RenderCommand::Text(msg) => msg.text(),
            RenderCommand::Clear => "<clear>",
        }
    }

    #[test]
    fn test_overflow_drops_new_message() {
        let queues: RenderQueues<NoopRawMutex> = RenderQueues::new();
        for _ in 0..RENDER_QUEUE_DEPTH {
            queues.enqueue_normal(0, 0, "old").unwrap();
        }
        assert_eq!(
            queues.enqueue_normal(0, 0, "new"),
            Err(RenderError::QueueFull)
        );
        // The other queue is unaffected
        assert!(queues.enqueue_high(1, 0, "urgent").is_ok());

        let mut arbiter = RenderArbiter::default();
        let (_, cmd) = arbiter.poll(&queues).unwrap();
        assert_eq!(text(&cmd), "urgent");
        let (_, cmd) = arbiter.poll(&queues).unwrap();
        assert_eq!(text(&cmd), "old");
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let queues: RenderQueues<NoopRawMutex> = RenderQueues::new();
        assert_eq!(queues.enqueue_high(8, 0, "x"), Err(RenderError::OutOfBounds));
        assert!(queues.is_empty());
    }

    #[test]
    fn test_fifo_within_queue() {
        let queues: RenderQueues<NoopRawMutex> = RenderQueues::new();
        queues.enqueue_high(0, 0, "a").unwrap();
        queues.enqueue_high(0, 0, "b").unwrap();
        queues.enqueue_high(0, 0, "c").unwrap();

        let mut arbiter = RenderArbiter::default();
        for expected in ["a", "b", "c"] {
            let (prio, cmd) = arbiter.poll(&queues).unwrap();
            assert_eq!(prio, Priority::High);
            assert_eq!(text(&cmd), expected);
        }
        assert!(arbiter.poll(&queues).is_none());
    }

    #[test]
    fn test_burst_then_normal() {
        let queues: RenderQueues<NoopRawMutex> = RenderQueues::new();
        for _ in 0..6 {
            queues.enqueue_high(1, 0, "h").unwrap();
        }
        queues.enqueue_normal(0, 0, "n").unwrap();

        let mut arbiter = RenderArbiter::new(3, 10);
        let order: [Priority; 7] = core::array::from_fn(|_| arbiter.poll(&queues).unwrap().0);
        assert_eq!(
            order,
            [
                Priority::High,
                Priority::High,
                Priority::High,
                Priority::Normal,
                Priority::High,
                Priority::High,
                Priority::High,
            ]
        );
    }

    #[test]
    fn test_normal_served_when_high_empty() {
        let queues: RenderQueues<NoopRawMutex> = RenderQueues::new();
        queues.enqueue_normal(0, 0, "12:00:05").unwrap();
        let mut arbiter = RenderArbiter::default();
        assert_eq!(arbiter.poll(&queues).unwrap().0, Priority::Normal);
    }

    #[test]
    fn test_next_idles_until_ready() {
        let queues: RenderQueues<NoopRawMutex> = RenderQueues::new();
        let mut arbiter = RenderArbiter::new(3, 25);

        struct FillOnSleep<'a> {
            queues: &'a RenderQueues<NoopRawMutex>,
            sleeps: u32,
        }

        impl DelayNs for FillOnSleep<'_> {
            async fn delay_ns(&mut self, _ns: u32) {}

            async fn delay_ms(&mut self, ms: u32) {
                assert_eq!(ms, 25);
                self.sleeps += 1;
                if self.sleeps == 2 {
                    self.queues.request_clear().unwrap();
                }
            }
        }

        let mut delay = FillOnSleep {
            queues: &queues,
            sleeps: 0,
        };
        let (prio, cmd) = block_on(arbiter.next(&queues, &mut delay));
        assert_eq!(prio, Priority::High);
        assert_eq!(cmd, RenderCommand::Clear);
        assert_eq!(delay.sleeps, 2);
    }

    #[test]
    fn test_next_does_not_sleep_when_ready() {
        let queues: RenderQueues<NoopRawMutex> = RenderQueues::new();
        queues.enqueue_normal(0, 0, "x").unwrap();
        let mut delay = InstantDelay::default();
        block_on(RenderArbiter::default().next(&queues, &mut delay));
        assert_eq!(delay.calls, 0);
    }

    proptest! {
        #[test]
        fn prop_normal_not_starved(burst in 1u8..6, warmup in 0usize..10, refill in 1usize..4) {
            let queues: RenderQueues<NoopRawMutex> = RenderQueues::new();
            let mut arbiter = RenderArbiter::new(burst, 10);

            // Run the high queue for a while to leave an arbitrary streak
            for _ in 0..warmup {
                queues.enqueue_high(1, 0, "h").unwrap();
                arbiter.poll(&queues);
            }

            queues.enqueue_normal(0, 0, "n").unwrap();
            let mut cycles = 0;
            loop {
                // Keep the high queue replenished
                for _ in 0..refill {
                    let _ = queues.enqueue_high(1, 0, "h");
                }
                cycles += 1;
                let (prio, _) = arbiter.poll(&queues).unwrap();
                if prio == Priority::Normal {
                    break;
                }
                prop_assert!(cycles <= burst as usize + 1);
            }
            prop_assert!(cycles <= burst as usize + 1);
        }
    }
}
