//! Debounce monitor
//!
//! Turns raw edge notifications into one logical press per physical press.
//!
//! The interrupt side calls [`DebounceMonitor::notify`], which never blocks:
//! when the queue is full the new edge is dropped. A single consumer task
//! awaits [`DebounceMonitor::next_press`], which raises the button's event
//! flag, waits out the quiet window and then throws away every edge that
//! piled up meanwhile.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embedded_hal_async::delay::DelayNs;

use crate::flags::{EventBus, EventFlag};

/// Quiet window after a logical press
pub const DEBOUNCE_WINDOW_MS: u32 = 30;

/// Raw edges buffered between interrupt and consumer
pub const EDGE_QUEUE_DEPTH: usize = 10;

/// GPIO number an edge came from
pub type PinId = u8;

/// Logical button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Start or stop a work session
    Stamp,
    /// Flip between live and summary view
    Switch,
}

impl Button {
    /// Event flag raised when this button is pressed
    pub const fn flag(self) -> EventFlag {
        match self {
            Button::Stamp => EventFlag::Button1Pressed,
            Button::Switch => EventFlag::Button2Pressed,
        }
    }
}

/// Which pin drives which button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonMap {
    pub stamp_pin: PinId,
    pub switch_pin: PinId,
}

impl ButtonMap {
    /// Look up the button wired to `pin`
    pub fn button_for(&self, pin: PinId) -> Option<Button> {
        if pin == self.stamp_pin {
            Some(Button::Stamp)
        } else if pin == self.switch_pin {
            Some(Button::Switch)
        } else {
            None
        }
    }
}

/// Result of one debounce cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebouncedPress {
    /// Pin of the edge that opened the window
    pub pin: PinId,
    /// Button raised, `None` for a pin no button is mapped to
    pub button: Option<Button>,
    /// Edges discarded at the end of the quiet window
    pub discarded: usize,
}

/// Edge queue plus the consumer-side debounce logic
pub struct DebounceMonitor<M: RawMutex, const N: usize = EDGE_QUEUE_DEPTH> {
    edges: Channel<M, PinId, N>,
}

impl<M: RawMutex, const N: usize> Default for DebounceMonitor<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> DebounceMonitor<M, N> {
    pub const fn new() -> Self {
        Self {
            edges: Channel::new(),
        }
    }

    /// Record a raw edge from interrupt context
    ///
    /// Returns `false` if the queue was full and the edge was dropped.
    pub fn notify(&self, pin: PinId) -> bool {
        self.edges.try_send(pin).is_ok()
    }

    /// Number of edges waiting in the queue
    pub fn pending(&self) -> usize {
        self.edges.len()
    }

    /// Wait for the next press and debounce it
    ///
    /// Edges from unmapped pins are reported without raising a flag or
    /// opening a quiet window.
    pub async fn next_press<MB: RawMutex, D: DelayNs>(
        &self,
        map: &ButtonMap,
        bus: &EventBus<MB>,
        delay: &mut D,
    ) -> DebouncedPress {
        let pin = self.edges.receive().await;

        let Some(button) = map.button_for(pin) else {
            return DebouncedPress {
                pin,
                button: None,
                discarded: 0,
            };
        };

        bus.set(button.flag());
        delay.delay_ms(DEBOUNCE_WINDOW_MS).await;

        let mut discarded = 0;
        while self.edges.try_receive().is_ok() {
            discarded += 1;
        }

        DebouncedPress {
            pin,
            button: Some(button),
            discarded,
        }
    }
}
