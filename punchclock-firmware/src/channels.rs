//! Inter-task shared state
//!
//! Defines the statics the Embassy tasks communicate through. All of them
//! use the critical-section mutex so the edge watchers can post from any
//! context.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use portable_atomic::AtomicU32;

use punchclock_core::app::SharedTracker;
use punchclock_core::debounce::DebounceMonitor;
use punchclock_core::flags::EventBus;
use punchclock_core::render::RenderQueues;
use punchclock_core::session::{SessionTracker, MAX_SESSIONS};
use punchclock_core::time::WallClock;

/// Event flags shared by every task
pub static EVENTS: EventBus<CriticalSectionRawMutex> = EventBus::new();

/// Raw button edges waiting to be debounced
pub static EDGES: DebounceMonitor<CriticalSectionRawMutex> = DebounceMonitor::new();

/// Edges lost because the edge queue was full
pub static DROPPED_EDGES: AtomicU32 = AtomicU32::new(0);

/// High and normal priority display commands
pub static RENDER: RenderQueues<CriticalSectionRawMutex> = RenderQueues::new();

/// Work sessions of the day
pub static TRACKER: SharedTracker<CriticalSectionRawMutex, MAX_SESSIONS> =
    Mutex::new(RefCell::new(SessionTracker::new()));

/// UTC anchor set by the time sync
pub static WALL_CLOCK: WallClock<CriticalSectionRawMutex> = WallClock::new();
