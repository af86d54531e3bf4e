//! Embassy async tasks
//!
//! Each task runs independently and communicates via the statics in
//! `channels`.

pub mod buttons;
pub mod debounce;
pub mod render;
pub mod session;
pub mod sync;
pub mod tick;

pub use buttons::edge_watch_task;
pub use debounce::debounce_task;
pub use render::render_task;
pub use session::{stamp_task, startup_task, switch_task};
pub use sync::time_sync_task;
pub use tick::clock_task;

use punchclock_core::app::Appliance;
use punchclock_core::render::RENDER_QUEUE_DEPTH;
use punchclock_core::session::MAX_SESSIONS;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::clock::SystemClock;

/// The appliance as the tasks share it
pub type App = Appliance<'static, CriticalSectionRawMutex, SystemClock, MAX_SESSIONS, RENDER_QUEUE_DEPTH>;
