//! Render pipeline
//!
//! Producers post [`RenderCommand`]s into one of two bounded queues. A single
//! consumer pulls them through the [`RenderArbiter`] and hands them to a
//! [`DisplayWriter`], which skips rows that would not change.
//!
//! ```text
//! enqueue_high ──┐
//!                ├─> RenderArbiter ─> DisplayWriter ─> DisplayCache ─> GlyphDisplay
//! enqueue_normal ┘
//! ```

pub mod cache;
pub mod message;
pub mod queue;
pub mod writer;

pub use cache::DisplayCache;
pub use message::{Priority, RenderCommand, RenderError, RenderMessage};
pub use queue::{RenderArbiter, RenderQueues, DEFAULT_HIGH_BURST, DEFAULT_IDLE_MS, RENDER_QUEUE_DEPTH};
pub use writer::{DisplayWriter, WriteOutcome};
