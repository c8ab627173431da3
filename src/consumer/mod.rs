//! Consumer Runtime - one polling loop per topic subscription.
//!
//! ```text
//! Polling ──timeout──▶ Polling
//!    │
//!    │ message
//!    ▼
//! Processing ──(handled | skipped)──▶ commit ──▶ Polling
//!
//! stop signal / closed consumer ──▶ Shutdown (consumer closed)
//! ```
//!
//! Per-message failures are classified by [`SkipReason`](crate::handlers::SkipReason)
//! and logged; none of them ends the loop. Transport errors from the poll are
//! logged and the loop keeps polling.

mod retry;
mod runtime;
mod thread;

pub use retry::RetryPolicy;
pub use runtime::{ConsumerRuntime, RuntimeStats, Step, DEFAULT_POLL_TIMEOUT};
pub use thread::ConsumerThread;
