//! # Lifecycle events emitted by the limiter.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Submission events**: queue admission flow (queued, rejected)
//! - **Execution events**: job flow through the pacer (admitted, completed,
//!   failed, canceled)
//! - **Shutdown events**: teardown progress and outcome
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! job's ticket id, its priority, queue depth, and error messages.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically, so events can be ordered correctly even when delivered
//! out-of-order through async channels.
//!
//! ## Example
//! ```rust
//! use ratevisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::JobFailed)
//!     .with_job(7)
//!     .with_priority(5)
//!     .with_error("boom");
//!
//! assert_eq!(ev.kind, EventKind::JobFailed);
//! assert_eq!(ev.job, Some(7));
//! assert_eq!(ev.error.as_deref(), Some("boom"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of limiter events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Submission events ===
    /// Submission accepted and placed in the queue.
    JobQueued,
    /// Submission rejected because the queue was at capacity.
    JobRejected,

    // === Execution events ===
    /// Job taken from the queue and launched by the admission loop.
    JobAdmitted,
    /// Job finished successfully.
    JobCompleted,
    /// Job finished with an error.
    JobFailed,
    /// Job was canceled, either while queued or while running.
    JobCanceled,

    // === Shutdown events ===
    /// Teardown started; pending and running jobs are being canceled.
    ShutdownRequested,
    /// All in-flight jobs stopped within the configured grace period.
    AllStoppedWithin,
    /// Grace period exceeded; remaining jobs were detached.
    GraceExceeded,
}

/// Limiter event with optional metadata.
///
/// ## Fields
///
/// - `seq`: Unique sequence number for ordering (monotonically increasing)
/// - `at`: Wall-clock timestamp (may go backwards due to NTP, use for logging only)
/// - `kind`: Event classification
/// - `job`, `priority`, `pending`, `error`: Optional metadata
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp (logging only).
    pub at: SystemTime,
    /// The kind of event.
    pub kind: EventKind,
    /// Ticket id of the job, if applicable.
    pub job: Option<u64>,
    /// Priority the job was submitted with, if applicable.
    pub priority: Option<i64>,
    /// Queue depth observed when the event was produced, if applicable.
    pub pending: Option<usize>,
    /// Error message, if the event represents a failure.
    pub error: Option<String>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            priority: None,
            pending: None,
            error: None,
        }
    }

    /// Attaches a job ticket id.
    pub fn with_job(mut self, id: u64) -> Self {
        self.job = Some(id);
        self
    }

    /// Attaches the job's priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attaches an observed queue depth.
    pub fn with_pending(mut self, pending: usize) -> Self {
        self.pending = Some(pending);
        self
    }

    /// Attaches an error message.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }
}
