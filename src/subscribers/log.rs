//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [queued] job=3 priority=5 pending=2
//! [admitted] job=3 priority=5
//! [failed] job=3 err="connection refused"
//! [canceled] job=4
//! [rejected] priority=0 pending=10
//! [shutdown-requested]
//! [all-stopped-within-grace]
//! ```

use async_trait::async_trait;

use super::subscriber::Subscribe;
use crate::events::{Event, EventKind};

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Useful for demos and debugging; for
/// structured logging or metrics, implement a custom [`Subscribe`].
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::JobQueued => {
                println!(
                    "[queued] job={:?} priority={:?} pending={:?}",
                    e.job, e.priority, e.pending
                );
            }
            EventKind::JobRejected => {
                println!("[rejected] priority={:?} pending={:?}", e.priority, e.pending);
            }
            EventKind::JobAdmitted => {
                println!("[admitted] job={:?} priority={:?}", e.job, e.priority);
            }
            EventKind::JobCompleted => {
                println!("[completed] job={:?}", e.job);
            }
            EventKind::JobFailed => {
                println!("[failed] job={:?} err={:?}", e.job, e.error);
            }
            EventKind::JobCanceled => {
                println!("[canceled] job={:?}", e.job);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
