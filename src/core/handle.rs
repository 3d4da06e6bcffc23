//! # Job handle: couples one submission to its waiting submitter.
//!
//! [`bind`] splits a job into two halves:
//! - an [`Executable`] — a one-shot future the queue stores and the pacer
//!   runs; it races the job against the handle's cancellation token and
//!   writes the outcome into the result slot,
//! - a [`JobHandle`] — the submitter side; awaits the result slot.
//!
//! ## Rules
//! - The result slot is written **exactly once**: the oneshot sender is
//!   consumed by the single send, and the executable is consumed by value,
//!   so a second invocation is unrepresentable.
//! - Cancellation is never lost: a token canceled before the executable
//!   runs short-circuits to a canceled outcome; a token canceled mid-run
//!   interrupts the job at its next suspend point.
//! - An executable dropped without running (entry deleted or drained)
//!   drops the sender, which the submitter observes as cancellation.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::JobError;

/// One-shot future that runs a job and reports a coarse outcome label.
///
/// The job's typed result travels through the handle's result slot; the
/// returned [`ExecOutcome`] only feeds lifecycle events.
pub(crate) type Executable = Pin<Box<dyn Future<Output = ExecOutcome> + Send + 'static>>;

/// Coarse outcome of one executable run, for event publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExecOutcome {
    Completed,
    Failed(String),
    Canceled,
}

/// Submitter side of one submission: the receiving end of the result slot.
pub(crate) struct JobHandle<T> {
    rx: oneshot::Receiver<Result<T, JobError>>,
}

impl<T> JobHandle<T> {
    /// Waits for the outcome.
    ///
    /// A dropped executable (never run) surfaces as [`JobError::Canceled`].
    pub(crate) async fn wait(self) -> Result<T, JobError> {
        match self.rx.await {
            Ok(res) => res,
            Err(_closed) => Err(JobError::Canceled),
        }
    }
}

/// Builds the two halves of a submission from a job and its token.
///
/// The token is shared: the executable races the job against it, the job
/// receives it for cooperative cleanup, and the submit path cancels it when
/// the caller gives up on a job that already left the queue.
pub(crate) fn bind<F, Fut, T>(job: F, cancel: CancellationToken) -> (JobHandle<T>, Executable)
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, JobError>> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    let exec: Executable = Box::pin(async move {
        if cancel.is_cancelled() {
            let _ = tx.send(Err(JobError::Canceled));
            return ExecOutcome::Canceled;
        }

        let res = tokio::select! {
            _ = cancel.cancelled() => Err(JobError::Canceled),
            res = job(cancel.clone()) => res,
        };

        let outcome = match &res {
            Ok(_) => ExecOutcome::Completed,
            Err(JobError::Canceled) => ExecOutcome::Canceled,
            Err(e) => ExecOutcome::Failed(e.to_string()),
        };
        // The submitter may already be gone (caller canceled its await);
        // the outcome still feeds the event stream.
        let _ = tx.send(res);
        outcome
    });

    (JobHandle { rx }, exec)
}
