//! # Error types used by the ratevisor runtime and jobs.
//!
//! This module defines two main error enums:
//!
//! - [`LimiterError`] errors surfaced by the limiter itself (admission
//!   rejection, shutdown outcomes) or relayed from a job.
//! - [`JobError`] errors produced by an individual job execution.
//!
//! Both types provide `as_label` helpers for logs/metrics. A job failure is
//! always delivered to the submitter that owns it and never promoted to a
//! limiter-wide fault.

use std::time::Duration;

use thiserror::Error;

/// # Errors surfaced by [`Limiter`](crate::Limiter) operations.
///
/// `submit` fails with [`LimiterError::LimitReached`] when the queue is at
/// capacity, or with [`LimiterError::Job`] carrying the job's own outcome.
/// `shutdown` fails with [`LimiterError::GraceExceeded`] when in-flight jobs
/// outlive the grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LimiterError {
    /// The submission queue was full; the job was never enqueued.
    #[error("submission queue is full ({pending} pending)")]
    LimitReached {
        /// Queue depth observed at rejection time.
        pending: usize,
    },

    /// Shutdown grace period elapsed with jobs still in flight.
    #[error("shutdown grace {grace:?} exceeded; in-flight jobs detached")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },

    /// The job ran (or was canceled) and produced this outcome.
    #[error(transparent)]
    Job(#[from] JobError),
}

impl LimiterError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LimiterError::LimitReached { .. } => "limiter_limit_reached",
            LimiterError::GraceExceeded { .. } => "limiter_grace_exceeded",
            LimiterError::Job(e) => e.as_label(),
        }
    }

    /// True when the underlying outcome is a cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, LimiterError::Job(JobError::Canceled))
    }
}

/// # Errors produced by job execution.
///
/// Jobs return `Result<T, JobError>`; a failure reaches exactly the
/// submitter that posted the job. [`JobError::Canceled`] signals intentional
/// termination (submitter cancel or limiter shutdown), not a defect.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JobError {
    /// Job execution failed.
    #[error("execution failed: {reason}")]
    Fail {
        /// Human-readable failure description.
        reason: String,
    },

    /// Job was canceled before or during execution.
    ///
    /// This is **not an error** in the traditional sense, but signals that
    /// the submitter or the limiter intentionally terminated the job.
    #[error("job canceled")]
    Canceled,
}

impl JobError {
    /// Creates a [`JobError::Fail`] from any displayable reason.
    pub fn fail(reason: impl Into<String>) -> Self {
        JobError::Fail {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Fail { .. } => "job_failed",
            JobError::Canceled => "job_canceled",
        }
    }

    /// True for [`JobError::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self, JobError::Canceled)
    }
}
