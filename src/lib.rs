//! # ratevisor
//!
//! **Ratevisor** is a lightweight, priority-aware pacing limiter for
//! asynchronous jobs.
//!
//! It smooths bursty workloads into a steady stream of operations against a
//! downstream resource (an API, a database, a remote service): jobs are
//! admitted at most one per configured interval, highest priority first,
//! under a concurrency cap and a bounded queue, with cancellation flowing
//! both ways between submitter and job.
//!
//! ## Features
//!
//! | Area               | Description                                                       | Key types / traits             |
//! |--------------------|-------------------------------------------------------------------|--------------------------------|
//! | **Submission**     | Submit prioritized jobs and await their typed results.            | [`Limiter`]                    |
//! | **Pacing**         | Fixed-delay floor between admissions; no bursts after stalls.     | [`Config::min_interval`]       |
//! | **Backpressure**   | Bounded queue with immediate rejection when full.                 | [`Config::max_queued`], [`LimiterError::LimitReached`] |
//! | **Concurrency**    | Cap on simultaneously running jobs.                               | [`Config::max_concurrent`]     |
//! | **Cancellation**   | Drop a pending submit to cancel it; running jobs are interrupted. | [`LimiterError`], [`JobError`] |
//! | **Observability**  | Lifecycle events fanned out to isolated subscribers.              | [`Subscribe`], [`Event`]       |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ```no_run
//! use std::time::Duration;
//! use ratevisor::{Config, JobError, Limiter};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::new(Duration::from_millis(250));
//!     cfg.max_queued = Some(64);
//!     cfg.max_concurrent = Some(8);
//!
//!     let limiter = Limiter::start(cfg);
//!
//!     // Urgent work jumps the line; ties run in submission order.
//!     let value = limiter
//!         .submit_with_priority(5, |_ctx| async move {
//!             // call the downstream resource...
//!             Ok::<_, JobError>(42)
//!         })
//!         .await?;
//!     assert_eq!(value, 42);
//!
//!     limiter.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ---

mod config;
mod core;
mod error;
mod events;
mod queue;
mod subscribers;

// ---- Public re-exports ----

pub use self::core::Limiter;
pub use config::Config;
pub use error::{JobError, LimiterError};
pub use events::{Event, EventKind};
pub use subscribers::Subscribe;

// Optional: expose a simple built-in logging subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
