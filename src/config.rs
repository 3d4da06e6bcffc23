//! # Limiter configuration.
//!
//! Provides [`Config`] centralized settings for a [`Limiter`](crate::Limiter).
//!
//! ## Preconditions
//! The queue and concurrency bounds are optional (`None` = unbounded). When
//! a bound is present it must be positive: `Some(0)` would reject every
//! submission or admit nothing, so it is treated as a programming error and
//! fails an assertion in [`Limiter::start`](crate::Limiter::start).

use std::time::Duration;

/// Configuration for a limiter, immutable after [`Limiter::start`](crate::Limiter::start).
///
/// Defines:
/// - **Pacing**: minimum gap between successive admissions
/// - **Backpressure**: queue depth at which submissions are rejected
/// - **Concurrency**: cap on simultaneously running jobs
/// - **Shutdown behavior**: grace period for in-flight jobs
/// - **Event system**: bus capacity for event delivery
///
/// All fields are public; both bounds default to unbounded.
#[derive(Clone, Debug)]
pub struct Config {
    /// Minimum time between consecutive admissions.
    ///
    /// Enforced as a fixed delay, sampled after each admission: once a job
    /// is admitted at time `t`, the next admission happens no earlier than
    /// `t + min_interval`. The effective gap may exceed this floor when the
    /// concurrency cap stalls the loop. `Duration::ZERO` disables pacing.
    pub min_interval: Duration,

    /// Maximum number of submissions held in the queue.
    ///
    /// - `None` = unbounded
    /// - `Some(n)`, `n > 0` = submissions are rejected with
    ///   [`LimiterError::LimitReached`](crate::LimiterError::LimitReached)
    ///   once `n` entries are pending
    /// - `Some(0)` = programming error, fails fast at construction
    pub max_queued: Option<usize>,

    /// Maximum number of jobs running simultaneously.
    ///
    /// - `None` = unbounded (no semaphore)
    /// - `Some(n)`, `n > 0` = the admission loop stalls once `n` jobs are
    ///   in flight; stalled entries stay in the queue
    /// - `Some(0)` = programming error, fails fast at construction
    pub max_concurrent: Option<usize>,

    /// Maximum time [`shutdown`](crate::Limiter::shutdown) waits for
    /// in-flight jobs after cancellation before detaching them.
    pub grace: Duration,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events
    /// skip older items. Minimum value is 1 (clamped at bus construction).
    pub bus_capacity: usize,
}

impl Config {
    /// Creates a configuration with the given pacing interval and all other
    /// fields at their defaults.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            ..Self::default()
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `min_interval = 0` (no pacing floor)
    /// - `max_queued = None` (unbounded)
    /// - `max_concurrent = None` (unbounded)
    /// - `grace = 30s` (reasonable shutdown window)
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            min_interval: Duration::ZERO,
            max_queued: None,
            max_concurrent: None,
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}
