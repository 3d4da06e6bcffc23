//! # Limiter: the public facade.
//!
//! The [`Limiter`] owns the runtime components (submission queue, event bus,
//! runtime cancellation token, pacer task) and exposes the submission
//! surface:
//!
//! - Submit jobs with a priority and await their typed result
//! - Observe the pending queue depth
//! - Tear down gracefully, with a bounded grace period for in-flight jobs
//!
//! ## Architecture
//! ```text
//! Limiter::start(cfg)
//!     ├──► spawn subscriber listener (bus → SubscriberSet fan-out)
//!     └──► spawn Pacer::run(runtime_token)
//!
//! submit(priority, job)
//!     ├──► bind job → (handle, executable)
//!     ├──► queue.push(priority, executable) → ticket | LimitReached
//!     └──► handle.wait()
//!           └── drop guard: remove(ticket) ──► canceled while queued
//!                          └─ already taken ──► cancel the running job
//! ```
//!
//! ## Rules
//! - Caller cancellation (dropping the `submit` future) is always safe:
//!   a still-queued entry is deleted without consuming a pacing slot; an
//!   admitted one has its token canceled and the slot stays consumed
//! - Job failures are delivered to their submitter only; the pacer and all
//!   other submissions are unaffected
//! - After [`shutdown`](Limiter::shutdown) every outstanding `submit`
//!   observes cancellation within the grace period

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use super::handle::{self, JobHandle};
use super::pacer::Pacer;
use crate::config::Config;
use crate::error::{JobError, LimiterError};
use crate::events::{Bus, Event, EventKind};
use crate::queue::{PushRejected, SubmitQueue, TicketId};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Priority-aware pacing limiter for asynchronous jobs.
///
/// Jobs are closures receiving a [`CancellationToken`] and returning a
/// future; the limiter starts them at most one per
/// [`min_interval`](Config::min_interval), highest priority first, FIFO
/// among equal priorities, bounded by
/// [`max_concurrent`](Config::max_concurrent) in-flight executions and
/// [`max_queued`](Config::max_queued) pending submissions.
///
/// ## Example
/// ```no_run
/// use std::time::Duration;
/// use ratevisor::{Config, JobError, Limiter};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let limiter = Limiter::start(Config::new(Duration::from_millis(200)));
///
///     let greeting = limiter
///         .submit(|_ctx| async { Ok::<_, JobError>("hello") })
///         .await?;
///     assert_eq!(greeting, "hello");
///
///     limiter.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct Limiter {
    /// Immutable runtime configuration.
    cfg: Config,
    /// Ordered store of pending submissions.
    queue: Arc<SubmitQueue>,
    /// Event bus shared with the pacer and the teardown path.
    bus: Bus,
    /// Cancellation root: the pacer and every job token descend from it.
    runtime_token: CancellationToken,
    /// Join handle of the pacer task, taken once by shutdown.
    pacer: Mutex<Option<JoinHandle<()>>>,
}

impl Limiter {
    /// Starts a limiter with the given configuration.
    ///
    /// Must be called from within a Tokio runtime: the pacer loop is
    /// spawned here.
    ///
    /// ### Panics
    /// When [`Config::max_queued`] or [`Config::max_concurrent`] is
    /// `Some(0)`. A zero bound is a programming error: it would reject
    /// every submission or admit nothing. Leave the bound `None` for
    /// unbounded.
    pub fn start(cfg: Config) -> Self {
        Self::start_with(cfg, Vec::new())
    }

    /// Starts a limiter and attaches event subscribers (maybe empty).
    ///
    /// Subscribers observe the full lifecycle event stream through
    /// dedicated, panic-isolated workers.
    ///
    /// ### Panics
    /// Same preconditions as [`start`](Self::start).
    pub fn start_with(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        assert!(
            cfg.max_queued.map_or(true, |n| n > 0),
            "max_queued must be positive when bounded"
        );
        assert!(
            cfg.max_concurrent.map_or(true, |n| n > 0),
            "max_concurrent must be positive when bounded"
        );

        let bus = Bus::new(cfg.bus_capacity_clamped());
        let queue = Arc::new(SubmitQueue::new(cfg.max_queued));
        let runtime_token = CancellationToken::new();

        // Listen before the pacer starts to avoid missing early events.
        if !subscribers.is_empty() {
            Self::spawn_subscriber_listener(&bus, subscribers);
        }

        let pacer = Pacer::new(
            Arc::clone(&queue),
            bus.clone(),
            cfg.min_interval,
            cfg.max_concurrent,
        );
        let pacer = tokio::spawn(pacer.run(runtime_token.clone()));

        Self {
            cfg,
            queue,
            bus,
            runtime_token,
            pacer: Mutex::new(Some(pacer)),
        }
    }

    /// Submits a job at the default priority (0) and awaits its result.
    ///
    /// See [`submit_with_priority`](Self::submit_with_priority).
    pub async fn submit<F, Fut, T>(&self, job: F) -> Result<T, LimiterError>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, JobError>> + Send + 'static,
        T: Send + 'static,
    {
        self.submit_with_priority(0, job).await
    }

    /// Submits a job at the given priority and awaits its result.
    ///
    /// Higher priorities are admitted earlier; equal priorities run in
    /// submission order.
    ///
    /// ### Outcomes
    /// - `Ok(value)` — the job ran to completion
    /// - [`LimiterError::LimitReached`] — the queue was full; the job never
    ///   ran and nothing was consumed
    /// - [`LimiterError::Job`] — the job failed or was canceled
    ///
    /// ### Cancellation
    /// Dropping the returned future cancels the submission: a still-queued
    /// entry is deleted (the pacing clock is untouched); an already-running
    /// job has its token canceled and is interrupted at its next suspend
    /// point.
    pub async fn submit_with_priority<F, Fut, T>(
        &self,
        priority: i64,
        job: F,
    ) -> Result<T, LimiterError>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, JobError>> + Send + 'static,
        T: Send + 'static,
    {
        let token = self.runtime_token.child_token();
        let (job_handle, exec) = handle::bind(job, token.clone());

        let id = match self.queue.push(priority, exec) {
            Ok(id) => id,
            Err(PushRejected::Full { pending }) => {
                self.bus.publish(
                    Event::now(EventKind::JobRejected)
                        .with_priority(priority)
                        .with_pending(pending),
                );
                return Err(LimiterError::LimitReached { pending });
            }
            // Teardown already started; the pacer will never run this job.
            Err(PushRejected::Closed) => return Err(JobError::Canceled.into()),
        };

        self.bus.publish(
            Event::now(EventKind::JobQueued)
                .with_job(id.value())
                .with_priority(priority)
                .with_pending(self.queue.len()),
        );

        self.wait_guarded(job_handle, id, token).await
    }

    /// Returns the current number of queued submissions.
    ///
    /// A best-effort snapshot: it may be stale the instant after the read.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Tears the limiter down.
    ///
    /// ### Flow
    /// - Publish `ShutdownRequested` and cancel the runtime token (stops
    ///   the pacer, interrupts every running job)
    /// - Close and drain the queue: every pending submitter observes
    ///   cancellation, and late submissions are rejected as canceled
    /// - Join the pacer within [`Config::grace`]
    ///
    /// Returns [`LimiterError::GraceExceeded`] when in-flight jobs did not
    /// stop in time; they keep their cancellation signal and are detached.
    pub async fn shutdown(&self) -> Result<(), LimiterError> {
        self.bus.publish(
            Event::now(EventKind::ShutdownRequested).with_pending(self.queue.len()),
        );
        self.runtime_token.cancel();

        for entry in self.queue.close() {
            // Dropping the executable resolves its submitter with Canceled.
            self.bus
                .publish(Event::now(EventKind::JobCanceled).with_job(entry.id.value()));
        }

        let pacer = self
            .pacer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = pacer {
            if time::timeout(self.cfg.grace, handle).await.is_err() {
                self.bus.publish(Event::now(EventKind::GraceExceeded));
                return Err(LimiterError::GraceExceeded {
                    grace: self.cfg.grace,
                });
            }
        }

        self.bus.publish(Event::now(EventKind::AllStoppedWithin));
        Ok(())
    }

    /// Awaits the handle with the two-step cancellation guard armed.
    async fn wait_guarded<T>(
        &self,
        job_handle: JobHandle<T>,
        id: TicketId,
        token: CancellationToken,
    ) -> Result<T, LimiterError> {
        let mut guard = WaitGuard {
            queue: Arc::clone(&self.queue),
            bus: self.bus.clone(),
            id,
            cancel: token,
            armed: true,
        };
        let res = job_handle.wait().await;
        guard.armed = false;
        res.map_err(LimiterError::from)
    }

    /// Forwards bus events to subscriber workers until the bus closes.
    fn spawn_subscriber_listener(bus: &Bus, subscribers: Vec<Arc<dyn Subscribe>>) {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            let set = SubscriberSet::new(subscribers);
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            set.shutdown().await;
        });
    }
}

impl Drop for Limiter {
    /// Best-effort scope guard: cancel everything and unblock submitters.
    ///
    /// Prefer [`shutdown`](Limiter::shutdown), which also waits for
    /// in-flight jobs within the grace period.
    fn drop(&mut self) {
        self.runtime_token.cancel();
        self.queue.close();
    }
}

/// Cleanup for a submitter that abandons its wait.
///
/// The two steps mirror the admission race: either the entry is still
/// deletable (the job never ran, no pacing slot consumed) or it is already
/// gone, in which case the running handle is signaled.
struct WaitGuard {
    queue: Arc<SubmitQueue>,
    bus: Bus,
    id: TicketId,
    cancel: CancellationToken,
    armed: bool,
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if self.queue.remove(self.id) {
            self.bus
                .publish(Event::now(EventKind::JobCanceled).with_job(self.id.value()));
        } else {
            self.cancel.cancel();
        }
    }
}
