//! # Pacer: the admission loop.
//!
//! Pulls one entry per iteration from the submission queue and launches it,
//! with an enforced minimum spacing of `min_interval` between consecutive
//! admissions and at most `max_concurrent` executions in flight.
//!
//! ## Pacing policy
//! Fixed delay, not fixed rate: the interval sleep runs after each
//! admission, so after a stall (empty queue, exhausted concurrency permits)
//! admissions resume one per interval instead of bursting. The concurrency
//! permit is acquired **before** the dequeue, so entries stalled behind the
//! cap stay in the queue where a submitter can still delete them.
//!
//! ## Rules
//! - Job failures and cancellations are localized to their handle; the loop
//!   never exits because of a job outcome
//! - Launched jobs complete independently and in any order
//! - The loop exits only on the runtime cancellation token, then drains its
//!   in-flight set (job tokens are children of the runtime token, so the
//!   drain is prompt for cooperative jobs)

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use super::handle::ExecOutcome;
use crate::events::{Bus, Event, EventKind};
use crate::queue::SubmitQueue;

/// Admission loop for one limiter.
pub(crate) struct Pacer {
    queue: Arc<SubmitQueue>,
    bus: Bus,
    min_interval: Duration,
    max_concurrent: Option<usize>,
}

impl Pacer {
    /// Creates a new pacer over the given queue.
    pub(crate) fn new(
        queue: Arc<SubmitQueue>,
        bus: Bus,
        min_interval: Duration,
        max_concurrent: Option<usize>,
    ) -> Self {
        Self {
            queue,
            bus,
            min_interval,
            max_concurrent,
        }
    }

    /// Runs admissions until the runtime token is canceled.
    pub(crate) async fn run(self, runtime_token: CancellationToken) {
        let semaphore = self.max_concurrent.map(|n| Arc::new(Semaphore::new(n)));
        let mut in_flight: JoinSet<()> = JoinSet::new();
        let queue = Arc::clone(&self.queue);
        let mut incoming = pin!(queue.incoming());

        loop {
            // Reap finished executions so the set stays bounded.
            while in_flight.try_join_next().is_some() {}

            let permit = match &semaphore {
                Some(sem) => {
                    let acquired = select! {
                        res = Arc::clone(sem).acquire_owned() => res,
                        _ = runtime_token.cancelled() => break,
                    };
                    match acquired {
                        Ok(permit) => Some(permit),
                        Err(_closed) => break,
                    }
                }
                None => None,
            };

            let entry = select! {
                next = incoming.next() => match next {
                    Some(entry) => entry,
                    None => break,
                },
                _ = runtime_token.cancelled() => break,
            };

            // Admission point: the entry is no longer deletable, and the
            // interval clock below restarts from here.
            self.bus.publish(
                Event::now(EventKind::JobAdmitted)
                    .with_job(entry.id.value())
                    .with_priority(entry.priority),
            );

            let bus = self.bus.clone();
            let id = entry.id.value();
            let exec = entry.exec;
            in_flight.spawn(async move {
                let outcome = exec.await;
                let event = match outcome {
                    ExecOutcome::Completed => Event::now(EventKind::JobCompleted).with_job(id),
                    ExecOutcome::Failed(err) => {
                        Event::now(EventKind::JobFailed).with_job(id).with_error(err)
                    }
                    ExecOutcome::Canceled => Event::now(EventKind::JobCanceled).with_job(id),
                };
                bus.publish(event);
                drop(permit);
            });

            if !self.min_interval.is_zero() {
                select! {
                    _ = time::sleep(self.min_interval) => {}
                    _ = runtime_token.cancelled() => break,
                }
            }
        }

        // Runtime cancellation has propagated to every job token; remaining
        // executions exit at their next suspend point.
        while in_flight.join_next().await.is_some() {}
    }
}
