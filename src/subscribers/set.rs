//! # SubscriberSet: non-blocking fan-out over multiple subscribers.
//!
//! Each subscriber gets a **lane**: a bounded queue fed by
//! [`SubscriberSet::emit`] and drained by a dedicated worker task.
//! Publishing never awaits a subscriber.
//!
//! ## Overflow accounting
//! A full lane skips the event and ticks a missed-event counter instead of
//! logging per loss; the worker reports the accumulated count the next time
//! it drains the lane, so a slow subscriber produces one summary line
//! rather than a warning storm.
//!
//! ## Panic isolation
//! A panicking subscriber loses only the event it was handling; its worker
//! keeps the lane alive and counts the panics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::subscriber::Subscribe;
use crate::events::Event;

/// Feed side of one subscriber's lane.
struct Lane {
    name: &'static str,
    feed: mpsc::Sender<Arc<Event>>,
    missed: Arc<AtomicU64>,
}

/// Composite fan-out: one bounded lane and one worker per subscriber.
pub(crate) struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: JoinSet<()>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    pub(crate) fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = JoinSet::new();

        for sub in subs {
            let (feed, rx) = mpsc::channel(sub.queue_capacity().max(1));
            let missed = Arc::new(AtomicU64::new(0));
            lanes.push(Lane {
                name: sub.name(),
                feed,
                missed: Arc::clone(&missed),
            });
            workers.spawn(drive(sub, rx, missed));
        }

        Self { lanes, workers }
    }

    /// Fans one event out to every lane (non-blocking).
    ///
    /// A full lane skips the event and accounts for it; a lane whose worker
    /// is gone is skipped quietly.
    pub(crate) fn emit(&self, event: &Event) {
        if self.lanes.is_empty() {
            return;
        }
        let ev = Arc::new(event.clone());
        for lane in &self.lanes {
            match lane.feed.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    lane.missed.fetch_add(1, Ordering::Relaxed);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("subscriber '{}' is gone; event skipped", lane.name);
                }
            }
        }
    }

    /// Graceful shutdown: close every lane and await the workers.
    pub(crate) async fn shutdown(mut self) {
        self.lanes.clear();
        while self.workers.join_next().await.is_some() {}
    }
}

/// Worker loop for one subscriber's lane.
///
/// Reports events the lane dropped since the last delivery, then hands the
/// event to the subscriber behind a panic barrier.
async fn drive(
    sub: Arc<dyn Subscribe>,
    mut rx: mpsc::Receiver<Arc<Event>>,
    missed: Arc<AtomicU64>,
) {
    let mut panics: u64 = 0;
    while let Some(ev) = rx.recv().await {
        let skipped = missed.swap(0, Ordering::Relaxed);
        if skipped > 0 {
            log::warn!(
                "subscriber '{}' missed {skipped} event(s): lane was full",
                sub.name()
            );
        }

        let handled = std::panic::AssertUnwindSafe(sub.on_event(ev.as_ref()))
            .catch_unwind()
            .await;
        if handled.is_err() {
            panics += 1;
            log::warn!(
                "subscriber '{}' panicked ({panics} total); event lost",
                sub.name()
            );
        }
    }
}
