//! # SubmitQueue: ordered, bounded store of pending submissions.
//!
//! Entries are keyed by `(priority desc, sequence asc)` in a `BTreeMap`,
//! with a parallel `ticket → key` index so a submitter can delete its own
//! entry without scanning.
//!
//! ## Concurrency
//! All mutations take one lock, so size, ordering, counter assignment, and
//! waiter wake-up are atomic with respect to each other. The consumer side
//! parks on a [`Notify`]; exactly one wake is issued per push, and a woken
//! consumer that finds the queue empty (entry deleted in between) parks
//! again rather than failing.
//!
//! ## Rules
//! - `push` never suspends: a full queue rejects, a closed queue rejects
//! - `pop` never fails: it suspends until an entry is available
//! - `remove` never fails: absent ids report `false`
//!
//! The asymmetry is deliberate backpressure: submitters get an immediate
//! answer while the admission loop waits for work.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use futures::stream::{self, Stream};
use tokio::sync::Notify;

use super::entry::{EntryKey, QueueEntry, TicketId};
use crate::core::handle::Executable;

/// Reasons a push can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushRejected {
    /// The queue held `pending` entries, which is its capacity.
    Full { pending: usize },
    /// The queue was closed by teardown.
    Closed,
}

struct Inner {
    entries: BTreeMap<EntryKey, QueueEntry>,
    index: HashMap<TicketId, EntryKey>,
    next_seq: u64,
    next_ticket: u64,
    closed: bool,
}

/// Ordered, bounded store of pending submissions.
pub(crate) struct SubmitQueue {
    inner: Mutex<Inner>,
    capacity: Option<usize>,
    ready: Notify,
}

impl SubmitQueue {
    /// Creates an empty queue. `capacity = None` means unlimited.
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: BTreeMap::new(),
                index: HashMap::new(),
                next_seq: 0,
                next_ticket: 0,
                closed: false,
            }),
            capacity,
            ready: Notify::new(),
        }
    }

    // No user code ever runs under this lock, so a poisoned lock can only
    // follow an internal bug; recover the guard and keep the invariants.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Inserts an executable at the given priority.
    ///
    /// Assigns the next sequence number and ticket id, wakes the consumer,
    /// and returns the ticket. Never suspends: a full or closed queue
    /// rejects immediately.
    pub(crate) fn push(
        &self,
        priority: i64,
        exec: Executable,
    ) -> Result<TicketId, PushRejected> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(PushRejected::Closed);
        }
        if let Some(cap) = self.capacity {
            if inner.entries.len() >= cap {
                return Err(PushRejected::Full {
                    pending: inner.entries.len(),
                });
            }
        }

        let id = TicketId::new(inner.next_ticket);
        let key = EntryKey::new(priority, inner.next_seq);
        inner.next_ticket += 1;
        inner.next_seq += 1;

        inner.entries.insert(key, QueueEntry { id, priority, exec });
        inner.index.insert(id, key);
        drop(inner);

        self.ready.notify_one();
        Ok(id)
    }

    /// Removes and returns the next entry: highest priority, then earliest
    /// submitted. Suspends while the queue is empty.
    pub(crate) async fn pop(&self) -> QueueEntry {
        loop {
            // Register interest before checking, so a push racing with the
            // check leaves a stored permit instead of a lost wake-up.
            let ready = self.ready.notified();
            if let Some(entry) = self.try_pop() {
                return entry;
            }
            ready.await;
        }
    }

    fn try_pop(&self) -> Option<QueueEntry> {
        let mut inner = self.lock();
        let (_, entry) = inner.entries.pop_first()?;
        inner.index.remove(&entry.id);
        Some(entry)
    }

    /// Endless stream of entries produced by repeated [`pop`](Self::pop).
    pub(crate) fn incoming(&self) -> impl Stream<Item = QueueEntry> + '_ {
        stream::unfold(self, |q| async move { Some((q.pop().await, q)) })
    }

    /// Deletes the entry with the given ticket, if it is still queued.
    ///
    /// Returns `true` when the entry was present (its executable is dropped,
    /// resolving the submitter with cancellation), `false` when it was
    /// already taken by the consumer or never existed.
    pub(crate) fn remove(&self, id: TicketId) -> bool {
        let mut inner = self.lock();
        match inner.index.remove(&id) {
            Some(key) => {
                inner.entries.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the current depth; may be stale the instant after.
    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Marks the queue closed and removes every pending entry.
    ///
    /// Later pushes observe [`PushRejected::Closed`], so a submission racing
    /// with teardown cannot strand behind a stopped consumer.
    pub(crate) fn close(&self) -> Vec<QueueEntry> {
        let mut inner = self.lock();
        inner.closed = true;
        inner.index.clear();
        let entries = std::mem::take(&mut inner.entries);
        entries.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::handle::ExecOutcome;

    fn noop_exec() -> Executable {
        Box::pin(async { ExecOutcome::Completed })
    }

    #[tokio::test]
    async fn pops_by_priority_then_submission_order() {
        let q = SubmitQueue::new(None);
        let a = q.push(0, noop_exec()).unwrap();
        let b = q.push(0, noop_exec()).unwrap();
        let c = q.push(5, noop_exec()).unwrap();

        assert_eq!(q.pop().await.id, c);
        assert_eq!(q.pop().await.id, a);
        assert_eq!(q.pop().await.id, b);
    }

    #[tokio::test]
    async fn tickets_are_unique_and_monotonic() {
        let q = SubmitQueue::new(None);
        let first = q.push(1, noop_exec()).unwrap();
        let second = q.push(-1, noop_exec()).unwrap();
        assert!(second.value() > first.value());

        // Ids keep growing even after entries leave the queue.
        q.pop().await;
        q.pop().await;
        let third = q.push(0, noop_exec()).unwrap();
        assert!(third.value() > second.value());
    }

    #[test]
    fn full_queue_rejects() {
        let q = SubmitQueue::new(Some(2));
        q.push(0, noop_exec()).unwrap();
        q.push(0, noop_exec()).unwrap();
        assert_eq!(
            q.push(0, noop_exec()).unwrap_err(),
            PushRejected::Full { pending: 2 }
        );
    }

    #[test]
    fn remove_reports_presence() {
        let q = SubmitQueue::new(Some(1));
        let id = q.push(0, noop_exec()).unwrap();
        assert_eq!(q.len(), 1);
        assert!(q.remove(id));
        assert!(!q.remove(id));
        assert_eq!(q.len(), 0);

        // The freed slot is usable again.
        q.push(0, noop_exec()).unwrap();
    }

    #[test]
    fn closed_queue_rejects_pushes() {
        let q = SubmitQueue::new(None);
        q.push(0, noop_exec()).unwrap();
        let drained = q.close();
        assert_eq!(drained.len(), 1);
        assert_eq!(q.push(0, noop_exec()).unwrap_err(), PushRejected::Closed);
        assert_eq!(q.len(), 0);
    }

    #[tokio::test]
    async fn pop_waits_for_push() {
        let q = std::sync::Arc::new(SubmitQueue::new(None));
        let consumer = {
            let q = std::sync::Arc::clone(&q);
            tokio::spawn(async move { q.pop().await.id })
        };

        // Give the consumer a chance to park before the push.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let id = q.push(0, noop_exec()).unwrap();

        let popped = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("pop should wake")
            .unwrap();
        assert_eq!(popped, id);
    }
}
