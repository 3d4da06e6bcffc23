//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] — the extension point for plugging custom event
//! handlers into a limiter.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics caught and logged)
//!
//! ## Rules
//! - Slow subscribers only affect themselves (queue overflow → event drop)
//! - Panics do not crash the limiter or other subscribers
//! - Subscribers never block publishers

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for limiter observability.
///
/// Receives events via a dedicated worker task with a bounded queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the subscriber's worker task, in publish order for this
    /// subscriber. Handle errors internally; a panic is caught, logged, and
    /// dropped.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name for logging.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// When the queue is full, new events are dropped for this subscriber
    /// only; other subscribers are unaffected.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
