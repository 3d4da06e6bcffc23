//! # Event subscribers for limiter observability.
//!
//! This module provides the [`Subscribe`] trait for plugging custom event
//! handlers into a limiter, plus the internal fan-out machinery.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Limiter / Pacer ── publish(Event) ──► Bus ──► listener task
//!                                                    │
//!                                              SubscriberSet::emit
//!                                              ┌─────┴─────┬────────┐
//!                                              ▼           ▼        ▼
//!                                          LogWriter    Metrics   Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use ratevisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::JobFailed {
//!             // increment a counter
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::SubscriberSet;
pub use subscriber::Subscribe;
