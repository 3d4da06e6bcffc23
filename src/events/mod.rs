//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the limiter, the
//! admission loop, and the teardown path.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Limiter::submit` (queued/rejected), the submit-side
//!   cancellation guard (canceled while queued), `Pacer` (admitted and the
//!   terminal completed/failed/canceled), `Limiter::shutdown` (shutdown
//!   request, drained entries, grace outcome).
//! - **Consumers**: the limiter's subscriber listener, which fans events
//!   out to the subscriber workers.

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind};
