//! Runtime core: the limiter and its building blocks.
//!
//! The only public API re-exported from here is [`Limiter`]. Everything else
//! is an internal building block that the limiter wires together.
//!
//! ## Files & responsibilities
//! - **limiter.rs**: public facade; owns the queue, bus, and runtime token;
//!   builds job handles on submit, installs the submit-side cancellation
//!   guard, drives teardown with a grace period.
//! - **pacer.rs**: admission loop: concurrency permit → dequeue → launch →
//!   fixed-delay sleep; tolerates job failures; exits only on the runtime
//!   token.
//! - **handle.rs**: couples one submitted job to its waiting submitter:
//!   one-shot executable, oneshot result slot, cancellation token.
//!
//! ## Wiring (module-level flow)
//! ```text
//! Submitter
//!   └─ Limiter::submit(priority, job)
//!        ├─ handle::bind(job, child_token)  → (JobHandle, Executable)
//!        ├─ SubmitQueue::push(priority, executable) → TicketId | rejection
//!        └─ JobHandle::wait()  [drop guard: remove(id) else cancel token]
//!
//! Pacer::run(runtime_token)          (one loop per limiter)
//! loop {
//!   acquire semaphore permit (optional, cancellable)
//!   entry = queue incoming stream    (suspends on empty, cancellable)
//!   publish JobAdmitted; spawn executable into JoinSet
//!   sleep(min_interval)              (fixed delay, cancellable)
//! }
//!
//! Executable (one per submission)
//!   race job(token) against token.cancelled()
//!   send outcome through the oneshot slot (exactly once)
//!   report Completed / Failed / Canceled to the pacer for events
//! ```
//!
//! ## Shutdown timeline
//! ```text
//! Limiter::shutdown() → publish ShutdownRequested → cancel runtime token
//! → queue.close(): drained entries resolve their submitters with Canceled
//! → join pacer within grace: AllStoppedWithin OR GraceExceeded{grace}
//! ```

pub(crate) mod handle;
mod limiter;
mod pacer;

pub use limiter::Limiter;
