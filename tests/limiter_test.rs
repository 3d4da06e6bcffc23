//! Integration tests for the limiter on a virtualized clock.
//!
//! These validate the externally observable contract:
//! 1. Admissions are paced at least `min_interval` apart (fixed delay)
//! 2. Higher priority admits first; equal priorities keep submission order
//! 3. A full queue rejects immediately without consuming anything
//! 4. Canceling a queued submission leaves the pacing clock untouched
//! 5. Canceling a running job interrupts it and keeps its pacing slot
//! 6. Job failures stay isolated to their submitter
//! 7. The concurrency cap bounds in-flight executions
//! 8. Shutdown unblocks every outstanding submitter with cancellation
//!
//! All tests run with `start_paused`, so `tokio::time` auto-advances and
//! the timing assertions are deterministic.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use ratevisor::{Config, JobError, Limiter, LimiterError};

type StartLog = Arc<Mutex<Vec<(&'static str, Instant)>>>;

/// Job that records its admission instant under the given label.
fn record(
    label: &'static str,
    log: &StartLog,
) -> impl FnOnce(CancellationToken) -> Pin<Box<dyn Future<Output = Result<(), JobError>> + Send>>
{
    let log = Arc::clone(log);
    move |_ctx| {
        Box::pin(async move {
            log.lock().unwrap().push((label, Instant::now()));
            Ok(())
        })
    }
}

fn starts(log: &StartLog) -> Vec<(&'static str, Instant)> {
    log.lock().unwrap().clone()
}

#[tokio::test(start_paused = true)]
async fn admissions_respect_min_interval() {
    let limiter = Limiter::start(Config::new(Duration::from_secs(1)));
    let log: StartLog = Arc::default();
    let t0 = Instant::now();

    let mut waits = Vec::new();
    for label in ["a", "b", "c"] {
        waits.push(limiter.submit(record(label, &log)));
    }
    let results = futures::future::join_all(waits).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let started = starts(&log);
    assert_eq!(started.len(), 3);
    assert!(started[0].1 - t0 < Duration::from_millis(100));
    assert!(started[1].1 - started[0].1 >= Duration::from_secs(1));
    assert!(started[2].1 - started[1].1 >= Duration::from_secs(1));
    assert!(started[2].1 - t0 < Duration::from_millis(2100));
}

#[tokio::test(start_paused = true)]
async fn higher_priority_admits_first_equal_keeps_fifo() {
    let limiter = Limiter::start(Config::new(Duration::from_secs(1)));
    let log: StartLog = Arc::default();

    // All three are queued before the pacer takes its first entry: the
    // submit futures push synchronously on their first poll, and the pacer
    // task only runs once this task suspends.
    let (a, b, c) = tokio::join!(
        limiter.submit_with_priority(0, record("a", &log)),
        limiter.submit_with_priority(0, record("b", &log)),
        limiter.submit_with_priority(5, record("c", &log)),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let order: Vec<&str> = starts(&log).iter().map(|(label, _)| *label).collect();
    assert_eq!(order, vec!["c", "a", "b"]);
}

#[test]
#[should_panic(expected = "max_queued must be positive")]
fn zero_queue_bound_is_a_construction_error() {
    let mut cfg = Config::new(Duration::from_secs(1));
    cfg.max_queued = Some(0);
    let _ = Limiter::start(cfg);
}

#[test]
#[should_panic(expected = "max_concurrent must be positive")]
fn zero_concurrency_bound_is_a_construction_error() {
    let mut cfg = Config::new(Duration::from_secs(1));
    cfg.max_concurrent = Some(0);
    let _ = Limiter::start(cfg);
}

#[tokio::test(start_paused = true)]
async fn full_queue_rejects_without_consuming() {
    let mut cfg = Config::new(Duration::from_secs(1));
    cfg.max_queued = Some(2);
    let limiter = Limiter::start(cfg);

    let mut first = Box::pin(limiter.submit(|_ctx| async { Ok::<_, JobError>("first") }));
    assert!(futures::poll!(first.as_mut()).is_pending());
    let mut second = Box::pin(limiter.submit(|_ctx| async { Ok::<_, JobError>("second") }));
    assert!(futures::poll!(second.as_mut()).is_pending());
    assert_eq!(limiter.pending(), 2);

    // Third submission hits the cap and fails synchronously.
    let third = limiter
        .submit(|_ctx| async { Ok::<_, JobError>("third") })
        .await;
    match third {
        Err(LimiterError::LimitReached { pending }) => assert_eq!(pending, 2),
        other => panic!("expected LimitReached, got {other:?}"),
    }

    // Once the first job is admitted a slot frees up.
    assert_eq!(first.await.unwrap(), "first");
    assert_eq!(limiter.pending(), 1);

    let fourth = limiter.submit(|_ctx| async { Ok::<_, JobError>("fourth") });
    let (second, fourth) = tokio::join!(second, fourth);
    assert_eq!(second.unwrap(), "second");
    assert_eq!(fourth.unwrap(), "fourth");
}

#[tokio::test(start_paused = true)]
async fn cancel_while_queued_keeps_pacing_clock() {
    let limiter = Limiter::start(Config::new(Duration::from_secs(10)));
    let log: StartLog = Arc::default();
    let t0 = Instant::now();

    // Admitted immediately; the next admission slot is t0 + 10s.
    limiter.submit(record("a", &log)).await.unwrap();

    let mut b = Box::pin(limiter.submit(|_ctx| async { Ok::<_, JobError>(()) }));
    assert!(futures::poll!(b.as_mut()).is_pending());
    assert_eq!(limiter.pending(), 1);

    time::sleep(Duration::from_secs(1)).await;
    drop(b);
    assert_eq!(limiter.pending(), 0);

    // The canceled entry neither accelerated nor reset the clock.
    limiter.submit(record("c", &log)).await.unwrap();
    let started = starts(&log);
    assert_eq!(started[1].0, "c");
    assert!(started[1].1 - t0 >= Duration::from_secs(10));
    assert!(started[1].1 - t0 < Duration::from_millis(10100));
}

#[tokio::test(start_paused = true)]
async fn cancel_while_running_interrupts_and_keeps_slot() {
    let limiter = Limiter::start(Config::new(Duration::from_secs(1)));
    let log: StartLog = Arc::default();
    let finished = Arc::new(AtomicBool::new(false));
    let t0 = Instant::now();

    let mut a = Box::pin(limiter.submit({
        let finished = Arc::clone(&finished);
        move |_ctx| async move {
            time::sleep(Duration::from_secs(5)).await;
            finished.store(true, Ordering::SeqCst);
            Ok::<_, JobError>(())
        }
    }));
    assert!(futures::poll!(a.as_mut()).is_pending());

    // Let the pacer admit the job, then abandon the wait mid-run.
    time::sleep(Duration::from_millis(500)).await;
    assert_eq!(limiter.pending(), 0);
    drop(a);

    // The admission slot stays consumed: the next job starts at t0 + 1s,
    // neither earlier nor after the canceled job's full sleep.
    limiter.submit(record("b", &log)).await.unwrap();
    let started = starts(&log);
    assert_eq!(started[0].0, "b");
    assert!(started[0].1 - t0 >= Duration::from_secs(1));
    assert!(started[0].1 - t0 < Duration::from_millis(1100));
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn job_failure_stays_isolated() {
    let limiter = Limiter::start(Config::new(Duration::from_secs(1)));
    let log: StartLog = Arc::default();
    let t0 = Instant::now();

    let (a, b) = tokio::join!(
        limiter.submit(|_ctx| async { Err::<(), _>(JobError::fail("boom")) }),
        limiter.submit(record("b", &log)),
    );

    match a {
        Err(LimiterError::Job(JobError::Fail { reason })) => assert_eq!(reason, "boom"),
        other => panic!("expected job failure, got {other:?}"),
    }

    // The failure did not stall the loop or skip the survivor.
    b.unwrap();
    let started = starts(&log);
    assert!(started[0].1 - t0 >= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn concurrency_cap_bounds_in_flight() {
    let mut cfg = Config::default();
    cfg.max_concurrent = Some(2);
    let limiter = Limiter::start(cfg);

    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut waits = Vec::new();
    for _ in 0..6 {
        let current = Arc::clone(&current);
        let peak = Arc::clone(&peak);
        waits.push(limiter.submit(move |_ctx| async move {
            let now = current.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            time::sleep(Duration::from_millis(50)).await;
            current.fetch_sub(1, Ordering::SeqCst);
            Ok::<_, JobError>(())
        }));
    }
    let results = futures::future::join_all(waits).await;
    assert!(results.iter().all(|r| r.is_ok()));
    assert!(peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test(start_paused = true)]
async fn serial_when_single_slot_and_no_interval() {
    let mut cfg = Config::default();
    cfg.max_concurrent = Some(1);
    let limiter = Limiter::start(cfg);

    let spans = Arc::new(Mutex::new(Vec::new()));
    let mut waits = Vec::new();
    for _ in 0..3 {
        let spans = Arc::clone(&spans);
        waits.push(limiter.submit(move |_ctx| async move {
            let start = Instant::now();
            time::sleep(Duration::from_millis(100)).await;
            spans.lock().unwrap().push((start, Instant::now()));
            Ok::<_, JobError>(())
        }));
    }
    futures::future::join_all(waits).await;

    let mut spans = spans.lock().unwrap().clone();
    spans.sort();
    assert_eq!(spans.len(), 3);
    for pair in spans.windows(2) {
        // Each job starts only after the previous one finished.
        assert!(pair[1].0 >= pair[0].1);
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_unblocks_queued_and_running_submitters() {
    let limiter = Limiter::start(Config::new(Duration::from_secs(60)));

    let mut a = Box::pin(limiter.submit(|_ctx| async {
        time::sleep(Duration::from_secs(3600)).await;
        Ok::<_, JobError>(())
    }));
    assert!(futures::poll!(a.as_mut()).is_pending());
    let mut b = Box::pin(limiter.submit(|_ctx| async { Ok::<_, JobError>(()) }));
    assert!(futures::poll!(b.as_mut()).is_pending());

    // a gets admitted and parks in its sleep; b stays queued.
    time::sleep(Duration::from_millis(10)).await;
    assert_eq!(limiter.pending(), 1);

    limiter.shutdown().await.unwrap();

    // The running job was interrupted, the queued one never ran.
    assert!(a.await.unwrap_err().is_canceled());
    assert!(b.await.unwrap_err().is_canceled());
    assert_eq!(limiter.pending(), 0);

    // Submissions racing past teardown observe cancellation, not a hang.
    let late = limiter.submit(|_ctx| async { Ok::<_, JobError>(()) }).await;
    assert!(late.unwrap_err().is_canceled());
}

#[tokio::test(start_paused = true)]
async fn pending_tracks_queue_depth() {
    let limiter = Limiter::start(Config::new(Duration::from_secs(60)));
    assert_eq!(limiter.pending(), 0);

    let mut a = Box::pin(limiter.submit(|_ctx| async { Ok::<_, JobError>(()) }));
    assert!(futures::poll!(a.as_mut()).is_pending());
    let mut b = Box::pin(limiter.submit(|_ctx| async { Ok::<_, JobError>(()) }));
    assert!(futures::poll!(b.as_mut()).is_pending());
    assert_eq!(limiter.pending(), 2);

    // First admission drains one entry.
    assert!(a.await.is_ok());
    assert_eq!(limiter.pending(), 1);

    limiter.shutdown().await.unwrap();
    assert!(b.await.unwrap_err().is_canceled());
    assert_eq!(limiter.pending(), 0);
}
