//! # Example: basic_pacing
//!
//! Demonstrates how submissions are smoothed into a steady stream.
//!
//! Shows how to:
//! - Start a [`Limiter`] with a pacing interval
//! - Submit a burst of jobs and watch them admit one per interval
//! - Observe the lifecycle through the built-in [`LogWriter`]
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► Limiter::start_with(cfg, [LogWriter])
//!   ├─► submit 5 jobs at once (burst)
//!   │     └─► admissions at ~0ms, ~300ms, ~600ms, ...
//!   └─► shutdown
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_pacing --features logging
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use ratevisor::{Config, JobError, Limiter, LogWriter, Subscribe};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== basic_pacing example ===\n");

    let mut cfg = Config::new(Duration::from_millis(300));
    cfg.max_concurrent = Some(4);

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let limiter = Limiter::start_with(cfg, subs);

    let t0 = Instant::now();
    let mut waits = Vec::new();
    for n in 0..5u32 {
        waits.push(limiter.submit(move |_ctx| async move {
            // Pretend to call a downstream service.
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, JobError>(n * n)
        }));
    }

    for (n, wait) in waits.into_iter().enumerate() {
        let value = wait.await?;
        println!("job {n} -> {value} (t={:?})", t0.elapsed());
    }

    limiter.shutdown().await?;
    println!("\ndone");
    Ok(())
}
