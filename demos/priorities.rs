//! # Example: priorities
//!
//! Demonstrates priority-based admission ordering.
//!
//! Shows how to:
//! - Queue a batch of background jobs at priority 0
//! - Submit an urgent job at a higher priority that jumps the line
//! - Keep FIFO order among equal priorities
//!
//! ## Run
//! ```bash
//! cargo run --example priorities
//! ```

use std::time::Duration;

use ratevisor::{Config, JobError, Limiter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== priorities example ===\n");

    let limiter = Limiter::start(Config::new(Duration::from_millis(200)));

    let background: Vec<_> = (0..3)
        .map(|n| {
            limiter.submit(move |_ctx| async move {
                println!("background job {n} running");
                Ok::<_, JobError>(())
            })
        })
        .collect();

    let urgent = limiter.submit_with_priority(10, |_ctx| async {
        println!("urgent job running");
        Ok::<_, JobError>(())
    });

    // The urgent job admits before the queued background work, even though
    // it was submitted last.
    let (background, urgent) = tokio::join!(futures::future::join_all(background), urgent);
    urgent?;
    for res in background {
        res?;
    }

    limiter.shutdown().await?;
    println!("\ndone");
    Ok(())
}
