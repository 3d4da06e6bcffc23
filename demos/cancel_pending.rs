//! # Example: cancel_pending
//!
//! Demonstrates caller-side cancellation of a submission.
//!
//! Shows how to:
//! - Compose an external timeout around a pending submit
//! - Observe that the timed-out submission is deleted from the queue
//!   without consuming a pacing slot
//!
//! ## Run
//! ```bash
//! cargo run --example cancel_pending
//! ```

use std::time::Duration;

use ratevisor::{Config, JobError, Limiter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== cancel_pending example ===\n");

    // One admission every two seconds: the second submission will wait.
    let limiter = Limiter::start(Config::new(Duration::from_secs(2)));

    let first = limiter.submit(|_ctx| async {
        println!("first job running");
        Ok::<_, JobError>(())
    });
    first.await?;

    // This one is queued behind the pacing interval; give up after 500ms.
    let slow = limiter.submit(|_ctx| async {
        println!("this should never print");
        Ok::<_, JobError>(())
    });
    match tokio::time::timeout(Duration::from_millis(500), slow).await {
        Ok(res) => res?,
        Err(_elapsed) => println!("gave up on the queued job"),
    }

    assert_eq!(limiter.pending(), 0);
    limiter.shutdown().await?;
    println!("\ndone");
    Ok(())
}
