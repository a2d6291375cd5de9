//! Supervised startup for frame sources.
//!
//! A camera or tracker is often not ready on the first try. Startup is a
//! bounded polling loop with fixed backoff that ends in a single ready (or
//! gave-up) transition. Dropping the returned future cancels any pending
//! backoff sleep.

use crate::config::StartupConfig;
use crate::tracking::source::{FrameSource, TrackingError};

/// Start `source`, retrying up to `policy.max_attempts` times.
///
/// Returns the attempt number that succeeded.
pub async fn start_with_retry<S>(source: &mut S, policy: &StartupConfig) -> Result<u32, TrackingError>
where
    S: FrameSource + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        match source.start() {
            Ok(()) | Err(TrackingError::AlreadyRunning) => {
                tracing::info!("Frame source ready after {} attempt(s)", attempt);
                return Ok(attempt);
            }
            Err(e) => {
                tracing::warn!(
                    "Frame source start failed (attempt {}/{}): {}",
                    attempt,
                    max_attempts,
                    e
                );
                last_error = e.to_string();
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(policy.backoff).await;
        }
    }

    Err(TrackingError::GaveUp {
        attempts: max_attempts,
        last_error,
    })
}
