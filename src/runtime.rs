//! Async helpers shared by the adapters
//!
//! The adapters only need two things from the runtime: a delay, and a
//! bounded polling loop for engines that report "created" before they can
//! answer questions about their view.

use crate::{MapError, Result};
use instant::Instant;
use std::time::Duration;

/// Async delay on the tokio timer
pub async fn async_delay(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Polls `is_ready` every `interval` until it returns true or `max_wait` has
/// elapsed. The check runs once before any delay, so an already-ready
/// engine costs no sleep.
pub async fn wait_until<F>(mut is_ready: F, interval: Duration, max_wait: Duration) -> Result<()>
where
    F: FnMut() -> bool,
{
    let started = Instant::now();
    let mut polls = 0_u32;
    loop {
        if is_ready() {
            log::debug!("ready after {} polls", polls);
            return Ok(());
        }
        if started.elapsed() >= max_wait {
            return Err(MapError::ReadyTimeout(max_wait));
        }
        polls += 1;
        async_delay(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_immediately() {
        let result = wait_until(|| true, Duration::from_secs(10), Duration::from_secs(10)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_ready_after_polls() {
        let mut checks = 0;
        let result = wait_until(
            || {
                checks += 1;
                checks >= 3
            },
            Duration::from_millis(1),
            Duration::from_secs(5),
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(checks, 3);
    }

    #[tokio::test]
    async fn test_gives_up_at_cap() {
        let result = wait_until(|| false, Duration::from_millis(2), Duration::from_millis(20)).await;
        assert!(matches!(result, Err(MapError::ReadyTimeout(d)) if d == Duration::from_millis(20)));
    }
}
