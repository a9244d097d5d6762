//! Deadline enforcement around blocking driver polls.

use std::time::Duration;

use thiserror::Error;

use crate::driver::DriverError;

/// Failure of a single device poll.
#[derive(Debug, Error)]
pub enum PollError {
    /// The driver reported an error.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// The poll did not finish before its deadline.
    #[error("poll timed out after {0:?}")]
    Timeout(Duration),

    /// The driver task panicked or was cancelled.
    #[error("poll aborted: {0}")]
    Aborted(String),

    /// An earlier, abandoned poll of the device is still running.
    #[error("previous poll still in flight")]
    Busy,
}

impl PollError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PollError::Timeout(_))
    }
}

/// Run a blocking operation with a hard deadline.
///
/// The operation runs on the blocking thread pool. When the deadline elapses
/// first, its handle is dropped and [`PollError::Timeout`] is returned; the
/// thread finishes on its own and its result is discarded.
pub async fn run_with_deadline<T, F>(deadline: Duration, op: F) -> Result<T, PollError>
where
    F: FnOnce() -> Result<T, DriverError> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(op);

    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(result)) => result.map_err(PollError::from),
        Ok(Err(join_error)) => Err(PollError::Aborted(join_error.to_string())),
        Err(_elapsed) => Err(PollError::Timeout(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = run_with_deadline(Duration::from_secs(1), || Ok(42)).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_driver_error_is_not_timeout() {
        let result: Result<(), _> = run_with_deadline(Duration::from_secs(1), || {
            Err(DriverError::Unreachable {
                address: "AA:BB".to_string(),
                message: "gone".to_string(),
            })
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, PollError::Driver(DriverError::Unreachable { .. })));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_overrun_returns_timeout() {
        let started = Instant::now();
        let result = run_with_deadline(Duration::from_millis(50), || {
            std::thread::sleep(Duration::from_millis(500));
            Ok(1)
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(err, PollError::Timeout(d) if d == Duration::from_millis(50)));
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_panic_is_aborted() {
        let result: Result<(), _> =
            run_with_deadline(Duration::from_secs(1), || panic!("driver crashed")).await;

        assert!(matches!(result, Err(PollError::Aborted(_))));
    }
}
