//! Error types for retry operations.

use std::fmt;
use std::time::Duration;

use super::FailureClassification;

/// Failure returned by [`Executor::with_retry`](super::Executor::with_retry).
///
/// Carries the error from the final attempt together with its classification
/// and metadata about the retry sequence.
///
/// # Examples
///
/// ```rust
/// use scanguard::retry::{Executor, FailureClassification, RetryPolicy, StoreError, StoreErrorCode};
/// use scanguard::testing::RecordingDelay;
///
/// # tokio_test::block_on(async {
/// let executor = Executor::for_store().with_delay(RecordingDelay::new());
///
/// let failure = executor
///     .with_retry(
///         || async { Err::<(), _>(StoreError::new(StoreErrorCode::Unavailable, "down")) },
///         &RetryPolicy::default(),
///     )
///     .await
///     .unwrap_err();
///
/// assert_eq!(failure.attempts, 3);
/// assert_eq!(failure.classification, FailureClassification::Network);
/// assert!(failure.is_exhausted());
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryFailure<E> {
    /// The error from the final attempt.
    pub error: E,
    /// How the final error was classified.
    pub classification: FailureClassification,
    /// Total number of attempts made.
    pub attempts: u32,
    /// Total time spent, including backoff.
    pub elapsed: Duration,
}

impl<E> RetryFailure<E> {
    /// Create a new RetryFailure.
    pub fn new(
        error: E,
        classification: FailureClassification,
        attempts: u32,
        elapsed: Duration,
    ) -> Self {
        Self {
            error,
            classification,
            attempts,
            elapsed,
        }
    }

    /// True when the failure was retryable and attempts ran out.
    ///
    /// False for terminal classes, which stop on first occurrence.
    pub fn is_exhausted(&self) -> bool {
        self.classification.is_retryable()
    }

    /// Extract the final error, discarding metadata.
    pub fn into_error(self) -> E {
        self.error
    }

    /// Get a reference to the final error.
    pub fn error(&self) -> &E {
        &self.error
    }
}

impl<E: fmt::Display> fmt::Display for RetryFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failure after {} attempt(s) ({:?}): {}",
            self.classification, self.attempts, self.elapsed, self.error
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryFailure<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Caller-facing error carrying only a user-safe message.
///
/// The low-level cause is logged, never carried here.
///
/// ```rust
/// use scanguard::retry::{FailureClassification, OperationError};
///
/// let err = OperationError::new(FailureClassification::Permission);
/// assert_eq!(err.to_string(), "You do not have permission to perform this action");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationError {
    classification: FailureClassification,
}

impl OperationError {
    /// Build the error for a classification.
    pub fn new(classification: FailureClassification) -> Self {
        Self { classification }
    }

    /// The failure class.
    pub fn classification(&self) -> FailureClassification {
        self.classification
    }

    /// The translated, user-safe message.
    pub fn message(&self) -> &'static str {
        self.classification.user_message()
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for OperationError {}

impl From<FailureClassification> for OperationError {
    fn from(classification: FailureClassification) -> Self {
        Self::new(classification)
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use crate::retry::{StoreError, StoreErrorCode};
    use std::error::Error as _;

    #[test]
    fn test_retry_failure_display() {
        let err = RetryFailure::new(
            "connection failed",
            FailureClassification::Network,
            3,
            Duration::from_millis(500),
        );
        let display = format!("{}", err);
        assert!(display.contains("network"));
        assert!(display.contains("3 attempt(s)"));
        assert!(display.contains("connection failed"));
    }

    #[test]
    fn test_retry_failure_into_error() {
        let err = RetryFailure::new(
            "test error",
            FailureClassification::Unknown,
            1,
            Duration::ZERO,
        );
        assert!(!err.is_exhausted());
        assert_eq!(err.error(), &"test error");
        assert_eq!(err.into_error(), "test error");
    }

    #[test]
    fn test_retry_failure_exposes_source() {
        let err = RetryFailure::new(
            StoreError::new(StoreErrorCode::NotFound, "missing"),
            FailureClassification::NotFound,
            1,
            Duration::ZERO,
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_operation_error_hides_cause() {
        let err = OperationError::from(FailureClassification::ResourceExhausted);
        assert_eq!(err.to_string(), "Too many requests. Please wait a moment.");
        assert_eq!(err.classification(), FailureClassification::ResourceExhausted);
        assert!(err.source().is_none());
    }
}
