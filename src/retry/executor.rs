//! The resilient operation executor.

use std::fmt;
use std::future::Future;
use std::time::Instant;

use super::{
    diagnostic, Classify, Delay, DiagnosticSink, OperationError, RetryEvent, RetryFailure,
    RetryPolicy, TracingSink,
};

#[cfg(feature = "async")]
use super::{StoreClassifier, TokioDelay};

/// Runs remote operations with classified retry and user-safe translation.
///
/// An executor is immutable configuration: a classifier, a delay, a diagnostic
/// sink and a default policy. Every call owns its own attempt counter and
/// delay, so one executor can serve many concurrent callers.
///
/// Two layers are exposed separately:
///
/// - [`with_retry`](Self::with_retry): retry mechanics only, returns the raw
///   failure
/// - [`safe_operation`](Self::safe_operation): wraps `with_retry`, logs the
///   cause and returns an [`OperationError`] with a fixed message
///
/// # Example
///
/// ```rust
/// use scanguard::retry::{Executor, FailureClassification, StoreError, StoreErrorCode};
///
/// # tokio_test::block_on(async {
/// let executor = Executor::for_store();
///
/// let value = executor
///     .execute(|| async { Ok::<_, StoreError>("product") }, Some("products.lookup"))
///     .await;
/// assert_eq!(value, Ok("product"));
///
/// let err = executor
///     .execute(
///         || async { Err::<(), _>(StoreError::new(StoreErrorCode::PermissionDenied, "rules")) },
///         None,
///     )
///     .await
///     .unwrap_err();
/// assert_eq!(err.classification(), FailureClassification::Permission);
/// # });
/// ```
pub struct Executor<C, D, S = TracingSink> {
    classifier: C,
    delay: D,
    sink: S,
    policy: RetryPolicy,
}

#[cfg(feature = "async")]
impl Executor<StoreClassifier, TokioDelay, TracingSink> {
    /// Executor for [`CodedError`](super::CodedError) store errors, sleeping on
    /// the tokio timer and logging through `tracing`.
    pub fn for_store() -> Self {
        Self::new(StoreClassifier, TokioDelay)
    }
}

#[cfg(feature = "async")]
impl Default for Executor<StoreClassifier, TokioDelay, TracingSink> {
    fn default() -> Self {
        Self::for_store()
    }
}

impl<C, D> Executor<C, D, TracingSink> {
    /// Create an executor with the default policy and the tracing sink.
    pub fn new(classifier: C, delay: D) -> Self {
        Self {
            classifier,
            delay,
            sink: TracingSink,
            policy: RetryPolicy::default(),
        }
    }
}

impl<C, D, S> Executor<C, D, S> {
    /// Replace the policy used by [`execute`](Self::execute).
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the classifier.
    pub fn with_classifier<C2>(self, classifier: C2) -> Executor<C2, D, S> {
        Executor {
            classifier,
            delay: self.delay,
            sink: self.sink,
            policy: self.policy,
        }
    }

    /// Replace the backoff delay.
    pub fn with_delay<D2>(self, delay: D2) -> Executor<C, D2, S> {
        Executor {
            classifier: self.classifier,
            delay,
            sink: self.sink,
            policy: self.policy,
        }
    }

    /// Replace the diagnostic sink.
    pub fn with_sink<S2>(self, sink: S2) -> Executor<C, D, S2> {
        Executor {
            classifier: self.classifier,
            delay: self.delay,
            sink,
            policy: self.policy,
        }
    }

    /// The policy used by [`execute`](Self::execute).
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The classifier.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }
}

impl<C, D, S> Executor<C, D, S>
where
    D: Delay,
{
    /// Run `operation` under `policy`, retrying network failures.
    ///
    /// The first attempt runs immediately. A failure that does not classify as
    /// [`Network`](super::FailureClassification::Network) is returned at once.
    /// Network failures are retried until `max_attempts` attempts have been
    /// made, waiting `initial_delay * backoff_multiplier^(k-2)` before attempt
    /// `k`.
    pub async fn with_retry<T, E, F, Fut>(
        &self,
        operation: F,
        policy: &RetryPolicy,
    ) -> Result<T, RetryFailure<E>>
    where
        C: Classify<E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.with_retry_hooks(operation, policy, |_: &RetryEvent<'_, E>| {})
            .await
    }

    /// [`with_retry`](Self::with_retry), calling `on_retry` before each wait.
    ///
    /// The hook is synchronous and should not block; use it for metrics.
    pub async fn with_retry_hooks<T, E, F, Fut, H>(
        &self,
        mut operation: F,
        policy: &RetryPolicy,
        mut on_retry: H,
    ) -> Result<T, RetryFailure<E>>
    where
        C: Classify<E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        H: FnMut(&RetryEvent<'_, E>),
    {
        let start = Instant::now();
        let mut attempt = 1u32;
        let mut delay = policy.initial_delay();

        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let classification = self.classifier.classify(&error);
            if !classification.is_retryable() {
                tracing::debug!(attempt, %classification, "terminal failure, not retrying");
                return Err(RetryFailure::new(
                    error,
                    classification,
                    attempt,
                    start.elapsed(),
                ));
            }
            if attempt >= policy.max_attempts() {
                tracing::warn!(attempts = attempt, %classification, "retry attempts exhausted");
                return Err(RetryFailure::new(
                    error,
                    classification,
                    attempt,
                    start.elapsed(),
                ));
            }

            let wait = policy.jitter().apply(delay);
            on_retry(&RetryEvent {
                attempt,
                error: &error,
                classification,
                next_delay: wait,
                elapsed: start.elapsed(),
            });
            tracing::debug!(
                attempt,
                %classification,
                next_delay_ms = wait.as_millis() as u64,
                "transient failure, backing off"
            );
            drop(error);

            self.delay.sleep(wait).await;
            delay = policy.next_delay(delay);
            attempt += 1;
        }
    }
}

impl<C, D, S> Executor<C, D, S>
where
    D: Delay,
    S: DiagnosticSink,
{
    /// Run `operation` under `policy`, translating terminal failures.
    ///
    /// On failure the cause is recorded with the diagnostic sink, tagged with
    /// `context`, and an [`OperationError`] carrying only the user-safe
    /// message is returned.
    pub async fn safe_operation<T, E, F, Fut>(
        &self,
        operation: F,
        policy: &RetryPolicy,
        context: Option<&str>,
    ) -> Result<T, OperationError>
    where
        C: Classify<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.with_retry(operation, policy)
            .await
            .map_err(|failure| diagnostic::translate(&failure, context, &self.sink))
    }

    /// [`safe_operation`](Self::safe_operation) under the executor's policy.
    pub async fn execute<T, E, F, Fut>(
        &self,
        operation: F,
        context: Option<&str>,
    ) -> Result<T, OperationError>
    where
        C: Classify<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.safe_operation(operation, &self.policy, context).await
    }
}

impl<C, D, S> Clone for Executor<C, D, S>
where
    C: Clone,
    D: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            classifier: self.classifier.clone(),
            delay: self.delay.clone(),
            sink: self.sink.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl<C, D, S> fmt::Debug for Executor<C, D, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
