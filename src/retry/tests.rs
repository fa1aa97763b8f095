//! Executor tests for retry, backoff and translation.

use super::*;
use crate::testing::{RecordingDelay, RecordingSink, ScriptedOperation};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_test::traced_test;

fn unavailable() -> StoreError {
    StoreError::new(StoreErrorCode::Unavailable, "backend unavailable")
}

fn test_executor() -> (
    Executor<StoreClassifier, RecordingDelay, RecordingSink>,
    RecordingDelay,
    RecordingSink,
) {
    let delay = RecordingDelay::new();
    let sink = RecordingSink::new();
    let executor = Executor::new(StoreClassifier, delay.clone()).with_sink(sink.clone());
    (executor, delay, sink)
}

#[tokio::test]
async fn test_success_runs_once_without_delay() {
    let (executor, delay, sink) = test_executor();
    let op = ScriptedOperation::<_, StoreError>::new([Ok("found")]);

    let result = executor.execute(|| op.call(), Some("lookup")).await;

    assert_eq!(result, Ok("found"));
    assert_eq!(op.calls(), 1);
    assert!(delay.requested().is_empty());
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn test_succeeds_on_third_attempt_with_geometric_delays() {
    let (executor, delay, _) = test_executor();
    let policy = RetryPolicy::default().with_max_attempts(5);
    let op = ScriptedOperation::failing_then(2, unavailable(), 42);

    let result = executor.with_retry(|| op.call(), &policy).await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(op.calls(), 3);
    assert_eq!(
        delay.requested(),
        vec![Duration::from_millis(1000), Duration::from_millis(2000)]
    );
}

#[tokio::test]
async fn test_delays_match_policy_formula() {
    let (executor, delay, _) = test_executor();
    let policy = RetryPolicy::new(6, Duration::from_millis(250), 3.0).unwrap();
    let op = ScriptedOperation::failing_then(4, unavailable(), ());

    executor.with_retry(|| op.call(), &policy).await.unwrap();

    let expected: Vec<Duration> = (2..=5)
        .map(|k| policy.delay_before_attempt(k).unwrap())
        .collect();
    assert_eq!(delay.requested(), expected);
    assert_eq!(
        expected,
        vec![
            Duration::from_millis(250),
            Duration::from_millis(750),
            Duration::from_millis(2250),
            Duration::from_millis(6750),
        ]
    );
}

#[tokio::test]
async fn test_always_unavailable_exhausts_max_attempts() {
    let (executor, delay, _) = test_executor();
    let op = ScriptedOperation::<(), _>::always_failing(unavailable());

    let failure = executor
        .with_retry(|| op.call(), &RetryPolicy::default())
        .await
        .unwrap_err();

    assert_eq!(op.calls(), 3);
    assert_eq!(failure.attempts, 3);
    assert!(failure.is_exhausted());
    assert_eq!(failure.error, unavailable());
    assert_eq!(delay.requested().len(), 2);
}

#[tokio::test]
async fn test_deadline_exceeded_is_retried() {
    let (executor, _, _) = test_executor();
    let op = ScriptedOperation::failing_then(
        1,
        StoreError::new(StoreErrorCode::DeadlineExceeded, "slow"),
        "late",
    );

    let result = executor.with_retry(|| op.call(), &RetryPolicy::default()).await;

    assert_eq!(result.unwrap(), "late");
    assert_eq!(op.calls(), 2);
}

#[tokio::test]
async fn test_single_attempt_policy_never_waits() {
    let (executor, delay, _) = test_executor();
    let op = ScriptedOperation::<(), _>::always_failing(unavailable());
    let policy = RetryPolicy::default().with_max_attempts(1);

    let failure = executor.with_retry(|| op.call(), &policy).await.unwrap_err();

    assert_eq!(failure.attempts, 1);
    assert_eq!(op.calls(), 1);
    assert!(delay.requested().is_empty());
}

#[tokio::test]
async fn test_terminal_classes_are_not_retried() {
    for code in StoreErrorCode::ALL {
        if code.classification().is_retryable() {
            continue;
        }
        let (executor, delay, _) = test_executor();
        let op = ScriptedOperation::<(), _>::always_failing(StoreError::new(code, "no"));

        let failure = executor
            .with_retry(|| op.call(), &RetryPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(op.calls(), 1, "{}", code);
        assert_eq!(failure.attempts, 1);
        assert!(!failure.is_exhausted());
        assert!(delay.requested().is_empty());
    }
}

#[tokio::test]
async fn test_uncoded_errors_are_terminal_unknown() {
    let (executor, _, sink) = test_executor();
    let op = ScriptedOperation::<(), _>::always_failing(StoreError::opaque("socket closed"));

    let err = executor.execute(|| op.call(), None).await.unwrap_err();

    assert_eq!(op.calls(), 1);
    assert_eq!(err.classification(), FailureClassification::Unknown);
    assert_eq!(err.message(), "Something went wrong. Please try again.");
    assert_eq!(sink.records()[0].cause, "socket closed");
}

#[tokio::test]
async fn test_permission_denied_surfaces_fixed_message() {
    let (executor, delay, sink) = test_executor();
    let op = ScriptedOperation::<(), _>::always_failing(StoreError::new(
        StoreErrorCode::PermissionDenied,
        "Missing or insufficient permissions.",
    ));

    let result = executor
        .safe_operation(|| op.call(), &RetryPolicy::default(), Some("products.save"))
        .await;

    crate::assert_classified!(result, FailureClassification::Permission);
    assert_eq!(op.calls(), 1);
    assert!(delay.requested().is_empty());

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].context.as_deref(), Some("products.save"));
    assert!(records[0].cause.contains("insufficient permissions"));
}

#[tokio::test]
async fn test_translated_error_never_carries_cause() {
    let (executor, _, _) = test_executor();
    let op = ScriptedOperation::<(), _>::always_failing(StoreError::new(
        StoreErrorCode::ResourceExhausted,
        "quota project-123 exceeded",
    ));

    let err = executor.execute(|| op.call(), None).await.unwrap_err();

    assert_eq!(err.to_string(), "Too many requests. Please wait a moment.");
    assert!(!format!("{:?}", err).contains("project-123"));
}

#[tokio::test]
async fn test_exhausted_network_failure_is_recorded_once() {
    let (executor, _, sink) = test_executor();
    let op = ScriptedOperation::<(), _>::always_failing(unavailable());

    let err = executor
        .execute(|| op.call(), Some("history.sync"))
        .await
        .unwrap_err();

    assert_eq!(err.classification(), FailureClassification::Network);
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].attempts, 3);
    assert_eq!(records[0].classification, FailureClassification::Network);
}

#[tokio::test]
async fn test_execute_uses_executor_policy() {
    let (executor, delay, _) = test_executor();
    let executor = executor.with_policy(
        RetryPolicy::new(2, Duration::from_millis(10), 2.0).unwrap(),
    );
    let op = ScriptedOperation::<(), _>::always_failing(unavailable());

    let _ = executor.execute(|| op.call(), None).await;

    assert_eq!(op.calls(), 2);
    assert_eq!(delay.requested(), vec![Duration::from_millis(10)]);
    assert_eq!(executor.policy().max_attempts(), 2);
}

#[tokio::test]
async fn test_retry_hook_sees_each_scheduled_retry() {
    let (executor, _, _) = test_executor();
    let op = ScriptedOperation::failing_then(2, unavailable(), ());
    let mut seen = Vec::new();

    executor
        .with_retry_hooks(
            || op.call(),
            &RetryPolicy::default(),
            |event: &RetryEvent<'_, StoreError>| {
                seen.push((event.attempt, event.next_delay, event.classification));
            },
        )
        .await
        .unwrap();

    assert_eq!(
        seen,
        vec![
            (1, Duration::from_secs(1), FailureClassification::Network),
            (2, Duration::from_secs(2), FailureClassification::Network),
        ]
    );
}

#[tokio::test]
async fn test_custom_classifier() {
    let delay = RecordingDelay::new();
    let executor = Executor::new(
        |err: &&str| {
            if err.starts_with("timeout") {
                FailureClassification::Network
            } else {
                FailureClassification::NotFound
            }
        },
        delay.clone(),
    );
    let op = ScriptedOperation::failing_then(1, "timeout waiting for index", 1);

    assert_eq!(
        executor.with_retry(|| op.call(), &RetryPolicy::default()).await.unwrap(),
        1
    );
    assert_eq!(delay.requested().len(), 1);

    let missing = ScriptedOperation::<(), _>::always_failing("no such doc");
    let err = executor.execute(|| missing.call(), None).await.unwrap_err();
    assert_eq!(err.classification(), FailureClassification::NotFound);
}

#[tokio::test]
async fn test_concurrent_calls_keep_independent_state() {
    let delay = RecordingDelay::new();
    let executor = Arc::new(Executor::new(StoreClassifier, delay.clone()));

    let flaky = ScriptedOperation::failing_then(2, unavailable(), "flaky");
    let denied = ScriptedOperation::<&str, _>::always_failing(StoreError::new(
        StoreErrorCode::PermissionDenied,
        "no",
    ));
    let steady = ScriptedOperation::<_, StoreError>::new([Ok("steady")]);

    let (a, b, c) = futures::join!(
        executor.execute(|| flaky.call(), Some("a")),
        executor.execute(|| denied.call(), Some("b")),
        executor.execute(|| steady.call(), Some("c")),
    );

    assert_eq!(a, Ok("flaky"));
    assert_eq!(
        b.unwrap_err().classification(),
        FailureClassification::Permission
    );
    assert_eq!(c, Ok("steady"));
    assert_eq!(flaky.calls(), 3);
    assert_eq!(denied.calls(), 1);
    assert_eq!(steady.calls(), 1);
    assert_eq!(delay.requested().len(), 2);
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_real_timer_backoff_does_not_block_other_tasks() {
    let executor = Arc::new(
        Executor::for_store()
            .with_policy(RetryPolicy::new(3, Duration::from_millis(20), 2.0).unwrap()),
    );
    let attempts = Arc::new(AtomicU32::new(0));

    let retrying = {
        let executor = executor.clone();
        let attempts = attempts.clone();
        tokio::spawn(async move {
            executor
                .execute(
                    move || {
                        let attempts = attempts.clone();
                        async move {
                            attempts.fetch_add(1, Ordering::SeqCst);
                            Err::<(), _>(unavailable())
                        }
                    },
                    None,
                )
                .await
        })
    };

    let quick = executor
        .execute(|| async { Ok::<_, StoreError>("quick") }, None)
        .await;
    assert_eq!(quick, Ok("quick"));

    let start = std::time::Instant::now();
    let result = retrying.await.unwrap();
    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert!(start.elapsed() <= Duration::from_secs(5));
}

#[traced_test]
#[tokio::test]
async fn test_retries_and_exhaustion_are_logged() {
    let (executor, _, _) = test_executor();
    let op = ScriptedOperation::<(), _>::always_failing(unavailable());

    let _ = executor.with_retry(|| op.call(), &RetryPolicy::default()).await;

    assert!(logs_contain("transient failure, backing off"));
    assert!(logs_contain("retry attempts exhausted"));
}

#[traced_test]
#[tokio::test]
async fn test_default_sink_logs_context() {
    let executor = Executor::new(StoreClassifier, RecordingDelay::new());
    let op = ScriptedOperation::<(), _>::always_failing(StoreError::new(
        StoreErrorCode::NotFound,
        "products/0001",
    ));

    let err = executor.execute(|| op.call(), Some("products.lookup")).await;

    assert!(err.is_err());
    assert!(logs_contain("remote operation failed"));
    assert!(logs_contain("products.lookup"));
    assert!(logs_contain("products/0001"));
}
