//! Testing utilities for code built on `scanguard`.
//!
//! Test doubles for the executor's seams plus a few assertion macros.
//!
//! # Examples
//!
//! ## Asserting on backoff without waiting
//!
//! ```rust
//! use scanguard::retry::{Executor, RetryPolicy, StoreError, StoreErrorCode};
//! use scanguard::testing::{RecordingDelay, ScriptedOperation};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let delay = RecordingDelay::new();
//! let executor = Executor::for_store().with_delay(delay.clone());
//!
//! let op = ScriptedOperation::new([
//!     Err(StoreError::new(StoreErrorCode::Unavailable, "down")),
//!     Ok(7),
//! ]);
//!
//! let value = executor.with_retry(|| op.call(), &RetryPolicy::default()).await;
//! assert_eq!(value.unwrap(), 7);
//! assert_eq!(op.calls(), 2);
//! assert_eq!(delay.requested(), vec![Duration::from_secs(1)]);
//! # });
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use scanguard::{assert_invalid_barcode, assert_valid_barcode};
//!
//! assert_valid_barcode!("4006381333931");
//! assert_invalid_barcode!("4006381333930");
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{self, BoxFuture, Ready};

use crate::retry::{Delay, Diagnostic, DiagnosticSink, FailureClassification};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A [`Delay`] that resolves immediately and records what was requested.
///
/// Clones share the same record, so keep one clone for assertions and hand
/// the other to the executor.
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    requested: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingDelay {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every requested wait, in order.
    pub fn requested(&self) -> Vec<Duration> {
        lock(&self.requested).clone()
    }

    /// Sum of every requested wait.
    pub fn total(&self) -> Duration {
        lock(&self.requested).iter().sum()
    }
}

impl Delay for RecordingDelay {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        lock(&self.requested).push(duration);
        Box::pin(future::ready(()))
    }
}

/// An owned copy of a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDiagnostic {
    /// The failure class.
    pub classification: FailureClassification,
    /// The rendered cause.
    pub cause: String,
    /// Attempts made.
    pub attempts: u32,
    /// Caller-supplied label.
    pub context: Option<String>,
}

/// A [`DiagnosticSink`] that keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<RecordedDiagnostic>>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record so far, in order.
    pub fn records(&self) -> Vec<RecordedDiagnostic> {
        lock(&self.records).clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, diagnostic: &Diagnostic<'_>) {
        lock(&self.records).push(RecordedDiagnostic {
            classification: diagnostic.classification,
            cause: diagnostic.cause.clone(),
            attempts: diagnostic.attempts,
            context: diagnostic.context.map(str::to_string),
        });
    }
}

/// A fake remote operation that replays a fixed script of outcomes.
///
/// Call `n` (0-indexed) returns entry `n`; once the script runs out the last
/// entry repeats.
///
/// # Panics
///
/// [`ScriptedOperation::new`] panics on an empty script.
#[derive(Debug, Clone)]
pub struct ScriptedOperation<T, E> {
    script: Arc<Vec<Result<T, E>>>,
    calls: Arc<AtomicUsize>,
}

impl<T: Clone, E: Clone> ScriptedOperation<T, E> {
    /// Create an operation from its outcomes.
    pub fn new(script: impl IntoIterator<Item = Result<T, E>>) -> Self {
        let script: Vec<_> = script.into_iter().collect();
        assert!(!script.is_empty(), "ScriptedOperation needs at least one outcome");
        Self {
            script: Arc::new(script),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail with `error` `failures` times, then succeed with `value`.
    pub fn failing_then(failures: usize, error: E, value: T) -> Self {
        Self::new(
            std::iter::repeat_n(Err(error), failures).chain(std::iter::once(Ok(value))),
        )
    }

    /// Always fail with `error`.
    pub fn always_failing(error: E) -> Self {
        Self::new([Err(error)])
    }

    /// Invoke the operation once.
    pub fn call(&self) -> Ready<Result<T, E>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = n.min(self.script.len() - 1);
        future::ready(self.script[index].clone())
    }

    /// How many times [`call`](Self::call) has run.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Assert that a candidate passes [`validate`](crate::barcode::validate).
///
/// Panics with the rejection reason otherwise.
#[macro_export]
macro_rules! assert_valid_barcode {
    ($raw:expr) => {
        match $crate::barcode::inspect($raw) {
            Ok(_) => {}
            Err(e) => panic!("Expected valid barcode {:?}, got: {}", $raw, e),
        }
    };
}

/// Assert that a candidate fails [`validate`](crate::barcode::validate).
#[macro_export]
macro_rules! assert_invalid_barcode {
    ($raw:expr) => {
        if let Ok(code) = $crate::barcode::inspect($raw) {
            panic!(
                "Expected invalid barcode, got valid {} code {}",
                code.symbology(),
                code
            );
        }
    };
}

/// Assert that a result failed with the given [`FailureClassification`].
///
/// ```rust
/// use scanguard::assert_classified;
/// use scanguard::retry::{FailureClassification, OperationError};
///
/// let result: Result<(), _> = Err(OperationError::new(FailureClassification::NotFound));
/// assert_classified!(result, FailureClassification::NotFound);
/// ```
#[macro_export]
macro_rules! assert_classified {
    ($result:expr, $class:expr) => {
        match $result {
            Err(e) => assert_eq!(e.classification(), $class),
            Ok(v) => panic!("Expected {:?} failure, got Ok: {:?}", $class, v),
        }
    };
}
