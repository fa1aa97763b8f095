//! Diagnostic records for terminal failures.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::{FailureClassification, OperationError, RetryFailure};

/// What gets logged when an operation fails terminally.
#[derive(Debug, Clone)]
pub struct Diagnostic<'a> {
    /// The failure class.
    pub classification: FailureClassification,
    /// The low-level cause, rendered.
    pub cause: String,
    /// Attempts made before giving up.
    pub attempts: u32,
    /// Time spent, including backoff.
    pub elapsed: Duration,
    /// Caller-supplied label, e.g. `"products.lookup"`.
    pub context: Option<&'a str>,
}

/// Destination for [`Diagnostic`] records.
pub trait DiagnosticSink: Send + Sync {
    /// Record one terminal failure.
    fn record(&self, diagnostic: &Diagnostic<'_>);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn record(&self, diagnostic: &Diagnostic<'_>) {
        (**self).record(diagnostic)
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn record(&self, diagnostic: &Diagnostic<'_>) {
        (**self).record(diagnostic)
    }
}

/// Writes diagnostics as `tracing` error events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: &Diagnostic<'_>) {
        tracing::error!(
            classification = %diagnostic.classification,
            attempts = diagnostic.attempts,
            elapsed_ms = diagnostic.elapsed.as_millis() as u64,
            context = diagnostic.context.unwrap_or("-"),
            cause = %diagnostic.cause,
            "remote operation failed"
        );
    }
}

/// Translate a retry failure into its caller-facing error.
///
/// Records the cause with `sink` first; the returned error carries only the
/// classification and its fixed message.
pub fn translate<E: fmt::Display>(
    failure: &RetryFailure<E>,
    context: Option<&str>,
    sink: &dyn DiagnosticSink,
) -> OperationError {
    sink.record(&Diagnostic {
        classification: failure.classification,
        cause: failure.error.to_string(),
        attempts: failure.attempts,
        elapsed: failure.elapsed,
        context,
    });
    OperationError::new(failure.classification)
}
