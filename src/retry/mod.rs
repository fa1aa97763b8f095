//! Classified retry and backoff for remote document-store operations.
//!
//! Every call that reaches the store goes through an [`Executor`], which is
//! the single place failures are classified, retried and translated:
//!
//! - **Classification**: a [`Classify`] capability maps an error to a
//!   [`FailureClassification`]. [`StoreClassifier`] handles any [`CodedError`].
//! - **Retry**: only `Network` failures (`unavailable`, `deadline-exceeded`)
//!   are retried, with exponential backoff described by a [`RetryPolicy`].
//! - **Translation**: terminal failures are logged through a
//!   [`DiagnosticSink`] and surfaced as an [`OperationError`] with a fixed
//!   user-safe message.
//!
//! # Quick Start
//!
//! ```rust
//! use scanguard::retry::{Executor, RetryPolicy, StoreError, StoreErrorCode};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let executor = Executor::for_store()
//!     .with_policy(RetryPolicy::default().with_initial_delay(Duration::from_millis(1)));
//!
//! let calls = AtomicU32::new(0);
//! let counter = &calls;
//! let result = executor
//!     .execute(
//!         move || async move {
//!             if counter.fetch_add(1, Ordering::SeqCst) == 0 {
//!                 Err(StoreError::new(StoreErrorCode::Unavailable, "cold start"))
//!             } else {
//!                 Ok("ok")
//!             }
//!         },
//!         Some("products.lookup"),
//!     )
//!     .await;
//!
//! assert_eq!(result, Ok("ok"));
//! assert_eq!(calls.load(Ordering::SeqCst), 2);
//! # });
//! ```
//!
//! # Backoff
//!
//! The wait before attempt `k` (for `k >= 2`) is
//! `initial_delay * backoff_multiplier^(k-2)`. With the defaults (3 attempts,
//! 1000 ms, x2) a failing call waits 1 s, then 2 s, then gives up.
//!
//! # Jitter Support
//!
//! Enable the `jitter` feature to spread waits with [`RetryPolicy::with_jitter`].

mod classify;
mod delay;
mod diagnostic;
mod error;
mod executor;
mod policy;
#[cfg(feature = "serde")]
mod serde_impl;

pub use classify::{
    classify, is_auth_failure, is_network_failure, Classify, CodedError, FailureClassification,
    StoreClassifier, StoreError, StoreErrorCode,
};
#[cfg(feature = "async")]
pub use delay::TokioDelay;
pub use delay::Delay;
pub use diagnostic::{translate, Diagnostic, DiagnosticSink, TracingSink};
pub use error::{OperationError, RetryFailure};
pub use executor::Executor;
pub use policy::{JitterStrategy, PolicyError, RetryEvent, RetryPolicy};

#[cfg(test)]
mod tests;
