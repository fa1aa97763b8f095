//! # Scanguard
//!
//! Barcode integrity checks and resilient remote-store calls for product
//! scanning applications.
//!
//! The crate has two independent halves:
//!
//! - [`barcode`]: pure, synchronous checksum validation for EAN-13, EAN-8 and
//!   UPC-A, with a plausibility check for other lengths
//! - [`retry`]: an async executor that classifies remote-store failures,
//!   retries transient ones with exponential backoff, and translates terminal
//!   ones into stable user-facing messages
//!
//! ## Quick Example
//!
//! ```rust
//! use scanguard::barcode::{sanitize, validate};
//! use scanguard::retry::{Executor, StoreError};
//!
//! # tokio_test::block_on(async {
//! let input = " 4006381-333931 ";
//! let code = sanitize(input);
//! assert!(validate(&code));
//!
//! let lookup = |code: String| async move { Ok::<_, StoreError>(format!("product {}", code)) };
//!
//! let executor = Executor::for_store();
//! let product = executor
//!     .execute(|| lookup(code.clone()), Some("products.lookup"))
//!     .await;
//!
//! assert_eq!(product.unwrap(), "product 4006381333931");
//! # });
//! ```
//!
//! ## Features
//!
//! - `async` (default): tokio-backed [`retry::TokioDelay`] and
//!   [`retry::Executor::for_store`]
//! - `jitter`: randomized backoff via [`RetryPolicy::with_jitter`]
//! - `serde`: load [`RetryPolicy`] from configuration

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod barcode;
pub mod retry;
pub mod testing;

// Re-exports
pub use barcode::{sanitize, validate, Barcode, BarcodeError, Symbology};
pub use retry::{
    Executor, FailureClassification, OperationError, RetryFailure, RetryPolicy, StoreError,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::barcode::{inspect, sanitize, validate, Barcode, BarcodeError, Symbology};
    pub use crate::retry::{
        Classify, CodedError, Delay, DiagnosticSink, Executor, FailureClassification,
        OperationError, RetryFailure, RetryPolicy, StoreClassifier, StoreError, StoreErrorCode,
    };
}
