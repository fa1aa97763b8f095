//! Failure classification for remote-store errors.
//!
//! The executor never looks at a store's concrete error type. It asks a
//! [`Classify`] capability, and the store's error is adapted at the boundary
//! through [`CodedError`].

use std::fmt;

/// Coarse failure class derived from a remote-store error.
///
/// Drives both retry eligibility and the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailureClassification {
    /// Transient connectivity or deadline problem. The only retryable class.
    Network,
    /// Caller is not authenticated.
    Auth,
    /// Caller is authenticated but not allowed.
    Permission,
    /// The addressed document does not exist.
    NotFound,
    /// The document already exists.
    Conflict,
    /// Quota or rate limit hit.
    ResourceExhausted,
    /// The operation was cancelled remotely.
    Cancelled,
    /// Unrecognized cause or error shape.
    Unknown,
}

impl FailureClassification {
    /// Every class, in declaration order.
    pub const ALL: [FailureClassification; 8] = [
        FailureClassification::Network,
        FailureClassification::Auth,
        FailureClassification::Permission,
        FailureClassification::NotFound,
        FailureClassification::Conflict,
        FailureClassification::ResourceExhausted,
        FailureClassification::Cancelled,
        FailureClassification::Unknown,
    ];

    /// Whether failures of this class are retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureClassification::Network)
    }

    /// The fixed, user-safe message for this class.
    ///
    /// These strings are stable; callers may match on them.
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureClassification::Network => {
                "The service is temporarily unavailable. Please try again."
            }
            FailureClassification::Auth => "Your session has expired. Please sign in again.",
            FailureClassification::Permission => {
                "You do not have permission to perform this action"
            }
            FailureClassification::NotFound => "The requested item could not be found.",
            FailureClassification::Conflict => "This item already exists.",
            FailureClassification::ResourceExhausted => "Too many requests. Please wait a moment.",
            FailureClassification::Cancelled => "The operation was cancelled.",
            FailureClassification::Unknown => "Something went wrong. Please try again.",
        }
    }

    /// Short machine-readable label, used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClassification::Network => "network",
            FailureClassification::Auth => "auth",
            FailureClassification::Permission => "permission",
            FailureClassification::NotFound => "not_found",
            FailureClassification::Conflict => "conflict",
            FailureClassification::ResourceExhausted => "resource_exhausted",
            FailureClassification::Cancelled => "cancelled",
            FailureClassification::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cause codes recognized from the remote document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorCode {
    /// `permission-denied`
    PermissionDenied,
    /// `not-found`
    NotFound,
    /// `already-exists`
    AlreadyExists,
    /// `unavailable`
    Unavailable,
    /// `cancelled`
    Cancelled,
    /// `deadline-exceeded`
    DeadlineExceeded,
    /// `resource-exhausted`
    ResourceExhausted,
    /// `unauthenticated`
    Unauthenticated,
    /// `unknown`
    Unknown,
}

impl StoreErrorCode {
    /// Every recognized code.
    pub const ALL: [StoreErrorCode; 9] = [
        StoreErrorCode::PermissionDenied,
        StoreErrorCode::NotFound,
        StoreErrorCode::AlreadyExists,
        StoreErrorCode::Unavailable,
        StoreErrorCode::Cancelled,
        StoreErrorCode::DeadlineExceeded,
        StoreErrorCode::ResourceExhausted,
        StoreErrorCode::Unauthenticated,
        StoreErrorCode::Unknown,
    ];

    /// Parse a wire code. Unrecognized codes yield `None`.
    ///
    /// ```rust
    /// use scanguard::retry::StoreErrorCode;
    ///
    /// assert_eq!(StoreErrorCode::parse("unavailable"), Some(StoreErrorCode::Unavailable));
    /// assert_eq!(StoreErrorCode::parse("UNAVAILABLE"), None);
    /// ```
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }

    /// The wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorCode::PermissionDenied => "permission-denied",
            StoreErrorCode::NotFound => "not-found",
            StoreErrorCode::AlreadyExists => "already-exists",
            StoreErrorCode::Unavailable => "unavailable",
            StoreErrorCode::Cancelled => "cancelled",
            StoreErrorCode::DeadlineExceeded => "deadline-exceeded",
            StoreErrorCode::ResourceExhausted => "resource-exhausted",
            StoreErrorCode::Unauthenticated => "unauthenticated",
            StoreErrorCode::Unknown => "unknown",
        }
    }

    /// Map the code onto its failure class.
    pub fn classification(&self) -> FailureClassification {
        match self {
            StoreErrorCode::Unavailable | StoreErrorCode::DeadlineExceeded => {
                FailureClassification::Network
            }
            StoreErrorCode::Unauthenticated => FailureClassification::Auth,
            StoreErrorCode::PermissionDenied => FailureClassification::Permission,
            StoreErrorCode::NotFound => FailureClassification::NotFound,
            StoreErrorCode::AlreadyExists => FailureClassification::Conflict,
            StoreErrorCode::ResourceExhausted => FailureClassification::ResourceExhausted,
            StoreErrorCode::Cancelled => FailureClassification::Cancelled,
            StoreErrorCode::Unknown => FailureClassification::Unknown,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error that may expose a machine-readable cause code.
///
/// `None` means the error does not have the coded shape at all; it classifies
/// as [`FailureClassification::Unknown`].
pub trait CodedError {
    /// The cause code, if the error carries one.
    fn code(&self) -> Option<&str>;
}

impl<T: CodedError + ?Sized> CodedError for &T {
    fn code(&self) -> Option<&str> {
        (**self).code()
    }
}

impl<T: CodedError + ?Sized> CodedError for Box<T> {
    fn code(&self) -> Option<&str> {
        (**self).code()
    }
}

/// Transport errors surfaced as `std::io::Error` map onto store codes.
impl CodedError for std::io::Error {
    fn code(&self) -> Option<&str> {
        use std::io::ErrorKind;

        let code = match self.kind() {
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::BrokenPipe
            | ErrorKind::Interrupted => StoreErrorCode::Unavailable,
            ErrorKind::TimedOut => StoreErrorCode::DeadlineExceeded,
            ErrorKind::PermissionDenied => StoreErrorCode::PermissionDenied,
            ErrorKind::NotFound => StoreErrorCode::NotFound,
            ErrorKind::AlreadyExists => StoreErrorCode::AlreadyExists,
            _ => return None,
        };
        Some(code.as_str())
    }
}

/// Capability that classifies an error of type `E`.
///
/// Any `Fn(&E) -> FailureClassification` closure is a classifier.
///
/// ```rust
/// use scanguard::retry::{Classify, FailureClassification};
///
/// let classifier = |err: &String| {
///     if err.contains("timeout") {
///         FailureClassification::Network
///     } else {
///         FailureClassification::Unknown
///     }
/// };
///
/// assert_eq!(classifier.classify(&"read timeout".to_string()), FailureClassification::Network);
/// ```
pub trait Classify<E: ?Sized> {
    /// Classify one failure.
    fn classify(&self, error: &E) -> FailureClassification;
}

impl<E: ?Sized, F> Classify<E> for F
where
    F: Fn(&E) -> FailureClassification,
{
    fn classify(&self, error: &E) -> FailureClassification {
        self(error)
    }
}

/// Classifier for any [`CodedError`], using the store's code taxonomy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreClassifier;

impl<E: CodedError + ?Sized> Classify<E> for StoreClassifier {
    fn classify(&self, error: &E) -> FailureClassification {
        classify(error)
    }
}

/// Classify a coded error. Unrecognized shapes and codes are `Unknown`.
pub fn classify<E: CodedError + ?Sized>(error: &E) -> FailureClassification {
    error
        .code()
        .and_then(StoreErrorCode::parse)
        .map(|code| code.classification())
        .unwrap_or(FailureClassification::Unknown)
}

/// True for `unavailable` and `deadline-exceeded`.
pub fn is_network_failure<E: CodedError + ?Sized>(error: &E) -> bool {
    classify(error) == FailureClassification::Network
}

/// True for `unauthenticated`.
pub fn is_auth_failure<E: CodedError + ?Sized>(error: &E) -> bool {
    classify(error) == FailureClassification::Auth
}

/// A coded error as raised by the remote document store.
///
/// # Examples
///
/// ```rust
/// use scanguard::retry::{classify, FailureClassification, StoreError, StoreErrorCode};
///
/// let err = StoreError::new(StoreErrorCode::PermissionDenied, "rules rejected write");
/// assert_eq!(classify(&err), FailureClassification::Permission);
///
/// let opaque = StoreError::opaque("socket hung up");
/// assert_eq!(classify(&opaque), FailureClassification::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    code: Option<String>,
    message: String,
}

impl StoreError {
    /// Create an error with a recognized code.
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.as_str().to_string()),
            message: message.into(),
        }
    }

    /// Create an error with an arbitrary raw code, recognized or not.
    pub fn with_raw_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Create an error without a code.
    pub fn opaque(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// The raw code, if any.
    pub fn raw_code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// The parsed code, if present and recognized.
    pub fn store_code(&self) -> Option<StoreErrorCode> {
        self.raw_code().and_then(StoreErrorCode::parse)
    }

    /// The low-level message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl CodedError for StoreError {
    fn code(&self) -> Option<&str> {
        self.raw_code()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for StoreError {}
