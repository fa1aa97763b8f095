//! Rejection reasons for barcode candidates.

use std::fmt;

use super::Symbology;

/// Why a candidate was rejected by [`inspect`](super::inspect).
///
/// Structural rejections and checksum mismatches are kept apart: a malformed
/// candidate never reaches symbology-specific logic.
///
/// # Examples
///
/// ```rust
/// use scanguard::barcode::{inspect, BarcodeError, Symbology};
///
/// assert_eq!(
///     inspect("12-34"),
///     Err(BarcodeError::Malformed { length: 5 })
/// );
///
/// assert_eq!(
///     inspect("4006381333930"),
///     Err(BarcodeError::ChecksumMismatch {
///         symbology: Symbology::Ean13,
///         expected: 1,
///         found: 0,
///     })
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeError {
    /// Not 8 to 14 ASCII digits once whitespace is removed.
    Malformed {
        /// Character count after whitespace removal.
        length: usize,
    },
    /// Well-formed, but the trailing check digit is wrong.
    ChecksumMismatch {
        /// The symbology the candidate was checked against.
        symbology: Symbology,
        /// The check digit computed from the payload.
        expected: u8,
        /// The check digit present in the candidate.
        found: u8,
    },
}

impl BarcodeError {
    /// Returns true for structural rejections.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Returns true for check digit mismatches.
    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(self, Self::ChecksumMismatch { .. })
    }
}

impl fmt::Display for BarcodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { length } => write!(
                f,
                "expected {} to {} digits, got {} characters",
                Symbology::MIN_LEN,
                Symbology::MAX_LEN,
                length
            ),
            Self::ChecksumMismatch {
                symbology,
                expected,
                found,
            } => write!(
                f,
                "{} check digit mismatch: expected {}, found {}",
                symbology, expected, found
            ),
        }
    }
}

impl std::error::Error for BarcodeError {}
