//! Checksum validation for retail barcode symbologies.
//!
//! Candidates are normalized, checked for shape (8 to 14 ASCII digits), then
//! dispatched by length:
//!
//! - **EAN-13** (13 digits): weights x1/x3 from the left
//! - **EAN-8** (8 digits): weights x3/x1 from the left
//! - **UPC-A** (12 digits): weights x3/x1 from the left
//! - any other length in range is accepted without a checksum
//!
//! # Quick Start
//!
//! ```rust
//! use scanguard::barcode::{sanitize, validate};
//!
//! assert!(validate("4006381333931"));
//! assert!(validate("4006 3813 3393 1"));
//! assert!(!validate("4006381333930"));
//!
//! // Hyphens are not whitespace; clean them first.
//! assert!(!validate("0-36000-29145-2"));
//! assert!(validate(&sanitize("0-36000-29145-2")));
//! ```
//!
//! Use [`inspect`] when the reason for a rejection matters:
//!
//! ```rust
//! use scanguard::barcode::{inspect, Symbology};
//!
//! let code = inspect("036000291452").unwrap();
//! assert_eq!(code.symbology(), Symbology::UpcA);
//! assert!(code.is_checksum_verified());
//! ```

mod error;
mod symbology;

use std::fmt;
use std::str::FromStr;

pub use error::BarcodeError;
pub use symbology::Symbology;

/// A candidate that passed structural and checksum validation.
///
/// Only obtainable through [`inspect`], so holding a `Barcode` guarantees the
/// digits are well-formed and, for known symbologies, correctly checksummed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Barcode {
    digits: String,
    symbology: Symbology,
}

impl Barcode {
    /// The normalized digit string.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// The detected symbology.
    pub fn symbology(&self) -> Symbology {
        self.symbology
    }

    /// False when the code was let through without a checksum ([`Symbology::Other`]).
    pub fn is_checksum_verified(&self) -> bool {
        self.symbology.has_checksum()
    }

    /// Consume the barcode, returning its digit string.
    pub fn into_digits(self) -> String {
        self.digits
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

impl AsRef<str> for Barcode {
    fn as_ref(&self) -> &str {
        &self.digits
    }
}

impl FromStr for Barcode {
    type Err = BarcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        inspect(s)
    }
}

impl TryFrom<&str> for Barcode {
    type Error = BarcodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        inspect(value)
    }
}

/// Validate a candidate, reporting why it was rejected.
///
/// Whitespace is stripped first. Anything that is not 8 to 14 ASCII digits is
/// [`BarcodeError::Malformed`]; EAN-13, EAN-8 and UPC-A codes must then carry
/// the right check digit.
pub fn inspect(raw: &str) -> Result<Barcode, BarcodeError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let symbology = match Symbology::from_len(compact.len()) {
        Some(symbology) if compact.bytes().all(|b| b.is_ascii_digit()) => symbology,
        _ => {
            return Err(BarcodeError::Malformed {
                length: compact.chars().count(),
            })
        }
    };

    let digits: Vec<u8> = compact.bytes().map(|b| b - b'0').collect();
    symbology
        .verify(&digits)
        .map_err(|(expected, found)| BarcodeError::ChecksumMismatch {
            symbology,
            expected,
            found,
        })?;

    Ok(Barcode {
        digits: compact,
        symbology,
    })
}

/// Returns true if `raw` is a structurally valid, correctly checksummed code.
///
/// Malformed input is simply `false`; this never panics.
///
/// # Example
///
/// ```rust
/// use scanguard::barcode::validate;
///
/// assert!(validate("96385074"));    // EAN-8
/// assert!(validate("036000291452")); // UPC-A
/// assert!(validate("1234567890"));   // 10 digits, accepted unchecked
/// assert!(!validate("1234567"));     // too short
/// assert!(!validate("40063813339a1"));
/// ```
pub fn validate(raw: &str) -> bool {
    inspect(raw).is_ok()
}

/// Strip every character that is not an ASCII digit.
///
/// Does not enforce length or checksum.
///
/// ```rust
/// use scanguard::barcode::sanitize;
///
/// assert_eq!(sanitize(" 400-638 133.393 1 "), "4006381333931");
/// assert_eq!(sanitize("no digits"), "");
/// ```
pub fn sanitize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_valid_codes() {
        assert!(validate("4006381333931"));
        assert!(validate("5901234123457"));
        assert!(validate("96385074"));
        assert!(validate("40170725"));
        assert!(validate("036000291452"));
        assert!(validate("012345678905"));
    }

    #[test]
    fn test_altered_check_digit_is_rejected() {
        assert!(!validate("4006381333930"));
        assert!(!validate("96385075"));
        assert!(!validate("036000291453"));
    }

    #[test]
    fn test_whitespace_is_stripped_before_shape_check() {
        assert!(validate(" 4006381333931 "));
        assert!(validate("4006381\t333931"));
        assert!(validate("0360\n0029 1452"));
    }

    #[test]
    fn test_non_digit_noise_is_malformed() {
        assert_eq!(
            inspect("0-36000-29145-2"),
            Err(BarcodeError::Malformed { length: 15 })
        );
        assert!(!validate("4006381333931x"));
        assert!(!validate("４００６３８１３３３９３１"));
    }

    #[test]
    fn test_length_bounds() {
        assert!(!validate(""));
        assert!(!validate("1234567"));
        assert!(!validate("123456789012345"));
        assert!(validate("12345678901234"));
    }

    #[test]
    fn test_other_lengths_skip_checksum() {
        assert!(validate("123456789"));
        assert!(validate("1234567890"));
        assert!(validate("12345678901"));
        assert!(validate("00000000000000"));

        let code = inspect("1234567890").unwrap();
        assert_eq!(code.symbology(), Symbology::Other);
        assert!(!code.is_checksum_verified());
    }

    #[test]
    fn test_inspect_keeps_normalized_digits() {
        let code = inspect(" 4006 3813 3393 1").unwrap();
        assert_eq!(code.digits(), "4006381333931");
        assert_eq!(code.to_string(), "4006381333931");
        assert_eq!(code.symbology(), Symbology::Ean13);
        assert_eq!(code.into_digits(), "4006381333931");
    }

    #[test]
    fn test_from_str_and_try_from() {
        let parsed: Barcode = "96385074".parse().unwrap();
        assert_eq!(parsed.symbology(), Symbology::Ean8);

        let err = Barcode::try_from("96385070").unwrap_err();
        assert_eq!(
            err,
            BarcodeError::ChecksumMismatch {
                symbology: Symbology::Ean8,
                expected: 4,
                found: 0,
            }
        );
    }

    #[test]
    fn test_sanitize_keeps_only_ascii_digits() {
        assert_eq!(sanitize("abc"), "");
        assert_eq!(sanitize("0 36-000.29_145/2"), "036000291452");
        assert_eq!(sanitize("٣4"), "4");
    }

    #[test]
    fn test_check_digit_completes_payloads() {
        for payload in ["590123412345", "400638133393"] {
            let check = Symbology::Ean13.check_digit(payload).unwrap();
            assert!(validate(&format!("{}{}", payload, check)));
        }
        let check = Symbology::UpcA.check_digit("01234567890").unwrap();
        assert_eq!(check, 5);
    }
}
