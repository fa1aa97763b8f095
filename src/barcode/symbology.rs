//! Symbology detection and the shared check-digit routine.

use std::fmt;

/// Per-parity weights applied to payload digits before the modulo-10 check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Weights {
    even: u32,
    odd: u32,
}

impl Weights {
    /// EAN-13 weighting: x1 at even indices, x3 at odd indices.
    const EAN13: Weights = Weights { even: 1, odd: 3 };
    /// EAN-8 and UPC-A weighting: x3 at even indices, x1 at odd indices.
    const ODD_LEADING: Weights = Weights { even: 3, odd: 1 };

    #[inline]
    fn at(self, index: usize) -> u32 {
        if index % 2 == 0 {
            self.even
        } else {
            self.odd
        }
    }
}

/// Compute the check digit over `digits[..check_index]`.
///
/// Every symbology closes with `(10 - sum mod 10) mod 10`; only the weights and
/// the position of the check digit vary.
pub(crate) fn checksum(digits: &[u8], weights: Weights, check_index: usize) -> u8 {
    let sum: u32 = digits
        .iter()
        .take(check_index)
        .enumerate()
        .map(|(i, &d)| u32::from(d) * weights.at(i))
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// A retail barcode symbology, derived purely from digit count.
///
/// # Example
///
/// ```rust
/// use scanguard::barcode::Symbology;
///
/// assert_eq!(Symbology::from_len(13), Some(Symbology::Ean13));
/// assert_eq!(Symbology::from_len(12), Some(Symbology::UpcA));
/// assert_eq!(Symbology::from_len(10), Some(Symbology::Other));
/// assert_eq!(Symbology::from_len(7), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Symbology {
    /// 13-digit European Article Number.
    Ean13,
    /// 8-digit European Article Number.
    Ean8,
    /// 12-digit Universal Product Code.
    UpcA,
    /// Any other length in the accepted range. Not checksum-verified.
    Other,
}

impl Symbology {
    /// Shortest accepted candidate.
    pub const MIN_LEN: usize = 8;
    /// Longest accepted candidate.
    pub const MAX_LEN: usize = 14;

    /// Detect the symbology for a digit count, or `None` outside 8..=14.
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            13 => Some(Symbology::Ean13),
            8 => Some(Symbology::Ean8),
            12 => Some(Symbology::UpcA),
            Self::MIN_LEN..=Self::MAX_LEN => Some(Symbology::Other),
            _ => None,
        }
    }

    /// Total digit count including the check digit, `None` for [`Symbology::Other`].
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            Symbology::Ean13 => Some(13),
            Symbology::Ean8 => Some(8),
            Symbology::UpcA => Some(12),
            Symbology::Other => None,
        }
    }

    /// Whether codes of this symbology carry a verified check digit.
    pub fn has_checksum(&self) -> bool {
        self.weights().is_some()
    }

    /// Human-readable name, e.g. `"EAN-13"`.
    pub fn name(&self) -> &'static str {
        match self {
            Symbology::Ean13 => "EAN-13",
            Symbology::Ean8 => "EAN-8",
            Symbology::UpcA => "UPC-A",
            Symbology::Other => "other",
        }
    }

    /// Compute the check digit for a payload (the code without its last digit).
    ///
    /// Returns `None` for [`Symbology::Other`], or when the payload is not
    /// exactly `fixed_len - 1` ASCII digits.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scanguard::barcode::Symbology;
    ///
    /// assert_eq!(Symbology::Ean13.check_digit("400638133393"), Some(1));
    /// assert_eq!(Symbology::UpcA.check_digit("03600029145"), Some(2));
    /// assert_eq!(Symbology::Ean8.check_digit("12345"), None);
    /// ```
    pub fn check_digit(&self, payload: &str) -> Option<u8> {
        let weights = self.weights()?;
        let expected_len = self.fixed_len()? - 1;
        if payload.len() != expected_len || !payload.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits: Vec<u8> = payload.bytes().map(|b| b - b'0').collect();
        Some(checksum(&digits, weights, expected_len))
    }

    /// Verify the trailing check digit of a full-length digit vector.
    ///
    /// `Err((expected, found))` on mismatch. `Other` always verifies.
    pub(crate) fn verify(&self, digits: &[u8]) -> Result<(), (u8, u8)> {
        let Some(weights) = self.weights() else {
            return Ok(());
        };
        let check_index = digits.len() - 1;
        let expected = checksum(digits, weights, check_index);
        let found = digits[check_index];
        if expected == found {
            Ok(())
        } else {
            Err((expected, found))
        }
    }

    fn weights(&self) -> Option<Weights> {
        match self {
            Symbology::Ean13 => Some(Weights::EAN13),
            Symbology::Ean8 | Symbology::UpcA => Some(Weights::ODD_LEADING),
            Symbology::Other => None,
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
