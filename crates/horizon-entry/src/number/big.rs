//! Arbitrary-size numbers kept as decimal text.
//!
//! Fields only parse, compare and display numbers, so these types store
//! normalized digit strings and compare them numerically without doing
//! arithmetic.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::kind::{EntryNumber, is_plain_decimal};

/// Error returned when text is not a plain decimal number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a plain decimal number: {0:?}")]
pub struct ParseBigError(String);

/// An integer of any size.
///
/// ```
/// use horizon_entry::number::BigInteger;
///
/// let big: BigInteger = "-000123456789012345678901234567890".parse().unwrap();
/// assert_eq!(big.to_string(), "-123456789012345678901234567890");
/// assert!(big < "0".parse().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInteger {
    negative: bool,
    /// No leading zeros; `"0"` for zero.
    digits: String,
}

impl BigInteger {
    /// Whether the value is below zero.
    pub fn is_negative(&self) -> bool {
        self.negative
    }
}

impl FromStr for BigInteger {
    type Err = ParseBigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if !is_plain_decimal(text, false) {
            return Err(ParseBigError(text.to_string()));
        }
        let (negative, body) = split_sign(text);
        let digits = strip_leading_zeros(body);
        Ok(Self {
            negative: negative && digits != "0",
            digits,
        })
    }
}

impl fmt::Display for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(&self.digits)
    }
}

impl Ord for BigInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_signed(
            self.negative,
            other.negative,
            compare_magnitude(&self.digits, "", &other.digits, ""),
        )
    }
}

impl PartialOrd for BigInteger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl EntryNumber for BigInteger {
    const HAS_DECIMALS: bool = false;

    fn natural_min() -> Option<Self> {
        None
    }

    fn natural_max() -> Option<Self> {
        None
    }

    fn parse_plain(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn to_plain(&self) -> String {
        self.to_string()
    }

    fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    fn zero() -> Self {
        Self {
            negative: false,
            digits: "0".to_string(),
        }
    }
}

/// A decimal number of any size and scale.
///
/// Comparison and equality are numeric, so `1.50 == 1.5`. Display keeps
/// the digits as they were written, trailing zeros included.
///
/// ```
/// use horizon_entry::number::BigDecimal;
///
/// let a: BigDecimal = "1.50".parse().unwrap();
/// let b: BigDecimal = "1.5".parse().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "1.50");
/// assert_eq!(a.scale(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct BigDecimal {
    negative: bool,
    /// No leading zeros; `"0"` when the integer part is zero.
    whole: String,
    /// As written, trailing zeros included.
    fraction: String,
}

impl BigDecimal {
    /// Whether the value is below zero.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// The number of digits after the decimal point, as written.
    pub fn scale(&self) -> usize {
        self.fraction.len()
    }

    fn significant_fraction(&self) -> &str {
        self.fraction.trim_end_matches('0')
    }

    fn is_zero(&self) -> bool {
        self.whole == "0" && self.significant_fraction().is_empty()
    }
}

impl FromStr for BigDecimal {
    type Err = ParseBigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if !is_plain_decimal(text, true) {
            return Err(ParseBigError(text.to_string()));
        }
        let (negative, body) = split_sign(text);
        let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
        let mut value = Self {
            negative,
            whole: strip_leading_zeros(whole),
            fraction: fraction.to_string(),
        };
        value.negative = negative && !value.is_zero();
        Ok(value)
    }
}

impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(&self.whole)?;
        if !self.fraction.is_empty() {
            write!(f, ".{}", self.fraction)?;
        }
        Ok(())
    }
}

impl PartialEq for BigDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BigDecimal {}

impl Ord for BigDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_signed(
            self.negative,
            other.negative,
            compare_magnitude(
                &self.whole,
                self.significant_fraction(),
                &other.whole,
                other.significant_fraction(),
            ),
        )
    }
}

impl PartialOrd for BigDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl EntryNumber for BigDecimal {
    const HAS_DECIMALS: bool = true;

    fn natural_min() -> Option<Self> {
        None
    }

    fn natural_max() -> Option<Self> {
        None
    }

    fn parse_plain(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn to_plain(&self) -> String {
        self.to_string()
    }

    fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    fn zero() -> Self {
        Self {
            negative: false,
            whole: "0".to_string(),
            fraction: String::new(),
        }
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    }
}

fn strip_leading_zeros(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Compare two non-negative numbers given as normalized integer digits and
/// fraction digits without trailing zeros.
fn compare_magnitude(a_whole: &str, a_fraction: &str, b_whole: &str, b_fraction: &str) -> Ordering {
    a_whole
        .len()
        .cmp(&b_whole.len())
        .then_with(|| a_whole.cmp(b_whole))
        .then_with(|| a_fraction.cmp(b_fraction))
}

fn compare_signed(a_negative: bool, b_negative: bool, magnitude: Ordering) -> Ordering {
    match (a_negative, b_negative) {
        (false, true) => Ordering::Greater,
        (true, false) => Ordering::Less,
        (false, false) => magnitude,
        (true, true) => magnitude.reverse(),
    }
}
