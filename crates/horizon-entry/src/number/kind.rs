//! The numeric kinds a number field can hold.

use std::fmt;

use super::format::{plain_f32, plain_f64};

/// A numeric type usable in a [`NumberEntryField`](super::NumberEntryField).
///
/// Implementations parse and render a plain decimal form: an optional
/// leading `-`, ASCII digits, and for decimal kinds at most one `.`.
/// Localization happens in the field.
pub trait EntryNumber: Clone + PartialOrd + fmt::Debug + Send + Sync + 'static {
    /// Whether the kind accepts a fractional part.
    const HAS_DECIMALS: bool;

    /// The kind's natural lower bound, if it has one.
    fn natural_min() -> Option<Self>;

    /// The kind's natural upper bound, if it has one.
    fn natural_max() -> Option<Self>;

    /// Parse plain decimal text.
    ///
    /// Returns `None` for malformed text and for values the kind cannot
    /// represent.
    fn parse_plain(text: &str) -> Option<Self>;

    /// Render the value in plain decimal form.
    fn to_plain(&self) -> String;

    /// Approximate the value as an `f64`.
    fn to_f64(&self) -> f64;

    /// The kind's zero.
    fn zero() -> Self;
}

/// Whether `text` is a plain decimal: `-`? digits (`.` digits)?.
///
/// Digits may be missing on one side of the point but not both.
pub(crate) fn is_plain_decimal(text: &str, allow_fraction: bool) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    let (whole, fraction) = match body.split_once('.') {
        Some(_) if !allow_fraction => return false,
        Some((whole, fraction)) => (whole, fraction),
        None => (body, ""),
    };
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    all_digits(whole) && all_digits(fraction) && !(whole.is_empty() && fraction.is_empty())
}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EntryNumber for $ty {
                const HAS_DECIMALS: bool = false;

                fn natural_min() -> Option<Self> {
                    Some(<$ty>::MIN)
                }

                fn natural_max() -> Option<Self> {
                    Some(<$ty>::MAX)
                }

                fn parse_plain(text: &str) -> Option<Self> {
                    if !is_plain_decimal(text, false) {
                        return None;
                    }
                    text.parse().ok()
                }

                fn to_plain(&self) -> String {
                    self.to_string()
                }

                fn to_f64(&self) -> f64 {
                    *self as f64
                }

                fn zero() -> Self {
                    0
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64);

macro_rules! impl_float {
    ($($ty:ty => $plain:ident),* $(,)?) => {
        $(
            impl EntryNumber for $ty {
                const HAS_DECIMALS: bool = true;

                fn natural_min() -> Option<Self> {
                    None
                }

                fn natural_max() -> Option<Self> {
                    None
                }

                fn parse_plain(text: &str) -> Option<Self> {
                    if !is_plain_decimal(text, true) {
                        return None;
                    }
                    let value: $ty = text.parse().ok()?;
                    value.is_finite().then_some(value)
                }

                fn to_plain(&self) -> String {
                    $plain(*self).unwrap_or_else(|| self.to_string())
                }

                fn to_f64(&self) -> f64 {
                    *self as f64
                }

                fn zero() -> Self {
                    0.0
                }
            }
        )*
    };
}

impl_float!(f32 => plain_f32, f64 => plain_f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_decimal_shape() {
        assert!(is_plain_decimal("12", false));
        assert!(is_plain_decimal("-12", false));
        assert!(!is_plain_decimal("1.2", false));
        assert!(is_plain_decimal("1.2", true));
        assert!(is_plain_decimal(".5", true));
        assert!(is_plain_decimal("5.", true));
        assert!(!is_plain_decimal(".", true));
        assert!(!is_plain_decimal("-", true));
        assert!(!is_plain_decimal("", true));
        assert!(!is_plain_decimal("1.2.3", true));
        assert!(!is_plain_decimal("+1", true));
        assert!(!is_plain_decimal("1e5", true));
        assert!(!is_plain_decimal("--1", true));
    }

    #[test]
    fn test_integer_kinds() {
        assert_eq!(i8::parse_plain("-128"), Some(-128));
        assert_eq!(i8::parse_plain("128"), None);
        assert_eq!(i16::parse_plain("1.0"), None);
        assert_eq!(i32::natural_max(), Some(i32::MAX));
        assert_eq!(i64::parse_plain("-9223372036854775808"), Some(i64::MIN));
        assert_eq!((-42i32).to_plain(), "-42");
        assert!(!i64::HAS_DECIMALS);
    }

    #[test]
    fn test_float_kinds() {
        assert_eq!(f64::parse_plain("1.25"), Some(1.25));
        assert_eq!(f64::parse_plain("-.5"), Some(-0.5));
        assert_eq!(f64::parse_plain("NaN"), None);
        assert_eq!(f64::parse_plain("inf"), None);
        assert_eq!(f64::parse_plain("1e3"), None);
        assert_eq!(f32::parse_plain("2.5"), Some(2.5));
        assert_eq!(1e-7f64.to_plain(), "0.0000001");
        assert_eq!(3.0f64.to_plain(), "3");
        assert_eq!(f64::natural_min(), None);
        assert!(f32::HAS_DECIMALS);
    }
}
