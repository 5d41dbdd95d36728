//! Plain decimal rendering of numbers.
//!
//! Numbers are kept in a plain decimal form (no exponent, `.` separator)
//! and localized only at the edge. Floating point values are rendered
//! through their shortest scientific form, then expanded, so that
//! `1.5e-7` shows as `0.00000015` and never as an exponent.

use crate::config::Separators;
use crate::formatter::Formatter;

/// Largest exponent magnitude [`expand_scientific`] accepts.
///
/// Covers every finite `f64`, whose decimal exponents stay within ±324.
pub const MAX_EXPONENT: i64 = 1000;

/// Expand a number written in scientific notation into plain decimal form.
///
/// Text without an exponent is returned with a trailing `.0` removed.
/// Returns `None` unless the mantissa is ASCII digits with at most one `.`
/// and the exponent is an integer within [`MAX_EXPONENT`].
///
/// # Example
///
/// ```
/// use horizon_entry::number::expand_scientific;
///
/// assert_eq!(expand_scientific("1.25e3").as_deref(), Some("1250"));
/// assert_eq!(expand_scientific("-4.5E-3").as_deref(), Some("-0.0045"));
/// assert_eq!(expand_scientific("12.0").as_deref(), Some("12"));
/// assert_eq!(expand_scientific("1e9223372036854775807"), None);
/// ```
pub fn expand_scientific(text: &str) -> Option<String> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(index) => {
            let exponent: i64 = body[index + 1..]
                .trim_start_matches('+')
                .parse()
                .ok()?;
            (&body[..index], Some(exponent))
        }
        None => (body, None),
    };
    if !is_mantissa(mantissa) {
        return None;
    }

    let plain = match exponent {
        None => mantissa.strip_suffix(".0").unwrap_or(mantissa).to_string(),
        Some(exponent) if exponent.unsigned_abs() > MAX_EXPONENT.unsigned_abs() => return None,
        Some(exponent) => {
            let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
            let digits = format!("{int_part}{frac_part}");
            let point = i64::try_from(int_part.len()).ok()?.checked_add(exponent)?;
            let length = i64::try_from(digits.len()).ok()?;

            let shifted = if point <= 0 {
                let zeros = usize::try_from(point.unsigned_abs()).ok()?;
                format!("0.{}{}", "0".repeat(zeros), digits)
            } else if point >= length {
                let zeros = usize::try_from(point - length).ok()?;
                format!("{}{}", digits, "0".repeat(zeros))
            } else {
                let (whole, fraction) = digits.split_at(usize::try_from(point).ok()?);
                format!("{whole}.{fraction}")
            };
            trim_number(&shifted)
        }
    };

    if negative && plain.chars().any(|c| c.is_ascii_digit() && c != '0') {
        Some(format!("-{plain}"))
    } else {
        Some(plain)
    }
}

/// ASCII digits with at most one `.`, and at least one digit.
fn is_mantissa(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
        && text.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && text.bytes().filter(|&b| b == b'.').count() <= 1
}

/// Remove redundant leading zeros of the integer part and trailing zeros of
/// the fraction.
fn trim_number(text: &str) -> String {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let whole = whole.trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Render an `f64` in plain decimal form.
pub fn plain_f64(value: f64) -> Option<String> {
    value
        .is_finite()
        .then(|| expand_scientific(&format!("{value:e}")))
        .flatten()
}

/// Render an `f32` in plain decimal form.
pub fn plain_f32(value: f32) -> Option<String> {
    value
        .is_finite()
        .then(|| expand_scientific(&format!("{value:e}")))
        .flatten()
}

/// Replace the internal `.` with `separator`.
pub fn localize(plain: &str, separator: char) -> String {
    plain.replace('.', &separator.to_string())
}

/// Replace `separator` with the internal `.`.
pub fn delocalize(text: &str, separator: char) -> String {
    text.replace(separator, ".")
}

/// A display formatter that groups the digits of committed numbers.
///
/// # Example
///
/// ```
/// use horizon_entry::config::Separators;
/// use horizon_entry::formatter::Formatter;
/// use horizon_entry::number::NumberDisplayFormatter;
///
/// let formatter = NumberDisplayFormatter::new(Separators { decimal: ',', grouping: '.' });
/// let shown = formatter.format("-1234567,25").unwrap();
/// assert_eq!(shown, "-1.234.567,25");
/// assert_eq!(formatter.parse_display(&shown), "-1234567,25");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberDisplayFormatter {
    separators: Separators,
}

impl NumberDisplayFormatter {
    /// Create a grouping formatter.
    pub fn new(separators: Separators) -> Self {
        Self { separators }
    }

    /// Get the separators.
    pub fn separators(&self) -> Separators {
        self.separators
    }

    /// Turn display text back into the field's text.
    pub fn parse_display(&self, display: &str) -> String {
        display
            .chars()
            .filter(|c| *c != self.separators.grouping)
            .collect()
    }
}

impl Formatter for NumberDisplayFormatter {
    fn format(&self, valid_text: &str) -> Option<String> {
        if valid_text.is_empty() {
            return None;
        }
        let (sign, body) = match valid_text.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", valid_text),
        };
        let (whole, fraction) = match body.split_once([self.separators.decimal, '.']) {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (body, None),
        };

        let digits: Vec<char> = whole.chars().collect();
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.separators.grouping);
            }
            grouped.push(*c);
        }

        Some(match fraction {
            Some(fraction) => format!("{sign}{grouped}{}{fraction}", self.separators.decimal),
            None => format!("{sign}{grouped}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_positive_exponents() {
        assert_eq!(expand_scientific("1e3").as_deref(), Some("1000"));
        assert_eq!(expand_scientific("1.5e1").as_deref(), Some("15"));
        assert_eq!(expand_scientific("1.234e1").as_deref(), Some("12.34"));
        assert_eq!(expand_scientific("1.234E+3").as_deref(), Some("1234"));
        assert_eq!(expand_scientific("9.87e0").as_deref(), Some("9.87"));
    }

    #[test]
    fn test_expand_negative_exponents() {
        assert_eq!(expand_scientific("1e-3").as_deref(), Some("0.001"));
        assert_eq!(expand_scientific("1.5e-7").as_deref(), Some("0.00000015"));
        assert_eq!(expand_scientific("-2.5e-1").as_deref(), Some("-0.25"));
    }

    #[test]
    fn test_expand_zero_and_plain() {
        assert_eq!(expand_scientific("0e0").as_deref(), Some("0"));
        assert_eq!(expand_scientific("-0e0").as_deref(), Some("0"));
        assert_eq!(expand_scientific("42").as_deref(), Some("42"));
        assert_eq!(expand_scientific("-3.0").as_deref(), Some("-3"));
        assert_eq!(expand_scientific("1.5").as_deref(), Some("1.5"));
        assert_eq!(expand_scientific("1e+x"), None);
    }

    #[test]
    fn test_expand_rejects_malformed_text() {
        assert_eq!(expand_scientific("aée-1"), None);
        assert_eq!(expand_scientific("1.2.3e1"), None);
        assert_eq!(expand_scientific("e5"), None);
        assert_eq!(expand_scientific(".e5"), None);
        assert_eq!(expand_scientific("--1"), None);
        assert_eq!(expand_scientific("1,5"), None);
        assert_eq!(expand_scientific(""), None);
    }

    #[test]
    fn test_expand_rejects_huge_exponents() {
        assert_eq!(expand_scientific("1e9223372036854775807"), None);
        assert_eq!(expand_scientific("1e-9223372036854775808"), None);
        assert_eq!(expand_scientific("1e4000000000"), None);
        assert_eq!(expand_scientific("1e1001"), None);
        assert_eq!(expand_scientific("1e-1001"), None);
        assert_eq!(
            expand_scientific("1e1000").map(|plain| plain.len()),
            Some(1001)
        );
    }

    #[test]
    fn test_plain_floats() {
        assert_eq!(plain_f64(1500.0).as_deref(), Some("1500"));
        assert_eq!(plain_f64(0.1).as_deref(), Some("0.1"));
        assert_eq!(plain_f64(1e21).as_deref(), Some("1000000000000000000000"));
        assert_eq!(plain_f64(-0.000123).as_deref(), Some("-0.000123"));
        assert_eq!(plain_f64(f64::NAN), None);
        assert_eq!(plain_f64(f64::INFINITY), None);
        assert_eq!(plain_f32(2.5).as_deref(), Some("2.5"));
    }

    #[test]
    fn test_localize() {
        assert_eq!(localize("-1.5", ','), "-1,5");
        assert_eq!(delocalize("-1,5", ','), "-1.5");
        assert_eq!(delocalize("1.5", '.'), "1.5");
    }

    #[test]
    fn test_grouping() {
        let formatter = NumberDisplayFormatter::new(Separators::default());
        assert_eq!(formatter.format("").as_deref(), None);
        assert_eq!(formatter.format("123").as_deref(), Some("123"));
        assert_eq!(formatter.format("1234").as_deref(), Some("1,234"));
        assert_eq!(formatter.format("-123456.75").as_deref(), Some("-123,456.75"));
        assert_eq!(formatter.parse_display("-123,456.75"), "-123456.75");
    }

    #[test]
    fn test_grouping_accepts_either_decimal_point() {
        let formatter = NumberDisplayFormatter::new(Separators {
            decimal: ',',
            grouping: '.',
        });
        assert_eq!(formatter.format("1234,5").as_deref(), Some("1.234,5"));
        assert_eq!(formatter.format("1234.5").as_deref(), Some("1.234,5"));
        assert_eq!(formatter.parse_display("1.234,5"), "1234,5");
    }
}
