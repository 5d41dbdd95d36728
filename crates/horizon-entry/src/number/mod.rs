//! Numeric entry.
//!
//! A [`NumberEntryField`] is an [`EntryField`](crate::field::EntryField)
//! whose validator is a [`NumberValidator`]: only digits, a leading minus
//! and, for decimal kinds, one decimal separator can be typed, and a value
//! is complete when it parses, lies in the range and has no more than the
//! allowed number of decimals.
//!
//! The supported kinds are `i8`, `i16`, `i32`, `i64`, `f32`, `f64`,
//! [`BigInteger`] and [`BigDecimal`]. Any type implementing
//! [`EntryNumber`] works as well.
//!
//! # Example
//!
//! ```
//! use horizon_entry::number::NumberEntryField;
//!
//! let mut field = NumberEntryField::<i32>::new(5)
//!     .with_range(Some(0), Some(100))
//!     .unwrap();
//! assert_eq!(field.number(), Some(5));
//!
//! field.set_number(Some(500));
//! assert_eq!(field.number(), Some(5));
//! ```

mod big;
mod field;
mod format;
mod kind;

pub use big::{BigDecimal, BigInteger, ParseBigError};
pub use field::NumberEntryField;
pub use format::{
    MAX_EXPONENT, NumberDisplayFormatter, delocalize, expand_scientific, localize, plain_f32,
    plain_f64,
};
pub use kind::EntryNumber;

use crate::config::Messages;
use crate::validator::Validator;

/// Validator for numeric text.
///
/// The validator is immutable; fields build a new one whenever a numeric
/// setting changes.
#[derive(Debug, Clone)]
pub struct NumberValidator<T: EntryNumber> {
    min: Option<T>,
    max: Option<T>,
    decimal_count: Option<usize>,
    null_allowed: bool,
    separator: char,
    messages: Messages,
}

impl<T: EntryNumber> NumberValidator<T> {
    /// Create a validator for the kind's natural range.
    pub fn new(separator: char) -> Self {
        Self {
            min: T::natural_min(),
            max: T::natural_max(),
            decimal_count: None,
            null_allowed: false,
            separator,
            messages: Messages::default(),
        }
    }

    /// Set the bounds. `None` means unbounded on that side.
    pub fn with_range(mut self, min: Option<T>, max: Option<T>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Limit the number of decimals.
    pub fn with_decimal_count(mut self, decimal_count: Option<usize>) -> Self {
        self.decimal_count = decimal_count;
        self
    }

    /// Accept the empty text as "no value".
    pub fn with_null_allowed(mut self, null_allowed: bool) -> Self {
        self.null_allowed = null_allowed;
        self
    }

    /// Use custom message templates.
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// The decimal separator.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Parse localized text, ignoring range and decimal count.
    pub fn parse(&self, text: &str) -> Option<T> {
        T::parse_plain(&delocalize(text, self.separator))
    }

    /// Parse localized text into a value satisfying every constraint.
    pub fn number(&self, text: &str) -> Option<T> {
        let value = self.parse(text)?;
        (self.in_range(&value) && self.decimals_fit(text)).then_some(value)
    }

    /// Render a value as localized text.
    pub fn render(&self, value: &T) -> String {
        localize(&value.to_plain(), self.separator)
    }

    fn in_range(&self, value: &T) -> bool {
        self.min.as_ref().is_none_or(|min| value >= min)
            && self.max.as_ref().is_none_or(|max| value <= max)
    }

    fn decimals_fit(&self, text: &str) -> bool {
        let Some(limit) = self.decimal_count else {
            return true;
        };
        delocalize(text, self.separator)
            .split_once('.')
            .is_none_or(|(_, fraction)| fraction.chars().count() <= limit)
    }

    /// Whether the characters could form a number: digits, a digit-bearing
    /// body and at most one separator.
    fn has_number_shape(&self, text: &str) -> bool {
        let mut has_digit = false;
        let mut separators = 0;
        for (i, c) in text.chars().enumerate() {
            match c {
                '0'..='9' => has_digit = true,
                '-' if i == 0 => {}
                _ if T::HAS_DECIMALS && (c == self.separator || c == '.') => separators += 1,
                _ => return false,
            }
        }
        has_digit && separators <= 1
    }

    fn render_bound(&self, bound: Option<&T>, unbounded: &str) -> String {
        bound.map_or_else(|| unbounded.to_string(), |value| self.render(value))
    }
}

impl<T: EntryNumber> Validator for NumberValidator<T> {
    fn is_input_allowed(&self, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }
        let mut separators = 0;
        let shape_ok = text.chars().enumerate().all(|(i, c)| {
            if c.is_ascii_digit() || (c == '-' && i == 0) {
                true
            } else if T::HAS_DECIMALS && (c == self.separator || c == '.') {
                separators += 1;
                true
            } else {
                false
            }
        });
        shape_ok && separators <= 1
    }

    fn is_complete(&self, text: &str) -> bool {
        if text.is_empty() {
            return self.null_allowed;
        }
        self.number(text).is_some()
    }

    fn invalid_message(&self, text: &str) -> Option<String> {
        if text.is_empty() && self.null_allowed {
            return None;
        }
        if self.parse(text).is_none() {
            if !self.has_number_shape(text) {
                return Some(self.messages.invalid_format.clone());
            }
        } else if let Some(limit) = self.decimal_count
            && !self.decimals_fit(text)
        {
            return Some(self.messages.max_decimals(limit));
        }
        Some(self.messages.range(
            &self.render_bound(self.min.as_ref(), "-\u{221E}"),
            &self.render_bound(self.max.as_ref(), "+\u{221E}"),
        ))
    }

    fn default_valid_value(&self) -> String {
        let zero = T::zero();
        if self.in_range(&zero) {
            return self.render(&zero);
        }
        match (&self.min, &self.max) {
            (Some(min), _) if *min > zero => self.render(min),
            (_, Some(max)) => self.render(max),
            (Some(min), None) => self.render(min),
            (None, None) => self.render(&zero),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::ValidationState;

    #[test]
    fn test_input_filter_integers() {
        let validator = NumberValidator::<i32>::new('.');
        assert!(validator.is_input_allowed(""));
        assert!(validator.is_input_allowed("-"));
        assert!(validator.is_input_allowed("-12"));
        assert!(!validator.is_input_allowed("1-2"));
        assert!(!validator.is_input_allowed("1.2"));
        assert!(!validator.is_input_allowed("12a"));
        assert!(!validator.is_input_allowed("+1"));
    }

    #[test]
    fn test_input_filter_decimals() {
        let validator = NumberValidator::<f64>::new(',');
        assert!(validator.is_input_allowed("1,5"));
        assert!(validator.is_input_allowed("1.5"));
        assert!(validator.is_input_allowed("-,5"));
        assert!(!validator.is_input_allowed("1,5,"));
        assert!(!validator.is_input_allowed("1.5,2"));
    }

    #[test]
    fn test_completeness() {
        let validator = NumberValidator::<i8>::new('.');
        assert_eq!(validator.validate("12"), ValidationState::Acceptable);
        assert_eq!(validator.validate("-"), ValidationState::Intermediate);
        assert_eq!(validator.validate(""), ValidationState::Intermediate);
        assert_eq!(validator.validate("300"), ValidationState::Intermediate);
        assert_eq!(validator.validate("x"), ValidationState::Invalid);

        let nullable = validator.with_null_allowed(true);
        assert_eq!(nullable.validate(""), ValidationState::Acceptable);
    }

    #[test]
    fn test_range_and_decimals() {
        let validator = NumberValidator::<f64>::new(',')
            .with_range(Some(-1.0), Some(1.0))
            .with_decimal_count(Some(2));
        assert_eq!(validator.number("0,25"), Some(0.25));
        assert_eq!(validator.number("0,255"), None);
        assert_eq!(validator.number("1,5"), None);
        assert_eq!(validator.number("-1"), Some(-1.0));
    }

    #[test]
    fn test_invalid_messages() {
        let validator = NumberValidator::<i32>::new('.').with_range(Some(1), Some(10));
        assert_eq!(validator.invalid_message("-").as_deref(), Some("Invalid format"));
        assert_eq!(validator.invalid_message("").as_deref(), Some("Invalid format"));
        assert_eq!(validator.invalid_message("42").as_deref(), Some("Range: 1 .. 10"));
        assert_eq!(
            validator.invalid_message("99999999999").as_deref(),
            Some("Range: 1 .. 10")
        );

        let decimals = NumberValidator::<f64>::new('.').with_decimal_count(Some(1));
        assert_eq!(decimals.invalid_message("1.25").as_deref(), Some("Max decimals: 1"));
        assert_eq!(
            decimals.invalid_message("1.2").as_deref(),
            Some("Range: -\u{221E} .. +\u{221E}")
        );
    }

    #[test]
    fn test_range_message_is_localized() {
        let validator = NumberValidator::<f64>::new(',').with_range(Some(0.5), None);
        assert_eq!(
            validator.invalid_message("0,1").as_deref(),
            Some("Range: 0,5 .. +\u{221E}")
        );
    }

    #[test]
    fn test_default_valid_value() {
        let validator = NumberValidator::<i32>::new('.');
        assert_eq!(validator.default_valid_value(), "0");
        let positive = NumberValidator::<i32>::new('.').with_range(Some(5), Some(9));
        assert_eq!(positive.default_valid_value(), "5");
        let negative = NumberValidator::<i32>::new('.').with_range(Some(-9), Some(-5));
        assert_eq!(negative.default_valid_value(), "-5");
        let decimal = NumberValidator::<f64>::new(',').with_range(Some(1.5), None);
        assert_eq!(decimal.default_valid_value(), "1,5");
    }
}
