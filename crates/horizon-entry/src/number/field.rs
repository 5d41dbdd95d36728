//! The numeric entry field.

use std::fmt;
use std::sync::Arc;

use horizon_entry_core::logging::targets;
use horizon_entry_core::{Clock, NumberError};

use super::format::{NumberDisplayFormatter, localize, plain_f64};
use super::{EntryNumber, NumberValidator};
use crate::buffer::EditOutcome;
use crate::config::{FieldConfig, Separators};
use crate::field::{EntryField, FieldHost};
use crate::formatter::Formatter;
use crate::validator::Validator;

/// An entry field holding a number of kind `T`.
///
/// Typing `k`/`K` multiplies the value by a thousand or divides it by a
/// thousand, and `m`/`M` does the same with a million. The rest of the
/// field behavior is the wrapped [`EntryField`], reachable through
/// [`as_field`](Self::as_field) and [`as_field_mut`](Self::as_field_mut).
pub struct NumberEntryField<T: EntryNumber> {
    field: EntryField,
    min: Option<T>,
    max: Option<T>,
    decimal_count: Option<usize>,
    null_allowed: bool,
    separators: Separators,
    grouping: bool,
    custom_validator: Option<Arc<dyn Validator>>,
}

impl<T: EntryNumber> fmt::Debug for NumberEntryField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberEntryField")
            .field("field", &self.field)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("decimal_count", &self.decimal_count)
            .field("null_allowed", &self.null_allowed)
            .field("separators", &self.separators)
            .finish_non_exhaustive()
    }
}

impl<T: EntryNumber> NumberEntryField<T> {
    /// Create a field holding `value`, over the kind's natural range and
    /// with the system separators.
    pub fn new(value: T) -> Self {
        Self::with_separators(value, Separators::system())
    }

    /// Create a field with explicit separators.
    pub fn with_separators(value: T, separators: Separators) -> Self {
        let mut field = Self {
            field: EntryField::new("0"),
            min: T::natural_min(),
            max: T::natural_max(),
            decimal_count: None,
            null_allowed: false,
            separators,
            grouping: false,
            custom_validator: None,
        };
        field.install_validator();
        field.set_number(Some(value));
        field
    }

    /// Create a field that starts empty. Null values are allowed.
    pub fn empty() -> Self {
        let mut field = Self::new(T::zero());
        field.set_null_allowed(true);
        field.set_number(None);
        field
    }

    /// Restrict the range. See [`set_range`](Self::set_range).
    ///
    /// # Errors
    ///
    /// Fails if the minimum is greater than the maximum.
    pub fn with_range(mut self, min: Option<T>, max: Option<T>) -> Result<Self, NumberError> {
        self.set_range(min, max)?;
        Ok(self)
    }

    /// Limit the number of decimals.
    pub fn with_decimal_count(mut self, decimal_count: usize) -> Self {
        self.set_decimal_count(Some(decimal_count));
        self
    }

    /// Allow the empty text as "no value".
    pub fn with_null_allowed(mut self, null_allowed: bool) -> Self {
        self.set_null_allowed(null_allowed);
        self
    }

    /// Show committed values with grouped digits.
    pub fn with_grouping(mut self, grouping: bool) -> Self {
        self.set_grouping(grouping);
        self
    }

    /// Apply a field configuration.
    pub fn with_config(mut self, config: &FieldConfig) -> Self {
        self.field.apply_config(config);
        self.install_validator();
        self
    }

    /// Use a specific clock for feedback timing.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.field = self.field.with_clock(clock);
        self
    }

    /// Attach the rendering collaborator.
    pub fn with_host(mut self, host: Arc<dyn FieldHost>) -> Self {
        self.field = self.field.with_host(host);
        self
    }

    // =========================================================================
    // Numeric settings
    // =========================================================================

    /// The lower bound.
    pub fn min(&self) -> Option<&T> {
        self.min.as_ref()
    }

    /// The upper bound.
    pub fn max(&self) -> Option<&T> {
        self.max.as_ref()
    }

    /// Set the range. A missing bound falls back to the kind's natural
    /// bound, or to no bound for kinds without one.
    ///
    /// The current value is revalidated against the new range.
    ///
    /// # Errors
    ///
    /// Fails if the minimum is greater than the maximum. The range is left
    /// unchanged.
    pub fn set_range(&mut self, min: Option<T>, max: Option<T>) -> Result<(), NumberError> {
        let min = min.or_else(T::natural_min);
        let max = max.or_else(T::natural_max);
        if let (Some(low), Some(high)) = (&min, &max)
            && low > high
        {
            tracing::warn!(target: targets::NUMBER, min = ?low, max = ?high, "inverted range rejected");
            return Err(NumberError::InvertedRange {
                min: low.to_plain(),
                max: high.to_plain(),
            });
        }
        self.min = min;
        self.max = max;
        self.install_validator();
        Ok(())
    }

    /// The decimal limit.
    pub fn decimal_count(&self) -> Option<usize> {
        self.decimal_count
    }

    /// Set the decimal limit. `None` removes it.
    pub fn set_decimal_count(&mut self, decimal_count: Option<usize>) {
        if !T::HAS_DECIMALS && decimal_count.is_some_and(|count| count > 0) {
            tracing::warn!(target: targets::NUMBER, ?decimal_count, "decimal count set on an integer kind");
        }
        self.decimal_count = decimal_count;
        self.install_validator();
    }

    /// Whether the empty text is accepted.
    pub fn is_null_allowed(&self) -> bool {
        self.null_allowed
    }

    /// Set whether the empty text is accepted.
    pub fn set_null_allowed(&mut self, null_allowed: bool) {
        self.null_allowed = null_allowed;
        self.install_validator();
    }

    /// The decimal separator.
    pub fn decimal_separator(&self) -> char {
        self.separators.decimal
    }

    /// The separators.
    pub fn separators(&self) -> Separators {
        self.separators
    }

    /// Whether committed values are shown with grouped digits.
    pub fn is_grouping(&self) -> bool {
        self.grouping
    }

    /// Set whether committed values are shown with grouped digits.
    pub fn set_grouping(&mut self, grouping: bool) {
        self.grouping = grouping;
        let formatter = grouping.then(|| {
            Arc::new(NumberDisplayFormatter::new(self.separators)) as Arc<dyn Formatter>
        });
        self.field.set_formatter(formatter);
    }

    /// Replace the numeric validator. `None` restores it.
    pub fn set_validator(&mut self, validator: Option<Arc<dyn Validator>>) {
        self.custom_validator = validator;
        self.install_validator();
    }

    /// The validator for the current settings.
    pub fn number_validator(&self) -> NumberValidator<T> {
        NumberValidator::new(self.separators.decimal)
            .with_range(self.min.clone(), self.max.clone())
            .with_decimal_count(self.decimal_count)
            .with_null_allowed(self.null_allowed)
            .with_messages(self.field.messages().clone())
    }

    fn install_validator(&mut self) {
        let validator = match &self.custom_validator {
            Some(custom) => Arc::clone(custom),
            None => Arc::new(self.number_validator()),
        };
        self.field.set_validator(Some(validator));
    }

    // =========================================================================
    // Value
    // =========================================================================

    /// The last valid value. `None` when the field is empty.
    pub fn number(&self) -> Option<T> {
        self.number_validator().number(self.field.valid_text())
    }

    /// Set the value.
    ///
    /// `None` clears the field when null values are allowed and is ignored
    /// otherwise. Values the field does not accept leave the last valid
    /// value in place.
    pub fn set_number(&mut self, value: Option<T>) {
        match value {
            Some(value) => {
                let text = localize(&value.to_plain(), self.separators.decimal);
                self.field.set_text(&text);
            }
            None if self.null_allowed => self.field.set_text(""),
            None => {
                tracing::warn!(target: targets::NUMBER, "cannot clear a field that does not allow null");
            }
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Type text at the caret. A single `k`, `K`, `m` or `M` scales the
    /// value instead of being inserted.
    ///
    /// A typed `.` is stored as the locale's decimal separator.
    pub fn type_text(&mut self, text: &str) -> EditOutcome {
        match text {
            "k" => self.scale(|value| value * 1e3),
            "K" => self.scale(|value| value / 1e3),
            "m" => self.scale(|value| value * 1e6),
            "M" => self.scale(|value| value / 1e6),
            _ => {
                let text = self.localize_input(text);
                self.field.type_text(&text)
            }
        }
    }

    /// Replace the selection with `text`, ignoring surrounding whitespace.
    /// A `.` is stored as the locale's decimal separator.
    pub fn replace_selection(&mut self, text: &str) -> EditOutcome {
        let text = self.localize_input(text.trim());
        self.field.replace_selection(&text)
    }

    fn localize_input(&self, text: &str) -> String {
        localize(text, self.separators.decimal)
    }

    fn scale(&mut self, op: impl FnOnce(f64) -> f64) -> EditOutcome {
        let Some(value) = self.number_validator().parse(self.field.display_text()) else {
            return EditOutcome::Rejected;
        };
        let Some(plain) = plain_f64(op(value.to_f64())) else {
            tracing::debug!(target: targets::NUMBER, "scaled value is not finite");
            return EditOutcome::Rejected;
        };
        let text = localize(&plain, self.separators.decimal);
        tracing::debug!(target: targets::NUMBER, %text, "scaling value");
        self.field.set_text(&text);
        let end = self.field.display_text().chars().count();
        self.field.set_caret(end);
        if self.field.display_text() == text {
            EditOutcome::Applied
        } else {
            EditOutcome::Rejected
        }
    }

    // =========================================================================
    // Field access
    // =========================================================================

    /// The wrapped field.
    pub fn as_field(&self) -> &EntryField {
        &self.field
    }

    /// The wrapped field, mutably.
    ///
    /// Typing through the wrapped field bypasses the scaling keys.
    pub fn as_field_mut(&mut self) -> &mut EntryField {
        &mut self.field
    }

    /// Unwrap the field.
    pub fn into_field(self) -> EntryField {
        self.field
    }
}

impl<T: EntryNumber + Default> Default for NumberEntryField<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::{BigDecimal, BigInteger};

    const DOT: Separators = Separators {
        decimal: '.',
        grouping: ',',
    };
    const COMMA: Separators = Separators {
        decimal: ',',
        grouping: '.',
    };

    #[test]
    fn test_new_holds_value() {
        let field = NumberEntryField::<i32>::with_separators(42, DOT);
        assert_eq!(field.number(), Some(42));
        assert_eq!(field.as_field().display_text(), "42");
    }

    #[test]
    fn test_set_number_outside_range_keeps_last() {
        let mut field = NumberEntryField::<i32>::with_separators(5, DOT)
            .with_range(Some(0), Some(10))
            .unwrap();
        field.set_number(Some(11));
        assert_eq!(field.number(), Some(5));
        field.set_number(Some(10));
        assert_eq!(field.number(), Some(10));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut field = NumberEntryField::<i32>::with_separators(5, DOT);
        let err = field.set_range(Some(10), Some(1)).unwrap_err();
        assert_eq!(
            err,
            NumberError::InvertedRange {
                min: "10".to_string(),
                max: "1".to_string()
            }
        );
        assert_eq!(field.min(), Some(&i32::MIN));
    }

    #[test]
    fn test_missing_bounds_fall_back_to_natural() {
        let mut field = NumberEntryField::<i8>::with_separators(0, DOT);
        field.set_range(Some(-5), None).unwrap();
        assert_eq!(field.min(), Some(&-5));
        assert_eq!(field.max(), Some(&i8::MAX));

        let mut decimal = NumberEntryField::<f64>::with_separators(0.0, DOT);
        decimal.set_range(None, Some(1.0)).unwrap();
        assert_eq!(decimal.min(), None);
    }

    #[test]
    fn test_narrowing_range_revalidates() {
        let mut field = NumberEntryField::<i32>::with_separators(50, DOT);
        field.set_range(Some(1), Some(10)).unwrap();
        assert_eq!(field.number(), Some(1));
    }

    #[test]
    fn test_null_handling() {
        let mut field = NumberEntryField::<i32>::with_separators(3, DOT);
        field.set_number(None);
        assert_eq!(field.number(), Some(3));

        field.set_null_allowed(true);
        field.set_number(None);
        assert_eq!(field.number(), None);
        assert_eq!(field.as_field().valid_text(), "");

        let empty = NumberEntryField::<i64>::empty();
        assert_eq!(empty.number(), None);
    }

    #[test]
    fn test_decimal_separator() {
        let mut field = NumberEntryField::<f64>::with_separators(1.5, COMMA);
        assert_eq!(field.as_field().display_text(), "1,5");
        field.set_number(Some(-0.25));
        assert_eq!(field.as_field().valid_text(), "-0,25");
        assert_eq!(field.number(), Some(-0.25));
    }

    #[test]
    fn test_typed_point_becomes_locale_separator() {
        let mut field = NumberEntryField::<f64>::with_separators(0.0, COMMA).with_grouping(true);
        field.as_field_mut().focus_gained(false);
        assert!(field.type_text("1234.5").is_applied());
        assert_eq!(field.as_field().display_text(), "1234,5");

        field.as_field_mut().focus_lost(false);
        assert_eq!(field.as_field().valid_text(), "1234,5");
        assert_eq!(field.as_field().display_text(), "1.234,5");
        assert_eq!(field.number(), Some(1234.5));

        let formatter = NumberDisplayFormatter::new(COMMA);
        assert_eq!(
            formatter.parse_display(field.as_field().display_text()),
            field.as_field().valid_text()
        );
    }

    #[test]
    fn test_pasted_point_becomes_locale_separator() {
        let mut field = NumberEntryField::<f64>::with_separators(0.0, COMMA);
        field.as_field_mut().focus_gained(false);
        field.as_field_mut().select_all();
        assert!(field.replace_selection(" -0.25 ").is_applied());
        assert_eq!(field.as_field().display_text(), "-0,25");
    }

    #[test]
    fn test_decimal_count() {
        let mut field = NumberEntryField::<f64>::with_separators(0.0, DOT).with_decimal_count(2);
        field.set_number(Some(1.25));
        assert_eq!(field.number(), Some(1.25));
        field.set_number(Some(1.255));
        assert_eq!(field.number(), Some(1.25));
    }

    #[test]
    fn test_typing_digits() {
        let mut field = NumberEntryField::<i32>::with_separators(0, DOT);
        field.as_field_mut().focus_gained(false);
        assert!(field.type_text("7").is_applied());
        assert_eq!(field.as_field().display_text(), "7");
        assert_eq!(field.type_text("x"), EditOutcome::Rejected);
        assert_eq!(field.number(), Some(0));

        field.as_field_mut().commit();
        assert_eq!(field.number(), Some(7));
    }

    #[test]
    fn test_scaling_keys() {
        let mut field = NumberEntryField::<f64>::with_separators(1.5, DOT);
        assert_eq!(field.type_text("k"), EditOutcome::Applied);
        assert_eq!(field.number(), Some(1500.0));
        assert_eq!(field.as_field().caret(), 4);

        assert_eq!(field.type_text("m"), EditOutcome::Applied);
        assert_eq!(field.as_field().display_text(), "1500000000");

        field.type_text("M");
        field.type_text("K");
        assert_eq!(field.as_field().display_text(), "1.5");
    }

    #[test]
    fn test_scaling_integer_to_fraction_is_rejected() {
        let mut field = NumberEntryField::<i32>::with_separators(5, DOT);
        assert_eq!(field.type_text("K"), EditOutcome::Rejected);
        assert_eq!(field.number(), Some(5));
        assert_eq!(field.type_text("k"), EditOutcome::Applied);
        assert_eq!(field.number(), Some(5000));
    }

    #[test]
    fn test_replace_selection_trims() {
        let mut field = NumberEntryField::<i32>::with_separators(0, DOT);
        field.as_field_mut().focus_gained(false);
        field.as_field_mut().select_all();
        assert!(field.replace_selection("  123 ").is_applied());
        assert_eq!(field.as_field().display_text(), "123");
    }

    #[test]
    fn test_grouping_display() {
        let mut field = NumberEntryField::<i64>::with_separators(1234567, COMMA).with_grouping(true);
        assert_eq!(field.as_field().display_text(), "1.234.567");
        assert_eq!(field.number(), Some(1234567));

        field.as_field_mut().focus_gained(false);
        assert_eq!(field.as_field().display_text(), "1234567");
    }

    #[test]
    fn test_big_kinds() {
        let value: BigInteger = "123456789012345678901234567890".parse().unwrap();
        let field = NumberEntryField::with_separators(value.clone(), DOT);
        assert_eq!(field.number(), Some(value));

        let decimal: BigDecimal = "0.10".parse().unwrap();
        let field = NumberEntryField::with_separators(decimal, COMMA);
        assert_eq!(field.as_field().display_text(), "0,10");
    }

    #[test]
    fn test_custom_validator_survives_numeric_setters() {
        use crate::validator::FnValidator;

        let mut field = NumberEntryField::<i32>::with_separators(2, DOT);
        let even = FnValidator::new(|text| text.parse::<i32>().is_ok_and(|n| n % 2 == 0));
        field.set_validator(Some(Arc::new(even)));
        field.set_decimal_count(Some(0));
        field.set_number(Some(3));
        assert_eq!(field.as_field().valid_text(), "2");

        field.set_validator(None);
        field.set_number(Some(3));
        assert_eq!(field.number(), Some(3));
    }
}
