//! Input validation for entry fields.
//!
//! A validator answers two questions about a text:
//!
//! - may this text be typed at all? ([`Validator::is_input_allowed`])
//! - is this text a finished, committable value? ([`Validator::is_complete`])
//!
//! Text that may be typed but is not complete stays in the field while the
//! user keeps editing; it is reported after a short delay and reverted (or
//! trapped) when the field loses focus.
//!
//! # Validation States
//!
//! The two answers combine into a [`ValidationState`]:
//!
//! - [`ValidationState::Invalid`]: the text may not be typed
//! - [`ValidationState::Intermediate`]: the text may be typed but is not complete
//! - [`ValidationState::Acceptable`]: the text is a valid value
//!
//! # Built-in Validators
//!
//! - [`RegexValidator`]: validates against regular expressions
//! - [`FnValidator`]: validates with closures
//! - [`LengthValidator`]: validates the number of characters
//!
//! # Example
//!
//! ```
//! use horizon_entry::validator::{RegexValidator, ValidationState, Validator};
//!
//! let validator = RegexValidator::new(r"[A-Z]{3}")
//!     .unwrap()
//!     .with_partial(r"[A-Z]{0,3}")
//!     .unwrap();
//!
//! assert_eq!(validator.validate("ABC"), ValidationState::Acceptable);
//! assert_eq!(validator.validate("AB"), ValidationState::Intermediate);
//! assert_eq!(validator.validate("ab"), ValidationState::Invalid);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::{Messages, fill_template};

/// The result of validating a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidationState {
    /// The text may not be typed.
    Invalid,
    /// The text may be typed but is not a complete value.
    Intermediate,
    /// The text is a complete, valid value.
    #[default]
    Acceptable,
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationState::Invalid => write!(f, "Invalid"),
            ValidationState::Intermediate => write!(f, "Intermediate"),
            ValidationState::Acceptable => write!(f, "Acceptable"),
        }
    }
}

/// Trait for entry validators.
///
/// Every method has a permissive default, so an empty implementation
/// accepts everything. Validators are pure functions of the text.
///
/// # Thread Safety
///
/// Validators must be `Send + Sync` so fields can share them.
pub trait Validator: Send + Sync {
    /// Check whether `text` may be typed at all.
    ///
    /// This is a pre-filter run on every keystroke, before the text is
    /// stored. It should reject text that no further editing could fix.
    fn is_input_allowed(&self, _text: &str) -> bool {
        true
    }

    /// Check whether `text` is a complete, committable value.
    fn is_complete(&self, _text: &str) -> bool {
        true
    }

    /// A human-readable explanation of why `text` is not valid.
    ///
    /// `None` lets the field use its generic message.
    fn invalid_message(&self, _text: &str) -> Option<String> {
        None
    }

    /// The value used when no valid value exists yet.
    fn default_valid_value(&self) -> String {
        String::new()
    }

    /// Combine the two predicates into a [`ValidationState`].
    fn validate(&self, text: &str) -> ValidationState {
        if !self.is_input_allowed(text) {
            ValidationState::Invalid
        } else if !self.is_complete(text) {
            ValidationState::Intermediate
        } else {
            ValidationState::Acceptable
        }
    }
}

// Allow using Arc<dyn Validator> as a Validator
impl<V: Validator + ?Sized> Validator for Arc<V> {
    fn is_input_allowed(&self, text: &str) -> bool {
        (**self).is_input_allowed(text)
    }

    fn is_complete(&self, text: &str) -> bool {
        (**self).is_complete(text)
    }

    fn invalid_message(&self, text: &str) -> Option<String> {
        (**self).invalid_message(text)
    }

    fn default_valid_value(&self) -> String {
        (**self).default_valid_value()
    }
}

// Allow using Box<dyn Validator> as a Validator
impl<V: Validator + ?Sized> Validator for Box<V> {
    fn is_input_allowed(&self, text: &str) -> bool {
        (**self).is_input_allowed(text)
    }

    fn is_complete(&self, text: &str) -> bool {
        (**self).is_complete(text)
    }

    fn invalid_message(&self, text: &str) -> Option<String> {
        (**self).invalid_message(text)
    }

    fn default_valid_value(&self) -> String {
        (**self).default_valid_value()
    }
}

/// A validator that accepts everything.
///
/// Fields fall back to it when no validator is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {}

/// Validator for text matching regular expressions.
///
/// Both patterns must match the whole text; they are anchored internally.
/// Without a partial pattern any text may be typed.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: String,
    complete: regex::Regex,
    partial: Option<regex::Regex>,
    message: Option<String>,
    default_value: String,
}

impl RegexValidator {
    /// Create a validator whose complete values match `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: pattern.to_string(),
            complete: anchored(pattern)?,
            partial: None,
            message: None,
            default_value: String::new(),
        })
    }

    /// Restrict what may be typed to text matching `pattern`.
    pub fn with_partial(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.partial = Some(anchored(pattern)?);
        Ok(self)
    }

    /// Set the message reported for incomplete text.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the default valid value.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Get the complete-value pattern as given.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

fn anchored(pattern: &str) -> Result<regex::Regex, regex::Error> {
    regex::Regex::new(&format!("^(?:{pattern})$"))
}

impl Validator for RegexValidator {
    fn is_input_allowed(&self, text: &str) -> bool {
        self.partial
            .as_ref()
            .is_none_or(|partial| partial.is_match(text))
    }

    fn is_complete(&self, text: &str) -> bool {
        self.complete.is_match(text)
    }

    fn invalid_message(&self, _text: &str) -> Option<String> {
        self.message.clone()
    }

    fn default_valid_value(&self) -> String {
        self.default_value.clone()
    }
}

type TextPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;
type TextMessage = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A validator built from closures.
///
/// # Example
///
/// ```
/// use horizon_entry::validator::{FnValidator, Validator};
///
/// let even = FnValidator::new(|text| text.parse::<u32>().is_ok_and(|n| n % 2 == 0))
///     .with_input_filter(|text| text.chars().all(|c| c.is_ascii_digit()))
///     .with_message(|_| Some("Even numbers only".to_string()))
///     .with_default("0");
///
/// assert!(even.is_complete("42"));
/// assert!(!even.is_complete("7"));
/// assert!(!even.is_input_allowed("4a"));
/// assert_eq!(even.default_valid_value(), "0");
/// ```
pub struct FnValidator {
    complete_fn: TextPredicate,
    input_fn: Option<TextPredicate>,
    message_fn: Option<TextMessage>,
    default_value: String,
}

impl FnValidator {
    /// Create a validator whose complete values satisfy `complete_fn`.
    pub fn new<F>(complete_fn: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            complete_fn: Box::new(complete_fn),
            input_fn: None,
            message_fn: None,
            default_value: String::new(),
        }
    }

    /// Add a keystroke filter.
    pub fn with_input_filter<F>(mut self, input_fn: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.input_fn = Some(Box::new(input_fn));
        self
    }

    /// Add a message function.
    pub fn with_message<F>(mut self, message_fn: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.message_fn = Some(Box::new(message_fn));
        self
    }

    /// Set the default valid value.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }
}

impl Validator for FnValidator {
    fn is_input_allowed(&self, text: &str) -> bool {
        self.input_fn.as_ref().is_none_or(|f| f(text))
    }

    fn is_complete(&self, text: &str) -> bool {
        (self.complete_fn)(text)
    }

    fn invalid_message(&self, text: &str) -> Option<String> {
        self.message_fn.as_ref().and_then(|f| f(text))
    }

    fn default_valid_value(&self) -> String {
        self.default_value.clone()
    }
}

impl fmt::Debug for FnValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator")
            .field("has_input_filter", &self.input_fn.is_some())
            .field("has_message", &self.message_fn.is_some())
            .field("default_value", &self.default_value)
            .finish()
    }
}

/// Validator on the number of characters.
///
/// Text up to `maximum` characters may be typed; it is complete from
/// `minimum` characters on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthValidator {
    minimum: usize,
    maximum: usize,
    message: String,
}

impl LengthValidator {
    /// Create a length validator. The bounds are reordered if inverted.
    pub fn new(minimum: usize, maximum: usize) -> Self {
        Self {
            minimum: minimum.min(maximum),
            maximum: minimum.max(maximum),
            message: Messages::default().length,
        }
    }

    /// Take the invalid message template from `messages`.
    pub fn with_messages(self, messages: &Messages) -> Self {
        self.with_message(messages.length.clone())
    }

    /// Set the invalid message template. `{0}` and `{1}` are replaced by
    /// the minimum and maximum.
    pub fn with_message(mut self, template: impl Into<String>) -> Self {
        self.message = template.into();
        self
    }

    /// Get the minimum length.
    pub fn minimum(&self) -> usize {
        self.minimum
    }

    /// Get the maximum length.
    pub fn maximum(&self) -> usize {
        self.maximum
    }
}

impl Validator for LengthValidator {
    fn is_input_allowed(&self, text: &str) -> bool {
        text.chars().count() <= self.maximum
    }

    fn is_complete(&self, text: &str) -> bool {
        let count = text.chars().count();
        count >= self.minimum && count <= self.maximum
    }

    fn invalid_message(&self, _text: &str) -> Option<String> {
        Some(fill_template(
            &self.message,
            &[&self.minimum.to_string(), &self.maximum.to_string()],
        ))
    }

    fn default_valid_value(&self) -> String {
        "_".repeat(self.minimum)
    }
}
