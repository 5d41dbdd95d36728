//! Field configuration.
//!
//! [`FieldConfig`] gathers the tunables of an entry field: the feedback
//! delay, the focus and tip policies, the length limit and the message
//! templates. It can be built in code or loaded from TOML:
//!
//! ```
//! use horizon_entry::config::FieldConfig;
//!
//! let config = FieldConfig::from_toml_str(r#"
//! feedback_delay_ms = 200
//! focus_trapped_on_invalid_text = true
//!
//! [messages]
//! range = "Between {0} and {1}"
//! "#).unwrap();
//!
//! assert_eq!(config.feedback_delay().as_millis(), 200);
//! assert_eq!(config.messages.range("1", "9"), "Between 1 and 9");
//! // Unlisted keys keep their defaults.
//! assert!(config.selecting_all_on_focus);
//! ```
//!
//! Numeric fields also need the locale's separators. They are resolved once
//! per process by [`Separators::system`].

use std::sync::OnceLock;
use std::time::Duration;

use horizon_entry_core::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the system decimal separator.
pub const DECIMAL_SEPARATOR_ENV: &str = "HORIZON_ENTRY_DECIMAL_SEPARATOR";

/// The default error-feedback delay in milliseconds.
pub const DEFAULT_FEEDBACK_DELAY_MS: u64 = 150;

/// Tunables for an entry field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Delay between the last edit and the error feedback, in milliseconds.
    pub feedback_delay_ms: u64,
    /// Whether the error overlay is requested at all.
    pub tip_displayed_on_error: bool,
    /// Whether gaining focus selects the whole text.
    pub selecting_all_on_focus: bool,
    /// Whether focus stays in the field while its text is invalid.
    pub focus_trapped_on_invalid_text: bool,
    /// Optional limit on the number of characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_length: Option<usize>,
    /// User-visible message templates.
    pub messages: Messages,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            feedback_delay_ms: DEFAULT_FEEDBACK_DELAY_MS,
            tip_displayed_on_error: true,
            selecting_all_on_focus: true,
            focus_trapped_on_invalid_text: false,
            maximum_length: None,
            messages: Messages::default(),
        }
    }
}

impl FieldConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the text is not valid TOML or a key has
    /// the wrong type.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::new(e.message()))
    }

    /// Serialize the configuration to TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::new(e.to_string()))
    }

    /// The feedback delay as a [`Duration`].
    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }
}

/// Message templates.
///
/// `{0}` and `{1}` are replaced by the message arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Shown when a validator gives no specific message.
    pub invalid_input: String,
    /// Shown when typing would exceed the maximum length.
    pub max_length: String,
    /// Shown when numeric text cannot be parsed.
    pub invalid_format: String,
    /// Shown when numeric text has too many decimals.
    pub max_decimals: String,
    /// Shown when a number is outside its range.
    pub range: String,
    /// Shown when text length is outside its bounds.
    pub length: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            invalid_input: "Invalid input".to_string(),
            max_length: "Max length: {0}".to_string(),
            invalid_format: "Invalid format".to_string(),
            max_decimals: "Max decimals: {0}".to_string(),
            range: "Range: {0} .. {1}".to_string(),
            length: "Length: {0} .. {1}".to_string(),
        }
    }
}

impl Messages {
    /// The length-exceeded message for a limit.
    pub fn max_length(&self, limit: usize) -> String {
        fill_template(&self.max_length, &[&limit.to_string()])
    }

    /// The decimal-count message for a limit.
    pub fn max_decimals(&self, limit: usize) -> String {
        fill_template(&self.max_decimals, &[&limit.to_string()])
    }

    /// The range message for rendered bounds.
    pub fn range(&self, min: &str, max: &str) -> String {
        fill_template(&self.range, &[min, max])
    }

    /// The length message for character bounds.
    pub fn length(&self, minimum: usize, maximum: usize) -> String {
        fill_template(&self.length, &[&minimum.to_string(), &maximum.to_string()])
    }
}

/// Replace `{0}`, `{1}`... in `template` with the matching argument.
pub fn fill_template(template: &str, args: &[&str]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |text, (index, arg)| {
            text.replace(&format!("{{{index}}}"), arg)
        })
}

/// The decimal and grouping separators of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separators {
    /// The decimal separator.
    pub decimal: char,
    /// The digit-grouping separator.
    pub grouping: char,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            decimal: '.',
            grouping: ',',
        }
    }
}

impl Separators {
    /// Determine separators from a locale identifier such as `de-DE`.
    pub fn for_locale(locale: &str) -> Self {
        let lang = locale
            .split(['-', '_'])
            .next()
            .unwrap_or("en")
            .to_lowercase();

        let comma_decimal = matches!(
            lang.as_str(),
            "de" | "fr" | "es" | "it" | "pt" | "nl" | "da" | "fi" | "nb" | "nn" | "sv"
            | "pl" | "cs" | "sk" | "hu" | "ro" | "bg" | "hr" | "sl" | "sr" | "uk" | "ru"
            | "el" | "tr" | "vi" | "id" | "ca" | "gl" | "eu" | "et" | "lv" | "lt"
        );
        let space_grouping = matches!(
            lang.as_str(),
            "fr" | "fi" | "sv" | "nb" | "nn" | "pl" | "cs" | "sk" | "ru" | "uk" | "bg"
        );

        match (comma_decimal, space_grouping) {
            (true, true) => Self {
                decimal: ',',
                grouping: '\u{202F}',
            },
            (true, false) => Self {
                decimal: ',',
                grouping: '.',
            },
            _ => Self::default(),
        }
    }

    /// Separators for the running process.
    ///
    /// Resolved on first use: a single character in
    /// [`DECIMAL_SEPARATOR_ENV`] wins, otherwise the system locale decides.
    pub fn system() -> Self {
        static SYSTEM: OnceLock<Separators> = OnceLock::new();
        *SYSTEM.get_or_init(|| {
            let locale = sys_locale::get_locale().unwrap_or_else(|| "en-US".to_string());
            let mut separators = Self::for_locale(&locale);
            if let Some(decimal) = std::env::var(DECIMAL_SEPARATOR_ENV)
                .ok()
                .and_then(|value| single_char(&value))
            {
                separators.decimal = decimal;
                if separators.grouping == decimal {
                    separators.grouping = if decimal == ',' { '.' } else { ',' };
                }
            }
            tracing::debug!(
                target: horizon_entry_core::logging::targets::NUMBER,
                %locale,
                decimal = %separators.decimal,
                grouping = %separators.grouping,
                "system separators resolved"
            );
            separators
        })
    }
}

fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}
