//! Display formatting for committed values.
//!
//! While a field does not have focus it may show an alternate rendering of
//! its last valid text, for example a number with digit grouping. The raw
//! text comes back as soon as the field is edited again.
//!
//! # Example
//!
//! ```
//! use horizon_entry::formatter::Formatter;
//!
//! let percent = |text: &str| Some(format!("{text} %"));
//! assert_eq!(percent.format("42").as_deref(), Some("42 %"));
//! ```

/// Trait for display formatters.
pub trait Formatter: Send + Sync {
    /// The text to display for a valid value.
    ///
    /// `None` means the raw text is shown as is.
    fn format(&self, valid_text: &str) -> Option<String>;
}

impl<F> Formatter for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn format(&self, valid_text: &str) -> Option<String> {
        self(valid_text)
    }
}
