//! The constrained text buffer.
//!
//! [`ConstrainedBuffer`] holds the text being edited and checks every
//! insertion, removal and replacement against the attached mask, validator
//! and length limit before applying it. An edit is all or nothing: when it is
//! refused the text stays exactly as it was, and only the caret may move.
//!
//! Offsets, counts and the caret are character (code point) indices.
//!
//! # Masked editing
//!
//! With a mask the text always has the mask's length. Typing overwrites
//! positions and skips literal separators; deleting resets positions to the
//! filler.
//!
//! ```
//! use std::sync::Arc;
//! use horizon_entry::buffer::{ConstrainedBuffer, EditOutcome};
//! use horizon_entry::mask::PatternMask;
//!
//! let mut buffer = ConstrainedBuffer::with_mask(Arc::new(PatternMask::new("##-##").unwrap()));
//! assert_eq!(buffer.text(), "__-__");
//!
//! assert_eq!(buffer.insert(0, "12"), EditOutcome::Applied);
//! // The caret skipped the separator.
//! assert_eq!(buffer.caret(), 3);
//! assert_eq!(buffer.insert(3, "x"), EditOutcome::Rejected);
//! assert_eq!(buffer.text(), "12-__");
//! ```

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use horizon_entry_core::logging::targets;

use crate::mask::{Mask, MaskExt};
use crate::validator::{AcceptAll, Validator};

/// The result of an edit request.
///
/// A refused edit is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOutcome {
    /// The edit was applied.
    Applied,
    /// The edit was refused; the text is unchanged.
    Rejected,
    /// The edit was refused because the text would exceed the maximum length.
    LengthExceeded,
}

impl EditOutcome {
    /// Returns true if the edit was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }
}

/// A text buffer that enforces a mask, a validator and a length limit.
pub struct ConstrainedBuffer {
    text: String,
    caret: usize,
    anchor: usize,
    mask: Option<Arc<dyn Mask>>,
    validator: Arc<dyn Validator>,
    maximum_length: Option<usize>,
}

impl Default for ConstrainedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConstrainedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstrainedBuffer")
            .field("text", &self.text)
            .field("caret", &self.caret)
            .field("anchor", &self.anchor)
            .field("masked", &self.mask.is_some())
            .field("maximum_length", &self.maximum_length)
            .finish()
    }
}

impl ConstrainedBuffer {
    /// Create an empty, unconstrained buffer.
    pub fn new() -> Self {
        Self {
            text: String::new(),
            caret: 0,
            anchor: 0,
            mask: None,
            validator: Arc::new(AcceptAll),
            maximum_length: None,
        }
    }

    /// Create a buffer holding the mask's default text.
    pub fn with_mask(mask: Arc<dyn Mask>) -> Self {
        let mut buffer = Self::new();
        buffer.text = mask.default_text();
        buffer.mask = Some(mask);
        buffer
    }

    // =========================================================================
    // Text and Caret
    // =========================================================================

    /// Get the current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the number of characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole text without any check.
    ///
    /// Used for programmatic text that is already known to be acceptable
    /// and for display text. The caret moves to the end.
    pub fn set_raw(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.set_caret(self.char_count());
    }

    /// Get the caret position.
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Move the caret, clearing the selection. Clamped to the text.
    pub fn set_caret(&mut self, position: usize) {
        let position = position.min(self.char_count());
        self.caret = position;
        self.anchor = position;
    }

    /// Select from `anchor` to `caret`. Both are clamped to the text.
    pub fn select(&mut self, anchor: usize, caret: usize) {
        let count = self.char_count();
        self.anchor = anchor.min(count);
        self.caret = caret.min(count);
    }

    /// Select the whole text, leaving the caret at the end.
    pub fn select_all(&mut self) {
        self.select(0, self.char_count());
    }

    /// Get the selected range, if any.
    pub fn selection(&self) -> Option<Range<usize>> {
        (self.anchor != self.caret)
            .then(|| self.anchor.min(self.caret)..self.anchor.max(self.caret))
    }

    /// Check if there is a selection.
    pub fn has_selection(&self) -> bool {
        self.anchor != self.caret
    }

    /// Get the selected text.
    pub fn selected_text(&self) -> String {
        self.selection()
            .map(|range| {
                self.text
                    .chars()
                    .skip(range.start)
                    .take(range.end - range.start)
                    .collect()
            })
            .unwrap_or_default()
    }

    // =========================================================================
    // Constraints
    // =========================================================================

    /// Get the mask, if any.
    pub fn mask(&self) -> Option<&Arc<dyn Mask>> {
        self.mask.as_ref()
    }

    /// Set or remove the mask. The text is left as is.
    pub fn set_mask(&mut self, mask: Option<Arc<dyn Mask>>) {
        self.mask = mask;
    }

    /// Get the validator.
    pub fn validator(&self) -> &Arc<dyn Validator> {
        &self.validator
    }

    /// Set the validator.
    pub fn set_validator(&mut self, validator: Arc<dyn Validator>) {
        self.validator = validator;
    }

    /// Get the maximum length, if any.
    pub fn maximum_length(&self) -> Option<usize> {
        self.maximum_length
    }

    /// Set the maximum length.
    pub fn set_maximum_length(&mut self, maximum_length: Option<usize>) {
        self.maximum_length = maximum_length;
    }

    /// Check whether `text` may be typed.
    pub fn is_text_allowed(&self, text: &str) -> bool {
        self.validator.is_input_allowed(text)
    }

    /// Check whether `text` is a complete valid value under every constraint.
    pub fn is_text_valid(&self, text: &str) -> bool {
        if self
            .maximum_length
            .is_some_and(|max| text.chars().count() > max)
        {
            return false;
        }
        if self.mask.as_ref().is_some_and(|mask| !mask.is_complete(text)) {
            return false;
        }
        self.validator.is_complete(text)
    }

    /// The fallback valid text.
    ///
    /// The validator's default, or the mask's default text when the mask
    /// does not accept the validator's default.
    pub fn default_valid_text(&self) -> String {
        let text = self.validator.default_valid_value();
        match &self.mask {
            Some(mask) if !mask.is_complete(&text) => mask.default_text(),
            _ => text,
        }
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Insert `inserted` at `offset`.
    ///
    /// With a mask the characters overwrite positions starting at the first
    /// editable position (when typing at the caret). Without one the text
    /// grows, subject to the validator's input filter and the length limit.
    pub fn insert(&mut self, offset: usize, inserted: &str) -> EditOutcome {
        let count = self.char_count();
        if offset > count {
            tracing::warn!(target: targets::BUFFER, offset, count, "insertion past end of text");
            return EditOutcome::Rejected;
        }

        if let Some(mask) = self.mask.clone() {
            if !self.text.is_empty() {
                return self.insert_masked(mask.as_ref(), offset, inserted);
            }
        }

        let candidate = splice(&self.text, offset, offset, inserted);
        if !self.is_text_allowed(&candidate) {
            tracing::trace!(target: targets::BUFFER, inserted, offset, "insertion not allowed");
            return EditOutcome::Rejected;
        }
        if self.exceeds_maximum_length(&candidate) {
            tracing::trace!(target: targets::BUFFER, inserted, offset, "insertion exceeds maximum length");
            return EditOutcome::LengthExceeded;
        }
        self.text = candidate;
        self.set_caret(offset + inserted.chars().count());
        EditOutcome::Applied
    }

    fn insert_masked(&mut self, mask: &dyn Mask, offset: usize, inserted: &str) -> EditOutcome {
        let position = if offset == self.caret {
            mask.next_editable_position(offset)
        } else {
            offset
        };
        if position != offset {
            tracing::trace!(target: targets::BUFFER, from = offset, to = position, "caret snapped over literal");
        }

        let Some(result) = mask.apply_insertion(&self.text, inserted, position) else {
            let caret = mask.next_editable_position(self.caret);
            self.set_caret(caret);
            tracing::trace!(target: targets::BUFFER, inserted, position, "insertion rejected by mask");
            return EditOutcome::Rejected;
        };
        if !self.is_text_allowed(&result) {
            tracing::trace!(target: targets::BUFFER, inserted, position, "masked insertion not allowed");
            return EditOutcome::Rejected;
        }

        self.text = result;
        let end = position + inserted.chars().count();
        self.set_caret(mask.next_editable_position(end));
        EditOutcome::Applied
    }

    /// Remove `count` characters starting at `offset`.
    ///
    /// With a mask the positions are reset to their filler and the text keeps
    /// its length; this never fails. Without a mask the range must lie within
    /// the text.
    pub fn remove(&mut self, offset: usize, count: usize) -> EditOutcome {
        if let Some(mask) = &self.mask {
            self.text = mask.apply_removal(&self.text, offset, count);
            self.set_caret(offset);
            return EditOutcome::Applied;
        }

        let length = self.char_count();
        let Some(end) = offset.checked_add(count).filter(|end| *end <= length) else {
            tracing::warn!(target: targets::BUFFER, offset, count, length, "removal range outside text");
            return EditOutcome::Rejected;
        };
        self.text = splice(&self.text, offset, end, "");
        self.set_caret(offset);
        EditOutcome::Applied
    }

    /// Replace `count` characters at `offset` with `inserted`.
    ///
    /// The whole replacement is checked before anything changes. With a
    /// non-empty masked text, the result must also be a complete mask text.
    /// A zero-length replacement is an insertion.
    pub fn replace(&mut self, offset: usize, count: usize, inserted: &str) -> EditOutcome {
        if count == 0 {
            return self.insert(offset, inserted);
        }
        let length = self.char_count();
        let Some(end) = offset.checked_add(count).filter(|end| *end <= length) else {
            tracing::warn!(target: targets::BUFFER, offset, count, length, "replace range outside text");
            return EditOutcome::Rejected;
        };

        if let Some(mask) = self.mask.clone() {
            if !self.text.is_empty() {
                let cleared = mask.apply_removal(&self.text, offset, count);
                let result = mask
                    .apply_insertion(&cleared, inserted, offset)
                    .filter(|result| mask.is_complete(result) && self.is_text_allowed(result));
                let Some(result) = result else {
                    tracing::trace!(target: targets::BUFFER, inserted, offset, "masked replace rejected");
                    return EditOutcome::Rejected;
                };
                self.text = result;
                self.set_caret(mask.next_editable_position(offset + inserted.chars().count()));
                return EditOutcome::Applied;
            }
        }

        let candidate = splice(&self.text, offset, end, inserted);
        if !self.is_text_allowed(&candidate) {
            tracing::trace!(target: targets::BUFFER, inserted, offset, "replace not allowed");
            return EditOutcome::Rejected;
        }
        if self.exceeds_maximum_length(&candidate) {
            return EditOutcome::LengthExceeded;
        }
        self.text = candidate;
        self.set_caret(offset + inserted.chars().count());
        EditOutcome::Applied
    }

    fn exceeds_maximum_length(&self, text: &str) -> bool {
        self.maximum_length
            .is_some_and(|max| text.chars().count() > max)
    }
}

/// Replace the characters in `start..end` of `text` with `inserted`.
fn splice(text: &str, start: usize, end: usize, inserted: &str) -> String {
    let mut result = String::with_capacity(text.len() + inserted.len());
    result.extend(text.chars().take(start));
    result.push_str(inserted);
    result.extend(text.chars().skip(end));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::PatternMask;
    use crate::validator::{FnValidator, LengthValidator};

    fn date_buffer() -> ConstrainedBuffer {
        ConstrainedBuffer::with_mask(Arc::new(PatternMask::new("##-##-##").unwrap()))
    }

    fn digits_only() -> Arc<dyn Validator> {
        Arc::new(
            FnValidator::new(|text| !text.is_empty())
                .with_input_filter(|text| text.chars().all(|c| c.is_ascii_digit())),
        )
    }

    #[test]
    fn test_splice_counts_characters() {
        assert_eq!(splice("héllo", 1, 2, "e"), "hello");
        assert_eq!(splice("ab", 2, 2, "ç"), "abç");
        assert_eq!(splice("abc", 0, 3, ""), "");
    }

    #[test]
    fn test_masked_typing_skips_literals() {
        let mut buffer = date_buffer();
        for pair in ["12", "34", "56"] {
            let caret = buffer.caret();
            assert_eq!(buffer.insert(caret, pair), EditOutcome::Applied);
        }
        assert_eq!(buffer.text(), "12-34-56");
        assert_eq!(buffer.caret(), 8);
    }

    #[test]
    fn test_masked_typing_single_characters() {
        let mut buffer = date_buffer();
        for ch in ["1", "2", "3"] {
            let caret = buffer.caret();
            buffer.insert(caret, ch);
        }
        assert_eq!(buffer.text(), "12-3_-__");
        assert_eq!(buffer.caret(), 4);
    }

    #[test]
    fn test_masked_rejection_keeps_text_and_advances_caret() {
        let mut buffer = date_buffer();
        buffer.insert(0, "12");
        buffer.set_caret(2);
        assert_eq!(buffer.insert(2, "a"), EditOutcome::Rejected);
        assert_eq!(buffer.text(), "12-__-__");
        assert_eq!(buffer.caret(), 3);
    }

    #[test]
    fn test_masked_insertion_away_from_caret_is_not_snapped() {
        let mut buffer = date_buffer();
        buffer.set_caret(0);
        assert_eq!(buffer.insert(2, "1"), EditOutcome::Rejected);
        assert_eq!(buffer.insert(2, "-"), EditOutcome::Applied);
        assert_eq!(buffer.text(), "__-__-__");
    }

    #[test]
    fn test_masked_overrun_is_rejected() {
        let mut buffer = date_buffer();
        buffer.set_caret(6);
        assert_eq!(buffer.insert(6, "123"), EditOutcome::Rejected);
        assert_eq!(buffer.text(), "__-__-__");
    }

    #[test]
    fn test_masked_insertion_respects_input_filter() {
        let mut buffer = date_buffer();
        buffer.set_validator(Arc::new(
            FnValidator::new(|_| true).with_input_filter(|text| !text.starts_with('9')),
        ));
        assert_eq!(buffer.insert(0, "9"), EditOutcome::Rejected);
        assert_eq!(buffer.text(), "__-__-__");
        assert_eq!(buffer.insert(0, "1"), EditOutcome::Applied);
    }

    #[test]
    fn test_masked_removal_resets_positions() {
        let mut buffer = date_buffer();
        buffer.insert(0, "12");
        buffer.insert(3, "34");
        assert_eq!(buffer.remove(1, 3), EditOutcome::Applied);
        assert_eq!(buffer.text(), "1_-_4-__");
        assert_eq!(buffer.caret(), 1);
        assert_eq!(buffer.char_count(), 8);
    }

    #[test]
    fn test_masked_removal_never_fails() {
        let mut buffer = date_buffer();
        assert_eq!(buffer.remove(7, 5), EditOutcome::Applied);
        assert_eq!(buffer.text(), "__-__-__");
        assert_eq!(buffer.caret(), 7);
    }

    #[test]
    fn test_masked_replace_requires_complete_result() {
        let mut buffer = date_buffer();
        buffer.insert(0, "12");
        assert_eq!(buffer.replace(0, 2, "9"), EditOutcome::Applied);
        assert_eq!(buffer.text(), "9_-__-__");
        assert_eq!(buffer.replace(0, 2, "ab"), EditOutcome::Rejected);
        assert_eq!(buffer.text(), "9_-__-__");
        assert_eq!(buffer.replace(0, 8, "11-22-33"), EditOutcome::Applied);
        assert_eq!(buffer.text(), "11-22-33");
    }

    #[test]
    fn test_empty_masked_text_edits_unmasked() {
        let mut buffer = date_buffer();
        buffer.set_raw("");
        assert_eq!(buffer.insert(0, "12-34-56"), EditOutcome::Applied);
        assert_eq!(buffer.text(), "12-34-56");
    }

    #[test]
    fn test_unmasked_insertion_uses_input_filter() {
        let mut buffer = ConstrainedBuffer::new();
        buffer.set_validator(digits_only());
        assert_eq!(buffer.insert(0, "12"), EditOutcome::Applied);
        assert_eq!(buffer.insert(1, "x"), EditOutcome::Rejected);
        assert_eq!(buffer.text(), "12");
        assert_eq!(buffer.insert(1, "5"), EditOutcome::Applied);
        assert_eq!(buffer.text(), "152");
        assert_eq!(buffer.caret(), 2);
        assert_eq!(buffer.insert(9, "1"), EditOutcome::Rejected);
    }

    #[test]
    fn test_maximum_length() {
        let mut buffer = ConstrainedBuffer::new();
        buffer.set_maximum_length(Some(3));
        assert_eq!(buffer.insert(0, "abc"), EditOutcome::Applied);
        buffer.set_caret(1);
        assert_eq!(buffer.insert(3, "d"), EditOutcome::LengthExceeded);
        assert_eq!(buffer.text(), "abc");
        assert_eq!(buffer.caret(), 1);
        assert_eq!(buffer.replace(0, 1, "xy"), EditOutcome::LengthExceeded);
        assert_eq!(buffer.replace(0, 2, "z"), EditOutcome::Applied);
        assert_eq!(buffer.text(), "zc");
    }

    #[test]
    fn test_unmasked_removal() {
        let mut buffer = ConstrainedBuffer::new();
        buffer.set_raw("hello");
        assert_eq!(buffer.remove(1, 3), EditOutcome::Applied);
        assert_eq!(buffer.text(), "ho");
        assert_eq!(buffer.caret(), 1);
        assert_eq!(buffer.remove(1, 5), EditOutcome::Rejected);
        assert_eq!(buffer.remove(usize::MAX, 2), EditOutcome::Rejected);
        assert_eq!(buffer.text(), "ho");
    }

    #[test]
    fn test_unmasked_replace() {
        let mut buffer = ConstrainedBuffer::new();
        buffer.set_validator(digits_only());
        buffer.set_raw("1234");
        assert_eq!(buffer.replace(1, 2, "x"), EditOutcome::Rejected);
        assert_eq!(buffer.replace(1, 2, "0"), EditOutcome::Applied);
        assert_eq!(buffer.text(), "104");
        assert_eq!(buffer.replace(0, 0, "9"), EditOutcome::Applied);
        assert_eq!(buffer.text(), "9104");
    }

    #[test]
    fn test_selection() {
        let mut buffer = ConstrainedBuffer::new();
        buffer.set_raw("héllo");
        assert_eq!(buffer.caret(), 5);
        assert!(!buffer.has_selection());
        buffer.select(4, 1);
        assert_eq!(buffer.selection(), Some(1..4));
        assert_eq!(buffer.selected_text(), "éll");
        buffer.select_all();
        assert_eq!(buffer.selection(), Some(0..5));
        buffer.set_caret(99);
        assert_eq!(buffer.caret(), 5);
        assert_eq!(buffer.selection(), None);
    }

    #[test]
    fn test_validity_combines_constraints() {
        let mut buffer = date_buffer();
        assert!(buffer.is_text_valid("12-34-56"));
        assert!(!buffer.is_text_valid("12-34"));
        buffer.set_maximum_length(Some(5));
        assert!(!buffer.is_text_valid("12-34-56"));

        let mut plain = ConstrainedBuffer::new();
        plain.set_validator(Arc::new(LengthValidator::new(2, 4)));
        assert!(!plain.is_text_valid("a"));
        assert!(plain.is_text_valid("ab"));
    }

    #[test]
    fn test_default_valid_text_falls_back_to_mask() {
        let mut buffer = date_buffer();
        assert_eq!(buffer.default_valid_text(), "__-__-__");
        buffer.set_validator(Arc::new(FnValidator::new(|_| true).with_default("01-01-70")));
        assert_eq!(buffer.default_valid_text(), "01-01-70");

        let plain = ConstrainedBuffer::new();
        assert_eq!(plain.default_valid_text(), "");
    }
}
