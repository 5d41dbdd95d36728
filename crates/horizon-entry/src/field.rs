//! The entry field state machine.
//!
//! [`EntryField`] wraps a [`ConstrainedBuffer`] and keeps two texts apart:
//! the text being typed, which may be invalid, and the last valid text, which
//! only changes when a valid text is committed. It handles focus changes,
//! commit and revert, the debounced error feedback and the swap to formatted
//! display text while the field is not focused.
//!
//! The field renders nothing. It asks its [`FieldHost`] to show or hide an
//! error overlay and to give focus back, and it reads time from a [`Clock`].
//! The owner calls [`EntryField::poll`] from its event loop so that due
//! feedback fires.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use horizon_entry::field::EntryField;
//! use horizon_entry::validator::LengthValidator;
//! use horizon_entry_core::ManualClock;
//!
//! let clock = Arc::new(ManualClock::new());
//! let mut field = EntryField::new("abc")
//!     .with_clock(clock.clone())
//!     .with_validator(Arc::new(LengthValidator::new(2, 5)));
//!
//! field.focus_gained(false);
//! field.type_text("x");
//! assert_eq!(field.display_text(), "x");
//! // Invalid text never replaces the last valid value.
//! assert_eq!(field.valid_text(), "abc");
//!
//! clock.advance(Duration::from_millis(150));
//! assert!(field.poll());
//! assert_eq!(field.error_message(), Some("Length: 2 .. 5"));
//!
//! // Leaving the field reverts to the last valid value.
//! field.focus_lost(false);
//! assert_eq!(field.display_text(), "abc");
//! ```

use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use horizon_entry_core::logging::targets;
use horizon_entry_core::{
    ActionSpan, Clock, ConnectionId, FeedbackTimer, MaskError, Signal, SystemClock,
};

use crate::buffer::{ConstrainedBuffer, EditOutcome};
use crate::config::{FieldConfig, Messages};
use crate::formatter::Formatter;
use crate::mask::{Mask, PatternMask};
use crate::validator::{AcceptAll, Validator};

/// The rendering collaborator of a field.
///
/// Every method defaults to doing nothing.
pub trait FieldHost: Send + Sync {
    /// Show a transient error overlay with `message`.
    fn show_error_overlay(&self, _message: &str) {}

    /// Dismiss the error overlay.
    fn hide_error_overlay(&self) {}

    /// Give keyboard focus back to the field.
    fn request_focus(&self) {}
}

/// A host that ignores every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl FieldHost for NullHost {}

/// Whether the field is being edited or shows its committed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldState {
    /// The field has focus and shows the raw buffer.
    Editing,
    /// The field has no focus and shows the formatted value, or the raw
    /// valid text when there is no formatter.
    DisplayFormatted,
}

/// The result of ending an edit, by commit or focus loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitOutcome {
    /// A new valid text was committed and listeners were notified.
    Committed,
    /// The text was valid and equal to the last valid text.
    Unchanged,
    /// The text was invalid and reverted to the last valid text.
    Reverted,
    /// The text was invalid and focus is trapped in the field.
    Trapped,
}

/// The result of a focus-loss notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusOutcome {
    /// Focus left the field after committing or reverting.
    Released(CommitOutcome),
    /// Focus was refused because the text is invalid.
    Trapped,
    /// A temporary focus change, which does not end the edit.
    Ignored,
}

/// What a scheduled feedback evaluation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feedback {
    Invalid,
    MaxLength,
}

/// A text entry field with mask, validator, formatter and error feedback.
pub struct EntryField {
    buffer: ConstrainedBuffer,
    formatter: Option<Arc<dyn Formatter>>,
    last_valid_text: String,
    display_mode: bool,
    focused: bool,
    focus_trapped_on_invalid_text: bool,
    tip_displayed_on_error: bool,
    selecting_all_on_focus: bool,
    skip_next_select_all: bool,
    feedback_delay: Duration,
    messages: Messages,
    /// Last message sent to `error_message_changed`.
    displayed_message: Option<String>,
    /// Message of the visible overlay.
    overlay_message: Option<String>,
    feedback: FeedbackTimer<Feedback>,
    clock: Arc<dyn Clock>,
    host: Arc<dyn FieldHost>,

    /// Signal emitted with the new valid text when a value is committed.
    pub text_committed: Signal<String>,

    /// Signal emitted when the error message changes.
    ///
    /// Carries `Some(message)` when feedback reports a new message and
    /// `None` once the text is valid again.
    pub error_message_changed: Signal<Option<String>>,
}

impl fmt::Debug for EntryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryField")
            .field("buffer", &self.buffer)
            .field("last_valid_text", &self.last_valid_text)
            .field("display_mode", &self.display_mode)
            .field("focused", &self.focused)
            .field("overlay_message", &self.overlay_message)
            .field("feedback", &self.feedback)
            .finish_non_exhaustive()
    }
}

impl EntryField {
    /// Create a field holding `text`, or the default valid text if `text`
    /// is not valid.
    pub fn new(text: &str) -> Self {
        Self::from_buffer(ConstrainedBuffer::new(), text)
    }

    /// Create a masked field.
    pub fn with_mask(text: &str, mask: Arc<dyn Mask>) -> Self {
        Self::from_buffer(ConstrainedBuffer::with_mask(mask), text)
    }

    /// Create a field masked by a [`PatternMask`].
    ///
    /// # Errors
    ///
    /// Fails if the pattern is not a valid mask pattern.
    pub fn with_pattern(text: &str, pattern: &str) -> Result<Self, MaskError> {
        let mask = PatternMask::new(pattern)?;
        Ok(Self::with_mask(text, Arc::new(mask)))
    }

    fn from_buffer(buffer: ConstrainedBuffer, text: &str) -> Self {
        let config = FieldConfig::default();
        let mut field = Self {
            buffer,
            formatter: None,
            last_valid_text: String::new(),
            display_mode: false,
            focused: false,
            focus_trapped_on_invalid_text: config.focus_trapped_on_invalid_text,
            tip_displayed_on_error: config.tip_displayed_on_error,
            selecting_all_on_focus: config.selecting_all_on_focus,
            skip_next_select_all: false,
            feedback_delay: config.feedback_delay(),
            messages: config.messages,
            displayed_message: None,
            overlay_message: None,
            feedback: FeedbackTimer::new(),
            clock: Arc::new(SystemClock),
            host: Arc::new(NullHost),
            text_committed: Signal::new(),
            error_message_changed: Signal::new(),
        };
        field.set_text(text);
        field
    }

    /// Apply a configuration.
    pub fn with_config(mut self, config: &FieldConfig) -> Self {
        self.apply_config(config);
        self
    }

    /// Use a specific clock for feedback timing.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attach the rendering collaborator.
    pub fn with_host(mut self, host: Arc<dyn FieldHost>) -> Self {
        self.host = host;
        self
    }

    /// Set the validator.
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.set_validator(Some(validator));
        self
    }

    /// Set the display formatter.
    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.set_formatter(Some(formatter));
        self
    }

    /// Apply every setting of `config`.
    pub fn apply_config(&mut self, config: &FieldConfig) {
        self.feedback_delay = config.feedback_delay();
        self.focus_trapped_on_invalid_text = config.focus_trapped_on_invalid_text;
        self.selecting_all_on_focus = config.selecting_all_on_focus;
        self.messages = config.messages.clone();
        self.set_tip_displayed_on_error(config.tip_displayed_on_error);
        self.set_maximum_length(config.maximum_length);
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// The text currently shown: the buffer while editing, the formatted
    /// value in display mode.
    pub fn display_text(&self) -> &str {
        self.buffer.text()
    }

    /// The last committed valid text, whatever is being typed.
    pub fn valid_text(&self) -> &str {
        &self.last_valid_text
    }

    /// Check if the text being edited is valid.
    pub fn is_text_valid(&self) -> bool {
        self.display_mode || self.buffer.is_text_valid(self.buffer.text())
    }

    /// Set the text programmatically.
    ///
    /// Only valid text is installed. Otherwise the last valid text is kept,
    /// or the default valid text is used if the last valid text no longer
    /// validates. The installed text is committed.
    pub fn set_text(&mut self, text: &str) {
        let installed = if self.buffer.is_text_valid(text) {
            text.to_string()
        } else if self.buffer.is_text_valid(&self.last_valid_text) {
            self.last_valid_text.clone()
        } else {
            self.buffer.default_valid_text()
        };
        if installed != text {
            tracing::debug!(target: targets::FIELD, requested = text, %installed, "set_text replaced invalid text");
        }
        self.buffer.set_raw(installed);
        self.display_mode = false;
        self.text_changed();
        self.commit_current();
        self.adjust_display();
    }

    /// The valid text right now: the buffer if it is valid, else the last
    /// valid text.
    fn current_valid_text(&self) -> String {
        if !self.display_mode && self.buffer.is_text_valid(self.buffer.text()) {
            self.buffer.text().to_string()
        } else {
            self.last_valid_text.clone()
        }
    }

    fn revalidate_text(&mut self) {
        let text = self.current_valid_text();
        self.set_text(&text);
    }

    /// Promote the buffer to the last valid text if it is valid and new.
    fn commit_current(&mut self) -> bool {
        if self.display_mode {
            return false;
        }
        let text = self.buffer.text();
        if !self.buffer.is_text_valid(text) || self.last_valid_text == text {
            return false;
        }
        self.last_valid_text = text.to_string();
        tracing::debug!(target: targets::FIELD, text = %self.last_valid_text, "text committed");
        self.text_committed.emit(self.last_valid_text.clone());
        true
    }

    /// Swap between display text and the last valid text to match focus.
    fn adjust_display(&mut self) {
        let show_display = !self.focused;
        if self.display_mode == show_display {
            return;
        }
        if show_display {
            let Some(shown) = self
                .formatter
                .as_ref()
                .and_then(|formatter| formatter.format(self.buffer.text()))
            else {
                return;
            };
            self.display_mode = true;
            if self.buffer.text() != shown {
                tracing::debug!(target: targets::FIELD, shown = %shown, "showing display text");
                self.buffer.set_raw(shown);
            }
        } else {
            self.display_mode = false;
            if self.buffer.text() != self.last_valid_text {
                tracing::debug!(target: targets::FIELD, text = %self.last_valid_text, "restoring editable text");
                self.buffer.set_raw(self.last_valid_text.clone());
            }
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Insert text at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> EditOutcome {
        let outcome = self.buffer.insert(offset, text);
        self.after_edit(outcome);
        outcome
    }

    /// Remove `count` characters at `offset`.
    pub fn remove(&mut self, offset: usize, count: usize) -> EditOutcome {
        let outcome = self.buffer.remove(offset, count);
        self.after_edit(outcome);
        outcome
    }

    /// Replace `count` characters at `offset` with `text`.
    pub fn replace(&mut self, offset: usize, count: usize, text: &str) -> EditOutcome {
        let outcome = self.buffer.replace(offset, count, text);
        self.after_edit(outcome);
        outcome
    }

    /// Replace the selection with `text`, or insert it at the caret.
    pub fn replace_selection(&mut self, text: &str) -> EditOutcome {
        match self.buffer.selection() {
            Some(range) => self.replace(range.start, range.end - range.start, text),
            None => {
                let caret = self.buffer.caret();
                self.insert(caret, text)
            }
        }
    }

    /// Type text at the caret, replacing the selection if any.
    pub fn type_text(&mut self, text: &str) -> EditOutcome {
        self.replace_selection(text)
    }

    /// Delete the selection or the character before the caret.
    pub fn delete_backward(&mut self) -> EditOutcome {
        match self.buffer.selection() {
            Some(range) => self.remove(range.start, range.end - range.start),
            None => match self.buffer.caret() {
                0 => EditOutcome::Rejected,
                caret => self.remove(caret - 1, 1),
            },
        }
    }

    /// Delete the selection or the character after the caret.
    pub fn delete_forward(&mut self) -> EditOutcome {
        match self.buffer.selection() {
            Some(range) => self.remove(range.start, range.end - range.start),
            None => {
                let caret = self.buffer.caret();
                if caret >= self.buffer.char_count() {
                    return EditOutcome::Rejected;
                }
                self.remove(caret, 1)
            }
        }
    }

    fn after_edit(&mut self, outcome: EditOutcome) {
        match outcome {
            EditOutcome::Applied => self.text_changed(),
            EditOutcome::LengthExceeded => self.schedule_feedback(Feedback::MaxLength),
            EditOutcome::Rejected => {}
        }
    }

    /// Re-evaluate validity after the text changed.
    fn text_changed(&mut self) {
        if self.is_text_valid() {
            self.feedback.stop();
            self.hide_popup();
        } else {
            self.schedule_feedback(Feedback::Invalid);
        }
    }

    // =========================================================================
    // Caret and Selection
    // =========================================================================

    /// Get the caret position.
    pub fn caret(&self) -> usize {
        self.buffer.caret()
    }

    /// Move the caret, clearing the selection.
    pub fn set_caret(&mut self, position: usize) {
        self.buffer.set_caret(position);
    }

    /// Select from `anchor` to `caret`.
    pub fn select(&mut self, anchor: usize, caret: usize) {
        self.buffer.select(anchor, caret);
    }

    /// Select the whole text.
    pub fn select_all(&mut self) {
        self.buffer.select_all();
    }

    /// Get the selected range, if any.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.buffer.selection()
    }

    // =========================================================================
    // Focus and Commit
    // =========================================================================

    /// Check if the field has focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Get the current state.
    pub fn state(&self) -> FieldState {
        if self.focused {
            FieldState::Editing
        } else {
            FieldState::DisplayFormatted
        }
    }

    /// Notify the field that it gained focus.
    ///
    /// A permanent gain leaves display mode, schedules feedback for invalid
    /// text and selects everything (unless the previous loss was temporary).
    pub fn focus_gained(&mut self, temporary: bool) {
        self.focused = true;
        if temporary {
            return;
        }
        tracing::debug!(target: targets::FIELD, "focus gained");
        if self.display_mode {
            self.adjust_display();
        }
        if !self.is_text_valid() {
            self.schedule_feedback(Feedback::Invalid);
        }
        if self.selecting_all_on_focus && !self.skip_next_select_all {
            self.buffer.select_all();
        }
        self.skip_next_select_all = false;
    }

    /// Notify the field that it lost focus.
    ///
    /// A temporary loss, such as a popup taking focus for a moment, does
    /// not end the edit. A permanent loss commits valid text, reverts
    /// invalid text, or refuses to let go when focus is trapped.
    pub fn focus_lost(&mut self, temporary: bool) -> FocusOutcome {
        if temporary {
            tracing::trace!(target: targets::FIELD, "temporary focus loss ignored");
            self.skip_next_select_all = true;
            return FocusOutcome::Ignored;
        }
        let _span = ActionSpan::new("focus_lost");
        self.focused = false;
        match self.finish_editing() {
            CommitOutcome::Trapped => {
                self.focused = true;
                FocusOutcome::Trapped
            }
            outcome => {
                self.adjust_display();
                tracing::debug!(target: targets::FIELD, ?outcome, "focus released");
                FocusOutcome::Released(outcome)
            }
        }
    }

    /// Commit the current text, as when the user confirms the entry.
    ///
    /// Invalid text is reverted, or kept in place when focus is trapped.
    /// With a formatter whose display text differs from the valid text the
    /// field leaves editing and shows the display text.
    pub fn commit(&mut self) -> CommitOutcome {
        let _span = ActionSpan::new("commit");
        let outcome = self.finish_editing();
        if outcome == CommitOutcome::Trapped {
            return outcome;
        }
        let shows_display = self
            .formatter
            .as_ref()
            .and_then(|formatter| formatter.format(&self.last_valid_text))
            .is_some_and(|display| display != self.last_valid_text);
        if shows_display {
            self.focused = false;
            self.adjust_display();
        }
        outcome
    }

    fn finish_editing(&mut self) -> CommitOutcome {
        if self.is_text_valid() {
            self.hide_popup();
            self.feedback.stop();
            return if self.commit_current() {
                CommitOutcome::Committed
            } else {
                CommitOutcome::Unchanged
            };
        }
        if self.focus_trapped_on_invalid_text {
            tracing::debug!(target: targets::FIELD, text = self.buffer.text(), "focus trapped on invalid text");
            self.host.request_focus();
            self.schedule_feedback(Feedback::Invalid);
            return CommitOutcome::Trapped;
        }
        tracing::debug!(target: targets::FIELD, text = self.buffer.text(), "reverting invalid text");
        let last_valid = self.last_valid_text.clone();
        self.set_text(&last_valid);
        self.hide_popup();
        self.feedback.stop();
        CommitOutcome::Reverted
    }

    /// Handle the escape key.
    ///
    /// If an overlay is shown or the text differs from the last valid text,
    /// reverts to the last valid text. Everything is selected either way.
    /// Returns `true` if the key was consumed.
    pub fn escape(&mut self) -> bool {
        let consumed = self.is_error_overlay_visible() || self.buffer.text() != self.last_valid_text;
        self.hide_popup();
        self.feedback.stop();
        if consumed {
            let last_valid = self.last_valid_text.clone();
            self.set_text(&last_valid);
        }
        self.buffer.select_all();
        consumed
    }

    // =========================================================================
    // Error Feedback
    // =========================================================================

    fn schedule_feedback(&mut self, feedback: Feedback) {
        let id = self
            .feedback
            .restart(self.clock.now(), self.feedback_delay, feedback);
        tracing::trace!(target: targets::FIELD, ?id, ?feedback, "feedback scheduled");
    }

    /// Fire due error feedback.
    ///
    /// Returns `true` if a feedback evaluation ran.
    pub fn poll(&mut self) -> bool {
        let Some(feedback) = self.feedback.take_expired(self.clock.now()) else {
            return false;
        };
        self.show_feedback(feedback);
        true
    }

    /// Check if a feedback evaluation is pending.
    pub fn is_feedback_pending(&self) -> bool {
        self.feedback.is_pending()
    }

    /// When the pending feedback evaluation is due.
    pub fn feedback_deadline(&self) -> Option<Instant> {
        self.feedback.deadline()
    }

    fn show_feedback(&mut self, feedback: Feedback) {
        if !self.focused {
            return;
        }
        let text = self.buffer.text().to_string();
        let valid = self.is_text_valid();
        let max_length = feedback == Feedback::MaxLength;
        let message = if valid {
            self.messages
                .max_length(self.buffer.maximum_length().unwrap_or_default())
        } else {
            self.buffer
                .validator()
                .invalid_message(&text)
                .unwrap_or_else(|| self.messages.invalid_input.clone())
        };
        tracing::debug!(target: targets::FIELD, %message, valid, max_length, "feedback fired");

        if (!valid || max_length) && self.displayed_message.as_deref() != Some(message.as_str()) {
            self.displayed_message = Some(message.clone());
            self.error_message_changed.emit(Some(message.clone()));
        }
        if !self.tip_displayed_on_error || self.overlay_message.as_deref() == Some(message.as_str()) {
            return;
        }
        self.dismiss_overlay();
        if valid && !max_length {
            return;
        }
        self.host.show_error_overlay(&message);
        self.overlay_message = Some(message);
    }

    /// Clear the error message once the text is valid, and dismiss the overlay.
    fn hide_popup(&mut self) {
        if self.displayed_message.is_some() && self.is_text_valid() {
            self.displayed_message = None;
            self.error_message_changed.emit(None);
        }
        self.dismiss_overlay();
    }

    fn dismiss_overlay(&mut self) {
        if self.overlay_message.take().is_some() {
            self.host.hide_error_overlay();
        }
    }

    /// Notify the field that the user closed the error overlay.
    ///
    /// Invalid text is reverted, unless focus is trapped in the field, in
    /// which case the feedback is scheduled again.
    pub fn error_overlay_closed(&mut self) {
        if self.overlay_message.take().is_none() {
            return;
        }
        if self.displayed_message.is_some() && self.is_text_valid() {
            self.displayed_message = None;
            self.error_message_changed.emit(None);
        }
        if self.is_text_valid() {
            return;
        }
        if self.focused && self.focus_trapped_on_invalid_text {
            self.schedule_feedback(Feedback::Invalid);
        } else {
            let last_valid = self.last_valid_text.clone();
            self.set_text(&last_valid);
            self.buffer.select_all();
        }
    }

    /// Check if the error overlay is shown.
    pub fn is_error_overlay_visible(&self) -> bool {
        self.overlay_message.is_some()
    }

    /// The last error message sent to listeners, if still current.
    pub fn error_message(&self) -> Option<&str> {
        self.displayed_message.as_deref()
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a listener for committed values.
    pub fn on_commit<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&String) + Send + Sync + 'static,
    {
        self.text_committed.connect(listener)
    }

    /// Register a listener for error message changes.
    pub fn on_error_message_changed<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&Option<String>) + Send + Sync + 'static,
    {
        self.error_message_changed.connect(listener)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Get the underlying buffer.
    pub fn buffer(&self) -> &ConstrainedBuffer {
        &self.buffer
    }

    /// Get the mask, if any.
    pub fn mask(&self) -> Option<&Arc<dyn Mask>> {
        self.buffer.mask()
    }

    /// Get the validator.
    pub fn validator(&self) -> &Arc<dyn Validator> {
        self.buffer.validator()
    }

    /// Set or clear the validator, then revalidate the text.
    pub fn set_validator(&mut self, validator: Option<Arc<dyn Validator>>) {
        self.buffer
            .set_validator(validator.unwrap_or_else(|| Arc::new(AcceptAll)));
        self.revalidate_text();
    }

    /// Get the formatter, if any.
    pub fn formatter(&self) -> Option<&Arc<dyn Formatter>> {
        self.formatter.as_ref()
    }

    /// Set or clear the formatter, then revalidate the text.
    pub fn set_formatter(&mut self, formatter: Option<Arc<dyn Formatter>>) {
        self.formatter = formatter;
        self.revalidate_text();
    }

    /// Get the maximum length, if any.
    pub fn maximum_length(&self) -> Option<usize> {
        self.buffer.maximum_length()
    }

    /// Set the maximum length, then revalidate the text.
    pub fn set_maximum_length(&mut self, maximum_length: Option<usize>) {
        self.buffer.set_maximum_length(maximum_length);
        self.revalidate_text();
    }

    /// Check if focus is trapped while the text is invalid.
    pub fn is_focus_trapped_on_invalid_text(&self) -> bool {
        self.focus_trapped_on_invalid_text
    }

    /// Set whether focus is trapped while the text is invalid.
    pub fn set_focus_trapped_on_invalid_text(&mut self, trapped: bool) {
        self.focus_trapped_on_invalid_text = trapped;
    }

    /// Check if the error overlay is requested on errors.
    pub fn is_tip_displayed_on_error(&self) -> bool {
        self.tip_displayed_on_error
    }

    /// Set whether the error overlay is requested on errors.
    ///
    /// Turning it off dismisses a visible overlay.
    pub fn set_tip_displayed_on_error(&mut self, displayed: bool) {
        self.tip_displayed_on_error = displayed;
        if !displayed {
            self.hide_popup();
        }
    }

    /// Check if gaining focus selects everything.
    pub fn is_selecting_all_on_focus(&self) -> bool {
        self.selecting_all_on_focus
    }

    /// Set whether gaining focus selects everything.
    pub fn set_selecting_all_on_focus(&mut self, selecting: bool) {
        self.selecting_all_on_focus = selecting;
    }

    /// Get the feedback delay.
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    /// Set the feedback delay.
    pub fn set_feedback_delay(&mut self, delay: Duration) {
        self.feedback_delay = delay;
    }

    /// Get the message templates.
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Set the message templates.
    pub fn set_messages(&mut self, messages: Messages) {
        self.messages = messages;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{FnValidator, LengthValidator};
    use horizon_entry_core::ManualClock;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingHost {
        shown: Mutex<Vec<String>>,
        hidden: AtomicUsize,
        focus_requests: AtomicUsize,
    }

    impl FieldHost for RecordingHost {
        fn show_error_overlay(&self, message: &str) {
            self.shown.lock().push(message.to_string());
        }

        fn hide_error_overlay(&self) {
            self.hidden.fetch_add(1, Ordering::SeqCst);
        }

        fn request_focus(&self) {
            self.focus_requests.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Setup {
        clock: Arc<ManualClock>,
        host: Arc<RecordingHost>,
        field: EntryField,
    }

    fn setup(text: &str, validator: impl Validator + 'static) -> Setup {
        let clock = Arc::new(ManualClock::new());
        let host = Arc::new(RecordingHost::default());
        let field = EntryField::new(text)
            .with_clock(clock.clone())
            .with_host(host.clone())
            .with_validator(Arc::new(validator));
        Setup { clock, host, field }
    }

    fn wait(clock: &ManualClock) {
        clock.advance(Duration::from_millis(150));
    }

    #[test]
    fn test_new_field_commits_initial_text() {
        let field = EntryField::new("hello");
        assert_eq!(field.display_text(), "hello");
        assert_eq!(field.valid_text(), "hello");
        assert_eq!(field.state(), FieldState::DisplayFormatted);
        assert!(!field.is_focused());
    }

    #[test]
    fn test_invalid_initial_text_uses_default() {
        let field = EntryField::new("x").with_validator(Arc::new(
            FnValidator::new(|text| text.len() > 1).with_default("ok"),
        ));
        assert_eq!(field.display_text(), "ok");
        assert_eq!(field.valid_text(), "ok");
    }

    #[test]
    fn test_pattern_field_starts_with_mask_default() {
        let field = EntryField::with_pattern("", "##-##").unwrap();
        assert_eq!(field.display_text(), "__-__");
        assert!(EntryField::with_pattern("", "").is_err());
    }

    #[test]
    fn test_set_text_keeps_last_valid_on_invalid_input() {
        let Setup { mut field, .. } = setup("abc", LengthValidator::new(2, 4));
        field.set_text("abcdefg");
        assert_eq!(field.display_text(), "abc");
        field.set_text("xy");
        assert_eq!(field.valid_text(), "xy");
    }

    #[test]
    fn test_focus_gained_selects_all() {
        let Setup { mut field, .. } = setup("abc", LengthValidator::new(0, 9));
        field.focus_gained(false);
        assert_eq!(field.state(), FieldState::Editing);
        assert_eq!(field.selection(), Some(0..3));

        field.set_selecting_all_on_focus(false);
        field.focus_lost(false);
        field.set_caret(1);
        field.focus_gained(false);
        assert_eq!(field.selection(), None);
    }

    #[test]
    fn test_temporary_focus_loss_is_ignored() {
        let Setup { mut field, .. } = setup("abc", LengthValidator::new(1, 5));
        field.focus_gained(false);
        field.set_caret(3);
        field.type_text("d");
        assert_eq!(field.focus_lost(true), FocusOutcome::Ignored);
        assert_eq!(field.display_text(), "abcd");
        assert_eq!(field.state(), FieldState::Editing);

        // The focus coming back does not select everything.
        field.focus_gained(false);
        assert_eq!(field.selection(), None);
    }

    #[test]
    fn test_commit_notifies_once() {
        let Setup { mut field, .. } = setup("a", LengthValidator::new(1, 5));
        let commits = Arc::new(Mutex::new(Vec::new()));
        let commits_clone = commits.clone();
        field.on_commit(move |text| commits_clone.lock().push(text.clone()));

        field.focus_gained(false);
        field.type_text("bc");
        assert_eq!(field.valid_text(), "a");
        assert_eq!(field.commit(), CommitOutcome::Committed);
        assert_eq!(field.commit(), CommitOutcome::Unchanged);
        assert_eq!(*commits.lock(), vec!["bc".to_string()]);
        assert_eq!(field.valid_text(), "bc");
    }

    #[test]
    fn test_debounced_feedback_shows_overlay_once() {
        let Setup {
            mut field,
            clock,
            host,
        } = setup("ab", LengthValidator::new(2, 4));
        field.focus_gained(false);
        field.set_caret(2);
        field.type_text("cde");
        assert_eq!(field.display_text(), "ab");

        field.delete_backward();
        assert!(field.is_feedback_pending());
        clock.advance(Duration::from_millis(100));
        assert!(!field.poll());
        field.type_text("x");
        assert_eq!(field.display_text(), "ax");
        field.delete_backward();
        wait(&clock);
        assert!(field.poll());
        assert_eq!(*host.shown.lock(), vec!["Length: 2 .. 4".to_string()]);
        assert!(field.is_error_overlay_visible());
        assert!(!field.poll());
    }

    #[test]
    fn test_error_message_listener_gets_none_when_valid() {
        let Setup {
            mut field, clock, ..
        } = setup("ab", LengthValidator::new(2, 4));
        let messages = Arc::new(Mutex::new(Vec::new()));
        let messages_clone = messages.clone();
        field.on_error_message_changed(move |message| messages_clone.lock().push(message.clone()));

        field.focus_gained(false);
        field.set_caret(2);
        field.delete_backward();
        wait(&clock);
        field.poll();
        field.type_text("z");
        assert_eq!(
            *messages.lock(),
            vec![Some("Length: 2 .. 4".to_string()), None]
        );
        assert!(!field.is_error_overlay_visible());
        assert_eq!(field.error_message(), None);
    }

    #[test]
    fn test_feedback_needs_focus() {
        let Setup {
            mut field,
            clock,
            host,
        } = setup("ab", LengthValidator::new(2, 4));
        field.focus_gained(false);
        field.set_caret(2);
        field.delete_backward();
        field.focused = false;
        wait(&clock);
        assert!(field.poll());
        assert!(host.shown.lock().is_empty());
    }

    #[test]
    fn test_tip_disabled_still_notifies_listeners() {
        let Setup {
            mut field,
            clock,
            host,
        } = setup("ab", LengthValidator::new(2, 4));
        field.set_tip_displayed_on_error(false);
        field.focus_gained(false);
        field.set_caret(2);
        field.delete_backward();
        wait(&clock);
        field.poll();
        assert!(host.shown.lock().is_empty());
        assert_eq!(field.error_message(), Some("Length: 2 .. 4"));
    }

    #[test]
    fn test_max_length_feedback() {
        let Setup {
            mut field,
            clock,
            host,
        } = setup("abc", LengthValidator::new(0, 10));
        field.set_maximum_length(Some(3));
        field.focus_gained(false);
        field.set_caret(3);
        assert_eq!(field.type_text("d"), EditOutcome::LengthExceeded);
        assert_eq!(field.display_text(), "abc");
        wait(&clock);
        field.poll();
        assert_eq!(*host.shown.lock(), vec!["Max length: 3".to_string()]);
        assert_eq!(field.error_message(), Some("Max length: 3"));
    }

    #[test]
    fn test_focus_lost_reverts_invalid_text() {
        let Setup { mut field, .. } = setup("abc", LengthValidator::new(3, 3));
        field.focus_gained(false);
        field.set_caret(3);
        field.delete_backward();
        assert_eq!(
            field.focus_lost(false),
            FocusOutcome::Released(CommitOutcome::Reverted)
        );
        assert_eq!(field.display_text(), "abc");
        assert!(!field.is_feedback_pending());
    }

    #[test]
    fn test_focus_trap() {
        let Setup {
            mut field, host, ..
        } = setup("abc", LengthValidator::new(3, 3));
        field.set_focus_trapped_on_invalid_text(true);
        field.focus_gained(false);
        field.set_caret(3);
        field.delete_backward();
        assert_eq!(field.focus_lost(false), FocusOutcome::Trapped);
        assert_eq!(field.state(), FieldState::Editing);
        assert_eq!(field.display_text(), "ab");
        assert_eq!(host.focus_requests.load(Ordering::SeqCst), 1);
        assert_eq!(field.commit(), CommitOutcome::Trapped);
    }

    #[test]
    fn test_escape_reverts_and_selects() {
        let Setup { mut field, .. } = setup("abc", LengthValidator::new(1, 5));
        field.focus_gained(false);
        field.set_caret(3);
        field.type_text("d");
        assert!(field.escape());
        assert_eq!(field.display_text(), "abc");
        assert_eq!(field.selection(), Some(0..3));
        assert!(!field.escape());
    }

    #[test]
    fn test_formatter_display_swap() {
        let Setup { mut field, .. } = setup("42", LengthValidator::new(1, 5));
        field.set_formatter(Some(Arc::new(|text: &str| Some(format!("<{text}>")))));
        assert_eq!(field.display_text(), "<42>");
        assert_eq!(field.valid_text(), "42");

        field.focus_gained(false);
        assert_eq!(field.display_text(), "42");
        field.set_caret(2);
        field.type_text("7");
        field.focus_lost(false);
        assert_eq!(field.display_text(), "<427>");
        assert_eq!(field.valid_text(), "427");
    }

    #[test]
    fn test_commit_with_formatter_enters_display_mode() {
        let Setup { mut field, .. } = setup("1", LengthValidator::new(1, 5));
        field.set_formatter(Some(Arc::new(|text: &str| Some(format!("#{text}")))));
        field.focus_gained(false);
        field.set_caret(1);
        field.type_text("2");
        assert_eq!(field.commit(), CommitOutcome::Committed);
        assert_eq!(field.state(), FieldState::DisplayFormatted);
        assert_eq!(field.display_text(), "#12");
    }

    #[test]
    fn test_overlay_closed_reverts_unless_trapped() {
        let Setup {
            mut field, clock, ..
        } = setup("abc", LengthValidator::new(3, 3));
        field.focus_gained(false);
        field.set_caret(3);
        field.delete_backward();
        wait(&clock);
        field.poll();
        assert!(field.is_error_overlay_visible());

        field.set_focus_trapped_on_invalid_text(true);
        field.error_overlay_closed();
        assert_eq!(field.display_text(), "ab");
        assert!(field.is_feedback_pending());

        wait(&clock);
        field.poll();
        field.set_focus_trapped_on_invalid_text(false);
        field.error_overlay_closed();
        assert_eq!(field.display_text(), "abc");
        assert_eq!(field.selection(), Some(0..3));
    }

    #[test]
    fn test_changing_validator_revalidates() {
        let Setup { mut field, .. } = setup("abcdef", LengthValidator::new(0, 10));
        field.set_validator(Some(Arc::new(
            FnValidator::new(|text| text.len() <= 3).with_default("xyz"),
        )));
        assert_eq!(field.display_text(), "xyz");
        field.set_validator(None);
        assert_eq!(field.display_text(), "xyz");
    }

    #[test]
    fn test_masked_field_typing() {
        let mut field = EntryField::with_pattern("", "##-##").unwrap();
        field.focus_gained(false);
        field.set_caret(0);
        field.type_text("1");
        field.type_text("2");
        field.type_text("3");
        assert_eq!(field.display_text(), "12-3_");
        assert_eq!(field.type_text("a"), EditOutcome::Rejected);
        assert_eq!(field.display_text(), "12-3_");
        field.delete_backward();
        assert_eq!(field.display_text(), "12-__");
        assert_eq!(field.caret(), 3);
    }

    #[test]
    fn test_apply_config() {
        let config = FieldConfig {
            feedback_delay_ms: 40,
            maximum_length: Some(2),
            focus_trapped_on_invalid_text: true,
            ..FieldConfig::default()
        };
        let field = EntryField::new("abc").with_config(&config);
        assert_eq!(field.feedback_delay(), Duration::from_millis(40));
        assert!(field.is_focus_trapped_on_invalid_text());
        assert_eq!(field.maximum_length(), Some(2));
        // "abc" no longer fits; the default valid text replaces it.
        assert_eq!(field.display_text(), "");
    }
}
