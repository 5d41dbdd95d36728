//! Time entry.
//!
//! A [`TimeEditor`] edits a [`NaiveTime`] through one small numeric field
//! per [`TimeComponent`]. Each field accepts at most its width in digits and
//! values below its bound, and is padded with zeros when it loses focus.
//! Typing a digit that leaves no room for another moves on to the next
//! component, and spinning adjusts the active component with wrap-around.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveTime;
//! use horizon_entry::time::{TimeComponent, TimeEditor, TimePrecision};
//!
//! let mut editor = TimeEditor::with_time(
//!     NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
//!     TimePrecision::Minute,
//! );
//! editor.focus(TimeComponent::Hour);
//! editor.type_digit('1');
//! editor.type_digit('7');
//! // The hour is full, so the minute field is now active.
//! assert_eq!(editor.active_component(), TimeComponent::Minute);
//!
//! editor.spin(-31);
//! assert_eq!(editor.time(), NaiveTime::from_hms_opt(17, 59, 0).unwrap());
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{Local, NaiveTime, Timelike};
use horizon_entry_core::logging::targets;

use crate::buffer::EditOutcome;
use crate::field::{EntryField, FocusOutcome};
use crate::validator::Validator;

/// A component of a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeComponent {
    /// Hours, `0..24`.
    Hour,
    /// Minutes, `0..60`.
    Minute,
    /// Seconds, `0..60`.
    Second,
    /// Milliseconds, `0..1000`.
    Millisecond,
}

impl TimeComponent {
    /// The exclusive upper bound of the component's values.
    pub fn bound(self) -> u32 {
        match self {
            Self::Hour => 24,
            Self::Minute | Self::Second => 60,
            Self::Millisecond => 1000,
        }
    }

    /// The number of digits shown.
    pub fn width(self) -> usize {
        match self {
            Self::Millisecond => 3,
            _ => 2,
        }
    }

    /// The separator shown before the component, if any.
    pub fn leading_separator(self) -> Option<char> {
        match self {
            Self::Hour => None,
            Self::Minute | Self::Second => Some(':'),
            Self::Millisecond => Some('.'),
        }
    }

    fn of(self, time: NaiveTime) -> u32 {
        match self {
            Self::Hour => time.hour(),
            Self::Minute => time.minute(),
            Self::Second => time.second(),
            Self::Millisecond => (time.nanosecond() % 1_000_000_000) / 1_000_000,
        }
    }
}

impl fmt::Display for TimeComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hour => write!(f, "hour"),
            Self::Minute => write!(f, "minute"),
            Self::Second => write!(f, "second"),
            Self::Millisecond => write!(f, "millisecond"),
        }
    }
}

/// The finest component a [`TimeEditor`] shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimePrecision {
    /// Hours and minutes.
    #[default]
    Minute,
    /// Hours, minutes and seconds.
    Second,
    /// Down to milliseconds.
    Millisecond,
}

impl TimePrecision {
    /// The components shown, from the hour down.
    pub fn components(self) -> &'static [TimeComponent] {
        use TimeComponent::*;
        match self {
            Self::Minute => &[Hour, Minute],
            Self::Second => &[Hour, Minute, Second],
            Self::Millisecond => &[Hour, Minute, Second, Millisecond],
        }
    }
}

/// Accepts up to `width` digits with a value below `bound`.
#[derive(Debug, Clone, Copy)]
struct TimeComponentValidator {
    component: TimeComponent,
}

impl Validator for TimeComponentValidator {
    fn is_input_allowed(&self, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }
        text.len() <= self.component.width()
            && text.chars().all(|c| c.is_ascii_digit())
            && text
                .parse::<u32>()
                .is_ok_and(|value| value < self.component.bound())
    }

    fn is_complete(&self, text: &str) -> bool {
        self.is_input_allowed(text)
    }

    fn default_valid_value(&self) -> String {
        "0".repeat(self.component.width())
    }
}

/// An entry field for one time component.
#[derive(Debug)]
pub struct TimeComponentField {
    component: TimeComponent,
    field: EntryField,
}

impl TimeComponentField {
    /// Create a field holding zero.
    pub fn new(component: TimeComponent) -> Self {
        let validator = TimeComponentValidator { component };
        let field =
            EntryField::new(&validator.default_valid_value()).with_validator(Arc::new(validator));
        Self { component, field }
    }

    /// The component edited.
    pub fn component(&self) -> TimeComponent {
        self.component
    }

    /// The value typed so far. Empty text counts as zero.
    pub fn time_value(&self) -> u32 {
        self.field.display_text().parse().unwrap_or(0)
    }

    /// Set the value, wrapping it into range and padding it with zeros.
    pub fn set_time_value(&mut self, value: i64) {
        let value = value.rem_euclid(i64::from(self.component.bound()));
        let text = format!("{value:0width$}", width = self.component.width());
        self.field.set_text(&text);
    }

    /// Step the value by `delta`, wrapping around, and select it.
    pub fn adjust(&mut self, delta: i64) {
        self.set_time_value(i64::from(self.time_value()) + delta);
        self.field.select_all();
    }

    /// Whether another digit could not fit after the current value.
    pub fn completes_on_digit(&self) -> bool {
        self.time_value() * 10 >= self.component.bound()
    }

    /// Type text at the caret.
    pub fn type_text(&mut self, text: &str) -> EditOutcome {
        self.field.type_text(text)
    }

    /// Notify the field that it gained focus.
    pub fn focus_gained(&mut self) {
        self.field.focus_gained(false);
    }

    /// Notify the field that it lost focus, then pad its value.
    pub fn focus_lost(&mut self) -> FocusOutcome {
        let outcome = self.field.focus_lost(false);
        self.set_time_value(i64::from(self.time_value()));
        outcome
    }

    /// The wrapped field.
    pub fn as_field(&self) -> &EntryField {
        &self.field
    }

    /// The wrapped field, mutably.
    pub fn as_field_mut(&mut self) -> &mut EntryField {
        &mut self.field
    }
}

/// A time-of-day editor made of one field per component.
#[derive(Debug)]
pub struct TimeEditor {
    precision: TimePrecision,
    fields: Vec<TimeComponentField>,
    active: usize,
    focused: bool,
    /// Supplies the components finer than the precision.
    base: NaiveTime,
}

impl TimeEditor {
    /// Create an editor holding the current local time.
    pub fn new(precision: TimePrecision) -> Self {
        Self::with_time(Local::now().time(), precision)
    }

    /// Create an editor holding `time`.
    pub fn with_time(time: NaiveTime, precision: TimePrecision) -> Self {
        let fields = precision
            .components()
            .iter()
            .map(|&component| TimeComponentField::new(component))
            .collect();
        let mut editor = Self {
            precision,
            fields,
            active: 0,
            focused: false,
            base: time,
        };
        editor.set_time(time);
        editor
    }

    /// The precision.
    pub fn precision(&self) -> TimePrecision {
        self.precision
    }

    /// Set the time. Components finer than the precision are kept and
    /// returned by [`time`](Self::time).
    pub fn set_time(&mut self, time: NaiveTime) {
        self.base = time;
        for field in &mut self.fields {
            field.set_time_value(i64::from(field.component.of(time)));
        }
    }

    /// The time shown.
    pub fn time(&self) -> NaiveTime {
        let hour = self.value_of(TimeComponent::Hour);
        let minute = self.value_of(TimeComponent::Minute);
        let second = self.value_of(TimeComponent::Second);
        let nanosecond = match self.field(TimeComponent::Millisecond) {
            Some(field) => field.time_value() * 1_000_000,
            None => self.base.nanosecond() % 1_000_000_000,
        };
        NaiveTime::from_hms_nano_opt(hour, minute, second, nanosecond).unwrap_or(self.base)
    }

    fn value_of(&self, component: TimeComponent) -> u32 {
        self.field(component)
            .map_or_else(|| component.of(self.base), TimeComponentField::time_value)
    }

    /// The field of a component, if the precision shows it.
    pub fn field(&self, component: TimeComponent) -> Option<&TimeComponentField> {
        self.fields.iter().find(|field| field.component == component)
    }

    /// The field of a component, mutably.
    pub fn field_mut(&mut self, component: TimeComponent) -> Option<&mut TimeComponentField> {
        self.fields
            .iter_mut()
            .find(|field| field.component == component)
    }

    /// The component receiving typing and spinning.
    pub fn active_component(&self) -> TimeComponent {
        self.fields[self.active].component
    }

    /// Check if the editor has focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Give focus to the editor, on its active component.
    pub fn focus_gained(&mut self) {
        self.focused = true;
        self.fields[self.active].focus_gained();
    }

    /// Take focus away from the editor.
    pub fn focus_lost(&mut self) {
        if self.focused {
            self.focused = false;
            self.fields[self.active].focus_lost();
        }
    }

    /// Move the focus to `component`.
    ///
    /// The previously active field loses focus. Returns `false` if the
    /// precision does not show the component.
    pub fn focus(&mut self, component: TimeComponent) -> bool {
        let Some(index) = self.fields.iter().position(|f| f.component == component) else {
            tracing::debug!(target: targets::TIME, %component, "component not shown");
            return false;
        };
        if self.focused && index == self.active {
            return true;
        }
        if self.focused {
            self.fields[self.active].focus_lost();
        }
        tracing::trace!(target: targets::TIME, %component, "component focused");
        self.active = index;
        self.focused = true;
        self.fields[index].focus_gained();
        true
    }

    /// Step the active component by `delta`.
    pub fn spin(&mut self, delta: i64) {
        self.fields[self.active].adjust(delta);
    }

    /// Type a character into the active component.
    ///
    /// After a digit, focus moves on to the next component when the active
    /// one cannot take another digit.
    pub fn type_digit(&mut self, ch: char) -> EditOutcome {
        if !self.focused {
            self.focus_gained();
        }
        let mut buf = [0u8; 4];
        let outcome = self.fields[self.active].type_text(ch.encode_utf8(&mut buf));
        if outcome.is_applied()
            && ch.is_ascii_digit()
            && self.fields[self.active].completes_on_digit()
        {
            self.move_to(self.active + 1);
        }
        outcome
    }

    /// Handle the right arrow: at the end of a component, move to the next.
    pub fn move_right(&mut self) -> bool {
        let field = &self.fields[self.active].field;
        if field.caret() < field.display_text().chars().count() || field.selection().is_some() {
            return false;
        }
        self.move_to(self.active + 1)
    }

    /// Handle the left arrow: at the start of a component, move to the
    /// previous one.
    pub fn move_left(&mut self) -> bool {
        let field = &self.fields[self.active].field;
        let start = field.selection().map_or(field.caret(), |range| range.start);
        if start > 0 || self.active == 0 {
            return false;
        }
        self.move_to(self.active - 1)
    }

    fn move_to(&mut self, index: usize) -> bool {
        match self.fields.get(index) {
            Some(field) => {
                let component = field.component;
                self.focus(component)
            }
            None => false,
        }
    }
}
