//! Positional input masks.
//!
//! A mask constrains a fixed-length text: every position either holds a
//! literal separator or accepts one class of characters, optionally folding
//! case on the way in. Masked text never grows or shrinks. Typing overwrites
//! positions, and deleting resets them to the filler character.
//!
//! # Pattern Characters
//!
//! | Char | Meaning |
//! |------|---------|
//! | `#`  | Digit (0-9) |
//! | `U`  | Letter, converted to uppercase |
//! | `L`  | Letter, converted to lowercase |
//! | `A`  | Letter or digit |
//! | `?`  | Any letter |
//! | `*`  | Any character |
//! | `H`  | Hex character (0-9, a-f, A-F) |
//! | `'`  | Escape the following character to use it as a literal |
//!
//! Any other character is a literal separator.
//!
//! # Example
//!
//! ```
//! use horizon_entry::mask::{MaskExt, PatternMask};
//!
//! let mask = PatternMask::new("##-##-##").unwrap();
//! assert_eq!(mask.default_text(), "__-__-__");
//!
//! let text = mask.apply_insertion("__-__-__", "12", 0).unwrap();
//! assert_eq!(text, "12-__-__");
//!
//! // A letter does not fit a digit position; nothing is written.
//! assert_eq!(mask.apply_insertion(&text, "x", 3), None);
//! ```

use std::fmt;
use std::sync::Arc;

use horizon_entry_core::MaskError;
use horizon_entry_core::logging::targets;

/// The default filler character of a [`PatternMask`].
pub const DEFAULT_FILLER: char = '_';

/// A positional policy over a fixed-length text.
///
/// Positions are character (code point) indices. Implement the four
/// primitives; the derived operations come from [`MaskExt`].
pub trait Mask: Send + Sync {
    /// The character to store at `position` when `candidate` is typed there.
    ///
    /// Returns `None` if the candidate is not acceptable at that position.
    /// `text` is the full current text, for masks whose rules depend on
    /// neighboring positions.
    fn code_point_at(&self, text: &str, candidate: char, position: usize) -> Option<char>;

    /// The filler character for `position`.
    fn default_code_point_at(&self, position: usize) -> char;

    /// The fixed length of masked text.
    fn len(&self) -> usize;

    /// The first editable position at or after `position`.
    ///
    /// Returns [`len`](Mask::len) when no editable position remains.
    fn next_editable_position(&self, position: usize) -> usize;
}

impl<M: Mask + ?Sized> Mask for Arc<M> {
    fn code_point_at(&self, text: &str, candidate: char, position: usize) -> Option<char> {
        (**self).code_point_at(text, candidate, position)
    }

    fn default_code_point_at(&self, position: usize) -> char {
        (**self).default_code_point_at(position)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn next_editable_position(&self, position: usize) -> usize {
        (**self).next_editable_position(position)
    }
}

impl<M: Mask + ?Sized> Mask for Box<M> {
    fn code_point_at(&self, text: &str, candidate: char, position: usize) -> Option<char> {
        (**self).code_point_at(text, candidate, position)
    }

    fn default_code_point_at(&self, position: usize) -> char {
        (**self).default_code_point_at(position)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn next_editable_position(&self, position: usize) -> usize {
        (**self).next_editable_position(position)
    }
}

/// Operations derived from the [`Mask`] primitives.
///
/// Implemented for every mask; there is nothing to override.
pub trait MaskExt: Mask {
    /// Check that `text` has the mask length and every character is accepted
    /// at its position.
    fn is_complete(&self, text: &str) -> bool {
        if text.chars().count() != self.len() {
            return false;
        }
        text.chars()
            .enumerate()
            .all(|(position, ch)| self.code_point_at(text, ch, position).is_some())
    }

    /// The all-filler text.
    fn default_text(&self) -> String {
        (0..self.len())
            .map(|position| self.default_code_point_at(position))
            .collect()
    }

    /// Overwrite the positions starting at `position` with `inserted`.
    ///
    /// Every inserted character is checked (and possibly case-folded) at its
    /// target position. If any is rejected, or the run does not fit, or
    /// `text` is not of mask length, nothing is written and `None` is
    /// returned.
    fn apply_insertion(&self, text: &str, inserted: &str, position: usize) -> Option<String> {
        let length = self.len();
        let mut chars: Vec<char> = text.chars().collect();
        if chars.len() != length {
            return None;
        }
        let inserted: Vec<char> = inserted.chars().collect();
        if position + inserted.len() > length {
            return None;
        }
        for (offset, candidate) in inserted.into_iter().enumerate() {
            let target = position + offset;
            let stored = self.code_point_at(text, candidate, target)?;
            chars[target] = stored;
        }
        Some(chars.into_iter().collect())
    }

    /// Reset `count` positions starting at `position` to their filler.
    ///
    /// The text keeps its length. A range reaching past the end is clamped.
    fn apply_removal(&self, text: &str, position: usize, count: usize) -> String {
        let mut chars: Vec<char> = text.chars().collect();
        let end = position.saturating_add(count);
        if end > chars.len() {
            tracing::warn!(
                target: targets::MASK,
                position,
                count,
                length = chars.len(),
                "removal range clamped to mask length"
            );
        }
        let end = end.min(chars.len());
        for (index, ch) in chars.iter_mut().enumerate().take(end).skip(position) {
            *ch = self.default_code_point_at(index);
        }
        chars.into_iter().collect()
    }
}

impl<M: Mask + ?Sized> MaskExt for M {}

/// Character class of an editable mask position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Digit (0-9) - pattern char: #
    Digit,
    /// Letter, stored uppercase - pattern char: U
    LetterToUppercase,
    /// Letter, stored lowercase - pattern char: L
    LetterToLowercase,
    /// Letter or digit - pattern char: A
    LetterOrDigit,
    /// Hexadecimal (0-9, A-F, a-f) - pattern char: H
    Hex,
    /// Any letter - pattern char: ?
    AnyLetter,
    /// Any character - pattern char: *
    AnyChar,
}

impl CharClass {
    /// The class for a pattern token, if the character is a token.
    pub fn from_token(token: char) -> Option<Self> {
        match token {
            '#' => Some(CharClass::Digit),
            'U' => Some(CharClass::LetterToUppercase),
            'L' => Some(CharClass::LetterToLowercase),
            'A' => Some(CharClass::LetterOrDigit),
            'H' => Some(CharClass::Hex),
            '?' => Some(CharClass::AnyLetter),
            '*' => Some(CharClass::AnyChar),
            _ => None,
        }
    }

    /// The pattern token for this class.
    pub fn token(&self) -> char {
        match self {
            CharClass::Digit => '#',
            CharClass::LetterToUppercase => 'U',
            CharClass::LetterToLowercase => 'L',
            CharClass::LetterOrDigit => 'A',
            CharClass::Hex => 'H',
            CharClass::AnyLetter => '?',
            CharClass::AnyChar => '*',
        }
    }

    /// Accept and transform a character, or reject it.
    pub fn accept(&self, ch: char) -> Option<char> {
        match self {
            CharClass::Digit => ch.is_ascii_digit().then_some(ch),
            CharClass::LetterToUppercase => ch
                .is_alphabetic()
                .then(|| ch.to_uppercase().next().unwrap_or(ch)),
            CharClass::LetterToLowercase => ch
                .is_alphabetic()
                .then(|| ch.to_lowercase().next().unwrap_or(ch)),
            CharClass::LetterOrDigit => (ch.is_alphabetic() || ch.is_ascii_digit()).then_some(ch),
            CharClass::Hex => ch.is_ascii_hexdigit().then_some(ch),
            CharClass::AnyLetter => ch.is_alphabetic().then_some(ch),
            CharClass::AnyChar => Some(ch),
        }
    }
}

/// A single position of a parsed pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskElement {
    /// A fixed separator that is displayed but cannot be edited.
    Literal(char),
    /// An editable slot.
    Editable(CharClass),
}

impl MaskElement {
    /// Returns true if this element is a literal separator.
    pub fn is_literal(&self) -> bool {
        matches!(self, MaskElement::Literal(_))
    }

    /// Returns true if this element can accept user input.
    pub fn is_editable(&self) -> bool {
        !self.is_literal()
    }
}

/// A mask parsed from a compact pattern string.
///
/// Editable positions also accept the filler character itself, which stands
/// for "not filled in yet". The all-filler text is therefore complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMask {
    pattern: String,
    elements: Vec<MaskElement>,
    filler: char,
}

impl PatternMask {
    /// Parse a pattern using the default `_` filler.
    ///
    /// # Errors
    ///
    /// Fails if the pattern is empty, ends with a dangling `'`, or has no
    /// editable position.
    pub fn new(pattern: &str) -> Result<Self, MaskError> {
        Self::with_filler(pattern, DEFAULT_FILLER)
    }

    /// Parse a pattern with a custom filler character.
    pub fn with_filler(pattern: &str, filler: char) -> Result<Self, MaskError> {
        if pattern.is_empty() {
            return Err(MaskError::EmptyPattern);
        }

        let mut elements = Vec::with_capacity(pattern.len());
        let mut chars = pattern.chars();
        while let Some(ch) = chars.next() {
            let element = if ch == '\'' {
                match chars.next() {
                    Some(escaped) => MaskElement::Literal(escaped),
                    None => {
                        return Err(MaskError::DanglingEscape {
                            pattern: pattern.to_string(),
                        });
                    }
                }
            } else {
                CharClass::from_token(ch)
                    .map(MaskElement::Editable)
                    .unwrap_or(MaskElement::Literal(ch))
            };
            elements.push(element);
        }

        if !elements.iter().any(MaskElement::is_editable) {
            return Err(MaskError::NoEditablePosition {
                pattern: pattern.to_string(),
            });
        }

        tracing::debug!(
            target: targets::MASK,
            pattern,
            length = elements.len(),
            "pattern mask parsed"
        );

        Ok(Self {
            pattern: pattern.to_string(),
            elements,
            filler,
        })
    }

    /// Get the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Get the filler character.
    pub fn filler(&self) -> char {
        self.filler
    }

    /// Get the parsed elements.
    pub fn elements(&self) -> &[MaskElement] {
        &self.elements
    }

    /// Get the number of editable positions.
    pub fn editable_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_editable()).count()
    }
}

impl Mask for PatternMask {
    fn code_point_at(&self, _text: &str, candidate: char, position: usize) -> Option<char> {
        match self.elements.get(position)? {
            MaskElement::Literal(literal) => (candidate == *literal).then_some(candidate),
            MaskElement::Editable(_) if candidate == self.filler => Some(candidate),
            MaskElement::Editable(class) => class.accept(candidate),
        }
    }

    fn default_code_point_at(&self, position: usize) -> char {
        match self.elements.get(position) {
            Some(MaskElement::Literal(literal)) => *literal,
            _ => self.filler,
        }
    }

    fn len(&self) -> usize {
        self.elements.len()
    }

    fn next_editable_position(&self, position: usize) -> usize {
        self.elements
            .iter()
            .enumerate()
            .skip(position)
            .find(|(_, element)| element.is_editable())
            .map(|(index, _)| index)
            .unwrap_or(self.elements.len())
    }
}

impl fmt::Display for PatternMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}
