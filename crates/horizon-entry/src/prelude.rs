//! Prelude module for Horizon Entry.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use horizon_entry::prelude::*;
//! ```

// ============================================================================
// Core
// ============================================================================

pub use horizon_entry_core::{ConnectionId, EntryError, MaskError, NumberError, Signal};

// ============================================================================
// Constraints
// ============================================================================

pub use crate::formatter::Formatter;
pub use crate::mask::{Mask, MaskExt, PatternMask};
pub use crate::validator::{
    AcceptAll, FnValidator, LengthValidator, RegexValidator, ValidationState, Validator,
};

// ============================================================================
// Fields
// ============================================================================

pub use crate::buffer::{ConstrainedBuffer, EditOutcome};
pub use crate::config::{FieldConfig, Messages, Separators};
pub use crate::field::{CommitOutcome, EntryField, FieldHost, FieldState, FocusOutcome};
pub use crate::number::{BigDecimal, BigInteger, EntryNumber, NumberEntryField};
pub use crate::time::{TimeComponent, TimeEditor, TimePrecision};
