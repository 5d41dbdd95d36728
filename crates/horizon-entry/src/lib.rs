//! Horizon Entry - masked and validated text entry.
//!
//! This is the main crate of the entry engine. It builds on
//! [`horizon_entry_core`] and provides:
//!
//! - **Masks** ([`mask`]): positional policies such as `(###) ###-####`
//! - **Validators** ([`validator`]): input filters and completeness checks
//! - **Formatters** ([`formatter`]): display text for committed values
//! - **Buffers** ([`buffer`]): text storage that enforces all of the above
//! - **Fields** ([`field`]): the focus, commit and feedback state machine
//! - **Numbers** ([`number`]) and **times** ([`time`]): ready-made fields
//!
//! Nothing here draws. A field reports what to show through its
//! [`FieldHost`](field::FieldHost) and its signals.
//!
//! # Example
//!
//! ```
//! use horizon_entry::prelude::*;
//!
//! let mut phone = EntryField::with_pattern("", "(###) ###-####").unwrap();
//! assert_eq!(phone.display_text(), "(___) ___-____");
//!
//! phone.focus_gained(false);
//! phone.set_caret(0);
//! for digit in "5551234567".chars() {
//!     phone.type_text(&digit.to_string());
//! }
//! assert_eq!(phone.display_text(), "(555) 123-4567");
//! assert!(phone.is_text_valid());
//! ```

pub use horizon_entry_core::*;

pub mod buffer;
pub mod config;
pub mod field;
pub mod formatter;
pub mod mask;
pub mod number;
pub mod prelude;
pub mod time;
pub mod validator;
