//! Horizon Entry console walkthrough
//!
//! Drives a few entry fields the way a toolkit would, printing what a user
//! would see:
//! - a masked phone field
//! - a bounded integer field with scaling keys
//! - a trapped field whose error feedback fires after the delay
//! - a time editor with auto-advance
//!
//! Run with: cargo run -p horizon-entry --example entry_fields
//! Set `RUST_LOG=horizon_entry=debug` to watch the state machine.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use horizon_entry::prelude::*;
use horizon_entry::{ManualClock, Result};

/// Prints overlay requests instead of drawing them.
struct ConsoleHost;

impl FieldHost for ConsoleHost {
    fn show_error_overlay(&self, message: &str) {
        println!("    [overlay] {message}");
    }

    fn hide_error_overlay(&self) {
        println!("    [overlay hidden]");
    }

    fn request_focus(&self) {
        println!("    [focus requested back]");
    }
}

fn type_chars(field: &mut EntryField, text: &str) {
    for ch in text.chars() {
        let outcome = field.type_text(&ch.to_string());
        println!("  typed {ch:?} -> {:<16} {outcome:?}", field.display_text());
    }
}

fn phone_demo() -> Result<()> {
    println!("Phone mask");
    println!("----------");
    let mut phone = EntryField::with_pattern("", "(###) ###-####")?;
    phone.on_commit(|text| println!("  committed {text}"));
    phone.focus_gained(false);
    phone.set_caret(0);
    type_chars(&mut phone, "555x1234567");
    println!("  focus lost: {:?}", phone.focus_lost(false));
    println!();
    Ok(())
}

fn number_demo() -> Result<()> {
    println!("Integer field, range 0 .. 1000000");
    println!("---------------------------------");
    let separators = Separators::default();
    let mut amount = NumberEntryField::<i64>::with_separators(12, separators)
        .with_range(Some(0), Some(1_000_000))?
        .with_grouping(true);
    println!("  shown unfocused: {}", amount.as_field().display_text());

    amount.as_field_mut().focus_gained(false);
    println!("  editing:         {}", amount.as_field().display_text());
    for key in ["k", "k", "K"] {
        let outcome = amount.type_text(key);
        println!("  key {key:?} -> {} {outcome:?}", amount.as_field().display_text());
    }
    amount.as_field_mut().focus_lost(false);
    println!("  value {:?}, shown {}", amount.number(), amount.as_field().display_text());
    println!();
    Ok(())
}

fn trapped_demo() {
    println!("Trapped field, length 3 .. 5");
    println!("----------------------------");
    let clock = Arc::new(ManualClock::new());
    let mut field = EntryField::new("abc")
        .with_clock(clock.clone())
        .with_host(Arc::new(ConsoleHost))
        .with_validator(Arc::new(LengthValidator::new(3, 5)));
    field.set_focus_trapped_on_invalid_text(true);
    field.on_error_message_changed(|message| println!("  message: {message:?}"));

    field.focus_gained(false);
    type_chars(&mut field, "xy");
    clock.advance(Duration::from_millis(150));
    field.poll();
    println!("  focus lost: {:?}", field.focus_lost(false));
    println!("  escape reverted: {}", field.escape());
    println!("  focus lost: {:?}", field.focus_lost(false));
    println!();
}

fn time_demo() {
    println!("Time editor");
    println!("-----------");
    let start = NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default();
    let mut editor = TimeEditor::with_time(start, TimePrecision::Second);
    editor.focus(TimeComponent::Hour);
    for digit in "174512".chars() {
        editor.type_digit(digit);
        println!("  typed {digit:?}, active {}", editor.active_component());
    }
    editor.spin(1);
    editor.focus_lost();
    println!("  time {}", editor.time());
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("Horizon Entry walkthrough");
    println!("=========================");
    println!();

    phone_demo()?;
    number_demo()?;
    trapped_demo();
    time_demo();
    Ok(())
}
