//! Domain models for the calendar store.

mod calendar;
mod event;

pub use calendar::{Calendar, CalendarKind};
pub use event::Event;

use crate::error::{StoreError, StoreResult};
use chrono::{NaiveDateTime, Utc};

/// Default display color for events and calendars.
pub const DEFAULT_COLOR: &str = "#6750A4";

/// Returns the current wall-clock time as a naive UTC timestamp.
#[must_use]
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Validates a display color of the form `#RRGGBB`.
pub(crate) fn validate_color(field: &str, value: &str) -> StoreResult<()> {
    let hex = value.strip_prefix('#').unwrap_or("");
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(StoreError::validation(
            field,
            format!("{value:?} is not a #RRGGBB color"),
        ))
    }
}

/// Validates that a required text field is non-empty.
pub(crate) fn validate_required(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        Err(StoreError::validation(field, format!("{field} is required")))
    } else {
        Ok(())
    }
}
