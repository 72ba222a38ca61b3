//! The event model.

use crate::error::{StoreError, StoreResult};
use crate::model::{now, validate_color, validate_required, DEFAULT_COLOR};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use uuid::Uuid;

/// A calendar event.
///
/// Events are identified by a caller-assigned string id (a UUID by
/// default). Deletion is soft: [`Event::deleted`] marks a tombstone that is
/// invisible to every query until purged. The `synced` flag is cleared
/// whenever local state diverges from the remote copy identified by
/// `sync_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Stable, unique, caller-assigned id.
    pub id: String,
    /// Event title. Required.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Optional location text.
    pub location: Option<String>,
    /// Start timestamp.
    pub start: NaiveDateTime,
    /// End timestamp. For all-day events this is rewritten to the end of
    /// the start day during validation.
    pub end: NaiveDateTime,
    /// Whether the event spans the whole day.
    pub all_day: bool,
    /// Display color (`#RRGGBB`).
    pub color: String,
    /// Id of the owning calendar.
    pub calendar_id: String,
    /// Optional RFC 5545 recurrence rule. Stored opaquely; expansion is out
    /// of scope for the store.
    pub recurrence_rule: Option<String>,
    /// Reminder lead times in minutes before the start.
    pub reminder_minutes: Vec<u32>,
    /// Whether the remote counterpart has acknowledged this state.
    pub synced: bool,
    /// External sync id correlating the local row with its remote copy.
    pub sync_id: Option<String>,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
    /// Last modification timestamp.
    pub updated_at: NaiveDateTime,
    /// Soft-delete flag.
    pub deleted: bool,
}

impl Event {
    /// Creates a new event with a generated UUID id and default color.
    ///
    /// The event is dirty (`synced == false`) until a sync service
    /// acknowledges it.
    pub fn new(
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        calendar_id: impl Into<String>,
    ) -> Self {
        let created = now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            location: None,
            start,
            end,
            all_day: false,
            color: DEFAULT_COLOR.to_string(),
            calendar_id: calendar_id.into(),
            recurrence_rule: None,
            reminder_minutes: Vec::new(),
            synced: false,
            sync_id: None,
            created_at: created,
            updated_at: created,
            deleted: false,
        }
    }

    /// Validates the event, normalizing the all-day end timestamp.
    ///
    /// All-day events get a synthetic end at 23:59:59 of the start date so
    /// that `end >= start` holds uniformly.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the title is blank, the color
    /// is not `#RRGGBB`, the calendar id is blank, or `end < start`.
    pub fn validate(&mut self) -> StoreResult<()> {
        validate_required("title", &self.title)?;
        validate_required("calendar_id", &self.calendar_id)?;
        validate_color("color", &self.color)?;

        if self.all_day {
            if let Some(end_of_day) = self.start.date().and_hms_opt(23, 59, 59) {
                self.end = end_of_day;
            }
        }

        if self.end < self.start {
            return Err(StoreError::validation(
                "end",
                "end must not be before start",
            ));
        }

        Ok(())
    }

    /// Query ordering: start ascending, id as a deterministic tie-break.
    pub(crate) fn order(a: &Self, b: &Self) -> Ordering {
        a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id))
    }

    /// True if the query text matches title, description, or location,
    /// case-insensitively.
    pub(crate) fn matches(&self, needle_lower: &str) -> bool {
        let contains = |field: &str| field.to_lowercase().contains(needle_lower);
        contains(&self.title)
            || self.description.as_deref().is_some_and(contains)
            || self.location.as_deref().is_some_and(contains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn new_event_is_dirty() {
        let event = Event::new("Standup", at(9, 0), at(9, 30), "cal-a");
        assert!(!event.synced);
        assert!(!event.deleted);
        assert_eq!(event.color, DEFAULT_COLOR);
        assert!(!event.id.is_empty());
    }

    #[test]
    fn validate_rejects_blank_title() {
        let mut event = Event::new("  ", at(9, 0), at(10, 0), "cal-a");
        assert!(matches!(
            event.validate(),
            Err(StoreError::Validation { field, .. }) if field == "title"
        ));
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let mut event = Event::new("Standup", at(10, 0), at(9, 0), "cal-a");
        assert!(matches!(
            event.validate(),
            Err(StoreError::Validation { field, .. }) if field == "end"
        ));
    }

    #[test]
    fn all_day_end_is_normalized() {
        let mut event = Event::new("Holiday", at(9, 0), at(9, 0), "cal-a");
        event.all_day = true;
        event.validate().unwrap();

        let end_of_day = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(event.end, end_of_day);
    }

    #[test]
    fn search_matches_all_text_fields() {
        let mut event = Event::new("Team Standup", at(9, 0), at(10, 0), "cal-a");
        event.description = Some("Weekly planning".into());
        event.location = Some("Room 4".into());

        assert!(event.matches("standup"));
        assert!(event.matches("planning"));
        assert!(event.matches("room"));
        assert!(!event.matches("absent"));
    }

    #[test]
    fn ordering_is_by_start_then_id() {
        let mut a = Event::new("A", at(9, 0), at(10, 0), "cal-a");
        let mut b = Event::new("B", at(8, 0), at(9, 0), "cal-a");
        a.id = "a".into();
        b.id = "b".into();

        assert_eq!(Event::order(&b, &a), Ordering::Less);

        b.start = a.start;
        assert_eq!(Event::order(&a, &b), Ordering::Less);
    }
}
