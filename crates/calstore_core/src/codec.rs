//! Persisted row schema and table snapshot codec.
//!
//! Tables are persisted as CBOR arrays of rows. Rows keep timestamps as
//! sortable ISO-8601 strings and booleans as 0/1 integers so snapshots stay
//! portable across tooling that inspects them.

use crate::error::{StoreError, StoreResult};
use crate::model::{Calendar, CalendarKind, Event};
use crate::table::StoreEntity;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Timestamp encoding: sortable ISO-8601 with millisecond precision.
const TIME_ENCODE: &str = "%Y-%m-%dT%H:%M:%S%.3f";
/// Timestamp decoding accepts any fractional precision.
const TIME_DECODE: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub(crate) fn encode_time(t: NaiveDateTime) -> String {
    t.format(TIME_ENCODE).to_string()
}

pub(crate) fn decode_time(s: &str) -> StoreResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIME_DECODE)
        .map_err(|e| StoreError::corrupt(format!("bad timestamp {s:?}: {e}")))
}

fn encode_bool(b: bool) -> u8 {
    u8::from(b)
}

fn decode_bool(b: u8) -> bool {
    b != 0
}

/// Persisted form of an [`Event`].
#[derive(Debug, Serialize, Deserialize)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date_time: String,
    pub end_date_time: String,
    pub is_all_day: u8,
    pub location: Option<String>,
    pub color: String,
    pub calendar_id: String,
    pub recurrence_rule: Option<String>,
    pub reminder_minutes: Vec<u32>,
    pub is_synced: u8,
    pub sync_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub is_deleted: u8,
}

/// Persisted form of a [`Calendar`].
#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub is_visible: u8,
    pub is_primary: u8,
    pub calendar_type: String,
    pub account_email: Option<String>,
    pub sync_id: Option<String>,
    pub is_synced: u8,
    pub created_at: String,
    pub updated_at: String,
    pub is_deleted: u8,
}

impl StoreEntity for Event {
    type Row = EventRow;

    const TABLE: &'static str = "events";

    fn id(&self) -> &str {
        &self.id
    }

    fn deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, at: NaiveDateTime) {
        self.deleted = true;
        self.updated_at = at;
    }

    fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    fn touch(&mut self, at: NaiveDateTime) {
        self.updated_at = at;
    }

    fn synced(&self) -> bool {
        self.synced
    }

    fn set_synced(&mut self, synced: bool) {
        self.synced = synced;
    }

    fn sync_id(&self) -> Option<&str> {
        self.sync_id.as_deref()
    }

    fn validate(&mut self) -> StoreResult<()> {
        Event::validate(self)
    }

    fn order(a: &Self, b: &Self) -> std::cmp::Ordering {
        Event::order(a, b)
    }

    fn to_row(&self) -> EventRow {
        EventRow {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            start_date_time: encode_time(self.start),
            end_date_time: encode_time(self.end),
            is_all_day: encode_bool(self.all_day),
            location: self.location.clone(),
            color: self.color.clone(),
            calendar_id: self.calendar_id.clone(),
            recurrence_rule: self.recurrence_rule.clone(),
            reminder_minutes: self.reminder_minutes.clone(),
            is_synced: encode_bool(self.synced),
            sync_id: self.sync_id.clone(),
            created_at: encode_time(self.created_at),
            updated_at: encode_time(self.updated_at),
            is_deleted: encode_bool(self.deleted),
        }
    }

    fn from_row(row: EventRow) -> StoreResult<Self> {
        Ok(Event {
            id: row.id,
            title: row.title,
            description: row.description,
            start: decode_time(&row.start_date_time)?,
            end: decode_time(&row.end_date_time)?,
            all_day: decode_bool(row.is_all_day),
            location: row.location,
            color: row.color,
            calendar_id: row.calendar_id,
            recurrence_rule: row.recurrence_rule,
            reminder_minutes: row.reminder_minutes,
            synced: decode_bool(row.is_synced),
            sync_id: row.sync_id,
            created_at: decode_time(&row.created_at)?,
            updated_at: decode_time(&row.updated_at)?,
            deleted: decode_bool(row.is_deleted),
        })
    }
}

impl StoreEntity for Calendar {
    type Row = CalendarRow;

    const TABLE: &'static str = "calendars";

    fn id(&self) -> &str {
        &self.id
    }

    fn deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, at: NaiveDateTime) {
        self.deleted = true;
        self.updated_at = at;
    }

    fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    fn touch(&mut self, at: NaiveDateTime) {
        self.updated_at = at;
    }

    fn synced(&self) -> bool {
        self.synced
    }

    fn set_synced(&mut self, synced: bool) {
        self.synced = synced;
    }

    fn sync_id(&self) -> Option<&str> {
        self.sync_id.as_deref()
    }

    fn validate(&mut self) -> StoreResult<()> {
        Calendar::validate(self)
    }

    fn order(a: &Self, b: &Self) -> std::cmp::Ordering {
        Calendar::order(a, b)
    }

    fn to_row(&self) -> CalendarRow {
        CalendarRow {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            color: self.color.clone(),
            is_visible: encode_bool(self.visible),
            is_primary: encode_bool(self.primary),
            calendar_type: self.kind.as_str().to_string(),
            account_email: self.account_email.clone(),
            sync_id: self.sync_id.clone(),
            is_synced: encode_bool(self.synced),
            created_at: encode_time(self.created_at),
            updated_at: encode_time(self.updated_at),
            is_deleted: encode_bool(self.deleted),
        }
    }

    fn from_row(row: CalendarRow) -> StoreResult<Self> {
        let kind = CalendarKind::from_tag(&row.calendar_type).ok_or_else(|| {
            StoreError::corrupt(format!("unknown calendar type {:?}", row.calendar_type))
        })?;

        Ok(Calendar {
            id: row.id,
            name: row.name,
            description: row.description,
            color: row.color,
            visible: decode_bool(row.is_visible),
            primary: decode_bool(row.is_primary),
            kind,
            account_email: row.account_email,
            sync_id: row.sync_id,
            synced: decode_bool(row.is_synced),
            created_at: decode_time(&row.created_at)?,
            updated_at: decode_time(&row.updated_at)?,
            deleted: decode_bool(row.is_deleted),
        })
    }
}

/// Encodes a table snapshot as CBOR.
pub(crate) fn encode_rows<R: Serialize>(rows: &[R]) -> StoreResult<Vec<u8>> {
    let mut buffer = Vec::new();
    ciborium::into_writer(rows, &mut buffer)
        .map_err(|e| StoreError::corrupt(format!("encode failed: {e}")))?;
    Ok(buffer)
}

/// Decodes a table snapshot from CBOR.
pub(crate) fn decode_rows<R: DeserializeOwned>(bytes: &[u8]) -> StoreResult<Vec<R>> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::corrupt(format!("decode failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn time_encoding_is_sortable_iso() {
        let encoded = encode_time(ts(9));
        assert_eq!(encoded, "2024-01-15T09:00:00.000");
        assert_eq!(decode_time(&encoded).unwrap(), ts(9));

        // Lexicographic order matches chronological order.
        assert!(encode_time(ts(9)) < encode_time(ts(10)));
    }

    #[test]
    fn bad_timestamp_is_corrupt() {
        assert!(matches!(
            decode_time("yesterday"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn event_row_round_trips() {
        let mut event = Event::new("Standup", ts(9), ts(10), "cal-a");
        event.description = Some("daily".into());
        event.reminder_minutes = vec![5, 15];
        event.sync_id = Some("remote-1".into());
        event.deleted = true;

        let decoded = Event::from_row(event.to_row()).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn calendar_row_round_trips() {
        let mut cal = Calendar::new("Work");
        cal.kind = CalendarKind::Google;
        cal.account_email = Some("a@b.test".into());
        cal.primary = true;

        let decoded = Calendar::from_row(cal.to_row()).unwrap();
        assert_eq!(decoded, cal);
    }

    #[test]
    fn unknown_calendar_type_is_corrupt() {
        let mut row = Calendar::new("Work").to_row();
        row.calendar_type = "EXCHANGE".into();
        assert!(matches!(
            Calendar::from_row(row),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn snapshot_round_trips() {
        let rows = vec![
            Event::new("One", ts(9), ts(10), "cal-a").to_row(),
            Event::new("Two", ts(11), ts(12), "cal-a").to_row(),
        ];

        let bytes = encode_rows(&rows).unwrap();
        let decoded: Vec<EventRow> = decode_rows(&bytes).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].title, "One");
    }

    #[test]
    fn booleans_persist_as_zero_one() {
        let mut event = Event::new("Standup", ts(9), ts(10), "cal-a");
        event.all_day = true;
        let row = event.to_row();
        assert_eq!(row.is_all_day, 1);
        assert_eq!(row.is_deleted, 0);
    }
}
