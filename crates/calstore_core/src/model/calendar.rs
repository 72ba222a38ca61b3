//! The calendar model.

use crate::error::StoreResult;
use crate::model::{now, validate_color, validate_required, DEFAULT_COLOR};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Where a calendar's events originate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarKind {
    /// Device-local calendar with no remote counterpart.
    Local,
    /// Google Calendar account.
    Google,
    /// Microsoft / Outlook account.
    Microsoft,
    /// Generic CalDAV account.
    CalDav,
}

impl CalendarKind {
    /// Stable tag used in the persisted row schema.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarKind::Local => "LOCAL",
            CalendarKind::Google => "GOOGLE",
            CalendarKind::Microsoft => "MICROSOFT",
            CalendarKind::CalDav => "CALDAV",
        }
    }

    /// Parses a persisted tag. Returns `None` for unknown tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "LOCAL" => Some(CalendarKind::Local),
            "GOOGLE" => Some(CalendarKind::Google),
            "MICROSOFT" => Some(CalendarKind::Microsoft),
            "CALDAV" => Some(CalendarKind::CalDav),
            _ => None,
        }
    }
}

impl fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A calendar owning a set of events.
#[derive(Debug, Clone, PartialEq)]
pub struct Calendar {
    /// Stable, unique, caller-assigned id.
    pub id: String,
    /// Calendar name. Required.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Display color (`#RRGGBB`).
    pub color: String,
    /// Whether the calendar's events are shown.
    pub visible: bool,
    /// Whether this is the default target for new events. At most one
    /// non-deleted calendar may be primary.
    pub primary: bool,
    /// Where the calendar's events originate.
    pub kind: CalendarKind,
    /// Owning account for remote calendars.
    pub account_email: Option<String>,
    /// External sync id correlating the local row with its remote copy.
    pub sync_id: Option<String>,
    /// Whether the remote counterpart has acknowledged this state.
    pub synced: bool,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
    /// Last modification timestamp.
    pub updated_at: NaiveDateTime,
    /// Soft-delete flag.
    pub deleted: bool,
}

impl Calendar {
    /// Creates a new local calendar with a generated UUID id.
    pub fn new(name: impl Into<String>) -> Self {
        let created = now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            color: DEFAULT_COLOR.to_string(),
            visible: true,
            primary: false,
            kind: CalendarKind::Local,
            account_email: None,
            sync_id: None,
            synced: false,
            created_at: created,
            updated_at: created,
            deleted: false,
        }
    }

    /// Validates the calendar.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Validation`] if the name is blank or
    /// the color is not `#RRGGBB`.
    pub fn validate(&mut self) -> StoreResult<()> {
        validate_required("name", &self.name)?;
        validate_color("color", &self.color)?;
        Ok(())
    }

    /// Query ordering: primary first, then name ascending, id tie-break.
    pub(crate) fn order(a: &Self, b: &Self) -> Ordering {
        b.primary
            .cmp(&a.primary)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    }
}
