//! The calendar store: database handle and typed collection facades.

mod calendars;
mod events;

pub use calendars::CalendarStore;
pub use events::EventStore;

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::model::{Calendar, Event};
use crate::table::{StoreEntity, Table};
use calstore_storage::{InMemoryBackend, StoreDir};

/// A local-first calendar database holding the event and calendar
/// collections.
///
/// The database hands out cheap cloneable facades ([`EventStore`],
/// [`CalendarStore`]) that share the underlying tables. File-backed stores
/// hold an exclusive directory lock for their lifetime.
///
/// # Example
///
/// ```rust
/// use calstore_core::{CalendarDb, Calendar};
///
/// let db = CalendarDb::open_in_memory().unwrap();
/// let calendars = db.calendars();
///
/// calendars.insert(Calendar::new("Personal")).unwrap();
/// assert_eq!(calendars.get_all().unwrap().len(), 1);
/// ```
pub struct CalendarDb {
    events: Table<Event>,
    calendars: Table<Calendar>,
    /// Holds the directory lock for file-backed stores.
    _dir: Option<StoreDir>,
}

impl CalendarDb {
    /// Opens a file-backed store.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be opened or locked, or if
    /// an existing table snapshot cannot be decoded.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let dir = StoreDir::open(&config.path, config.create_if_missing)?;
        let events = Table::open(Box::new(dir.table(Event::TABLE)?), config.sync_writes)?;
        let calendars = Table::open(Box::new(dir.table(Calendar::TABLE)?), config.sync_writes)?;

        tracing::debug!(path = %config.path.display(), "opened calendar store");

        Ok(Self {
            events,
            calendars,
            _dir: Some(dir),
        })
    }

    /// Opens an ephemeral in-memory store.
    ///
    /// # Errors
    ///
    /// Never fails in practice; kept fallible for parity with [`Self::open`].
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            events: Table::open(Box::new(InMemoryBackend::new()), false)?,
            calendars: Table::open(Box::new(InMemoryBackend::new()), false)?,
            _dir: None,
        })
    }

    /// Returns a facade over the event collection.
    #[must_use]
    pub fn events(&self) -> EventStore {
        EventStore::new(self.events.clone())
    }

    /// Returns a facade over the calendar collection.
    #[must_use]
    pub fn calendars(&self) -> CalendarStore {
        CalendarStore::new(self.calendars.clone())
    }
}
