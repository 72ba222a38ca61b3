//! The calendar collection facade.

use crate::error::{StoreOp, StoreResult};
use crate::live::Subscription;
use crate::model::{now, Calendar, CalendarKind};
use crate::table::{Mutation, StoreEntity, Table};
use chrono::NaiveDateTime;

/// CRUD, queries, and sync-state tracking for the calendar collection.
///
/// Maintains the invariant that at most one non-deleted calendar carries
/// the primary flag. Query results are ordered primary-first, then by
/// name ascending.
#[derive(Clone)]
pub struct CalendarStore {
    table: Table<Calendar>,
}

impl CalendarStore {
    pub(crate) fn new(table: Table<Calendar>) -> Self {
        Self { table }
    }

    /// Inserts or replaces a calendar (upsert by id).
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name or bad color; a
    /// database error if persisting the write fails.
    pub fn insert(&self, calendar: Calendar) -> StoreResult<()> {
        self.table.insert(calendar)
    }

    /// Inserts or replaces a batch of calendars in one committed write.
    ///
    /// # Errors
    ///
    /// See [`CalendarStore::insert`]. Validation failure of any element
    /// rejects the whole batch.
    pub fn insert_many(&self, calendars: Vec<Calendar>) -> StoreResult<()> {
        self.table.insert_many(calendars)
    }

    /// Replaces all fields of an existing calendar and refreshes its
    /// `updated_at`. Silently no-ops when the id is absent.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CalendarStore::insert`].
    pub fn update(&self, calendar: Calendar) -> StoreResult<()> {
        self.table.update(calendar, now())
    }

    /// Soft-deletes a calendar: sets the tombstone flag and `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns a database error if persisting the write fails.
    pub fn soft_delete(&self, id: &str, at: NaiveDateTime) -> StoreResult<()> {
        self.table.soft_delete(id, at)
    }

    /// Point lookup excluding tombstones.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn get_by_id(&self, id: &str) -> StoreResult<Option<Calendar>> {
        Ok(self.table.get(id))
    }

    /// All non-deleted calendars, primary first, then by name.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn get_all(&self) -> StoreResult<Vec<Calendar>> {
        Ok(self.table.all())
    }

    /// Live variant of [`CalendarStore::get_all`].
    #[must_use]
    pub fn watch_all(&self) -> Subscription<Vec<Calendar>> {
        self.table
            .watch(|rows| Ok(Table::collect_sorted(rows, |_| true)))
    }

    /// Non-deleted calendars with the visible flag set.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn visible(&self) -> StoreResult<Vec<Calendar>> {
        Ok(self
            .table
            .read(|rows| Table::collect_sorted(rows, |c| c.visible)))
    }

    /// Live variant of [`CalendarStore::visible`].
    #[must_use]
    pub fn watch_visible(&self) -> Subscription<Vec<Calendar>> {
        self.table
            .watch(|rows| Ok(Table::collect_sorted(rows, |c| c.visible)))
    }

    /// Non-deleted calendars of the given kind.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn by_kind(&self, kind: CalendarKind) -> StoreResult<Vec<Calendar>> {
        Ok(self
            .table
            .read(|rows| Table::collect_sorted(rows, |c| c.kind == kind)))
    }

    /// The non-deleted calendar carrying the primary flag, if any.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn primary(&self) -> StoreResult<Option<Calendar>> {
        Ok(self.table.read(|rows| {
            rows.values()
                .find(|c| !c.deleted && c.primary)
                .cloned()
        }))
    }

    /// Makes the given calendar the sole primary.
    ///
    /// Clears the primary flag on every other calendar and sets it on the
    /// target inside one critical section, so no interleaving observes two
    /// primaries or none. No-ops when the target is absent or tombstoned.
    ///
    /// # Errors
    ///
    /// Returns a database error if persisting the write fails.
    pub fn set_primary(&self, id: &str) -> StoreResult<()> {
        let at = now();
        self.table.with_write(StoreOp::Update, |rows| {
            let eligible = rows.get(id).is_some_and(|c| !c.deleted);
            if !eligible {
                return Ok(Mutation::Unchanged(()));
            }
            let mut changed = false;
            for calendar in rows.values_mut() {
                let want = calendar.id == id;
                if calendar.primary != want {
                    calendar.primary = want;
                    calendar.touch(at);
                    changed = true;
                }
            }
            if changed {
                Ok(Mutation::Changed(()))
            } else {
                Ok(Mutation::Unchanged(()))
            }
        })
    }

    /// Clears the primary flag on every calendar except the given id.
    ///
    /// Does not set the flag on the exempted calendar; pair with
    /// [`CalendarStore::set_primary`] when promotion is wanted.
    ///
    /// # Errors
    ///
    /// Returns a database error if persisting the write fails.
    pub fn unset_primary_except(&self, id: &str) -> StoreResult<()> {
        let at = now();
        self.table.with_write(StoreOp::Update, |rows| {
            let mut changed = false;
            for calendar in rows.values_mut() {
                if calendar.id != id && calendar.primary {
                    calendar.primary = false;
                    calendar.touch(at);
                    changed = true;
                }
            }
            if changed {
                Ok(Mutation::Changed(()))
            } else {
                Ok(Mutation::Unchanged(()))
            }
        })
    }

    /// One-shot read of all non-deleted calendars awaiting sync
    /// acknowledgement.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn get_unsynced(&self) -> StoreResult<Vec<Calendar>> {
        Ok(self.table.unsynced())
    }

    /// Clears the dirty flag for a local id. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns a database error if persisting the write fails.
    pub fn mark_synced(&self, id: &str) -> StoreResult<()> {
        self.table.mark_synced(id)
    }

    /// Sets the dirty flag on the calendar matching an external sync id.
    ///
    /// # Errors
    ///
    /// Returns a database error if persisting the write fails.
    pub fn mark_unsynced(&self, sync_id: &str) -> StoreResult<()> {
        self.table.mark_unsynced(sync_id)
    }

    /// Point lookup by external sync id, excluding tombstones.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn get_by_sync_id(&self, sync_id: &str) -> StoreResult<Option<Calendar>> {
        Ok(self.table.get_by_sync_id(sync_id))
    }

    /// Physically removes tombstones with `updated_at` strictly older than
    /// `cutoff`. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns a database error if persisting the write fails.
    pub fn purge_tombstones(&self, cutoff: NaiveDateTime) -> StoreResult<usize> {
        self.table.purge_tombstones(cutoff)
    }
}
