//! Generic soft-delete collection.
//!
//! `Table<T>` is the CRUD-and-query engine shared by the event and calendar
//! collections. Rows are held in an id-keyed map and persisted to a
//! [`StorageBackend`] as a whole-table snapshot after every committed
//! write. Normal deletion only marks a tombstone; the single hard-delete
//! path is [`Table::purge_tombstones`].

use crate::codec::{decode_rows, encode_rows};
use crate::error::{StoreError, StoreOp, StoreResult};
use crate::live::{Notifier, Subscription};
use calstore_storage::StorageBackend;
use chrono::NaiveDateTime;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// An entity that can live in a [`Table`].
///
/// Implementations provide identity, tombstone and sync-state accessors,
/// validation, query ordering, and the persisted row form.
pub trait StoreEntity: Clone + Send + Sync + 'static {
    /// Persisted row form.
    type Row: Serialize + DeserializeOwned;

    /// Table name, used in error reports and file names.
    const TABLE: &'static str;

    /// The caller-assigned id.
    fn id(&self) -> &str;

    /// Whether the row is a tombstone.
    fn deleted(&self) -> bool;

    /// Marks the row as a tombstone and refreshes `updated_at`.
    fn set_deleted(&mut self, at: NaiveDateTime);

    /// Last modification timestamp.
    fn updated_at(&self) -> NaiveDateTime;

    /// Refreshes the modification timestamp.
    fn touch(&mut self, at: NaiveDateTime);

    /// Whether the remote counterpart has acknowledged this state.
    fn synced(&self) -> bool;

    /// Sets the sync acknowledgement flag.
    fn set_synced(&mut self, synced: bool);

    /// External sync id, if the row has a remote counterpart.
    fn sync_id(&self) -> Option<&str>;

    /// Validates (and possibly normalizes) the entity before a write.
    fn validate(&mut self) -> StoreResult<()>;

    /// Total query ordering for list results.
    fn order(a: &Self, b: &Self) -> std::cmp::Ordering;

    /// Converts to the persisted row form.
    fn to_row(&self) -> Self::Row;

    /// Converts from the persisted row form.
    fn from_row(row: Self::Row) -> StoreResult<Self>;
}

/// Outcome of a mutation closure: whether the table actually changed.
///
/// Unchanged mutations (updating an absent id, purging nothing) skip the
/// snapshot write and wake no subscribers.
pub(crate) enum Mutation<Out> {
    Changed(Out),
    Unchanged(Out),
}

struct TableInner<T> {
    rows: BTreeMap<String, T>,
    backend: Box<dyn StorageBackend>,
    sync_writes: bool,
}

/// An id-keyed, soft-deleting collection with snapshot persistence.
///
/// Every write runs under a single table-level write lock covering mutate,
/// persist, and notify, so multi-row invariants can be maintained inside
/// one critical section.
pub(crate) struct Table<T: StoreEntity> {
    inner: Arc<RwLock<TableInner<T>>>,
    notifier: Arc<Notifier>,
}

impl<T: StoreEntity> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<T: StoreEntity> Table<T> {
    /// Opens a table, loading any existing snapshot from the backend.
    pub(crate) fn open(backend: Box<dyn StorageBackend>, sync_writes: bool) -> StoreResult<Self> {
        let mut rows = BTreeMap::new();
        if let Some(bytes) = backend.read()? {
            for row in decode_rows::<T::Row>(&bytes)? {
                let entity = T::from_row(row)?;
                rows.insert(entity.id().to_string(), entity);
            }
        }

        tracing::debug!(table = T::TABLE, rows = rows.len(), "opened table");

        Ok(Self {
            inner: Arc::new(RwLock::new(TableInner {
                rows,
                backend,
                sync_writes,
            })),
            notifier: Arc::new(Notifier::new()),
        })
    }

    /// Runs a read-only closure against the committed rows.
    pub(crate) fn read<Out>(&self, f: impl FnOnce(&BTreeMap<String, T>) -> Out) -> Out {
        f(&self.inner.read().rows)
    }

    /// Runs a mutation under the table write lock.
    ///
    /// On [`Mutation::Changed`] the snapshot is persisted before the lock
    /// is released and subscribers are woken afterwards. The mutation runs
    /// against a staging copy of the rows, so a failed persist (surfaced as
    /// [`StoreError::Database`] tagged with `op`) leaves the committed rows
    /// untouched.
    pub(crate) fn with_write<Out>(
        &self,
        op: StoreOp,
        f: impl FnOnce(&mut BTreeMap<String, T>) -> StoreResult<Mutation<Out>>,
    ) -> StoreResult<Out> {
        let changed;
        let out;
        {
            let mut inner = self.inner.write();
            let mut staged = inner.rows.clone();

            match f(&mut staged)? {
                Mutation::Changed(value) => {
                    let rows: Vec<T::Row> = staged.values().map(StoreEntity::to_row).collect();
                    let bytes = encode_rows(&rows)?;
                    inner
                        .backend
                        .write(&bytes)
                        .map_err(|e| StoreError::database(op, T::TABLE, e))?;
                    if inner.sync_writes {
                        inner
                            .backend
                            .sync()
                            .map_err(|e| StoreError::database(op, T::TABLE, e))?;
                    }
                    inner.rows = staged;
                    changed = true;
                    out = value;
                }
                Mutation::Unchanged(value) => {
                    changed = false;
                    out = value;
                }
            }
        }

        if changed {
            self.notifier.notify();
        }
        Ok(out)
    }

    /// Inserts or replaces an entity (upsert).
    ///
    /// Duplicate ids replace the existing row wholesale; no uniqueness
    /// error is raised so retried inserts stay idempotent.
    pub(crate) fn insert(&self, mut entity: T) -> StoreResult<()> {
        entity.validate()?;
        self.with_write(StoreOp::Insert, |rows| {
            rows.insert(entity.id().to_string(), entity);
            Ok(Mutation::Changed(()))
        })
    }

    /// Inserts or replaces a batch of entities in one committed write.
    pub(crate) fn insert_many(&self, entities: Vec<T>) -> StoreResult<()> {
        let mut validated = Vec::with_capacity(entities.len());
        for mut entity in entities {
            entity.validate()?;
            validated.push(entity);
        }

        self.with_write(StoreOp::Insert, |rows| {
            if validated.is_empty() {
                return Ok(Mutation::Unchanged(()));
            }
            for entity in validated {
                rows.insert(entity.id().to_string(), entity);
            }
            Ok(Mutation::Changed(()))
        })
    }

    /// Replaces all fields of an existing row and refreshes `updated_at`.
    ///
    /// Silently no-ops when the id is absent; creation goes through
    /// [`Table::insert`].
    pub(crate) fn update(&self, mut entity: T, at: NaiveDateTime) -> StoreResult<()> {
        entity.validate()?;
        entity.touch(at);
        self.with_write(StoreOp::Update, |rows| {
            if !rows.contains_key(entity.id()) {
                return Ok(Mutation::Unchanged(()));
            }
            rows.insert(entity.id().to_string(), entity);
            Ok(Mutation::Changed(()))
        })
    }

    /// Marks a row as a tombstone and refreshes `updated_at`.
    ///
    /// The row is not removed; see [`Table::purge_tombstones`].
    pub(crate) fn soft_delete(&self, id: &str, at: NaiveDateTime) -> StoreResult<()> {
        self.with_write(StoreOp::Delete, |rows| match rows.get_mut(id) {
            Some(row) => {
                row.set_deleted(at);
                Ok(Mutation::Changed(()))
            }
            None => Ok(Mutation::Unchanged(())),
        })
    }

    /// Point lookup excluding tombstones.
    ///
    /// A soft-deleted row answers `None`, indistinguishable from an id that
    /// never existed.
    pub(crate) fn get(&self, id: &str) -> Option<T> {
        self.read(|rows| rows.get(id).filter(|row| !row.deleted()).cloned())
    }

    /// All non-deleted rows in query order.
    pub(crate) fn all(&self) -> Vec<T> {
        self.read(|rows| Self::collect_sorted(rows, |_| true))
    }

    /// Non-deleted rows matching a predicate, in query order.
    pub(crate) fn collect_sorted(
        rows: &BTreeMap<String, T>,
        keep: impl Fn(&T) -> bool,
    ) -> Vec<T> {
        let mut matched: Vec<T> = rows
            .values()
            .filter(|row| !row.deleted() && keep(row))
            .cloned()
            .collect();
        matched.sort_by(|a, b| T::order(a, b));
        matched
    }

    /// One-shot read of all non-deleted rows awaiting sync acknowledgement.
    pub(crate) fn unsynced(&self) -> Vec<T> {
        self.read(|rows| Self::collect_sorted(rows, |row| !row.synced()))
    }

    /// Clears the dirty flag for a local id. Idempotent; no-ops on an
    /// absent id.
    pub(crate) fn mark_synced(&self, id: &str) -> StoreResult<()> {
        self.with_write(StoreOp::Update, |rows| match rows.get_mut(id) {
            Some(row) if !row.synced() => {
                row.set_synced(true);
                Ok(Mutation::Changed(()))
            }
            _ => Ok(Mutation::Unchanged(())),
        })
    }

    /// Sets the dirty flag on every row matching an external sync id.
    ///
    /// Used when a remote system reports the local copy is stale.
    pub(crate) fn mark_unsynced(&self, sync_id: &str) -> StoreResult<()> {
        self.with_write(StoreOp::Update, |rows| {
            let mut changed = false;
            for row in rows.values_mut() {
                if row.sync_id() == Some(sync_id) && row.synced() {
                    row.set_synced(false);
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

    /// Point lookup by external sync id, excluding tombstones.
    pub(crate) fn get_by_sync_id(&self, sync_id: &str) -> Option<T> {
        self.read(|rows| {
            rows.values()
                .find(|row| !row.deleted() && row.sync_id() == Some(sync_id))
                .cloned()
        })
    }

    /// Physically removes tombstones older than `cutoff`.
    ///
    /// A row is removed iff its deleted flag is set and `updated_at` is
    /// strictly before the cutoff. Live rows are never removed regardless
    /// of age. This is the only hard-delete path. Returns the number of
    /// rows removed.
    pub(crate) fn purge_tombstones(&self, cutoff: NaiveDateTime) -> StoreResult<usize> {
        let removed = self.with_write(StoreOp::Delete, |rows| {
            let before = rows.len();
            rows.retain(|_, row| !(row.deleted() && row.updated_at() < cutoff));
            let removed = before - rows.len();
            if removed > 0 {
                Ok(Mutation::Changed(removed))
            } else {
                Ok(Mutation::Unchanged(removed))
            }
        })?;

        if removed > 0 {
            tracing::debug!(table = T::TABLE, removed, "purged tombstones");
        }
        Ok(removed)
    }

    /// Opens a live query against this table.
    ///
    /// The subscription delivers an initial result immediately and a fresh
    /// result after every committed write.
    pub(crate) fn watch<Out, F>(&self, query: F) -> Subscription<Out>
    where
        Out: 'static,
        F: Fn(&BTreeMap<String, T>) -> StoreResult<Out> + Send + 'static,
    {
        let wakeups = self.notifier.subscribe();
        let inner = Arc::clone(&self.inner);
        Subscription::new(wakeups, Box::new(move || query(&inner.read().rows)))
    }
}
