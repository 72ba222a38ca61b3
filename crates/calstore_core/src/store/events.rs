//! The event collection facade.

use crate::error::{StoreError, StoreResult};
use crate::live::Subscription;
use crate::model::{now, Event};
use crate::table::Table;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// CRUD, queries, and sync-state tracking for the event collection.
///
/// All list queries exclude tombstones; no query path may leak a
/// soft-deleted row. Each query comes as a one-shot `get_*` and a live
/// `watch_*` returning a [`Subscription`].
#[derive(Clone)]
pub struct EventStore {
    table: Table<Event>,
}

impl EventStore {
    pub(crate) fn new(table: Table<Event>) -> Self {
        Self { table }
    }

    /// Inserts or replaces an event (upsert by id).
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title, bad color, blank
    /// calendar id, or `end < start`; a database error if persisting the
    /// write fails.
    pub fn insert(&self, event: Event) -> StoreResult<()> {
        self.table.insert(event)
    }

    /// Inserts or replaces a batch of events in one committed write.
    ///
    /// # Errors
    ///
    /// See [`EventStore::insert`]. Validation failure of any element
    /// rejects the whole batch.
    pub fn insert_many(&self, events: Vec<Event>) -> StoreResult<()> {
        self.table.insert_many(events)
    }

    /// Replaces all fields of an existing event and refreshes its
    /// `updated_at`. Silently no-ops when the id is absent.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`EventStore::insert`].
    pub fn update(&self, event: Event) -> StoreResult<()> {
        self.table.update(event, now())
    }

    /// Soft-deletes an event: sets the tombstone flag and `updated_at`.
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
    pub fn get_by_id(&self, id: &str) -> StoreResult<Option<Event>> {
        Ok(self.table.get(id))
    }

    /// All non-deleted events, ordered by start time ascending.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn get_all(&self) -> StoreResult<Vec<Event>> {
        Ok(self.table.all())
    }

    /// Live variant of [`EventStore::get_all`].
    #[must_use]
    pub fn watch_all(&self) -> Subscription<Vec<Event>> {
        self.table
            .watch(|rows| Ok(Table::collect_sorted(rows, |_| true)))
    }

    /// Non-deleted events whose start falls in the half-open interval
    /// `[start, end)`, ordered by start ascending.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `end < start`.
    pub fn get_by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> StoreResult<Vec<Event>> {
        check_range(start, end)?;
        Ok(self
            .table
            .read(|rows| Table::collect_sorted(rows, |e| start <= e.start && e.start < end)))
    }

    /// Live variant of [`EventStore::get_by_date_range`].
    #[must_use]
    pub fn watch_by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Subscription<Vec<Event>> {
        self.table.watch(move |rows| {
            check_range(start, end)?;
            Ok(Table::collect_sorted(rows, |e| {
                start <= e.start && e.start < end
            }))
        })
    }

    /// Non-deleted events starting on the given day.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn get_by_day(&self, day: NaiveDate) -> StoreResult<Vec<Event>> {
        let (start, end) = day_bounds(day);
        self.get_by_date_range(start, end)
    }

    /// Live variant of [`EventStore::get_by_day`].
    #[must_use]
    pub fn watch_by_day(&self, day: NaiveDate) -> Subscription<Vec<Event>> {
        let (start, end) = day_bounds(day);
        self.watch_by_date_range(start, end)
    }

    /// Case-insensitive substring search over title, description, and
    /// location. Tombstones are excluded on every branch of the match.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn search(&self, query: &str) -> StoreResult<Vec<Event>> {
        let needle = query.to_lowercase();
        Ok(self
            .table
            .read(|rows| Table::collect_sorted(rows, |e| e.matches(&needle))))
    }

    /// Live variant of [`EventStore::search`].
    #[must_use]
    pub fn watch_search(&self, query: &str) -> Subscription<Vec<Event>> {
        let needle = query.to_lowercase();
        self.table
            .watch(move |rows| Ok(Table::collect_sorted(rows, |e| e.matches(&needle))))
    }

    /// Non-deleted events owned by a calendar, ordered by start ascending.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn get_by_calendar_id(&self, calendar_id: &str) -> StoreResult<Vec<Event>> {
        Ok(self
            .table
            .read(|rows| Table::collect_sorted(rows, |e| e.calendar_id == calendar_id)))
    }

    /// Live variant of [`EventStore::get_by_calendar_id`].
    #[must_use]
    pub fn watch_by_calendar_id(&self, calendar_id: &str) -> Subscription<Vec<Event>> {
        let calendar_id = calendar_id.to_string();
        self.table
            .watch(move |rows| Ok(Table::collect_sorted(rows, |e| e.calendar_id == calendar_id)))
    }

    /// One-shot read of all non-deleted events awaiting sync
    /// acknowledgement - the hand-off set for a sync service.
    ///
    /// # Errors
    ///
    /// Infallible today; fallible for a uniform raising contract.
    pub fn get_unsynced(&self) -> StoreResult<Vec<Event>> {
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

    /// Sets the dirty flag on the event matching an external sync id.
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
    pub fn get_by_sync_id(&self, sync_id: &str) -> StoreResult<Option<Event>> {
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

fn check_range(start: NaiveDateTime, end: NaiveDateTime) -> StoreResult<()> {
    if end < start {
        return Err(StoreError::validation(
            "date_range",
            format!("range end {end} is before start {start}"),
        ));
    }
    Ok(())
}

fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::MIN);
    let end = start
        .checked_add_signed(Duration::days(1))
        .unwrap_or(NaiveDateTime::MAX);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CalendarDb;
    use std::time::Duration as StdDuration;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn event(id: &str, day: u32, hour: u32) -> Event {
        let mut event = Event::new("Event", ts(day, hour), ts(day, hour + 1), "cal-a");
        event.id = id.to_string();
        event
    }

    fn open_events() -> EventStore {
        CalendarDb::open_in_memory().unwrap().events()
    }

    // Hold the db alive alongside the facade where subscriptions matter.
    fn open_db() -> (CalendarDb, EventStore) {
        let db = CalendarDb::open_in_memory().unwrap();
        let events = db.events();
        (db, events)
    }

    #[test]
    fn get_by_day_scenario() {
        let events = open_events();
        let mut e1 = event("e1", 15, 9);
        e1.end = ts(15, 10);
        events.insert(e1).unwrap();

        let day15 = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let day16 = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();

        let hits: Vec<String> = events
            .get_by_day(day15)
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(hits, vec!["e1".to_string()]);
        assert!(events.get_by_day(day16).unwrap().is_empty());
    }

    #[test]
    fn soft_delete_scenario() {
        let events = open_events();
        events.insert(event("e1", 15, 9)).unwrap();
        events.soft_delete("e1", ts(15, 12)).unwrap();

        assert!(events.get_all().unwrap().is_empty());
        assert!(events.get_by_id("e1").unwrap().is_none());
    }

    #[test]
    fn date_range_is_half_open() {
        let events = open_events();
        events.insert(event("at-start", 15, 9)).unwrap();
        events.insert(event("inside", 15, 12)).unwrap();
        events.insert(event("at-end", 15, 18)).unwrap();

        let hits: Vec<String> = events
            .get_by_date_range(ts(15, 9), ts(15, 18))
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(hits, vec!["at-start".to_string(), "inside".to_string()]);
    }

    #[test]
    fn inverted_range_is_validation_error() {
        let events = open_events();
        assert!(matches!(
            events.get_by_date_range(ts(16, 0), ts(15, 0)),
            Err(StoreError::Validation { .. })
        ));
    }

    #[test]
    fn results_ordered_by_start() {
        let events = open_events();
        events.insert(event("late", 15, 18)).unwrap();
        events.insert(event("early", 15, 8)).unwrap();
        events.insert(event("mid", 15, 12)).unwrap();

        let order: Vec<String> = events
            .get_all()
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(
            order,
            vec!["early".to_string(), "mid".to_string(), "late".to_string()]
        );
    }

    #[test]
    fn search_matches_title_and_description() {
        let events = open_events();
        let mut e1 = event("e1", 15, 9);
        e1.title = "Team Standup".into();
        let mut e2 = event("e2", 15, 10);
        e2.title = "1:1".into();
        e2.description = Some("standup follow-up".into());
        let mut e3 = event("e3", 15, 11);
        e3.title = "Lunch".into();

        events.insert_many(vec![e1, e2, e3]).unwrap();

        let hits: Vec<String> = events
            .search("STANDUP")
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(hits, vec!["e1".to_string(), "e2".to_string()]);
    }

    #[test]
    fn search_never_returns_tombstones() {
        // Regression guard: a tombstone must not resurface through a
        // title-only match.
        let events = open_events();
        let mut e1 = event("e1", 15, 9);
        e1.title = "Dentist".into();
        events.insert(e1).unwrap();
        events.soft_delete("e1", ts(15, 12)).unwrap();

        assert!(events.search("dentist").unwrap().is_empty());
    }

    #[test]
    fn get_by_calendar_scopes_results() {
        let events = open_events();
        events.insert(event("a1", 15, 9)).unwrap();
        let mut other = event("b1", 15, 10);
        other.calendar_id = "cal-b".into();
        events.insert(other).unwrap();

        let hits: Vec<String> = events
            .get_by_calendar_id("cal-b")
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(hits, vec!["b1".to_string()]);
    }

    #[test]
    fn watch_all_redelivers_after_writes() {
        let (_db, events) = open_db();
        let mut sub = events.watch_all();

        assert!(sub.recv().unwrap().unwrap().is_empty());

        events.insert(event("e1", 15, 9)).unwrap();
        let delivered = sub
            .recv_timeout(StdDuration::from_millis(100))
            .unwrap()
            .unwrap();
        assert_eq!(delivered.len(), 1);

        events.soft_delete("e1", ts(15, 12)).unwrap();
        let delivered = sub
            .recv_timeout(StdDuration::from_millis(100))
            .unwrap()
            .unwrap();
        assert!(delivered.is_empty());
    }

    #[test]
    fn watch_by_day_sees_only_that_day() {
        let (_db, events) = open_db();
        let day15 = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut sub = events.watch_by_day(day15);
        sub.recv();

        events.insert(event("other-day", 16, 9)).unwrap();
        let delivered = sub
            .recv_timeout(StdDuration::from_millis(100))
            .unwrap()
            .unwrap();
        assert!(delivered.is_empty());

        events.insert(event("same-day", 15, 9)).unwrap();
        let delivered = sub
            .recv_timeout(StdDuration::from_millis(100))
            .unwrap()
            .unwrap();
        assert_eq!(delivered.len(), 1);
    }

    #[test]
    fn sync_handoff_cycle() {
        let events = open_events();
        let mut e1 = event("e1", 15, 9);
        e1.sync_id = Some("remote-1".into());
        events.insert(e1).unwrap();

        // Dirty after insert.
        assert_eq!(events.get_unsynced().unwrap().len(), 1);

        events.mark_synced("e1").unwrap();
        assert!(events.get_unsynced().unwrap().is_empty());

        // Remote reports staleness by sync id.
        events.mark_unsynced("remote-1").unwrap();
        assert_eq!(events.get_unsynced().unwrap().len(), 1);

        assert_eq!(
            events.get_by_sync_id("remote-1").unwrap().unwrap().id,
            "e1"
        );
    }

    #[test]
    fn purge_scenario() {
        let events = open_events();
        events.insert(event("older", 10, 9)).unwrap();
        events.insert(event("newer", 10, 10)).unwrap();
        events.soft_delete("older", ts(14, 23)).unwrap();
        events.soft_delete("newer", ts(15, 1)).unwrap();

        let removed = events.purge_tombstones(ts(15, 0)).unwrap();
        assert_eq!(removed, 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn hour_event(id: usize, hour: u32) -> Event {
            let mut e = event(&format!("e{id}"), 15, hour);
            e.end = e.start + Duration::minutes(30);
            e
        }

        proptest! {
            // An event appears in [s, e) iff s <= start < e and it is not
            // deleted.
            #[test]
            fn range_membership(
                starts in proptest::collection::vec(0u32..22, 1..12),
                deleted_mask in proptest::collection::vec(any::<bool>(), 12),
                range_start in 0u32..22,
                span in 1u32..22,
            ) {
                let events = open_events();
                for (i, &hour) in starts.iter().enumerate() {
                    events.insert(hour_event(i, hour)).unwrap();
                    if deleted_mask.get(i).copied().unwrap_or(false) {
                        events.soft_delete(&format!("e{i}"), ts(15, 23)).unwrap();
                    }
                }

                let range_end = (range_start + span).min(23);
                let (s, e) = (ts(15, range_start), ts(15, range_end));
                let hits: Vec<String> = events
                    .get_by_date_range(s, e)
                    .unwrap()
                    .into_iter()
                    .map(|ev| ev.id)
                    .collect();

                for (i, &hour) in starts.iter().enumerate() {
                    let id = format!("e{i}");
                    let alive = !deleted_mask.get(i).copied().unwrap_or(false);
                    let in_range = range_start <= hour && hour < range_end;
                    prop_assert_eq!(hits.contains(&id), alive && in_range);
                }
            }

            // Purge removes exactly the tombstones strictly older than
            // the cutoff, and is idempotent at a fixed cutoff.
            #[test]
            fn purge_precondition(
                deleted_mask in proptest::collection::vec(any::<bool>(), 8),
                ages in proptest::collection::vec(0u32..20, 8),
                cutoff_hour in 0u32..20,
            ) {
                let events = open_events();
                for (i, &age) in ages.iter().enumerate() {
                    events.insert(hour_event(i, 0)).unwrap();
                    if deleted_mask[i] {
                        events.soft_delete(&format!("e{i}"), ts(15, 0) + Duration::hours(i64::from(age))).unwrap();
                    }
                }

                let cutoff = ts(15, 0) + Duration::hours(i64::from(cutoff_hour));
                let expected = ages
                    .iter()
                    .enumerate()
                    .filter(|&(i, &age)| {
                        deleted_mask[i] && ts(15, 0) + Duration::hours(i64::from(age)) < cutoff
                    })
                    .count();

                prop_assert_eq!(events.purge_tombstones(cutoff).unwrap(), expected);
                prop_assert_eq!(events.purge_tombstones(cutoff).unwrap(), 0);
            }
        }
    }
}
