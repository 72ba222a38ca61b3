//! # calstore Core
//!
//! Local-first calendar store engine.
//!
//! This crate provides:
//! - Typed event and calendar collections with upsert CRUD
//! - Soft deletion (tombstones) with explicit purge
//! - One-shot queries and live [`Subscription`] queries
//! - Sync-state tracking (dirty flags, external sync ids)
//! - Whole-table CBOR snapshot persistence over `calstore_storage`
//!
//! ## Example
//!
//! ```rust
//! use calstore_core::{CalendarDb, Event};
//! use chrono::NaiveDate;
//!
//! let db = CalendarDb::open_in_memory().unwrap();
//! let events = db.events();
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! let start = day.and_hms_opt(9, 0, 0).unwrap();
//! let end = day.and_hms_opt(10, 0, 0).unwrap();
//! events.insert(Event::new("Standup", start, end, "work")).unwrap();
//!
//! assert_eq!(events.get_by_day(day).unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod config;
mod error;
mod live;
mod model;
mod store;
mod table;

pub use config::StoreConfig;
pub use error::{StoreError, StoreOp, StoreResult};
pub use live::Subscription;
pub use model::{now, Calendar, CalendarKind, Event, DEFAULT_COLOR};
pub use store::{CalendarDb, CalendarStore, EventStore};
