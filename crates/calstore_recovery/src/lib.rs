//! # calstore Recovery
//!
//! Error taxonomy, classification, and recovery planning for calstore.
//!
//! This crate provides:
//! - [`CalendarError`] - a closed taxonomy of application errors
//! - [`Classifier`] - a total mapping from raw failures onto the taxonomy
//! - [`RecoveryPlanner`] - ordered, advisory recovery menus per error
//! - [`RetryPolicy`] - capped exponential backoff presets
//! - [`Outcome`] - the three-state envelope callers consume
//!
//! Classification and planning are pure, stateless transforms performed by
//! the calling layer; the store itself never recovers failures locally.
//!
//! ## Example
//!
//! ```rust
//! use calstore_recovery::{Classifier, Outcome, RecoveryAction, RecoveryPlanner};
//! use std::io;
//!
//! let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
//! let error = Classifier::new().classify(&refused);
//! assert!(error.can_retry());
//!
//! let menu = RecoveryPlanner::new().plan(&error);
//! assert_eq!(menu.first(), Some(&RecoveryAction::Retry));
//! assert_eq!(menu.last(), Some(&RecoveryAction::Dismiss));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod outcome;
mod plan;
mod retry;
mod taxonomy;

pub use classify::Classifier;
pub use outcome::Outcome;
pub use plan::{ConflictResolution, RecoveryAction, RecoveryPlanner, SettingsKind};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use taxonomy::{CalendarError, ErrorContext, Severity, SyncType};
