//! The application error taxonomy.
//!
//! Every failure surfaced to a caller is one of six kinds. The taxonomy is
//! closed on purpose: consumers match exhaustively and the compiler flags
//! any future addition.

use calstore_core::StoreOp;
use std::collections::BTreeMap;

/// How severely an error impacts the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The user can continue with limited functionality.
    Low,
    /// Some features may be unavailable.
    Medium,
    /// Critical, app functionality severely impacted.
    High,
}

/// What a sync failure was about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncType {
    /// Local and remote changed the same data.
    Conflict,
    /// Calendar synchronization.
    Calendars,
    /// Event synchronization.
    Events,
    /// A full-store synchronization pass.
    Full,
}

impl SyncType {
    /// Lowercase noun for message templates.
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::Calendars => "calendars",
            Self::Events => "events",
            Self::Full => "everything",
        }
    }
}

/// Extra key-value detail attached to an error.
pub type ErrorContext = BTreeMap<String, String>;

/// A classified application error.
///
/// `cause` holds the rendered message of the underlying failure so the
/// error stays `Clone` and can sit in caches and UI state. `context`
/// carries structured detail for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// Connectivity, timeout, or other communication failure.
    #[error("{message}")]
    Network {
        /// Human-readable description.
        message: String,
        /// Rendered message of the underlying failure, if any.
        cause: Option<String>,
        /// Structured detail for logs.
        context: ErrorContext,
        /// True when the device appears to have no usable connection.
        is_connectivity_issue: bool,
    },

    /// A store operation failed below the validation layer.
    #[error("{message}")]
    Database {
        /// Human-readable description.
        message: String,
        /// Rendered message of the underlying failure, if any.
        cause: Option<String>,
        /// Structured detail for logs.
        context: ErrorContext,
        /// The store operation that failed, when known.
        operation: Option<StoreOp>,
    },

    /// Caller-supplied data was rejected.
    #[error("{message}")]
    Validation {
        /// Human-readable description.
        message: String,
        /// Rendered message of the underlying failure, if any.
        cause: Option<String>,
        /// Structured detail for logs.
        context: ErrorContext,
        /// The offending field, when known.
        field: Option<String>,
    },

    /// Permission or authentication failure.
    #[error("{message}")]
    Security {
        /// Human-readable description.
        message: String,
        /// Rendered message of the underlying failure, if any.
        cause: Option<String>,
        /// Structured detail for logs.
        context: ErrorContext,
        /// The missing permission, when known.
        permission: Option<String>,
    },

    /// Synchronization with a remote provider failed.
    #[error("{message}")]
    Sync {
        /// Human-readable description.
        message: String,
        /// Rendered message of the underlying failure, if any.
        cause: Option<String>,
        /// Structured detail for logs.
        context: ErrorContext,
        /// What the sync pass was about, when known.
        sync_type: Option<SyncType>,
    },

    /// Anything the classifier could not recognize.
    #[error("{message}")]
    Unknown {
        /// Human-readable description.
        message: String,
        /// Rendered message of the underlying failure, if any.
        cause: Option<String>,
        /// Structured detail for logs.
        context: ErrorContext,
    },
}

impl CalendarError {
    /// No usable internet connection.
    #[must_use]
    pub fn no_connection() -> Self {
        Self::Network {
            message: "No internet connection available".into(),
            cause: None,
            context: ErrorContext::new(),
            is_connectivity_issue: true,
        }
    }

    /// A request exceeded its deadline.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Network {
            message: "Request timed out".into(),
            cause: None,
            context: ErrorContext::new(),
            is_connectivity_issue: false,
        }
    }

    /// The remote side answered with an error status.
    #[must_use]
    pub fn server_error(status: u16) -> Self {
        let mut context = ErrorContext::new();
        context.insert("status_code".into(), status.to_string());
        Self::Network {
            message: "Server error occurred".into(),
            cause: None,
            context,
            is_connectivity_issue: false,
        }
    }

    /// A read against the given table failed.
    #[must_use]
    pub fn query_failed(table: &str) -> Self {
        Self::db_op("Failed to query data from", table, StoreOp::Query)
    }

    /// An insert into the given table failed.
    #[must_use]
    pub fn insert_failed(table: &str) -> Self {
        Self::db_op("Failed to insert data into", table, StoreOp::Insert)
    }

    /// An update against the given table failed.
    #[must_use]
    pub fn update_failed(table: &str) -> Self {
        Self::db_op("Failed to update data in", table, StoreOp::Update)
    }

    /// A delete against the given table failed.
    #[must_use]
    pub fn delete_failed(table: &str) -> Self {
        Self::db_op("Failed to delete data from", table, StoreOp::Delete)
    }

    fn db_op(verb_phrase: &str, table: &str, operation: StoreOp) -> Self {
        let mut context = ErrorContext::new();
        context.insert("table".into(), table.to_string());
        Self::Database {
            message: format!("{verb_phrase} {table}"),
            cause: None,
            context,
            operation: Some(operation),
        }
    }

    /// A required field was missing or blank.
    #[must_use]
    pub fn required_field(field: &str) -> Self {
        Self::Validation {
            message: format!("{field} is required"),
            cause: None,
            context: ErrorContext::new(),
            field: Some(field.to_string()),
        }
    }

    /// A field did not match its expected format.
    #[must_use]
    pub fn invalid_format(field: &str, expected: &str) -> Self {
        let mut context = ErrorContext::new();
        context.insert("expected_format".into(), expected.to_string());
        Self::Validation {
            message: format!("{field} has invalid format. Expected: {expected}"),
            cause: None,
            context,
            field: Some(field.to_string()),
        }
    }

    /// A field fell outside its valid range.
    #[must_use]
    pub fn invalid_range(field: &str, min: &str, max: &str) -> Self {
        let mut context = ErrorContext::new();
        context.insert("min".into(), min.to_string());
        context.insert("max".into(), max.to_string());
        Self::Validation {
            message: format!("{field} is out of valid range ({min} - {max})"),
            cause: None,
            context,
            field: Some(field.to_string()),
        }
    }

    /// A required permission was denied.
    #[must_use]
    pub fn permission_denied(permission: &str) -> Self {
        Self::Security {
            message: format!("Permission denied: {permission}"),
            cause: None,
            context: ErrorContext::new(),
            permission: Some(permission.to_string()),
        }
    }

    /// The user could not be authenticated.
    #[must_use]
    pub fn authentication_failed() -> Self {
        Self::Security {
            message: "Authentication failed".into(),
            cause: None,
            context: ErrorContext::new(),
            permission: None,
        }
    }

    /// Local and remote changed the same data.
    #[must_use]
    pub fn conflict_detected() -> Self {
        Self::Sync {
            message: "Sync conflict detected".into(),
            cause: None,
            context: ErrorContext::new(),
            sync_type: Some(SyncType::Conflict),
        }
    }

    /// A sync pass failed outright.
    #[must_use]
    pub fn sync_failed(sync_type: SyncType) -> Self {
        Self::Sync {
            message: format!("Failed to sync {}", sync_type.noun()),
            cause: None,
            context: ErrorContext::new(),
            sync_type: Some(sync_type),
        }
    }

    /// Wraps an unclassifiable failure message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "An unexpected error occurred".to_string()
        } else {
            message
        };
        Self::Unknown {
            message,
            cause: None,
            context: ErrorContext::new(),
        }
    }

    /// The human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message, .. }
            | Self::Database { message, .. }
            | Self::Validation { message, .. }
            | Self::Security { message, .. }
            | Self::Sync { message, .. }
            | Self::Unknown { message, .. } => message,
        }
    }

    /// The rendered message of the underlying failure, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&str> {
        match self {
            Self::Network { cause, .. }
            | Self::Database { cause, .. }
            | Self::Validation { cause, .. }
            | Self::Security { cause, .. }
            | Self::Sync { cause, .. }
            | Self::Unknown { cause, .. } => cause.as_deref(),
        }
    }

    /// The structured detail attached at construction time.
    #[must_use]
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Network { context, .. }
            | Self::Database { context, .. }
            | Self::Validation { context, .. }
            | Self::Security { context, .. }
            | Self::Sync { context, .. }
            | Self::Unknown { context, .. } => context,
        }
    }

    /// Whether retrying the failed operation could plausibly succeed.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        match self {
            Self::Network {
                is_connectivity_issue,
                message,
                ..
            } => *is_connectivity_issue || message.to_lowercase().contains("timeout"),
            Self::Database { operation, .. } => operation.is_some(),
            Self::Sync { sync_type, .. } => *sync_type != Some(SyncType::Conflict),
            Self::Validation { .. } | Self::Security { .. } | Self::Unknown { .. } => false,
        }
    }

    /// How severely this error impacts the application.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Security { .. } | Self::Database { .. } | Self::Unknown { .. } => Severity::High,
            Self::Network {
                is_connectivity_issue,
                ..
            } => {
                if *is_connectivity_issue {
                    Severity::Medium
                } else {
                    Severity::Low
                }
            }
            Self::Validation { .. } => Severity::Low,
            Self::Sync { .. } => Severity::Medium,
        }
    }

    /// Whether this error requires immediate attention.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.severity() == Severity::High
    }

    /// The plain user-facing message.
    #[must_use]
    pub fn user_message(&self) -> &str {
        self.message()
    }

    /// User-facing message with kind-specific framing, never a raw trace.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Network {
                is_connectivity_issue,
                ..
            } => {
                if *is_connectivity_issue {
                    "Please check your internet connection and try again.".to_string()
                } else {
                    format!("Network error occurred. {}", self.user_message())
                }
            }
            Self::Database { .. } => {
                "Data error occurred. Please try refreshing or contact support if the problem persists."
                    .to_string()
            }
            Self::Validation { .. } => self.user_message().to_string(),
            Self::Security { .. } => format!("Permission required. {}", self.user_message()),
            Self::Sync { .. } => format!("Sync error occurred. {}", self.user_message()),
            Self::Unknown { .. } => {
                "An unexpected error occurred. Please try again or contact support.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_fill_context() {
        let err = CalendarError::query_failed("events");
        assert_eq!(err.message(), "Failed to query data from events");
        assert_eq!(err.context().get("table").map(String::as_str), Some("events"));

        let err = CalendarError::server_error(503);
        assert_eq!(
            err.context().get("status_code").map(String::as_str),
            Some("503")
        );
    }

    #[test]
    fn retry_policy_per_kind() {
        assert!(CalendarError::no_connection().can_retry());
        assert!(CalendarError::timeout().can_retry());
        assert!(!CalendarError::server_error(500).can_retry());
        assert!(CalendarError::insert_failed("events").can_retry());
        assert!(!CalendarError::conflict_detected().can_retry());
        assert!(CalendarError::sync_failed(SyncType::Events).can_retry());
        assert!(!CalendarError::required_field("title").can_retry());
        assert!(!CalendarError::authentication_failed().can_retry());
        assert!(!CalendarError::from_message("boom").can_retry());
    }

    #[test]
    fn severity_per_kind() {
        assert_eq!(CalendarError::authentication_failed().severity(), Severity::High);
        assert_eq!(CalendarError::query_failed("events").severity(), Severity::High);
        assert_eq!(CalendarError::from_message("boom").severity(), Severity::High);
        assert_eq!(CalendarError::no_connection().severity(), Severity::Medium);
        assert_eq!(CalendarError::timeout().severity(), Severity::Low);
        assert_eq!(CalendarError::required_field("title").severity(), Severity::Low);
        assert_eq!(
            CalendarError::sync_failed(SyncType::Full).severity(),
            Severity::Medium
        );
    }

    #[test]
    fn display_message_never_exposes_internals() {
        let err = CalendarError::Database {
            message: "disk I/O error at offset 4096".into(),
            cause: Some("os error 5".into()),
            context: ErrorContext::new(),
            operation: Some(StoreOp::Insert),
        };
        assert!(!err.display_message().contains("4096"));
        assert!(!err.display_message().contains("os error"));
    }

    #[test]
    fn empty_unknown_message_gets_fallback() {
        assert_eq!(
            CalendarError::from_message("  ").message(),
            "An unexpected error occurred"
        );
    }
}
