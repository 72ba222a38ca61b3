//! Mapping arbitrary failures onto the taxonomy.

use crate::taxonomy::{CalendarError, ErrorContext, Severity};
use calstore_core::StoreError;
use std::error::Error;
use std::io;

/// Stateless error classifier.
///
/// Total over `&dyn Error`: every input maps to some [`CalendarError`],
/// with [`CalendarError::Unknown`] as the catch-all. A unit struct so call
/// sites can hold it as an injected collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier;

impl Classifier {
    /// Creates a classifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classifies an arbitrary failure.
    ///
    /// Already-typed [`CalendarError`] values pass through unchanged;
    /// store and I/O errors map by kind; everything else becomes
    /// [`CalendarError::Unknown`].
    #[must_use]
    pub fn classify(&self, error: &(dyn Error + 'static)) -> CalendarError {
        if let Some(already) = error.downcast_ref::<CalendarError>() {
            return already.clone();
        }
        if let Some(store) = error.downcast_ref::<StoreError>() {
            return classify_store(store);
        }
        if let Some(io) = error.downcast_ref::<io::Error>() {
            return classify_io(io);
        }

        CalendarError::from_message(error.to_string())
    }

    /// Logs a classified error at the level its severity demands.
    pub fn log(&self, error: &CalendarError, extra_context: &ErrorContext) {
        let context = render_context(error.context(), extra_context);
        match error.severity() {
            Severity::Low => {
                tracing::info!(cause = error.cause(), %context, "{}", error.message());
            }
            Severity::Medium => {
                tracing::warn!(cause = error.cause(), %context, "{}", error.message());
            }
            Severity::High => {
                tracing::error!(cause = error.cause(), %context, "{}", error.message());
            }
        }
    }
}

fn classify_store(error: &StoreError) -> CalendarError {
    match error {
        StoreError::Validation { field, message } => CalendarError::Validation {
            message: message.clone(),
            cause: None,
            context: ErrorContext::new(),
            field: Some(field.clone()),
        },
        StoreError::Database {
            operation,
            table,
            message,
        } => {
            let mut context = ErrorContext::new();
            context.insert("table".into(), (*table).to_string());
            let verb = operation.to_string().to_lowercase();
            CalendarError::Database {
                message: format!("Failed to {verb} {table}: {message}"),
                cause: Some(message.clone()),
                context,
                operation: Some(*operation),
            }
        }
        other => CalendarError::Database {
            message: other.to_string(),
            cause: Some(other.to_string()),
            context: ErrorContext::new(),
            operation: None,
        },
    }
}

fn classify_io(error: &io::Error) -> CalendarError {
    match error.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable
        | io::ErrorKind::NotConnected => CalendarError::Network {
            message: "No internet connection available".into(),
            cause: Some(error.to_string()),
            context: ErrorContext::new(),
            is_connectivity_issue: true,
        },
        io::ErrorKind::TimedOut => CalendarError::Network {
            message: "Request timed out".into(),
            cause: Some(error.to_string()),
            context: ErrorContext::new(),
            is_connectivity_issue: false,
        },
        io::ErrorKind::PermissionDenied => CalendarError::Security {
            message: error.to_string(),
            cause: Some(error.to_string()),
            context: ErrorContext::new(),
            permission: None,
        },
        io::ErrorKind::InvalidInput => CalendarError::Validation {
            message: error.to_string(),
            cause: Some(error.to_string()),
            context: ErrorContext::new(),
            field: None,
        },
        _ => CalendarError::Network {
            message: "Network communication failed".into(),
            cause: Some(error.to_string()),
            context: ErrorContext::new(),
            is_connectivity_issue: false,
        },
    }
}

fn render_context(context: &ErrorContext, extra: &ErrorContext) -> String {
    context
        .iter()
        .chain(extra.iter())
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}
