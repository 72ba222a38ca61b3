//! The three-state result envelope.

use crate::classify::Classifier;
use crate::taxonomy::CalendarError;
use calstore_core::StoreResult;

/// Result of an operation as a caller-facing envelope.
///
/// Exactly one of three states; consumers match all three explicitly,
/// there is no default-success path. Constructed fresh per operation and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The operation is still in flight.
    Loading,
    /// The operation finished with a value.
    Success(T),
    /// The operation failed with a classified error.
    Failure(CalendarError),
}

impl<T> Outcome<T> {
    /// Lifts a store result into an envelope, classifying any error.
    #[must_use]
    pub fn from_result(result: StoreResult<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(Classifier::new().classify(&error)),
        }
    }

    /// Maps the success value, passing the other states through.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Loading => Outcome::Loading,
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Chains another envelope-producing step onto a success.
    #[must_use]
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Self::Loading => Outcome::Loading,
            Self::Success(value) => f(value),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Runs a side effect when successful; returns the envelope unchanged.
    #[must_use]
    pub fn on_success(self, f: impl FnOnce(&T)) -> Self {
        if let Self::Success(value) = &self {
            f(value);
        }
        self
    }

    /// Runs a side effect when failed; returns the envelope unchanged.
    #[must_use]
    pub fn on_failure(self, f: impl FnOnce(&CalendarError)) -> Self {
        if let Self::Failure(error) = &self {
            f(error);
        }
        self
    }

    /// Runs a side effect while loading; returns the envelope unchanged.
    #[must_use]
    pub fn on_loading(self, f: impl FnOnce()) -> Self {
        if matches!(self, Self::Loading) {
            f();
        }
        self
    }

    /// The success value, if this is a success.
    #[must_use]
    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// The classified error, if this is a failure.
    #[must_use]
    pub fn failure(&self) -> Option<&CalendarError> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }

    /// Whether the operation is still in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}
