//! Turning classified errors into recovery menus.

use crate::taxonomy::{CalendarError, SyncType};

/// Which settings screen a recovery action should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsKind {
    /// The top-level settings screen.
    General,
    /// Permission management.
    Permissions,
    /// Network configuration.
    Network,
    /// Sync account configuration.
    Sync,
    /// Notification preferences.
    Notifications,
}

/// How a sync conflict should be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Keep local changes.
    UseLocal,
    /// Use the server version.
    UseRemote,
    /// Attempt to merge both.
    Merge,
    /// Let the user decide.
    Manual,
}

/// An advisory recovery step a caller can offer the user.
///
/// Actions carry no behavior; executing them is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry the failed operation.
    Retry,
    /// Reload the data.
    Refresh,
    /// Open a settings screen.
    GoToSettings(SettingsKind),
    /// Ask the user to grant a permission.
    RequestPermission(String),
    /// Ask the user to verify connectivity.
    CheckConnection,
    /// Escalate to support.
    ContactSupport,
    /// Close the error without further action.
    Dismiss,
    /// Navigate to a named destination.
    Navigate(String),
    /// Clear cached data and retry.
    ClearCache,
    /// Force a synchronization pass.
    ForceSync,
    /// Resolve a sync conflict.
    ResolveSyncConflict(ConflictResolution),
}

impl RecoveryAction {
    /// Short button label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Retry => "Retry",
            Self::Refresh => "Refresh",
            Self::GoToSettings(_) => "Settings",
            Self::RequestPermission(_) => "Grant Permission",
            Self::CheckConnection => "Check Connection",
            Self::ContactSupport => "Contact Support",
            Self::Dismiss => "Dismiss",
            Self::Navigate(destination) => destination,
            Self::ClearCache => "Clear Cache",
            Self::ForceSync => "Force Sync",
            Self::ResolveSyncConflict(_) => "Resolve Conflict",
        }
    }

    /// Longer explanation, where one exists.
    #[must_use]
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Self::Retry => Some("Try the operation again"),
            Self::Refresh => Some("Reload the data"),
            Self::GoToSettings(_) => Some("Open app settings"),
            Self::RequestPermission(_) => Some("Allow required permissions"),
            Self::CheckConnection => Some("Verify your internet connection"),
            Self::ContactSupport => Some("Get help from support team"),
            Self::Dismiss => Some("Close this error"),
            Self::Navigate(_) => None,
            Self::ClearCache => Some("Clear app cache and try again"),
            Self::ForceSync => Some("Force synchronization with server"),
            Self::ResolveSyncConflict(_) => Some("Choose how to resolve the sync conflict"),
        }
    }
}

/// Stateless mapping from classified errors to ordered action lists.
///
/// The first action is the primary one a UI should highlight; the last is
/// always [`RecoveryAction::Dismiss`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryPlanner;

impl RecoveryPlanner {
    /// Creates a planner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The full ordered recovery menu for an error.
    #[must_use]
    pub fn plan(&self, error: &CalendarError) -> Vec<RecoveryAction> {
        let mut actions = Vec::new();
        match error {
            CalendarError::Network {
                is_connectivity_issue,
                ..
            } => {
                if error.can_retry() {
                    actions.push(RecoveryAction::Retry);
                }
                if *is_connectivity_issue {
                    actions.push(RecoveryAction::CheckConnection);
                }
                actions.push(RecoveryAction::Refresh);
            }
            CalendarError::Database { .. } => {
                if error.can_retry() {
                    actions.push(RecoveryAction::Retry);
                }
                actions.push(RecoveryAction::Refresh);
                actions.push(RecoveryAction::ClearCache);
                actions.push(RecoveryAction::ContactSupport);
            }
            CalendarError::Validation { .. } => {}
            CalendarError::Security { permission, .. } => {
                if let Some(permission) = permission {
                    actions.push(RecoveryAction::RequestPermission(permission.clone()));
                }
                actions.push(RecoveryAction::GoToSettings(SettingsKind::Permissions));
            }
            CalendarError::Sync { sync_type, .. } => {
                if *sync_type == Some(SyncType::Conflict) {
                    actions.push(RecoveryAction::ResolveSyncConflict(
                        ConflictResolution::Manual,
                    ));
                } else {
                    if error.can_retry() {
                        actions.push(RecoveryAction::Retry);
                    }
                    actions.push(RecoveryAction::ForceSync);
                }
                actions.push(RecoveryAction::GoToSettings(SettingsKind::Sync));
            }
            CalendarError::Unknown { .. } => {
                actions.push(RecoveryAction::Retry);
                actions.push(RecoveryAction::Refresh);
                actions.push(RecoveryAction::ContactSupport);
            }
        }
        actions.push(RecoveryAction::Dismiss);
        actions
    }

    /// The at-most-3 display menu: the first two planned actions plus
    /// Dismiss, primary first.
    #[must_use]
    pub fn shortlist(&self, error: &CalendarError) -> Vec<RecoveryAction> {
        let mut actions = self.plan(error);
        actions.pop();
        actions.truncate(2);
        actions.push(RecoveryAction::Dismiss);
        actions
    }
}
