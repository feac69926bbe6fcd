//! Sync status polling and the refresh cascade that follows a finished sync.

mod coordinator;
mod transition;

use std::time::Duration;

pub use coordinator::{PollingChange, Reaction, SyncCoordinator};
pub use transition::{detect_edge, Edge};

/// Fixed cadence while a sync is running. Not configurable, no backoff.
pub const POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Readings of the previous run tolerated after a start before polling stops.
pub const START_GRACE_POLLS: u32 = 10;

/// Follow-up work run once when a sync moves from running to completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionAction {
    NotifySuccess,
    RefreshMails,
    RefreshFolders,
    RefreshVirtualCounts,
    ClassifyUnclassified,
}

impl CompletionAction {
    pub const DEFAULT: [CompletionAction; 5] = [
        CompletionAction::NotifySuccess,
        CompletionAction::RefreshMails,
        CompletionAction::RefreshFolders,
        CompletionAction::RefreshVirtualCounts,
        CompletionAction::ClassifyUnclassified,
    ];
}
