use crate::error::ClientError;
use crate::models::{SyncState, SyncStatus};

use super::transition::{detect_edge, Edge};
use super::{CompletionAction, START_GRACE_POLLS};

/// What a driver must do with its poll timer after an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingChange {
    /// Start the repeating timer (it was not running)
    Arm,
    /// Tear the timer down (it was running)
    Disarm,
    Unchanged,
}

/// Result of feeding one fetched status into the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub edge: Option<Edge>,
    pub polling: PollingChange,
    /// Non-empty only on the completion edge, in execution order
    pub actions: Vec<CompletionAction>,
}

impl Reaction {
    pub fn completed(&self) -> bool {
        self.edge == Some(Edge::Completed)
    }

    pub fn failed(&self) -> bool {
        self.edge == Some(Edge::Failed)
    }
}

/// Local view of the backend sync job.
///
/// Holds no timers and performs no I/O. A driver fetches the status, hands it
/// to [`SyncCoordinator::observe`] and applies the returned [`Reaction`].
#[derive(Debug, Clone)]
pub struct SyncCoordinator {
    status: Option<SyncStatus>,
    polling: bool,
    pending_start: Option<PendingStart>,
    on_completion: Vec<CompletionAction>,
}

/// A start was requested but the backend has not shown the new run yet.
#[derive(Debug, Clone)]
struct PendingStart {
    /// Run id cached when the start was requested
    baseline: Option<String>,
    stale_readings: u32,
}

impl PendingStart {
    /// A run other than the baseline already reached a terminal state.
    fn finished_new_run(&self, status: &SyncStatus) -> bool {
        status.state.is_terminal()
            && self
                .baseline
                .as_deref()
                .is_some_and(|baseline| baseline != status.sync_id)
    }
}

impl Default for SyncCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncCoordinator {
    pub fn new() -> Self {
        Self::with_actions(CompletionAction::DEFAULT.to_vec())
    }

    pub fn with_actions(on_completion: Vec<CompletionAction>) -> Self {
        Self {
            status: None,
            polling: false,
            pending_start: None,
            on_completion,
        }
    }

    /// Last successfully fetched status, if any.
    pub fn status(&self) -> Option<&SyncStatus> {
        self.status.as_ref()
    }

    pub fn state(&self) -> Option<SyncState> {
        self.status.as_ref().map(|status| status.state)
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn completion_actions(&self) -> &[CompletionAction] {
        &self.on_completion
    }

    /// True between a successful start command and the first reading of the new run.
    pub fn is_start_pending(&self) -> bool {
        self.pending_start.is_some()
    }

    /// The start command was accepted; poll until the new run shows up.
    ///
    /// Readings that still describe the previous run keep polling armed for up
    /// to [`START_GRACE_POLLS`] fetches.
    pub fn expect_start(&mut self) -> PollingChange {
        self.pending_start = Some(PendingStart {
            baseline: self.status.as_ref().map(|status| status.sync_id.clone()),
            stale_readings: 0,
        });
        let change = if self.polling {
            PollingChange::Unchanged
        } else {
            PollingChange::Arm
        };
        self.polling = true;
        change
    }

    /// Cache a freshly fetched status and work out what has to happen.
    ///
    /// Last write wins: a late response simply overwrites whatever was cached.
    pub fn observe(&mut self, status: SyncStatus) -> Reaction {
        let mut previous = self.state();
        let current = status.state;

        if let Some(pending) = self.pending_start.as_mut() {
            if current.is_active() {
                self.pending_start = None;
            } else if pending.finished_new_run(&status) {
                // The new run finished between two fetches.
                previous = Some(SyncState::InProgress);
                self.pending_start = None;
            } else {
                pending.stale_readings += 1;
                if pending.stale_readings < START_GRACE_POLLS {
                    tracing::debug!(
                        sync_id = %status.sync_id,
                        "Waiting for the requested sync to start ({:?})",
                        current
                    );
                    self.status = Some(status);
                    return Reaction {
                        edge: None,
                        polling: PollingChange::Unchanged,
                        actions: Vec::new(),
                    };
                }
                tracing::warn!("Requested sync never started, stopping the poll");
                self.pending_start = None;
            }
        }

        let edge = detect_edge(previous, current);

        let should_poll = current.is_active();
        let polling = match (self.polling, should_poll) {
            (false, true) => PollingChange::Arm,
            (true, false) => PollingChange::Disarm,
            _ => PollingChange::Unchanged,
        };
        self.polling = should_poll;

        if previous != Some(current) {
            tracing::debug!(
                sync_id = %status.sync_id,
                "Sync state {:?} -> {:?}",
                previous,
                current
            );
        }
        self.status = Some(status);

        let actions = match edge {
            Some(Edge::Completed) => self.on_completion.clone(),
            Some(Edge::Failed) | None => Vec::new(),
        };

        Reaction {
            edge,
            polling,
            actions,
        }
    }

    /// A status fetch failed. The cached status and polling stay as they are.
    pub fn observe_failure(&self, error: &ClientError) {
        tracing::warn!(
            polling = self.polling,
            "Failed to fetch sync status, keeping last known state: {}",
            error
        );
    }

    /// Forget everything, e.g. on logout.
    pub fn clear(&mut self) -> PollingChange {
        self.status = None;
        self.pending_start = None;
        let change = if self.polling {
            PollingChange::Disarm
        } else {
            PollingChange::Unchanged
        };
        self.polling = false;
        change
    }
}
