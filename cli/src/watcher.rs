//! Terminal driver for the sync coordinator.

use pigeon_shared::api::ListMailsQuery;
use pigeon_shared::error::ClientResult;
use pigeon_shared::models::{SyncState, SyncStatus};
use pigeon_shared::sync::{CompletionAction, Edge, Reaction, SyncCoordinator, POLL_INTERVAL};
use std::future::Future;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::client::PigeonApi;

/// Where the watcher reports what happened.
pub trait Notifier: Send + Sync {
    fn progress(&self, status: &SyncStatus);
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
    fn info(&self, message: &str);
}

/// Prints to the terminal.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn progress(&self, status: &SyncStatus) {
        println!("{}", pigeon_shared::format::status_line(Some(status)));
        if status.state == SyncState::InProgress {
            if let Some(remaining) = status.estimated_remaining {
                println!(
                    "    {} remaining",
                    pigeon_shared::format::format_remaining(Some(remaining))
                );
            }
        }
    }

    fn success(&self, message: &str) {
        println!("✓ {}", message);
    }

    fn failure(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    fn info(&self, message: &str) {
        println!("  {}", message);
    }
}

/// Polls `/sync/status/` while a sync is running and runs the completion cascade.
pub struct SyncWatcher<'a, A: PigeonApi + ?Sized, N: Notifier + ?Sized> {
    api: &'a A,
    notifier: &'a N,
    coordinator: SyncCoordinator,
}

impl<'a, A: PigeonApi + ?Sized, N: Notifier + ?Sized> SyncWatcher<'a, A, N> {
    pub fn new(api: &'a A, notifier: &'a N) -> Self {
        Self {
            api,
            notifier,
            coordinator: SyncCoordinator::new(),
        }
    }

    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    /// Fetch the status once and apply it.
    ///
    /// Never fails: a failed fetch is logged and the previous status is kept.
    pub async fn refresh(&mut self) -> Option<Reaction> {
        match self.api.sync_status().await {
            Ok(status) => {
                self.notifier.progress(&status);
                let reaction = self.coordinator.observe(status);
                self.apply(&reaction).await;
                Some(reaction)
            }
            Err(e) => {
                self.coordinator.observe_failure(&e);
                None
            }
        }
    }

    /// Ask the backend to start a sync, then fetch the status right away.
    ///
    /// Polling stays armed until the new run shows up, even if the first
    /// readings still describe the previous one.
    pub async fn start(&mut self) -> ClientResult<()> {
        if let Err(e) = self.api.start_sync().await {
            self.notifier.failure(&format!("Failed to start sync: {}", e));
            return Err(e);
        }
        tracing::info!("Sync start requested");
        self.coordinator.expect_start();
        self.refresh().await;
        Ok(())
    }

    /// Ask the backend to cancel. Local state only changes once a poll says so.
    pub async fn stop(&mut self) -> ClientResult<()> {
        if let Err(e) = self.api.stop_sync().await {
            self.notifier.failure(&format!("Failed to stop sync: {}", e));
            return Err(e);
        }
        tracing::info!("Sync stop requested");
        Ok(())
    }

    /// Poll until the coordinator disarms polling or `shutdown` resolves.
    ///
    /// Returns the last known state.
    pub async fn watch<F>(&mut self, shutdown: F) -> Option<SyncState>
    where
        F: Future<Output = ()>,
    {
        if self.coordinator.status().is_none() {
            self.refresh().await;
        }

        let mut ticker = time::interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        while self.coordinator.is_polling() {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("Polling sync status");
                    self.refresh().await;
                }
                _ = &mut shutdown => {
                    tracing::info!("Stopped watching; the sync keeps running on the server");
                    break;
                }
            }
        }

        self.coordinator.state()
    }

    async fn apply(&self, reaction: &Reaction) {
        if reaction.edge == Some(Edge::Failed) {
            self.notifier.failure("Sync failed. Please try again.");
        }
        for action in &reaction.actions {
            self.run_action(*action).await;
        }
    }

    async fn run_action(&self, action: CompletionAction) {
        tracing::debug!(?action, "Running completion action");
        match action {
            CompletionAction::NotifySuccess => self.notifier.success("Sync completed"),
            CompletionAction::RefreshMails => {
                match self.api.list_mails(&ListMailsQuery::default()).await {
                    Ok(page) => self
                        .notifier
                        .info(&format!("{} mails in mailbox", page.pagination.total_count)),
                    Err(e) => tracing::warn!("Failed to refresh mails: {}", e),
                }
            }
            CompletionAction::RefreshFolders => match self.api.list_folders().await {
                Ok(folders) => self.notifier.info(&format!("{} folders", folders.len())),
                Err(e) => tracing::warn!("Failed to refresh folders: {}", e),
            },
            CompletionAction::RefreshVirtualCounts => match self.api.virtual_counts().await {
                Ok(counts) => self.notifier.info(&format!(
                    "unread {}, starred {}, unclassified {}",
                    counts.unread, counts.starred, counts.unclassified
                )),
                Err(e) => tracing::warn!("Failed to refresh folder counts: {}", e),
            },
            CompletionAction::ClassifyUnclassified => {
                match self.api.classify_unclassified().await {
                    Ok(message) => self.notifier.success(
                        message
                            .as_deref()
                            .unwrap_or("Started classifying unclassified mails"),
                    ),
                    Err(e) => self
                        .notifier
                        .failure(&format!("Automatic classification failed: {}", e)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pigeon_shared::api::ListMailsResponse;
    use pigeon_shared::error::ClientError;
    use pigeon_shared::models::{Folder, Pagination, SyncKind, SyncProgress};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    fn status(state: SyncState, percentage: f64) -> SyncStatus {
        SyncStatus {
            sync_id: "sync-42".to_string(),
            state,
            kind: SyncKind::Incremental,
            progress: SyncProgress {
                total: 100,
                synced: percentage as u64,
                classified: 0,
                percentage,
            },
            started_at: None,
            completed_at: None,
            estimated_remaining: None,
        }
    }

    /// Replays a scripted sequence of status responses; the last one repeats.
    #[derive(Default)]
    struct ScriptedApi {
        statuses: Mutex<VecDeque<ClientResult<SyncStatus>>>,
        calls: Mutex<Vec<&'static str>>,
        fail_start: bool,
    }

    impl ScriptedApi {
        fn new(script: Vec<ClientResult<SyncStatus>>) -> Self {
            Self {
                statuses: Mutex::new(script.into()),
                ..Self::default()
            }
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn count(&self, call: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
        }
    }

    #[async_trait]
    impl PigeonApi for ScriptedApi {
        async fn sync_status(&self) -> ClientResult<SyncStatus> {
            self.record("status");
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.pop_front().unwrap()
            } else {
                statuses.front().cloned().unwrap()
            }
        }

        async fn start_sync(&self) -> ClientResult<()> {
            self.record("start");
            if self.fail_start {
                Err(ClientError::Transport("connection refused".to_string()))
            } else {
                Ok(())
            }
        }

        async fn stop_sync(&self) -> ClientResult<()> {
            self.record("stop");
            Ok(())
        }

        async fn classify_unclassified(&self) -> ClientResult<Option<String>> {
            self.record("classify");
            Ok(Some("Classified 3 mails".to_string()))
        }

        async fn list_mails(&self, _query: &ListMailsQuery) -> ClientResult<ListMailsResponse> {
            self.record("mails");
            Ok(ListMailsResponse {
                mails: vec![],
                pagination: Pagination {
                    page: 1,
                    page_size: 20,
                    total_count: 7,
                    total_pages: 1,
                    has_next: false,
                    has_prev: false,
                },
            })
        }

        async fn list_folders(&self) -> ClientResult<Vec<Folder>> {
            self.record("folders");
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        successes: Mutex<Vec<String>>,
        failures: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn progress(&self, _status: &SyncStatus) {}

        fn success(&self, message: &str) {
            self.successes.lock().unwrap().push(message.to_string());
        }

        fn failure(&self, message: &str) {
            self.failures.lock().unwrap().push(message.to_string());
        }

        fn info(&self, _message: &str) {}
    }

    impl RecordingNotifier {
        fn successes(&self) -> Vec<String> {
            self.successes.lock().unwrap().clone()
        }

        fn failures(&self) -> Vec<String> {
            self.failures.lock().unwrap().clone()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_does_not_poll() {
        let api = ScriptedApi::new(vec![Ok(status(SyncState::Idle, 0.0))]);
        let notifier = RecordingNotifier::default();
        let mut watcher = SyncWatcher::new(&api, &notifier);

        let last = watcher.watch(std::future::pending()).await;

        assert_eq!(last, Some(SyncState::Idle));
        assert_eq!(api.count("status"), 1);
        assert_eq!(api.count("classify"), 0);
        assert!(notifier.successes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cycle_runs_cascade_once() {
        let api = ScriptedApi::new(vec![
            Ok(status(SyncState::Idle, 0.0)),
            Ok(status(SyncState::InProgress, 10.0)),
            Ok(status(SyncState::InProgress, 55.0)),
            Ok(status(SyncState::Completed, 100.0)),
        ]);
        let notifier = RecordingNotifier::default();
        let mut watcher = SyncWatcher::new(&api, &notifier);

        assert_ok!(watcher.start().await);
        assert_eq!(watcher.coordinator().state(), Some(SyncState::Idle));
        assert!(watcher.coordinator().is_polling());

        let last = watcher.watch(std::future::pending()).await;

        assert_eq!(last, Some(SyncState::Completed));
        assert_eq!(api.count("status"), 4);
        assert_eq!(api.count("mails"), 1 + 4);
        assert_eq!(api.count("folders"), 1);
        assert_eq!(api.count("classify"), 1);
        assert_eq!(
            notifier.successes(),
            vec!["Sync completed".to_string(), "Classified 3 mails".to_string()]
        );
        assert!(notifier.failures().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_waits_out_previous_run() {
        let mut previous = status(SyncState::Completed, 100.0);
        previous.sync_id = "sync-41".to_string();
        let api = ScriptedApi::new(vec![
            Ok(previous),
            Ok(status(SyncState::InProgress, 30.0)),
            Ok(status(SyncState::Completed, 100.0)),
        ]);
        let notifier = RecordingNotifier::default();
        let mut watcher = SyncWatcher::new(&api, &notifier);

        assert_ok!(watcher.start().await);
        assert!(watcher.coordinator().is_polling());
        assert_eq!(api.count("classify"), 0);

        let last = watcher.watch(std::future::pending()).await;

        assert_eq!(last, Some(SyncState::Completed));
        assert_eq!(api.count("status"), 3);
        assert_eq!(api.count("classify"), 1);
        assert_eq!(notifier.successes()[0], "Sync completed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_that_never_runs_stops_polling() {
        let api = ScriptedApi::new(vec![Ok(status(SyncState::Idle, 0.0))]);
        let notifier = RecordingNotifier::default();
        let mut watcher = SyncWatcher::new(&api, &notifier);

        assert_ok!(watcher.start().await);
        let last = watcher.watch(std::future::pending()).await;

        assert_eq!(last, Some(SyncState::Idle));
        assert_eq!(
            api.count("status"),
            pigeon_shared::sync::START_GRACE_POLLS as usize
        );
        assert_eq!(api.count("classify"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_notifies_without_cascade() {
        let api = ScriptedApi::new(vec![
            Ok(status(SyncState::InProgress, 20.0)),
            Ok(status(SyncState::Failed, 20.0)),
        ]);
        let notifier = RecordingNotifier::default();
        let mut watcher = SyncWatcher::new(&api, &notifier);

        let last = watcher.watch(std::future::pending()).await;

        assert_eq!(last, Some(SyncState::Failed));
        assert_eq!(notifier.failures().len(), 1);
        assert_eq!(api.count("classify"), 0);
        assert_eq!(api.count("mails"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_mid_sync_starts_polling() {
        let api = ScriptedApi::new(vec![
            Ok(status(SyncState::InProgress, 30.0)),
            Ok(status(SyncState::InProgress, 60.0)),
            Ok(status(SyncState::Completed, 100.0)),
        ]);
        let notifier = RecordingNotifier::default();
        let mut watcher = SyncWatcher::new(&api, &notifier);

        let first = watcher.refresh().await.unwrap();
        assert!(first.actions.is_empty());
        assert!(watcher.coordinator().is_polling());

        watcher.watch(std::future::pending()).await;
        assert_eq!(api.count("classify"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_errors_keep_last_status() {
        let api = ScriptedApi::new(vec![
            Ok(status(SyncState::InProgress, 40.0)),
            Err(ClientError::Transport("timeout".to_string())),
            Err(ClientError::Api {
                code: None,
                message: "busy".to_string(),
            }),
            Ok(status(SyncState::Completed, 100.0)),
        ]);
        let notifier = RecordingNotifier::default();
        let mut watcher = SyncWatcher::new(&api, &notifier);

        watcher.refresh().await;
        assert!(watcher.refresh().await.is_none());
        assert!(watcher.coordinator().is_polling());
        assert_eq!(
            watcher.coordinator().status().unwrap().progress.percentage,
            40.0
        );

        let last = watcher.watch(std::future::pending()).await;
        assert_eq!(last, Some(SyncState::Completed));
        assert_eq!(api.count("classify"), 1);
        assert!(notifier.failures().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_does_not_force_local_state() {
        let api = ScriptedApi::new(vec![
            Ok(status(SyncState::InProgress, 50.0)),
            Ok(status(SyncState::InProgress, 50.0)),
            Ok(status(SyncState::Idle, 50.0)),
        ]);
        let notifier = RecordingNotifier::default();
        let mut watcher = SyncWatcher::new(&api, &notifier);

        watcher.refresh().await;
        assert_ok!(watcher.stop().await);
        assert!(watcher.coordinator().is_polling());
        assert_eq!(watcher.coordinator().state(), Some(SyncState::InProgress));

        watcher.refresh().await;
        assert!(watcher.coordinator().is_polling());

        let last = watcher.watch(std::future::pending()).await;
        assert_eq!(last, Some(SyncState::Idle));
        assert_eq!(api.count("stop"), 1);
        assert_eq!(api.count("classify"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_start_is_reported() {
        let api = ScriptedApi {
            fail_start: true,
            ..ScriptedApi::new(vec![Ok(status(SyncState::Idle, 0.0))])
        };
        let notifier = RecordingNotifier::default();
        let mut watcher = SyncWatcher::new(&api, &notifier);

        assert_err!(watcher.start().await);
        assert_eq!(notifier.failures().len(), 1);
        assert_eq!(api.count("status"), 0);
        assert!(watcher.coordinator().status().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_watching() {
        let api = ScriptedApi::new(vec![Ok(status(SyncState::InProgress, 5.0))]);
        let notifier = RecordingNotifier::default();
        let mut watcher = SyncWatcher::new(&api, &notifier);

        let shutdown = time::sleep(POLL_INTERVAL * 3 + POLL_INTERVAL / 2);
        let last = watcher.watch(shutdown).await;

        assert_eq!(last, Some(SyncState::InProgress));
        // initial fetch plus three ticks
        assert_eq!(api.count("status"), 4);
    }
}
