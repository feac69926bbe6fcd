//! Browser driver for the sync coordinator.

use gloo::timers::callback::Interval;
use pigeon_shared::error::ClientResult;
use pigeon_shared::models::SyncStatus;
use pigeon_shared::sync::{CompletionAction, PollingChange, SyncCoordinator, POLL_INTERVAL};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::ApiService;
use crate::store::toast::Toaster;

/// A repeating timer that is cancelled when dropped.
trait PollTimer: 'static {
    fn every(period: Duration, tick: impl FnMut() + 'static) -> Self;
}

impl PollTimer for Interval {
    fn every(period: Duration, tick: impl FnMut() + 'static) -> Self {
        Interval::new(period.as_millis() as u32, tick)
    }
}

/// Owns the coordinator and the poll timer for one mounted mail view.
///
/// Network calls are spawned by the `refresh`/`start`/`stop` methods; their
/// results come back through the `on_*` methods.
struct SyncDriver<T: PollTimer = Interval> {
    coordinator: RefCell<SyncCoordinator>,
    timer: RefCell<Option<T>>,
    /// Cleared on unmount; late responses are dropped
    alive: Cell<bool>,
    set_status: Callback<Option<SyncStatus>>,
    on_action: RefCell<Callback<CompletionAction>>,
    toaster: RefCell<Toaster>,
}

impl<T: PollTimer> SyncDriver<T> {
    fn new(
        set_status: Callback<Option<SyncStatus>>,
        on_action: Callback<CompletionAction>,
        toaster: Toaster,
    ) -> Self {
        Self {
            coordinator: RefCell::new(SyncCoordinator::new()),
            timer: RefCell::new(None),
            alive: Cell::new(true),
            set_status,
            on_action: RefCell::new(on_action),
            toaster: RefCell::new(toaster),
        }
    }

    fn refresh(self: &Rc<Self>) {
        let driver = Rc::clone(self);
        spawn_local(async move {
            let result = ApiService::sync_status().await;
            driver.on_status(result);
        });
    }

    fn on_status(self: &Rc<Self>, result: ClientResult<SyncStatus>) {
        if !self.alive.get() {
            return;
        }
        match result {
            Ok(status) => self.apply(status),
            Err(e) => self.coordinator.borrow().observe_failure(&e),
        }
    }

    fn apply(self: &Rc<Self>, status: SyncStatus) {
        let reaction = self.coordinator.borrow_mut().observe(status.clone());
        self.set_status.emit(Some(status));
        self.change_polling(reaction.polling);

        if reaction.failed() {
            let toaster = self.toaster.borrow().clone();
            toaster.error("Sync failed. Please try again.");
        }

        let on_action = self.on_action.borrow().clone();
        for action in reaction.actions {
            on_action.emit(action);
        }
    }

    fn change_polling(self: &Rc<Self>, change: PollingChange) {
        match change {
            PollingChange::Arm => self.arm(),
            PollingChange::Disarm => self.disarm(),
            PollingChange::Unchanged => {}
        }
    }

    fn arm(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let timer = T::every(POLL_INTERVAL, move || {
            if let Some(driver) = weak.upgrade() {
                driver.refresh();
            }
        });
        // Replacing an old timer drops and cancels it.
        *self.timer.borrow_mut() = Some(timer);
        tracing::debug!("Sync polling armed");
    }

    fn disarm(&self) {
        if self.timer.borrow_mut().take().is_some() {
            tracing::debug!("Sync polling disarmed");
        }
    }

    #[cfg(test)]
    fn is_armed(&self) -> bool {
        self.timer.borrow().is_some()
    }

    fn start(self: &Rc<Self>) {
        let driver = Rc::clone(self);
        spawn_local(async move {
            let result = ApiService::start_sync().await.map(|_| ());
            if driver.on_started(result) {
                driver.refresh();
            }
        });
    }

    /// Returns true when the status should be fetched right away.
    fn on_started(self: &Rc<Self>, result: ClientResult<()>) -> bool {
        if !self.alive.get() {
            return false;
        }
        match result {
            Ok(()) => {
                tracing::info!("Sync start requested");
                let change = self.coordinator.borrow_mut().expect_start();
                self.change_polling(change);
                true
            }
            Err(e) => {
                tracing::error!("Failed to start sync: {}", e);
                let toaster = self.toaster.borrow().clone();
                toaster.error(format!("Failed to start sync: {}", e));
                false
            }
        }
    }

    fn stop(self: &Rc<Self>) {
        let driver = Rc::clone(self);
        spawn_local(async move {
            let result = ApiService::stop_sync().await;
            if !driver.alive.get() {
                return;
            }
            let toaster = driver.toaster.borrow().clone();
            match result {
                Ok(_) => toaster.info("Stopping sync..."),
                Err(e) => {
                    tracing::error!("Failed to stop sync: {}", e);
                    toaster.error(format!("Failed to stop sync: {}", e));
                }
            }
        });
    }

    fn clear(&self) {
        let change = self.coordinator.borrow_mut().clear();
        if change == PollingChange::Disarm {
            self.disarm();
        }
        self.set_status.emit(None);
    }

    fn teardown(&self) {
        self.alive.set(false);
        self.disarm();
    }
}

/// What the mail view and its children see of the sync job.
#[derive(Clone)]
pub struct SyncHandle {
    status: Option<SyncStatus>,
    driver: Rc<SyncDriver>,
}

impl PartialEq for SyncHandle {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status && Rc::ptr_eq(&self.driver, &other.driver)
    }
}

impl SyncHandle {
    pub fn status(&self) -> Option<&SyncStatus> {
        self.status.as_ref()
    }

    pub fn is_syncing(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|status| status.state.is_active())
    }

    pub fn start(&self) {
        self.driver.start();
    }

    /// Only asks the backend; the next poll decides what the UI shows.
    pub fn stop(&self) {
        self.driver.stop();
    }

    pub fn refresh(&self) {
        self.driver.refresh();
    }

    /// Drop the cached status and any running timer, e.g. on logout.
    pub fn clear(&self) {
        self.driver.clear();
    }
}

/// Fetch the sync status on mount and keep polling while a sync runs.
///
/// `on_action` receives the completion cascade one action at a time.
#[hook]
pub fn use_sync(on_action: Callback<CompletionAction>, toaster: Toaster) -> SyncHandle {
    let status = use_state(|| None::<SyncStatus>);

    let driver = {
        let setter = status.setter();
        let set_status = Callback::from(move |status: Option<SyncStatus>| setter.set(status));
        let on_action = on_action.clone();
        let toaster = toaster.clone();
        use_memo((), move |_| {
            SyncDriver::<Interval>::new(set_status, on_action, toaster)
        })
    };

    // Keep callbacks current without recreating the driver.
    *driver.on_action.borrow_mut() = on_action;
    *driver.toaster.borrow_mut() = toaster;

    {
        let driver = Rc::clone(&driver);
        use_effect_with((), move |_| {
            driver.refresh();
            move || driver.teardown()
        });
    }

    SyncHandle {
        status: (*status).clone(),
        driver,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigeon_shared::error::ClientError;
    use pigeon_shared::models::{SyncKind, SyncProgress, SyncState};

    thread_local! {
        static ARMED: Cell<u32> = Cell::new(0);
        static DROPPED: Cell<u32> = Cell::new(0);
    }

    /// Counts arms and drops instead of touching the browser.
    struct FakeTimer;

    impl PollTimer for FakeTimer {
        fn every(_period: Duration, _tick: impl FnMut() + 'static) -> Self {
            ARMED.with(|armed| armed.set(armed.get() + 1));
            FakeTimer
        }
    }

    impl Drop for FakeTimer {
        fn drop(&mut self) {
            DROPPED.with(|dropped| dropped.set(dropped.get() + 1));
        }
    }

    fn armed() -> u32 {
        ARMED.with(Cell::get)
    }

    fn dropped() -> u32 {
        DROPPED.with(Cell::get)
    }

    fn status(sync_id: &str, state: SyncState) -> SyncStatus {
        SyncStatus {
            sync_id: sync_id.to_string(),
            state,
            kind: SyncKind::Incremental,
            progress: SyncProgress::default(),
            started_at: None,
            completed_at: None,
            estimated_remaining: None,
        }
    }

    struct Harness {
        driver: Rc<SyncDriver<FakeTimer>>,
        statuses: Rc<RefCell<Vec<Option<SyncStatus>>>>,
        actions: Rc<RefCell<Vec<CompletionAction>>>,
    }

    fn harness() -> Harness {
        let statuses = Rc::new(RefCell::new(Vec::<Option<SyncStatus>>::new()));
        let actions = Rc::new(RefCell::new(Vec::<CompletionAction>::new()));
        let set_status = {
            let statuses = Rc::clone(&statuses);
            Callback::from(move |status: Option<SyncStatus>| statuses.borrow_mut().push(status))
        };
        let on_action = {
            let actions = Rc::clone(&actions);
            Callback::from(move |action: CompletionAction| actions.borrow_mut().push(action))
        };
        Harness {
            driver: Rc::new(SyncDriver::new(set_status, on_action, Toaster::new(None))),
            statuses,
            actions,
        }
    }

    #[test]
    fn test_timer_armed_once_per_run() {
        let h = harness();

        h.driver.on_status(Ok(status("s1", SyncState::Idle)));
        assert!(!h.driver.is_armed());

        h.driver.on_status(Ok(status("s1", SyncState::InProgress)));
        h.driver.on_status(Ok(status("s1", SyncState::InProgress)));
        assert!(h.driver.is_armed());
        assert_eq!(armed(), 1);

        h.driver.on_status(Ok(status("s1", SyncState::Completed)));
        assert!(!h.driver.is_armed());
        assert_eq!(dropped(), 1);
        assert_eq!(*h.actions.borrow(), CompletionAction::DEFAULT.to_vec());
        assert_eq!(h.statuses.borrow().len(), 4);
    }

    #[test]
    fn test_failed_fetch_keeps_timer() {
        let h = harness();
        h.driver.on_status(Ok(status("s1", SyncState::InProgress)));
        h.driver
            .on_status(Err(ClientError::Transport("offline".to_string())));

        assert!(h.driver.is_armed());
        assert_eq!(dropped(), 0);
        assert_eq!(h.statuses.borrow().len(), 1);
    }

    #[test]
    fn test_teardown_drops_timer_and_late_responses() {
        let h = harness();
        h.driver.on_status(Ok(status("s1", SyncState::InProgress)));
        h.driver.teardown();

        assert!(!h.driver.is_armed());
        assert_eq!(dropped(), 1);

        h.driver.on_status(Ok(status("s1", SyncState::Completed)));
        assert!(h.actions.borrow().is_empty());
        assert_eq!(h.statuses.borrow().len(), 1);
        assert!(!h.driver.on_started(Ok(())));
        assert_eq!(armed(), 1);
    }

    #[test]
    fn test_clear_disarms_on_logout() {
        let h = harness();
        h.driver.on_status(Ok(status("s1", SyncState::InProgress)));
        h.driver.clear();

        assert!(!h.driver.is_armed());
        assert_eq!(dropped(), 1);
        assert_eq!(h.statuses.borrow().last(), Some(&None));
    }

    #[test]
    fn test_start_arms_before_new_run_shows_up() {
        let h = harness();
        h.driver.on_status(Ok(status("old", SyncState::Completed)));

        assert!(h.driver.on_started(Ok(())));
        assert!(h.driver.is_armed());

        h.driver.on_status(Ok(status("old", SyncState::Completed)));
        assert!(h.driver.is_armed());

        h.driver.on_status(Ok(status("new", SyncState::InProgress)));
        h.driver.on_status(Ok(status("new", SyncState::Completed)));
        assert!(!h.driver.is_armed());
        assert_eq!(armed(), 1);
        assert_eq!(*h.actions.borrow(), CompletionAction::DEFAULT.to_vec());
    }

    #[test]
    fn test_failed_start_leaves_polling_off() {
        let h = harness();
        let started = h
            .driver
            .on_started(Err(ClientError::Transport("refused".to_string())));
        assert!(!started);
        assert!(!h.driver.is_armed());
    }
}
