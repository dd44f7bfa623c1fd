//! The orchestration facade: the entry points a front end calls.
//!
//! A `Session` owns the core state behind a mutex. Every call turns into a
//! `Msg`, runs through `update`, and the resulting effects are handed to the
//! engine before the lock is released, so a retarget (stop old poll, start
//! new job) is never interleaved with another dispatch. Engine outcomes come
//! back on a channel and are dispatched the same way by a pump task.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use scout_core::{
    update, AppState, AppViewModel, Effect, ErrorDomain, ExportRequest, Msg, SearchKey,
    SessionPolicy, ValidationError,
};
use scout_engine::{EngineEvent, EngineHandle, ReqwestTransport, SetupError, Transport};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::ScoutConfig;
use crate::effects::{map_event, EffectRunner};

struct Shared {
    state: Mutex<AppState>,
    runner: EffectRunner,
    view_tx: watch::Sender<AppViewModel>,
}

impl Shared {
    fn dispatch(&self, msg: Msg) {
        self.dispatch_with(msg, |_| ());
    }

    /// Dispatches `msg`, letting `inspect` look at the effects before they run.
    fn dispatch_with<R>(&self, msg: Msg, inspect: impl FnOnce(&[Effect]) -> R) -> R {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let state = std::mem::take(&mut *guard);
        let (mut state, effects) = update(state, msg);
        let inspected = inspect(&effects);
        self.runner.enqueue(effects);
        if state.consume_dirty() {
            self.view_tx.send_replace(state.view());
        }
        *guard = state;
        inspected
    }
}

pub struct Session {
    shared: Arc<Shared>,
    view_rx: watch::Receiver<AppViewModel>,
    pump: JoinHandle<()>,
}

impl Session {
    /// Builds a session talking HTTP to the configured service.
    /// Must be called inside a Tokio runtime.
    pub fn new(config: &ScoutConfig) -> Result<Self, SetupError> {
        let transport = ReqwestTransport::new(config.api_settings())?;
        Ok(Self::with_transport(
            Arc::new(transport),
            config.poll_interval(),
            config.policy(),
        ))
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        poll_interval: Duration,
        policy: SessionPolicy,
    ) -> Self {
        let (engine, events) = EngineHandle::new(transport, poll_interval);
        let state = AppState::with_policy(policy);
        let (view_tx, view_rx) = watch::channel(state.view());
        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            runner: EffectRunner::new(engine),
            view_tx,
        });
        let pump = tokio::spawn(pump_events(shared.clone(), events));
        Self {
            shared,
            view_rx,
            pump,
        }
    }

    /// Validates input, starts a scrape job and begins observing it.
    pub fn submit_search(&self, keyword: &str, location: &str) -> Result<SearchKey, ValidationError> {
        let key = self.validated_key(keyword, location)?;
        self.shared.dispatch(Msg::SearchSubmitted(key.clone()));
        Ok(key)
    }

    /// Observes the job for the given key without starting a new one.
    pub fn check_status(&self, keyword: &str, location: &str) -> Result<SearchKey, ValidationError> {
        let key = self.validated_key(keyword, location)?;
        self.shared.dispatch(Msg::StatusCheckRequested(key.clone()));
        Ok(key)
    }

    pub fn stop_observing(&self) {
        self.shared.dispatch(Msg::StopObservingRequested);
    }

    pub fn dismiss_status(&self) {
        self.shared.dispatch(Msg::StatusDismissed);
    }

    /// Reloads the active result set.
    pub fn load_results(&self) {
        self.shared.dispatch(Msg::ResultsRequested);
    }

    pub fn clear_search(&self) {
        self.shared.dispatch(Msg::SearchCleared);
    }

    pub fn change_page(&self, page: u32) -> Result<(), ValidationError> {
        if page == 0 {
            return Err(self.reject(ValidationError::InvalidPage));
        }
        self.shared.dispatch(Msg::PageRequested(page));
        Ok(())
    }

    /// Narrows the paginated listing to one keyword and location and reloads page 1.
    pub fn filter_listing(&self, keyword: &str, location: &str) -> Result<(), ValidationError> {
        let key = self.validated_key(keyword, location)?;
        self.shared.dispatch(Msg::PageFilterChanged(Some(key)));
        Ok(())
    }

    pub fn clear_listing_filter(&self) {
        self.shared.dispatch(Msg::PageFilterChanged(None));
    }

    pub fn next_page(&self) {
        self.shared.dispatch(Msg::NextPageRequested);
    }

    pub fn previous_page(&self) {
        self.shared.dispatch(Msg::PreviousPageRequested);
    }

    /// Deletes a displayed record; the local copy goes only after the server confirms.
    ///
    /// Returns `false` without contacting the server when `id` is not among the
    /// loaded results or a delete for it is already pending.
    pub fn delete_business(&self, id: &str) -> bool {
        self.shared.dispatch_with(Msg::DeleteRequested(id.to_string()), |effects| {
            effects
                .iter()
                .any(|effect| matches!(effect, Effect::DeleteBusiness { .. }))
        })
    }

    pub fn request_export(&self, request: ExportRequest) -> Result<(), ValidationError> {
        if let Err(err) = request.validate() {
            return Err(self.reject(err));
        }
        self.shared.dispatch(Msg::ExportRequested(request));
        Ok(())
    }

    pub fn clear_export_result(&self) {
        self.shared.dispatch(Msg::ExportResultDismissed);
    }

    pub fn clear_error(&self, domain: ErrorDomain) {
        self.shared.dispatch(Msg::ErrorsDismissed(domain));
    }

    pub fn test_service(&self) {
        self.shared.dispatch(Msg::ServiceProbeRequested);
    }

    pub fn load_search_history(&self) {
        self.shared.dispatch(Msg::HistoryRequested);
    }

    /// Latest published view.
    pub fn view(&self) -> AppViewModel {
        self.view_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppViewModel> {
        self.view_rx.clone()
    }

    /// Waits until the view satisfies `ready`, or gives up after `within`.
    pub async fn wait_until<F>(&self, within: Duration, mut ready: F) -> Option<AppViewModel>
    where
        F: FnMut(&AppViewModel) -> bool,
    {
        let mut rx = self.view_rx.clone();
        let waited = tokio::time::timeout(within, rx.wait_for(|view| ready(view))).await;
        match waited {
            Ok(Ok(view)) => Some(view.clone()),
            _ => None,
        }
    }

    fn validated_key(&self, keyword: &str, location: &str) -> Result<SearchKey, ValidationError> {
        SearchKey::parse(keyword, location).map_err(|err| self.reject(err))
    }

    fn reject(&self, err: ValidationError) -> ValidationError {
        self.shared.dispatch(Msg::InputRejected(err));
        err
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The pump holds the engine alive; aborting it stops polling too.
        self.pump.abort();
    }
}

async fn pump_events(shared: Arc<Shared>, mut events: mpsc::UnboundedReceiver<EngineEvent>) {
    while let Some(event) = events.recv().await {
        shared.dispatch(map_event(event));
    }
}
