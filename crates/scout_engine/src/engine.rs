use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use scout_core::{ExportRequest, PageQuery, SearchKey};
use tokio::sync::mpsc;

use crate::poller::Poller;
use crate::{EngineEvent, Transport};

/// Runs remote operations as independent tasks and reports each outcome as
/// an [`EngineEvent`]. Must be created inside a Tokio runtime.
pub struct EngineHandle {
    transport: Arc<dyn Transport>,
    poller: Poller,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineHandle {
    pub fn new(
        transport: Arc<dyn Transport>,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let poller = Poller::new(transport.clone(), poll_interval, event_tx.clone());
        let handle = Self {
            transport,
            poller,
            event_tx,
        };
        (handle, event_rx)
    }

    pub fn start_job(&self, key: SearchKey) {
        self.spawn(move |transport| async move {
            let result = transport.start_job(&key).await;
            EngineEvent::JobStarted { key, result }
        });
    }

    pub fn start_observing(&self, key: SearchKey, generation: u64) {
        self.poller.start_observing(key, generation);
    }

    pub fn stop_observing(&self) {
        self.poller.stop_observing();
    }

    pub fn load_page(&self, ticket: u64, query: PageQuery) {
        self.spawn(move |transport| async move {
            let result = transport.list_businesses(&query).await;
            EngineEvent::PageLoaded { ticket, result }
        });
    }

    pub fn load_scoped(&self, ticket: u64, key: SearchKey) {
        self.spawn(move |transport| async move {
            let result = transport.search_businesses(&key).await;
            EngineEvent::ScopedLoaded {
                ticket,
                key,
                result,
            }
        });
    }

    pub fn delete_business(&self, id: String) {
        self.spawn(move |transport| async move {
            let result = transport.delete_business(&id).await;
            EngineEvent::BusinessDeleted { id, result }
        });
    }

    pub fn export(&self, request: ExportRequest) {
        self.spawn(move |transport| async move {
            EngineEvent::ExportFinished(transport.export_businesses(&request).await)
        });
    }

    pub fn probe(&self) {
        self.spawn(|transport| async move { EngineEvent::ServiceProbed(transport.probe().await) });
    }

    pub fn load_history(&self) {
        self.spawn(|transport| async move {
            EngineEvent::HistoryLoaded(transport.search_history().await)
        });
    }

    fn spawn<F, Fut>(&self, job: F)
    where
        F: FnOnce(Arc<dyn Transport>) -> Fut,
        Fut: Future<Output = EngineEvent> + Send + 'static,
    {
        let event_tx = self.event_tx.clone();
        let pending = job(self.transport.clone());
        tokio::spawn(async move {
            let _ = event_tx.send(pending.await);
        });
    }
}
