use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use scout_core::SearchKey;
use scout_logging::{scout_debug, scout_trace};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, Transport};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

struct ActiveLoop {
    key: SearchKey,
    generation: u64,
    token: CancellationToken,
}

/// Drives periodic status checks for one key at a time.
///
/// Every tick issues its own status call; ticks are neither coalesced nor
/// skipped while earlier calls are outstanding. Each loop owns a cancellation
/// token: stopping cancels the token, which aborts pending calls and drops any
/// result that resolves afterwards.
pub struct Poller {
    transport: Arc<dyn Transport>,
    interval: Duration,
    events: mpsc::UnboundedSender<EngineEvent>,
    active: Mutex<Option<ActiveLoop>>,
}

impl Poller {
    pub fn new(
        transport: Arc<dyn Transport>,
        interval: Duration,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Self {
        Self {
            transport,
            interval,
            events,
            active: Mutex::new(None),
        }
    }

    /// Retargets polling to `key`. The previous loop is cancelled first and
    /// the new loop checks immediately.
    pub fn start_observing(&self, key: SearchKey, generation: u64) {
        let mut active = self.lock();
        if let Some(previous) = active.take() {
            scout_debug!(
                "poller: replacing {} (generation {})",
                previous.key,
                previous.generation
            );
            previous.token.cancel();
        }

        let token = CancellationToken::new();
        scout_debug!("poller: observing {} (generation {})", key, generation);
        tokio::spawn(run_loop(
            self.transport.clone(),
            key.clone(),
            generation,
            self.interval,
            token.clone(),
            self.events.clone(),
        ));
        *active = Some(ActiveLoop {
            key,
            generation,
            token,
        });
    }

    pub fn stop_observing(&self) {
        if let Some(previous) = self.lock().take() {
            scout_debug!(
                "poller: stopped {} (generation {})",
                previous.key,
                previous.generation
            );
            previous.token.cancel();
        }
    }

    /// Key and generation of the running loop, if any.
    pub fn observing(&self) -> Option<(SearchKey, u64)> {
        self.lock()
            .as_ref()
            .map(|active| (active.key.clone(), active.generation))
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveLoop>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop_observing();
    }
}

async fn run_loop(
    transport: Arc<dyn Transport>,
    key: SearchKey,
    generation: u64,
    interval: Duration,
    token: CancellationToken,
    events: mpsc::UnboundedSender<EngineEvent>,
) {
    // The first tick of a tokio interval completes immediately.
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seq = 0u64;
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }
        seq += 1;
        tokio::spawn(tick(
            transport.clone(),
            key.clone(),
            generation,
            seq,
            token.clone(),
            events.clone(),
        ));
    }
    scout_trace!("poller: loop for {} ended after {} ticks", key, seq);
}

async fn tick(
    transport: Arc<dyn Transport>,
    key: SearchKey,
    generation: u64,
    seq: u64,
    token: CancellationToken,
    events: mpsc::UnboundedSender<EngineEvent>,
) {
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        result = transport.job_status(&key) => result,
    };
    if token.is_cancelled() {
        scout_trace!("poller: discarding tick {} for {}", seq, key);
        return;
    }
    let _ = events.send(EngineEvent::StatusChecked {
        key,
        generation,
        seq,
        result,
    });
}
