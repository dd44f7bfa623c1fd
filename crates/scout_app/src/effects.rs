use scout_core::{Effect, Msg};
use scout_engine::{EngineEvent, EngineHandle};
use scout_logging::{scout_debug, scout_info, scout_warn};

/// Performs core effects on the engine.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Runs effects in order. Every engine call only spawns or cancels work,
    /// so this never blocks.
    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartJob { key } => {
                    scout_info!("StartJob {}", key);
                    self.engine.start_job(key);
                }
                Effect::StartObserving { key, generation } => {
                    scout_info!("StartObserving {} generation={}", key, generation);
                    self.engine.start_observing(key, generation);
                }
                Effect::StopObserving => {
                    scout_info!("StopObserving");
                    self.engine.stop_observing();
                }
                Effect::LoadPage { ticket, query } => {
                    scout_debug!(
                        "LoadPage ticket={} page={} limit={}",
                        ticket,
                        query.page,
                        query.limit
                    );
                    self.engine.load_page(ticket, query);
                }
                Effect::LoadScoped { ticket, key } => {
                    scout_debug!("LoadScoped ticket={} {}", ticket, key);
                    self.engine.load_scoped(ticket, key);
                }
                Effect::DeleteBusiness { id } => {
                    scout_info!("DeleteBusiness id={}", id);
                    self.engine.delete_business(id);
                }
                Effect::Export { request } => {
                    scout_info!("Export type={:?}", request.export_type);
                    self.engine.export(request);
                }
                Effect::ProbeService => self.engine.probe(),
                Effect::LoadHistory => self.engine.load_history(),
            }
        }
    }
}

/// Translates an engine outcome into the message the core understands.
pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::JobStarted { key, result } => {
            if let Err(err) = &result {
                scout_warn!("starting job {} failed: {}", key, err);
            }
            Msg::JobStartResolved { key, result }
        }
        EngineEvent::StatusChecked {
            key,
            generation,
            seq,
            result,
        } => Msg::StatusChecked {
            key,
            generation,
            seq,
            result,
        },
        EngineEvent::PageLoaded { ticket, result } => Msg::PageLoaded { ticket, result },
        EngineEvent::ScopedLoaded {
            ticket,
            key,
            result,
        } => Msg::ScopedLoaded {
            ticket,
            key,
            result,
        },
        EngineEvent::BusinessDeleted { id, result } => {
            if let Err(err) = &result {
                scout_warn!("deleting {} failed: {}", id, err);
            }
            Msg::DeleteResolved { id, result }
        }
        EngineEvent::ExportFinished(result) => Msg::ExportResolved(result),
        EngineEvent::ServiceProbed(result) => Msg::ServiceProbed(result),
        EngineEvent::HistoryLoaded(result) => Msg::HistoryLoaded(result),
    }
}
