use scout_logging::scout_debug;

use crate::state::SearchParams;
use crate::{
    ActiveSet, AppState, Effect, ErrorDomain, Msg, PageQuery, SearchKey, SessionPhase,
    ValidationError,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SearchSubmitted(key) => {
            // The old loop is stopped in the same update that retargets the
            // job, so no tick of the old key can land on the new one.
            let mut effects = stop_current_observation(&mut state);
            state.job.record_job_started(key.clone());
            state.phase = SessionPhase::Searching;
            state.validation_error = None;
            state.mark_dirty();
            effects.push(Effect::StartJob { key });
            effects
        }
        Msg::JobStartResolved { key, result } => {
            if state.phase != SessionPhase::Searching || state.job.key() != Some(&key) {
                scout_debug!("dropping start-job response for {}", key);
                return (state, Vec::new());
            }
            match result {
                Ok(snapshot) => {
                    state.job.record_status(&key, 0, snapshot);
                }
                Err(err) => {
                    state.job.record_failure(&key, 0, err);
                }
            }
            let mut effects = observe(&mut state, key);
            state.sync_phase_with_job();
            effects.extend(load_active(&mut state));
            effects
        }
        Msg::StatusCheckRequested(key) => {
            let mut effects = stop_current_observation(&mut state);
            if state.job.key() != Some(&key) {
                state.job.record_job_started(key.clone());
            }
            state.validation_error = None;
            effects.extend(observe(&mut state, key));
            state.phase = SessionPhase::Observing;
            effects.extend(load_active(&mut state));
            effects
        }
        Msg::StatusChecked {
            key,
            generation,
            seq,
            result,
        } => {
            if !state.is_current_observation(&key, generation) {
                scout_debug!(
                    "dropping status for {} generation={} seq={}",
                    key,
                    generation,
                    seq
                );
                return (state, Vec::new());
            }
            let found_before = state.job.total_found();
            let outcome = match result {
                Ok(snapshot) => state.job.record_status(&key, seq, snapshot),
                Err(err) => state.job.record_failure(&key, seq, err),
            };
            if !outcome.is_applied() {
                return (state, Vec::new());
            }
            state.sync_phase_with_job();
            state.mark_dirty();

            let grew = state.job.total_found() != found_before;
            let shows_key = state.search_params.key().as_ref() == Some(&key);
            if grew && shows_key && state.policy.refresh_scoped_on_status {
                let ticket = state.results.begin_scoped_load();
                vec![Effect::LoadScoped { ticket, key }]
            } else {
                Vec::new()
            }
        }
        Msg::StopObservingRequested => stop_current_observation(&mut state),
        Msg::StatusDismissed => {
            let effects = stop_current_observation(&mut state);
            state.job.clear();
            state.phase = SessionPhase::Idle;
            state.mark_dirty();
            effects
        }
        Msg::SearchCleared => {
            state.search_params = SearchParams::default();
            state.mark_dirty();
            load_active(&mut state)
        }
        Msg::ResultsRequested => load_active(&mut state),
        Msg::PageRequested(page) => {
            if page == 0 {
                state.validation_error = Some(ValidationError::InvalidPage);
                state.mark_dirty();
                Vec::new()
            } else {
                vec![load_page(&mut state, page)]
            }
        }
        Msg::PageFilterChanged(filter) => {
            state.page_filter = filter;
            vec![load_page(&mut state, 1)]
        }
        Msg::NextPageRequested => {
            let pagination = state.results.pagination();
            if pagination.has_next() {
                vec![load_page(&mut state, pagination.page + 1)]
            } else {
                Vec::new()
            }
        }
        Msg::PreviousPageRequested => {
            let pagination = state.results.pagination();
            if pagination.has_previous() {
                vec![load_page(&mut state, pagination.page - 1)]
            } else {
                Vec::new()
            }
        }
        Msg::PageLoaded { ticket, result } => {
            state.results.load_paginated(ticket, result);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ScopedLoaded {
            ticket,
            key,
            result,
        } => {
            let current = state.search_params.key();
            state
                .results
                .load_scoped(ticket, &key, current.as_ref(), result);
            state.mark_dirty();
            Vec::new()
        }
        Msg::DeleteRequested(id) => {
            // Unknown or already-pending ids are a no-op, which makes a repeated
            // delete of the same record harmless.
            if !state.results.contains(&id) || state.results.is_delete_pending(&id) {
                return (state, Vec::new());
            }
            state.results.begin_delete(&id);
            state.mark_dirty();
            vec![Effect::DeleteBusiness { id }]
        }
        Msg::DeleteResolved { id, result } => {
            state.results.finish_delete(&id, result);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExportRequested(request) => {
            state.export.begin(request.clone());
            state.validation_error = None;
            state.mark_dirty();
            vec![Effect::Export { request }]
        }
        Msg::ExportResolved(result) => {
            state.export.resolve(result);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExportResultDismissed => {
            state.export.clear_result();
            state.mark_dirty();
            Vec::new()
        }
        Msg::ServiceProbeRequested => {
            state.probe.begin();
            state.mark_dirty();
            vec![Effect::ProbeService]
        }
        Msg::ServiceProbed(result) => {
            state.probe.resolve(result);
            state.mark_dirty();
            Vec::new()
        }
        Msg::HistoryRequested => {
            state.history.begin();
            state.mark_dirty();
            vec![Effect::LoadHistory]
        }
        Msg::HistoryLoaded(result) => {
            state.history.resolve(result);
            state.mark_dirty();
            Vec::new()
        }
        Msg::InputRejected(err) => {
            state.validation_error = Some(err);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ErrorsDismissed(domain) => {
            match domain {
                ErrorDomain::Job => state.job.clear_error(),
                ErrorDomain::Results => state.results.clear_errors(),
                ErrorDomain::Export => state.export.clear_error(),
                ErrorDomain::History => state.history.error = None,
                ErrorDomain::Probe => state.probe.error = None,
                ErrorDomain::Validation => state.validation_error = None,
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn stop_current_observation(state: &mut AppState) -> Vec<Effect> {
    if state.observation.take().is_some() {
        state.mark_dirty();
        vec![Effect::StopObserving]
    } else {
        Vec::new()
    }
}

/// Starts observing `key` and scopes the result view to it.
fn observe(state: &mut AppState, key: SearchKey) -> Vec<Effect> {
    state.search_params = SearchParams::from(&key);
    let generation = state.begin_observation(key.clone());
    state.mark_dirty();
    vec![Effect::StartObserving { key, generation }]
}

fn load_active(state: &mut AppState) -> Vec<Effect> {
    match (state.active_set(), state.search_params.key()) {
        (ActiveSet::Scoped, Some(key)) => {
            let ticket = state.results.begin_scoped_load();
            state.mark_dirty();
            vec![Effect::LoadScoped { ticket, key }]
        }
        _ => {
            let page = state.results.pagination().page.max(1);
            vec![load_page(state, page)]
        }
    }
}

fn load_page(state: &mut AppState, page: u32) -> Effect {
    let ticket = state.results.begin_paginated_load();
    state.validation_error = None;
    state.mark_dirty();
    Effect::LoadPage {
        ticket,
        query: PageQuery {
            page,
            limit: state.policy.page_limit,
            filter: state.page_filter.clone(),
        },
    }
}
