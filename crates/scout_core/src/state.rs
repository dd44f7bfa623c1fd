use crate::results::{select_active, ActiveSet, ResultStore};
use crate::view_model::{
    AppViewModel, BusinessRow, ExportView, HistoryView, JobView, ProbeView, ResultsView,
};
use crate::{
    ApiError, ExportTracker, JobStatus, JobStore, SearchHistoryEntry, SearchKey, ValidationError,
    DEFAULT_PAGE_LIMIT,
};

/// Caller-tunable behaviour that does not belong to any single store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub page_limit: u32,
    /// Re-fetch the scoped results whenever a status tick reports new records.
    pub refresh_scoped_on_status: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            refresh_scoped_on_status: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Searching,
    Observing,
    Completed,
    Failed,
}

/// The key currently polled, tagged with the generation of its poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub key: SearchKey,
    pub generation: u64,
}

/// Search parameters the result view is scoped to; empty strings mean "none".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchParams {
    pub keyword: String,
    pub location: String,
}

impl SearchParams {
    pub fn key(&self) -> Option<SearchKey> {
        SearchKey::parse(&self.keyword, &self.location).ok()
    }
}

impl From<&SearchKey> for SearchParams {
    fn from(key: &SearchKey) -> Self {
        Self {
            keyword: key.keyword.clone(),
            location: key.location.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Remote<T> {
    pub(crate) value: Option<T>,
    pub(crate) error: Option<ApiError>,
    pub(crate) in_flight: u32,
}

impl<T> Remote<T> {
    pub(crate) fn begin(&mut self) {
        self.in_flight += 1;
        self.error = None;
    }

    pub(crate) fn resolve(&mut self, result: Result<T, ApiError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            Err(err) => self.error = Some(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) policy: SessionPolicy,
    pub(crate) phase: SessionPhase,
    pub(crate) job: JobStore,
    pub(crate) observation: Option<Observation>,
    pub(crate) generation: u64,
    pub(crate) search_params: SearchParams,
    /// Narrows the paginated listing; independent of the scoped search.
    pub(crate) page_filter: Option<SearchKey>,
    pub(crate) results: ResultStore,
    pub(crate) export: ExportTracker,
    pub(crate) history: Remote<Vec<SearchHistoryEntry>>,
    pub(crate) probe: Remote<serde_json::Value>,
    pub(crate) validation_error: Option<ValidationError>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SessionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn job(&self) -> &JobStore {
        &self.job
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    pub fn export(&self) -> &ExportTracker {
        &self.export
    }

    pub fn observation(&self) -> Option<&Observation> {
        self.observation.as_ref()
    }

    pub fn search_params(&self) -> &SearchParams {
        &self.search_params
    }

    pub fn page_filter(&self) -> Option<&SearchKey> {
        self.page_filter.as_ref()
    }

    pub fn active_set(&self) -> ActiveSet {
        select_active(&self.search_params.keyword, &self.search_params.location)
    }

    /// Opens a new poll generation for `key`. Any previous observation must
    /// already have been stopped by the caller.
    pub(crate) fn begin_observation(&mut self, key: SearchKey) -> u64 {
        self.generation += 1;
        self.job.reset_sequence();
        self.observation = Some(Observation {
            key,
            generation: self.generation,
        });
        self.generation
    }

    pub(crate) fn is_current_observation(&self, key: &SearchKey, generation: u64) -> bool {
        self.observation
            .as_ref()
            .is_some_and(|obs| obs.generation == generation && &obs.key == key)
    }

    pub(crate) fn sync_phase_with_job(&mut self) {
        self.phase = match self.job.status() {
            JobStatus::Completed => SessionPhase::Completed,
            JobStatus::Failed => SessionPhase::Failed,
            JobStatus::Running | JobStatus::Idle => SessionPhase::Observing,
        };
    }

    pub fn view(&self) -> AppViewModel {
        let active = self.active_set();
        let current_key = self.search_params.key();
        let (items, title, pagination, error) = match active {
            ActiveSet::Scoped => {
                let shown = self.results.scoped_key() == current_key.as_ref();
                let items = if shown { self.results.scoped() } else { &[][..] };
                let title = format!(
                    "Search Results for \"{}\" in \"{}\"",
                    self.search_params.keyword.trim(),
                    self.search_params.location.trim()
                );
                (items, title, None, self.results.scoped_error().cloned())
            }
            ActiveSet::Paginated => (
                self.results.paginated(),
                "All Businesses".to_string(),
                Some(self.results.pagination()),
                self.results.paginated_error().cloned(),
            ),
        };
        let rows: Vec<BusinessRow> = items
            .iter()
            .map(|business| BusinessRow {
                has_website: business.has_website(),
                deleting: self.results.is_delete_pending(&business.id),
                business: business.clone(),
            })
            .collect();

        AppViewModel {
            phase: self.phase,
            job: self.job.key().map(|key| JobView {
                key: key.clone(),
                status: self.job.status(),
                progress: self.job.progress(),
                percent: self.job.progress().map(|p| p.percent()),
                total_found: self.job.total_found(),
                last_scraped_at: self.job.last_scraped_at(),
                error: self.job.error().cloned(),
                answers: self.job.answers(),
            }),
            observing: self.observation.as_ref().map(|obs| obs.key.clone()),
            results: ResultsView {
                active,
                title,
                count: rows.len(),
                rows,
                show_pager: pagination.is_some_and(|p| p.pages > 1),
                pagination,
                filter: match active {
                    ActiveSet::Paginated => self.page_filter.clone(),
                    ActiveSet::Scoped => None,
                },
                loading: self.results.is_loading(active),
                error,
                delete_error: self.results.delete_error().cloned(),
            },
            export: ExportView {
                is_exporting: self.export.is_exporting(),
                result: self.export.result().cloned(),
                error: self.export.error().cloned(),
            },
            history: HistoryView {
                entries: self.history.value.clone().unwrap_or_default(),
                loading: self.history.in_flight > 0,
                error: self.history.error.clone(),
            },
            probe: ProbeView {
                response: self.probe.value.clone(),
                loading: self.probe.in_flight > 0,
                error: self.probe.error.clone(),
            },
            validation_error: self.validation_error,
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
