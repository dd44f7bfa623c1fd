use chrono::{DateTime, Utc};

use crate::{
    ActiveSet, ApiError, Business, ExportResult, JobStatus, Pagination, Progress,
    SearchHistoryEntry, SearchKey, SessionPhase, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: SessionPhase,
    pub job: Option<JobView>,
    pub observing: Option<SearchKey>,
    pub results: ResultsView,
    pub export: ExportView,
    pub history: HistoryView,
    pub probe: ProbeView,
    pub validation_error: Option<ValidationError>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobView {
    pub key: SearchKey,
    pub status: JobStatus,
    pub progress: Option<Progress>,
    pub percent: Option<u8>,
    pub total_found: u64,
    pub last_scraped_at: Option<DateTime<Utc>>,
    pub error: Option<ApiError>,
    pub answers: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub active: ActiveSet,
    pub title: String,
    pub rows: Vec<BusinessRow>,
    pub count: usize,
    /// Present only while the paginated set is active.
    pub pagination: Option<Pagination>,
    /// Filter applied to the paginated listing, if any.
    pub filter: Option<SearchKey>,
    pub show_pager: bool,
    pub loading: bool,
    pub error: Option<ApiError>,
    pub delete_error: Option<(String, ApiError)>,
}

impl Default for ResultsView {
    fn default() -> Self {
        Self {
            active: ActiveSet::Paginated,
            title: String::new(),
            rows: Vec::new(),
            count: 0,
            pagination: None,
            filter: None,
            show_pager: false,
            loading: false,
            error: None,
            delete_error: None,
        }
    }
}

impl ResultsView {
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.business.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusinessRow {
    pub business: Business,
    pub has_website: bool,
    pub deleting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportView {
    pub is_exporting: bool,
    pub result: Option<ExportResult>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryView {
    pub entries: Vec<SearchHistoryEntry>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbeView {
    pub response: Option<serde_json::Value>,
    pub loading: bool,
    pub error: Option<ApiError>,
}
