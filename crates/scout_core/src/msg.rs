use crate::{
    ApiError, Business, BusinessPage, ExportRequest, ExportResult, JobSnapshot,
    SearchHistoryEntry, SearchKey, ValidationError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted a new search; starts a scrape job for the key.
    SearchSubmitted(SearchKey),
    /// The start-job call for `key` resolved.
    JobStartResolved {
        key: SearchKey,
        result: Result<JobSnapshot, ApiError>,
    },
    /// User asked for the status of `key` without starting a job.
    StatusCheckRequested(SearchKey),
    /// One poll tick resolved.
    StatusChecked {
        key: SearchKey,
        generation: u64,
        seq: u64,
        result: Result<JobSnapshot, ApiError>,
    },
    /// Stop polling but keep the job on screen.
    StopObservingRequested,
    /// Stop polling and forget the tracked job.
    StatusDismissed,
    /// Drop the search scope and go back to the global listing.
    SearchCleared,
    /// Reload whichever result set is active.
    ResultsRequested,
    PageRequested(u32),
    /// Sets or clears the listing filter and reloads from page 1.
    PageFilterChanged(Option<SearchKey>),
    NextPageRequested,
    PreviousPageRequested,
    PageLoaded {
        ticket: u64,
        result: Result<BusinessPage, ApiError>,
    },
    ScopedLoaded {
        ticket: u64,
        key: SearchKey,
        result: Result<Vec<Business>, ApiError>,
    },
    DeleteRequested(String),
    DeleteResolved {
        id: String,
        result: Result<(), ApiError>,
    },
    ExportRequested(ExportRequest),
    ExportResolved(Result<ExportResult, ApiError>),
    ExportResultDismissed,
    ServiceProbeRequested,
    ServiceProbed(Result<serde_json::Value, ApiError>),
    HistoryRequested,
    HistoryLoaded(Result<Vec<SearchHistoryEntry>, ApiError>),
    /// Input failed validation before reaching the network.
    InputRejected(ValidationError),
    ErrorsDismissed(ErrorDomain),
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDomain {
    Job,
    Results,
    Export,
    History,
    Probe,
    Validation,
}
