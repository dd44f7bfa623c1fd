use scout_core::{
    ApiError, Business, BusinessPage, ExportResult, JobSnapshot, SearchHistoryEntry, SearchKey,
};

/// Outcome of one engine task, reported back to whoever drives the state.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    JobStarted {
        key: SearchKey,
        result: Result<JobSnapshot, ApiError>,
    },
    /// One poll tick of the loop tagged `generation`; `seq` counts ticks from 1.
    StatusChecked {
        key: SearchKey,
        generation: u64,
        seq: u64,
        result: Result<JobSnapshot, ApiError>,
    },
    PageLoaded {
        ticket: u64,
        result: Result<BusinessPage, ApiError>,
    },
    ScopedLoaded {
        ticket: u64,
        key: SearchKey,
        result: Result<Vec<Business>, ApiError>,
    },
    BusinessDeleted {
        id: String,
        result: Result<(), ApiError>,
    },
    ExportFinished(Result<ExportResult, ApiError>),
    ServiceProbed(Result<serde_json::Value, ApiError>),
    HistoryLoaded(Result<Vec<SearchHistoryEntry>, ApiError>),
}
