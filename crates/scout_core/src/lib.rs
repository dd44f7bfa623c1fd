//! Scout core: pure state machine for driving a remote scrape job and
//! reconciling its result sets. No I/O happens here; `update` turns messages
//! into state changes plus a list of effects for the engine to perform.
mod effect;
mod error;
mod export;
mod job;
mod model;
mod msg;
mod results;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::{ApiError, ApplyOutcome, ValidationError};
pub use export::ExportTracker;
pub use job::{JobStatus, JobStore};
pub use model::{
    Business, BusinessPage, ExportRequest, ExportResult, ExportType, JobSnapshot, PageQuery,
    Pagination, Progress, RemoteJobStatus, SearchHistoryEntry, SearchKey, WebsiteFilter,
    DEFAULT_PAGE_LIMIT,
};
pub use msg::{ErrorDomain, Msg};
pub use results::{select_active, ActiveSet, ResultStore};
pub use state::{AppState, Observation, SearchParams, SessionPhase, SessionPolicy};
pub use update::update;
pub use view_model::{
    AppViewModel, BusinessRow, ExportView, HistoryView, JobView, ProbeView, ResultsView,
};
