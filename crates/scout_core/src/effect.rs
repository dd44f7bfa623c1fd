use crate::{ExportRequest, PageQuery, SearchKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartJob { key: SearchKey },
    /// Begin polling `key`; responses must carry `generation` back.
    StartObserving { key: SearchKey, generation: u64 },
    /// Cancel the running poll loop and the effect of its in-flight ticks.
    StopObserving,
    LoadPage { ticket: u64, query: PageQuery },
    LoadScoped { ticket: u64, key: SearchKey },
    DeleteBusiness { id: String },
    Export { request: ExportRequest },
    ProbeService,
    LoadHistory,
}
