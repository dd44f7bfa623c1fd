use crate::{ApiError, ExportRequest, ExportResult};

/// Tracks the one export treated as current.
///
/// Requests are not correlated: starting a second export takes over the
/// tracking state, and whichever response resolves last decides the shown
/// outcome. `is_exporting` drops as soon as any response lands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportTracker {
    is_exporting: bool,
    last_request: Option<ExportRequest>,
    result: Option<ExportResult>,
    error: Option<ApiError>,
}

impl ExportTracker {
    pub fn is_exporting(&self) -> bool {
        self.is_exporting
    }

    pub fn last_request(&self) -> Option<&ExportRequest> {
        self.last_request.as_ref()
    }

    pub fn result(&self) -> Option<&ExportResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn begin(&mut self, request: ExportRequest) {
        self.is_exporting = true;
        self.last_request = Some(request);
        self.error = None;
    }

    pub fn resolve(&mut self, result: Result<ExportResult, ApiError>) {
        self.is_exporting = false;
        match result {
            Ok(done) => {
                self.result = Some(done);
                self.error = None;
            }
            Err(err) => self.error = Some(err),
        }
    }

    pub fn clear_result(&mut self) {
        self.result = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
