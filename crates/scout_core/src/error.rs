use thiserror::Error;

/// Failure of a single call to the remote API.
///
/// Stored verbatim in the per-domain error fields of the state, so it must be
/// cheap to clone and comparable in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received (connect failure, reset, timeout).
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("http status {status}")]
    HttpStatus { status: u16 },
    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Missing or invalid user input, surfaced before any network call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please enter a keyword")]
    MissingKeyword,
    #[error("please enter a location")]
    MissingLocation,
    #[error("page numbers start at 1")]
    InvalidPage,
    #[error("exporting search results needs both keyword and location")]
    SearchExportWithoutKey,
}

/// Result of offering a response to a store that may already have moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The response belonged to an abandoned key, generation or ticket and was dropped.
    Stale,
}

impl ApplyOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }
}
