//! Envelopes wrapping payloads on the wire.

use serde::{Deserialize, Serialize};

use scout_core::{Business, Pagination};

#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub(crate) data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub(crate) data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageEnvelope {
    #[serde(default)]
    pub(crate) data: Vec<Business>,
    #[serde(default)]
    pub(crate) pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub(crate) struct StartJobBody<'a> {
    pub(crate) keyword: &'a str,
    pub(crate) location: &'a str,
    #[serde(rename = "async")]
    pub(crate) run_async: bool,
}
