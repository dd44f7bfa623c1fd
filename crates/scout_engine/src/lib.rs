//! Scout engine: talks to the remote scraping service and runs the poll loop.
mod engine;
mod poller;
mod transport;
mod types;
mod wire;

pub use engine::EngineHandle;
pub use poller::{Poller, DEFAULT_POLL_INTERVAL};
pub use transport::{ApiSettings, ReqwestTransport, SetupError, Transport, DEFAULT_API_URL};
pub use types::EngineEvent;
