//! Scout application layer: session facade, config and command line.
pub mod cli;
pub mod config;
mod effects;
pub mod logging;
mod session;

pub use config::{ConfigError, ScoutConfig, API_URL_ENV, CONFIG_FILENAME};
pub use session::Session;
