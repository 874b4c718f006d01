//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod doctor;
mod ingest;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use ingest::run_ingest;

use crate::app::App;
use crate::backend::HttpBackend;
use crate::config::Settings;
use std::sync::Arc;

/// Build an app talking to the configured backend.
fn connect(settings: &Settings) -> crate::error::Result<App> {
    let backend = HttpBackend::from_settings(settings)?;
    Ok(App::new(Arc::new(backend)))
}
