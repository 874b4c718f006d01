//! Pre-flight checks before talking to the backend.
//!
//! Validates configuration up front so a bad setting is reported as such
//! instead of surfacing as a generic request failure.

use crate::config::Settings;
use crate::error::{RagdeskError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Asking questions requires a valid server URL.
    Ask,
    /// Uploading also requires at least one accepted file type.
    Ingest,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    settings.base_url()?;
    match operation {
        Operation::Ask => {}
        Operation::Ingest => check_extensions(settings)?,
    }
    Ok(())
}

/// At least one accepted extension must be non-empty once its dot is trimmed.
pub(crate) fn check_extensions(settings: &Settings) -> Result<()> {
    let usable = settings
        .ingest
        .accepted_extensions
        .iter()
        .any(|ext| !ext.trim_start_matches('.').is_empty());
    if usable {
        Ok(())
    } else {
        Err(RagdeskError::Config(
            "ingest.accepted_extensions is empty; no file could be uploaded".to_string(),
        ))
    }
}
