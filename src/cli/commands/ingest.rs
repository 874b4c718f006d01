//! Ingest command implementation.

use super::connect;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::picker::FileSelection;
use crate::view::PROCESSING_NOTICE;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(files: &[String], settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'ragdesk doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let (mut selection, skipped) = FileSelection::pick(files, &settings.ingest);
    for path in &skipped {
        Output::warning(&format!(
            "Skipping {}: only {} files are accepted",
            path.display(),
            settings.ingest.accepted_extensions.join(", ")
        ));
    }

    let app = connect(&settings)?;

    let spinner = Output::spinner(PROCESSING_NOTICE);
    let notice = app.handle_upload(&mut selection).await;
    spinner.finish_and_clear();

    match notice {
        Some(notice) => {
            Output::notice(&notice);
            if notice.is_success() {
                Ok(())
            } else {
                anyhow::bail!("upload failed")
            }
        }
        None => {
            Output::warning("No files to upload.");
            Ok(())
        }
    }
}
