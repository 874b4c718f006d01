//! File selection for uploads.

use crate::config::IngestSettings;
use crate::config::Settings;
use std::path::PathBuf;
use tracing::debug;

/// Files picked for the next upload, in the order they were chosen.
///
/// The selection is consumed by one upload attempt and cleared afterwards so
/// the same files can be picked again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    files: Vec<PathBuf>,
}

impl FileSelection {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    /// Build a selection from user-supplied paths.
    ///
    /// `~` is expanded. Paths whose extension is not accepted are left out,
    /// the way a picker with an `accept` filter would not offer them, and are
    /// returned separately.
    pub fn pick<S: AsRef<str>>(paths: &[S], ingest: &IngestSettings) -> (Self, Vec<PathBuf>) {
        let mut files = Vec::new();
        let mut skipped = Vec::new();

        for raw in paths {
            let path = Settings::expand_path(raw.as_ref());
            if ingest.accepts(&path) {
                files.push(path);
            } else {
                debug!("Skipping {}: unsupported file type", path.display());
                skipped.push(path);
            }
        }

        (Self { files }, skipped)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Reset the selection.
    pub fn clear(&mut self) {
        self.files.clear();
    }
}
