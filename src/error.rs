use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures surfaced by title extraction.
///
/// An empty result is not an error: "no title" is reported as `Ok(None)`.
#[derive(Debug, Error)]
pub enum TitleError {
    #[error("PDF file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("error processing PDF {}: {source:#}", .path.display())]
    Processing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl TitleError {
    pub fn not_found(path: &Path) -> Self {
        Self::NotFound {
            path: path.to_path_buf(),
        }
    }

    pub fn processing(path: &Path, source: anyhow::Error) -> Self {
        Self::Processing {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
