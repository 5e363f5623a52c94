//! Error types for pinfix-edit.
//!
//! A missing or malformed manifest is terminal for a run. Write failures are
//! kept separate so callers can report them as unexpected.

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file does not exist.
    #[error("manifest not found: {path}")]
    NotFound { path: Utf8PathBuf },

    /// The manifest exists but is not valid JSON.
    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest is valid JSON but its top-level value is not an object.
    #[error("failed to parse manifest {path}: expected a JSON object at the top level")]
    NotAnObject { path: Utf8PathBuf },

    /// Reading or writing the manifest failed for any other reason.
    #[error("manifest i/o error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize manifest {path}: {source}")]
    Serialize {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    /// True for the errors that mean the input itself is unusable.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ManifestError::NotFound { .. }
                | ManifestError::Parse { .. }
                | ManifestError::NotAnObject { .. }
        )
    }
}

/// Result type alias using ManifestError.
pub type ManifestResult<T> = Result<T, ManifestError>;
