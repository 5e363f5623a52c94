//! Error types for the pin pipeline.
//!
//! Two tiers:
//! - Fatal (exit code 1): manifest missing, manifest malformed, unexpected errors.
//! - Recoverable (exit code 0): a version-control step failed after the
//!   manifest was already rewritten.

use camino::Utf8PathBuf;
use pinfix_edit::ManifestError;
use pinfix_types::outcome::PublishStep;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PinError {
    #[error("manifest not found: {path}")]
    ManifestNotFound { path: Utf8PathBuf },

    #[error("{0}")]
    ManifestParseError(#[source] ManifestError),

    /// Logged and reported; never fails the run.
    #[error("version control {0}")]
    VersionControlStepFailed(#[from] StepFailure),

    #[error("{0:#}")]
    UnexpectedError(#[from] anyhow::Error),
}

impl PinError {
    /// Returns true if this error must fail the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PinError::VersionControlStepFailed(_))
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_fatal() { 1 } else { 0 }
    }
}

impl From<ManifestError> for PinError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::NotFound { path } => PinError::ManifestNotFound { path },
            ManifestError::Parse { .. } | ManifestError::NotAnObject { .. } => {
                PinError::ManifestParseError(err)
            }
            other => PinError::UnexpectedError(anyhow::Error::new(other)),
        }
    }
}

/// A version-control step that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{step} failed: {message}")]
pub struct StepFailure {
    pub step: PublishStep,
    pub message: String,
}

/// Failure to run an external program.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("`{program}` not found on PATH")]
    NotFound { program: String },

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program} {args}` exited with {status}: {stderr}")]
    Exit {
        program: String,
        args: String,
        status: String,
        stderr: String,
    },
}

impl CommandError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CommandError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_errors_are_fatal() {
        let err = PinError::from(ManifestError::NotFound {
            path: Utf8PathBuf::from("package.json"),
        });
        assert!(matches!(err, PinError::ManifestNotFound { .. }));
        assert_eq!(err.exit_code(), 1);

        let err = PinError::from(ManifestError::NotAnObject {
            path: Utf8PathBuf::from("package.json"),
        });
        assert!(matches!(err, PinError::ManifestParseError(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn io_errors_become_unexpected() {
        let err = PinError::from(ManifestError::Io {
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert!(matches!(err, PinError::UnexpectedError(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn step_failure_is_not_fatal() {
        let err = PinError::from(StepFailure {
            step: PublishStep::Push,
            message: "no remote".to_string(),
        });
        assert!(!err.is_fatal());
        assert_eq!(err.exit_code(), 0);
        assert!(err.to_string().contains("step 5 (push) failed: no remote"));
    }

    #[test]
    fn exit_error_display_includes_status() {
        let err = CommandError::Exit {
            program: "git".to_string(),
            args: "push -u origin pinfix".to_string(),
            status: "exit status: 128".to_string(),
            stderr: "fatal: 'origin' does not appear to be a git repository".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("git push -u origin pinfix"));
        assert!(s.contains("exit status: 128"));
        assert!(!err.is_not_found());
    }
}
