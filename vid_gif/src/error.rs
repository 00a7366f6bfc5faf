use crate::outcome::BatchOutcome;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that affect the whole batch rather than one file.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to prepare directory {}: {source}", path.display())]
    DirectorySetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Output directory {} is not writable: {source} ({} of the batch completed)",
        path.display(),
        completed.total()
    )]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        /// Jobs finished before the directory became unusable
        completed: BatchOutcome,
    },

    #[error("Batch worker panicked")]
    WorkerPanicked,
}

impl BatchError {
    /// Partial results, when the batch got that far.
    pub fn completed(&self) -> Option<&BatchOutcome> {
        match self {
            BatchError::OutputUnavailable { completed, .. } => Some(completed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_unavailable_message() {
        let err = BatchError::OutputUnavailable {
            path: PathBuf::from("/out"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            completed: BatchOutcome::new(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/out"));
        assert!(msg.contains("read-only"));
        assert!(err.completed().is_some());
    }

    #[test]
    fn test_setup_error_has_source() {
        use std::error::Error as _;
        let err = BatchError::DirectorySetup {
            path: PathBuf::from("/in"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        };
        assert!(err.source().is_some());
        assert!(err.completed().is_none());
    }
}
