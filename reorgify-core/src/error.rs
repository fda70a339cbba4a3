use std::path::PathBuf;
use thiserror::Error;

/// Whole-run failures.
///
/// A `FatalError` aborts a run before any filesystem mutation and surfaces as
/// the sole response. Per-item problems (permission denied, a source that
/// vanished mid-run, an unexpected entry type) are never raised through this
/// type; they are recorded in the run report and its failure tallies.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("no valid source paths")]
    NoValidSources,

    #[error("no target path specified")]
    MissingTarget,

    #[error("nothing to do: resolved plan is empty")]
    EmptyPlan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_error_messages() {
        let err = FatalError::RootNotFound(PathBuf::from("/no/such/dir"));
        assert_eq!(err.to_string(), "path does not exist: /no/such/dir");

        assert_eq!(
            FatalError::EmptyPlan.to_string(),
            "nothing to do: resolved plan is empty"
        );
    }
}
