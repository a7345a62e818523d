use crate::{
    config::RunContext,
    runner::{ConversionOutcome, OutcomeError},
};
use serde::Serialize;

/// How a finished run is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The worklist was empty after filtering; neither success nor failure.
    NothingToDo,
    /// Every outcome succeeded.
    AllSucceeded {
        /// Number of files processed
        total: usize,
    },
    /// At least one outcome failed.
    PartiallyFailed {
        /// Number of files processed
        total: usize,
        /// Number of failed files
        failed: usize,
    },
}

impl RunStatus {
    /// Process exit code for this status: zero unless a file failed.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NothingToDo | Self::AllSucceeded { .. } => 0,
            Self::PartiallyFailed { .. } => 1,
        }
    }
}

/// One entry of the results record, serialized in worklist order.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEntry {
    /// Path relative to the run's working directory
    pub path: String,
    /// `null` on success, structured error on failure
    pub error: Option<OutcomeError>,
}

/// Classifies a finished run from its outcomes.
#[must_use]
pub fn classify(outcomes: &[ConversionOutcome]) -> RunStatus {
    if outcomes.is_empty() {
        return RunStatus::NothingToDo;
    }
    let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
    if failed == 0 {
        RunStatus::AllSucceeded {
            total: outcomes.len(),
        }
    } else {
        RunStatus::PartiallyFailed {
            total: outcomes.len(),
            failed,
        }
    }
}

/// Builds the serializable results record, one entry per outcome in order.
#[must_use]
pub fn result_entries(outcomes: &[ConversionOutcome], ctx: &RunContext) -> Vec<ResultEntry> {
    outcomes
        .iter()
        .map(|outcome| ResultEntry {
            path: ctx.display_path(&outcome.path),
            error: outcome.error.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FailureKind;
    use std::path::PathBuf;

    fn success(path: &str) -> ConversionOutcome {
        ConversionOutcome {
            path: PathBuf::from(path),
            error: None,
        }
    }

    fn failure(path: &str, message: &str) -> ConversionOutcome {
        ConversionOutcome {
            path: PathBuf::from(path),
            error: Some(OutcomeError::new(FailureKind::Command, message)),
        }
    }

    #[test]
    fn test_classify_empty_is_nothing_to_do() {
        assert_eq!(classify(&[]), RunStatus::NothingToDo);
        assert_eq!(RunStatus::NothingToDo.exit_code(), 0);
    }

    #[test]
    fn test_classify_all_succeeded() {
        let status = classify(&[success("/w/a.coffee"), success("/w/b.coffee")]);
        assert_eq!(status, RunStatus::AllSucceeded { total: 2 });
        assert_eq!(status.exit_code(), 0);
    }

    #[test]
    fn test_classify_partial_failure() {
        let status = classify(&[failure("/w/a.coffee", "boom"), success("/w/b.coffee")]);
        assert_eq!(
            status,
            RunStatus::PartiallyFailed {
                total: 2,
                failed: 1
            }
        );
        assert_eq!(status.exit_code(), 1);
    }

    #[test]
    fn test_result_entries_mirror_outcome_order() {
        let ctx = RunContext::new("/w");
        let outcomes = vec![failure("/w/error.coffee", "boom"), success("/w/ok.coffee")];
        let entries = result_entries(&outcomes, &ctx);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "error.coffee");
        assert!(entries[0].error.is_some());
        assert_eq!(entries[1].path, "ok.coffee");
        assert!(entries[1].error.is_none());
    }

    #[test]
    fn test_result_entry_json_shape() {
        let ctx = RunContext::new("/w");
        let entries = result_entries(&[failure("/w/a.coffee", "bad indent")], &ctx);
        let json = serde_json::to_value(&entries).unwrap();

        assert_eq!(json[0]["path"], "a.coffee");
        assert_eq!(json[0]["error"]["kind"], "command");
        assert_eq!(json[0]["error"]["message"], "bad indent");
    }

    #[test]
    fn test_success_serializes_error_as_null() {
        let ctx = RunContext::new("/w");
        let entries = result_entries(&[success("/w/a.coffee")], &ctx);
        let json = serde_json::to_value(&entries).unwrap();

        assert!(json[0]["error"].is_null());
    }
}
