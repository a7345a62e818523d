//! Console output for a run.
//!
//! All progress and summary lines go to stdout; stderr is reserved for
//! fatal errors so that callers can treat any stderr output as failure.

use crate::{aggregate::RunStatus, runner::Mode};

/// Renders the run's stdout lines.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    mode: Mode,
}

impl Reporter {
    /// Creates a reporter for the given mode.
    #[must_use]
    pub const fn new(mode: Mode) -> Self {
        Self { mode }
    }

    /// Line announcing the run, with the post-filter file count.
    #[must_use]
    pub fn start_line(&self, count: usize) -> String {
        let files = plural_files(count);
        match self.mode {
            Mode::Check => format!("Doing a dry run of decaffeinate on {count} {files}..."),
            Mode::Apply => format!("Running decaffeinate on {count} {files}..."),
        }
    }

    /// Summary line for a finished run.
    #[must_use]
    pub fn summary_line(&self, status: &RunStatus) -> String {
        match status {
            RunStatus::NothingToDo => "No files found to process.".to_string(),
            RunStatus::AllSucceeded { .. } => match self.mode {
                Mode::Check => "All checks succeeded".to_string(),
                Mode::Apply => "All conversions succeeded".to_string(),
            },
            RunStatus::PartiallyFailed { failed, .. } => {
                format!("{failed} {} failed to convert", plural_files(*failed))
            }
        }
    }

    /// Prints the start line for a non-empty worklist.
    pub fn report_start(&self, count: usize) {
        println!("{}", self.start_line(count));
    }

    /// Prints the summary line.
    pub fn report_summary(&self, status: &RunStatus) {
        println!("{}", self.summary_line(status));
    }
}

const fn plural_files(count: usize) -> &'static str {
    if count == 1 {
        "file"
    } else {
        "files"
    }
}
