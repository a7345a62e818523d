use crate::{
    aggregate::ResultEntry,
    error::{Error, Result},
};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Results record: ordered JSON array, one entry per worklist file.
pub const RESULTS_FILE: &str = "decaffeinate-results.json";
/// Newline-joined list of files that converted cleanly.
pub const SUCCESS_FILE: &str = "decaffeinate-successful-files.txt";
/// Delimited per-file error blocks; only present when something failed.
pub const ERROR_LOG_FILE: &str = "decaffeinate-errors.log";

/// Delimiter opening each block in the error log.
const ERROR_DELIMITER: &str = "=====";

/// Writes the run artifacts into the run's working directory.
///
/// Each artifact is replaced as a whole file via tmp-write plus rename, so a
/// reader never sees output of a previous run mixed with new data.
pub struct ArtifactWriter {
    out_dir: PathBuf,
}

impl ArtifactWriter {
    /// Creates a writer targeting the given directory.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Writes all three artifacts for the given result entries.
    ///
    /// The results record and successful-files list are written on every
    /// run, even when empty. The error log is written only when failures
    /// exist; a stale log from an earlier run is removed otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any file operation fails.
    pub fn write_all(&self, entries: &[ResultEntry]) -> Result<()> {
        self.write_results(entries)?;
        self.write_successful_files(entries)?;
        self.write_error_log(entries)?;
        Ok(())
    }

    fn write_results(&self, entries: &[ResultEntry]) -> Result<()> {
        let path = self.out_dir.join(RESULTS_FILE);
        let json = serde_json::to_string_pretty(entries)?;
        self.write_file_atomic(&path, &json)?;
        debug!("Wrote {} result entries to {}", entries.len(), path.display());
        Ok(())
    }

    fn write_successful_files(&self, entries: &[ResultEntry]) -> Result<()> {
        let path = self.out_dir.join(SUCCESS_FILE);
        let successes: Vec<&str> = entries
            .iter()
            .filter(|e| e.error.is_none())
            .map(|e| e.path.as_str())
            .collect();

        let mut content = successes.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        self.write_file_atomic(&path, &content)
    }

    fn write_error_log(&self, entries: &[ResultEntry]) -> Result<()> {
        let path = self.out_dir.join(ERROR_LOG_FILE);
        let failures: Vec<&ResultEntry> = entries.iter().filter(|e| e.error.is_some()).collect();

        if failures.is_empty() {
            // The log's absence is meaningful; a leftover from a previous
            // run must not survive a clean one.
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed stale {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(&path, e)),
            }
            return Ok(());
        }

        let mut content = String::new();
        for entry in failures {
            let message = entry.error.as_ref().map_or("", |e| e.message.as_str());
            content.push_str(&format!("{ERROR_DELIMITER} {}\n{message}\n\n", entry.path));
        }
        self.write_file_atomic(&path, &content)
    }

    /// Writes content to a temporary file, syncs it, and renames it over the
    /// target path.
    fn write_file_atomic(&self, path: &Path, content: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;
        drop(temp_file);

        fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{FailureKind, OutcomeError};
    use assert_fs::prelude::*;

    fn success(path: &str) -> ResultEntry {
        ResultEntry {
            path: path.to_string(),
            error: None,
        }
    }

    fn failure(path: &str, message: &str) -> ResultEntry {
        ResultEntry {
            path: path.to_string(),
            error: Some(OutcomeError::new(FailureKind::Command, message)),
        }
    }

    #[test]
    fn test_results_record_written_even_on_full_success() {
        let temp = assert_fs::TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp.path());

        writer.write_all(&[success("a.coffee")]).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(temp.child(RESULTS_FILE).path()).unwrap())
                .unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert!(json[0]["error"].is_null());
    }

    #[test]
    fn test_results_record_written_for_empty_run() {
        let temp = assert_fs::TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp.path());

        writer.write_all(&[]).unwrap();

        temp.child(RESULTS_FILE).assert("[]");
        temp.child(SUCCESS_FILE).assert("");
        assert!(!temp.child(ERROR_LOG_FILE).exists());
    }

    #[test]
    fn test_successful_files_in_worklist_order() {
        let temp = assert_fs::TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp.path());

        writer
            .write_all(&[
                success("b.coffee"),
                failure("error.coffee", "boom"),
                success("a.coffee"),
            ])
            .unwrap();

        temp.child(SUCCESS_FILE).assert("b.coffee\na.coffee\n");
    }

    #[test]
    fn test_error_log_contains_delimited_blocks() {
        let temp = assert_fs::TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp.path());

        writer
            .write_all(&[failure("src/error.coffee", "unexpected indent")])
            .unwrap();

        let log = fs::read_to_string(temp.child(ERROR_LOG_FILE).path()).unwrap();
        assert!(log.contains("===== src/error.coffee"));
        assert!(log.contains("unexpected indent"));
    }

    #[test]
    fn test_stale_error_log_removed_on_clean_run() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child(ERROR_LOG_FILE).write_str("old failure").unwrap();

        let writer = ArtifactWriter::new(temp.path());
        writer.write_all(&[success("a.coffee")]).unwrap();

        assert!(!temp.child(ERROR_LOG_FILE).exists());
    }

    #[test]
    fn test_artifacts_fully_replace_previous_run() {
        let temp = assert_fs::TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp.path());

        writer
            .write_all(&[success("old-a.coffee"), success("old-b.coffee")])
            .unwrap();
        writer.write_all(&[success("new.coffee")]).unwrap();

        let list = fs::read_to_string(temp.child(SUCCESS_FILE).path()).unwrap();
        assert_eq!(list, "new.coffee\n");
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(temp.child(RESULTS_FILE).path()).unwrap())
                .unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
    }
}
