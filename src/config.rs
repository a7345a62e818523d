use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the declarative config file, looked up in the run's working
/// directory when no source is given on the command line.
pub const CONFIG_FILE_NAME: &str = "bulk-decaffeinate.json";

/// Declarative run configuration.
///
/// Loaded once at the start of a run and read-only thereafter. All keys are
/// optional; an absent config file is not an error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Files or glob patterns to process instead of scanning the directory.
    pub files_to_process: Option<Vec<String>>,

    /// Glob or substring patterns; matching files are dropped from the
    /// worklist.
    pub excludes: Option<Vec<String>>,

    /// Path-list file to read the worklist from, one path per line.
    pub path_file: Option<PathBuf>,
}

impl Config {
    /// Loads the config file from `dir`, returning `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;

        debug!("Loaded config from {}", path.display());
        Ok(Some(config))
    }

    /// Returns the exclude patterns, or an empty slice when unset.
    #[must_use]
    pub fn excludes(&self) -> &[String] {
        self.excludes.as_deref().unwrap_or(&[])
    }
}

/// Explicit per-run context.
///
/// The working directory is threaded through resolution, filtering, and
/// artifact writing rather than looked up ambiently, so a run is fully
/// described by its context value.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Directory paths are resolved against and artifacts are written to.
    pub cwd: PathBuf,
}

impl RunContext {
    /// Creates a context rooted at the given working directory.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Creates a context rooted at the process working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn from_process_cwd() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(PathBuf::from("."), e))?;
        Ok(Self::new(cwd))
    }

    /// Resolves a possibly-relative path against the run's working directory.
    #[must_use]
    pub fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Renders a worklist path relative to the run's working directory, the
    /// form used in artifacts and console output.
    #[must_use]
    pub fn display_path(&self, path: &Path) -> String {
        pathdiff::diff_paths(path, &self.cwd)
            .unwrap_or_else(|| path.to_path_buf())
            .to_string_lossy()
            .to_string()
    }
}
