use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Conversion mode for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Dry run: converter outcomes are reported, no file is mutated.
    Check,
    /// Source files are rewritten in place on success.
    Apply,
}

/// Broad classification of a per-file conversion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The converter binary could not be started.
    Spawn,
    /// The converter ran and reported failure for this file.
    Command,
    /// Writing the converted output back failed.
    Io,
}

/// Structured error attached to a failed conversion outcome.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeError {
    /// Failure classification
    pub kind: FailureKind,
    /// Converter-provided (or IO) message
    pub message: String,
}

impl OutcomeError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Per-file result of one conversion attempt. `error == None` is success.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// Absolute path of the attempted file
    pub path: PathBuf,
    /// Populated when the conversion failed
    pub error: Option<OutcomeError>,
}

impl ConversionOutcome {
    /// Returns true when the conversion succeeded.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// The opaque per-file converter seam.
///
/// Implementations report failure through the return value; they are trusted
/// not to panic. In [`Mode::Check`] an implementation must not mutate the
/// file regardless of outcome.
pub trait Converter {
    /// Attempts to convert a single file.
    fn convert(&self, path: &Path, mode: Mode) -> std::result::Result<(), OutcomeError>;
}

/// Converter that shells out to the external decaffeinate binary.
///
/// The binary is invoked once per file with the file path as its argument
/// and the converted source expected on stdout. A non-zero exit reports the
/// captured stderr as the failure message.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: PathBuf,
}

impl CommandConverter {
    /// Creates a converter around the given binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Converter for CommandConverter {
    fn convert(&self, path: &Path, mode: Mode) -> std::result::Result<(), OutcomeError> {
        let output = Command::new(&self.program)
            .arg(path)
            .output()
            .map_err(|e| {
                OutcomeError::new(
                    FailureKind::Spawn,
                    format!("failed to run '{}': {}", self.program.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim();
            let message = if message.is_empty() {
                format!("converter exited with {}", output.status)
            } else {
                message.to_string()
            };
            return Err(OutcomeError::new(FailureKind::Command, message));
        }

        if mode == Mode::Apply {
            fs::write(path, &output.stdout)
                .map_err(|e| OutcomeError::new(FailureKind::Io, e.to_string()))?;
        }

        Ok(())
    }
}

/// Drives the converter over the worklist with isolated failure handling.
pub struct ConversionRunner<C> {
    converter: C,
    mode: Mode,
}

impl<C: Converter> ConversionRunner<C> {
    /// Creates a runner for the given converter and mode.
    pub fn new(converter: C, mode: Mode) -> Self {
        Self { converter, mode }
    }

    /// Attempts one file; a converter failure becomes a populated outcome,
    /// never a propagated error.
    pub fn run_one(&self, path: &Path) -> ConversionOutcome {
        debug!("Converting {}", path.display());
        let error = self.converter.convert(path, self.mode).err();
        ConversionOutcome {
            path: path.to_path_buf(),
            error,
        }
    }

    /// Runs every worklist entry independently, in order.
    ///
    /// The returned vector mirrors the worklist: one outcome per entry, in
    /// the same order, regardless of individual failures.
    pub fn run_all(&self, worklist: &[PathBuf]) -> Vec<ConversionOutcome> {
        worklist.iter().map(|path| self.run_one(path)).collect()
    }
}
