//! # bulk-decaffeinate
//!
//! A batch runner for the `decaffeinate` CoffeeScript converter.
//!
//! ## Features
//!
//! - Worklist discovery from explicit files, a directory scan, a path-list
//!   file, or a declarative config file
//! - Include/exclude filtering with glob patterns
//! - Per-file failure isolation: one broken file never aborts the batch
//! - Machine-readable artifacts (results JSON, successful-files list,
//!   error log) replaced atomically on every run
//!
//! ## Quick Start
//!
//! ```no_run
//! use bulk_decaffeinate::{
//!     CommandConverter, FileSource, Mode, Pipeline, RunContext,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = RunContext::from_process_cwd()?;
//! let pipeline = Pipeline::new(
//!     ctx,
//!     FileSource::Dir("./src".into()),
//!     Mode::Check,
//!     CommandConverter::new("decaffeinate"),
//! );
//! let status = pipeline.run()?;
//! std::process::exit(status.exit_code());
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a pipeline architecture:
//! 1. **Resolver**: Builds a deduplicated, deterministically ordered worklist
//! 2. **Filter**: Applies config exclude patterns
//! 3. **Runner**: Invokes the converter per file, capturing outcomes
//! 4. **Aggregator**: Classifies the run and shapes the results record
//! 5. **Writer/Reporter**: Persists artifacts and prints the summary

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic
)]
#![allow(clippy::module_name_repetitions)]

mod aggregate;
mod config;
mod error;
mod filter;
mod pipeline;
mod report;
mod resolver;
mod runner;
mod writer;

pub use aggregate::{classify, result_entries, ResultEntry, RunStatus};
pub use config::{Config, RunContext, CONFIG_FILE_NAME};
pub use error::{Error, Result};
pub use filter::ExcludeFilter;
pub use pipeline::Pipeline;
pub use report::Reporter;
pub use resolver::{resolve, scan_dir, FileSource, SOURCE_EXTENSION};
pub use runner::{
    CommandConverter, ConversionOutcome, ConversionRunner, Converter, FailureKind, Mode,
    OutcomeError,
};
pub use writer::{ArtifactWriter, ERROR_LOG_FILE, RESULTS_FILE, SUCCESS_FILE};

/// Runs a complete batch with the external decaffeinate binary.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if:
/// - The config file exists but cannot be parsed
/// - A named input path does not exist
/// - An artifact cannot be written
pub fn run(
    ctx: RunContext,
    source: FileSource,
    mode: Mode,
    decaffeinate_path: impl Into<std::path::PathBuf>,
) -> Result<RunStatus> {
    Pipeline::new(ctx, source, mode, CommandConverter::new(decaffeinate_path)).run()
}
