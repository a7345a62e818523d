use crate::{
    aggregate::{classify, result_entries, RunStatus},
    config::{Config, RunContext},
    error::Result,
    filter::ExcludeFilter,
    report::Reporter,
    resolver::{self, FileSource},
    runner::{ConversionRunner, Converter, Mode},
    writer::ArtifactWriter,
};
use tracing::{debug, info, instrument};

/// Orchestrates one run: resolve, filter, convert, aggregate, write, report.
pub struct Pipeline<C> {
    ctx: RunContext,
    source: FileSource,
    mode: Mode,
    converter: C,
}

impl<C: Converter> Pipeline<C> {
    /// Creates a pipeline for one run invocation.
    pub fn new(ctx: RunContext, source: FileSource, mode: Mode, converter: C) -> Self {
        Self {
            ctx,
            source,
            mode,
            converter,
        }
    }

    /// Executes the run and returns its classification.
    ///
    /// Only resolution and artifact-write failures terminate early; a
    /// per-file conversion failure is recorded in the outcomes and surfaced
    /// through the artifacts and the returned status.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded, a named input path
    /// does not exist, or an artifact cannot be written.
    #[instrument(skip(self), fields(cwd = %self.ctx.cwd.display()))]
    pub fn run(self) -> Result<RunStatus> {
        // Config is discovered only when no source was given on the CLI.
        let config = match self.source {
            FileSource::Implicit => Config::load(&self.ctx.cwd)?,
            _ => None,
        };

        let mut worklist = resolver::resolve(&self.source, &self.ctx, config.as_ref())?;

        if let Some(config) = &config {
            if !config.excludes().is_empty() {
                let filter = ExcludeFilter::new(config.excludes())?;
                worklist = filter.apply(worklist, &self.ctx);
            }
        }

        let reporter = Reporter::new(self.mode);
        let writer = ArtifactWriter::new(&self.ctx.cwd);

        if worklist.is_empty() {
            debug!("Worklist is empty after filtering");
            writer.write_all(&[])?;
            let status = RunStatus::NothingToDo;
            reporter.report_summary(&status);
            return Ok(status);
        }

        reporter.report_start(worklist.len());

        let runner = ConversionRunner::new(self.converter, self.mode);
        let outcomes = runner.run_all(&worklist);
        debug_assert_eq!(outcomes.len(), worklist.len());

        let status = classify(&outcomes);
        let entries = result_entries(&outcomes, &self.ctx);
        writer.write_all(&entries)?;

        info!(
            "Run finished: {} files, {} failed",
            outcomes.len(),
            outcomes.iter().filter(|o| !o.succeeded()).count()
        );

        reporter.report_summary(&status);
        Ok(status)
    }
}
