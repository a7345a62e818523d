use anyhow::Context;
use bulk_decaffeinate::{CommandConverter, FileSource, Mode, Pipeline, RunContext};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "bulk-decaffeinate",
    version,
    author,
    about = "Batch runner for decaffeinate",
    long_about = "Run the decaffeinate CoffeeScript converter over many files at once.\n\n\
    Files are discovered from explicit --file arguments, a --dir scan, a \
    --path-file list, or a bulk-decaffeinate.json config file in the current \
    directory. Each file is converted independently; failures are collected \
    into decaffeinate-errors.log and decaffeinate-results.json rather than \
    aborting the batch.\n\n\
    USAGE EXAMPLES:\n  \
      # Dry-run every .coffee file under the current directory\n  \
      bulk-decaffeinate check\n\n  \
      # Dry-run a specific tree\n  \
      bulk-decaffeinate check --dir ./src\n\n  \
      # Convert two files in place\n  \
      bulk-decaffeinate convert --file a.coffee --file b.coffee"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dry-run decaffeinate over the worklist without touching any file
    Check(SourceArgs),
    /// Convert the worklist, rewriting each file in place on success
    Convert(SourceArgs),
}

/// Worklist sources; at most one may be given per invocation.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Directory to scan recursively for .coffee files
    #[arg(short, long, value_name = "DIR", conflicts_with_all = ["file", "path_file"])]
    dir: Option<PathBuf>,

    /// File to convert; repeat for multiple files
    #[arg(short, long, value_name = "FILE", conflicts_with = "path_file")]
    file: Vec<PathBuf>,

    /// Text file listing one path per line, resolved relative to the list
    #[arg(long, value_name = "FILE")]
    path_file: Option<PathBuf>,

    /// Path to the decaffeinate binary
    #[arg(long, value_name = "BIN", default_value = "decaffeinate")]
    decaffeinate_path: PathBuf,
}

impl SourceArgs {
    fn source(&self) -> FileSource {
        if !self.file.is_empty() {
            FileSource::Explicit(self.file.clone())
        } else if let Some(dir) = &self.dir {
            FileSource::Dir(dir.clone())
        } else if let Some(path_file) = &self.path_file {
            FileSource::PathFile(path_file.clone())
        } else {
            FileSource::Implicit
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    // Bare invocation shows the help text rather than a usage error.
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .context("Failed to print help")?;
        return Ok(());
    };

    let (mode, args) = match command {
        Commands::Check(args) => (Mode::Check, args),
        Commands::Convert(args) => (Mode::Apply, args),
    };

    let ctx = RunContext::from_process_cwd().context("Failed to determine working directory")?;
    let converter = CommandConverter::new(&args.decaffeinate_path);

    let status = Pipeline::new(ctx, args.source(), mode, converter)
        .run()
        .context("Run failed")?;

    std::process::exit(status.exit_code());
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    // Diagnostics default to warn so a successful run leaves stderr empty.
    let filter = match verbosity {
        0 => EnvFilter::new("bulk_decaffeinate=warn"),
        1 => EnvFilter::new("bulk_decaffeinate=debug"),
        _ => EnvFilter::new("bulk_decaffeinate=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
