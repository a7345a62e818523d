use crate::{
    config::{Config, RunContext},
    error::{Error, Result},
};
use globset::{Glob, GlobSetBuilder};
use ignore::{WalkBuilder, WalkState};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Extension of files eligible for conversion.
pub const SOURCE_EXTENSION: &str = "coffee";

/// Where the worklist comes from, selected once at the start of a run.
///
/// The CLI guarantees at most one source flag is given, so a run never has to
/// re-inspect which options were set.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Explicit file list, used verbatim in the given order.
    Explicit(Vec<PathBuf>),
    /// Recursive scan of a directory for convertible files.
    Dir(PathBuf),
    /// Text file listing one path per line.
    PathFile(PathBuf),
    /// No source given: config file in the working directory if present,
    /// otherwise a scan of the working directory.
    Implicit,
}

/// Resolves a [`FileSource`] into the run's worklist.
///
/// The result is an ordered list of absolute paths, deduplicated by
/// canonical path with the first occurrence preserved.
///
/// # Errors
///
/// Returns [`Error::Resolution`] when an explicitly named file, a path-file
/// entry, or a config-referenced literal path does not exist.
pub fn resolve(source: &FileSource, ctx: &RunContext, config: Option<&Config>) -> Result<Vec<PathBuf>> {
    let raw = match source {
        FileSource::Explicit(files) => resolve_explicit(files, ctx)?,
        FileSource::Dir(dir) => scan_dir(&ctx.absolutize(dir))?,
        FileSource::PathFile(path) => read_path_file(&ctx.absolutize(path))?,
        FileSource::Implicit => resolve_implicit(ctx, config)?,
    };

    Ok(dedupe(raw))
}

fn resolve_explicit(files: &[PathBuf], ctx: &RunContext) -> Result<Vec<PathBuf>> {
    let mut resolved = Vec::with_capacity(files.len());
    for file in files {
        let path = ctx.absolutize(file);
        if !path.is_file() {
            return Err(Error::resolution(file.clone()));
        }
        resolved.push(path);
    }
    Ok(resolved)
}

fn resolve_implicit(ctx: &RunContext, config: Option<&Config>) -> Result<Vec<PathBuf>> {
    if let Some(config) = config {
        if let Some(patterns) = &config.files_to_process {
            return expand_patterns(patterns, ctx);
        }
        if let Some(path_file) = &config.path_file {
            return read_path_file(&ctx.absolutize(path_file));
        }
    }
    scan_dir(&ctx.cwd)
}

/// Recursively enumerates convertible files under `root`, sorted by path.
///
/// VCS metadata and ignore rules are handled by the walker's standard
/// filters; `node_modules` trees are pruned explicitly. Walking is parallel,
/// so results are sorted afterwards for a deterministic worklist.
pub fn scan_dir(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::resolution(root));
    }

    let files = Arc::new(Mutex::new(Vec::new()));
    let files_clone = Arc::clone(&files);

    debug!("Scanning {} for .{} files", root.display(), SOURCE_EXTENSION);

    let walker = WalkBuilder::new(root)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .hidden(true)
        .follow_links(false)
        .skip_stdout(true)
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .threads(num_cpus::get())
        .build_parallel();

    walker.run(|| {
        let files = Arc::clone(&files_clone);
        Box::new(move |result| {
            if let Ok(entry) = result {
                let path = entry.path();
                if entry.file_type().is_some_and(|ft| ft.is_file())
                    && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
                {
                    files.lock().unwrap().push(path.to_path_buf());
                }
            }
            WalkState::Continue
        })
    });

    let mut files = Arc::try_unwrap(files)
        .map(|m| m.into_inner().unwrap())
        .unwrap_or_else(|arc| arc.lock().unwrap().clone());

    files.sort();

    debug!("Found {} convertible files", files.len());
    Ok(files)
}

/// Reads a path-list file: one path per line, blank lines ignored, entries
/// resolved relative to the path-file's own directory.
fn read_path_file(path_file: &Path) -> Result<Vec<PathBuf>> {
    let content = fs::read_to_string(path_file).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::resolution(path_file)
        } else {
            Error::io(path_file, e)
        }
    })?;
    let base = path_file.parent().unwrap_or_else(|| Path::new("."));

    let mut files = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry = Path::new(line);
        let path = if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            base.join(entry)
        };
        if !path.is_file() {
            return Err(Error::resolution(path));
        }
        files.push(path);
    }
    Ok(files)
}

/// Expands the config's `filesToProcess` entries.
///
/// An entry naming an existing file is used verbatim; an entry with glob
/// metacharacters is matched against a scan of the working directory; any
/// other entry is a missing literal path and fails resolution.
fn expand_patterns(patterns: &[String], ctx: &RunContext) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut scanned: Option<Vec<PathBuf>> = None;

    for pattern in patterns {
        let literal = ctx.absolutize(Path::new(pattern));
        if literal.is_file() {
            files.push(literal);
            continue;
        }

        if !is_glob(pattern) {
            return Err(Error::resolution(pattern));
        }

        let glob = Glob::new(pattern)
            .map_err(|e| Error::config(format!("Invalid glob pattern '{pattern}': {e}")))?;
        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        let set = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build glob set: {e}")))?;

        if scanned.is_none() {
            scanned = Some(scan_dir(&ctx.cwd)?);
        }
        for candidate in scanned.as_ref().unwrap() {
            let relative = ctx.display_path(candidate);
            if set.is_match(&relative) {
                files.push(candidate.clone());
            }
        }
    }

    Ok(files)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// Collapses the raw ordered list to unique canonical paths, preserving the
/// first occurrence of each file.
fn dedupe(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(files.len());
    for file in files {
        let key = fs::canonicalize(&file).unwrap_or_else(|_| file.clone());
        if seen.insert(key) {
            unique.push(file);
        }
    }
    unique
}
