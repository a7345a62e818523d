//! Worklist narrowing based on config exclude patterns.
//!
//! Patterns match case-sensitively against the cwd-relative form of each
//! worklist path, either as a glob or as a plain substring. A pattern that
//! matches nothing is not an error, and an empty worklist after filtering is
//! a valid "nothing to do" run.

use crate::{
    config::RunContext,
    error::{Error, Result},
};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::PathBuf;
use tracing::debug;

/// Compiled exclude filter for a run.
#[derive(Debug)]
pub struct ExcludeFilter {
    globs: GlobSet,
    substrings: Vec<String>,
}

impl ExcludeFilter {
    /// Compiles exclude patterns into a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not valid glob syntax.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| Error::config(format!("Invalid exclude pattern '{pattern}': {e}")))?;
            builder.add(glob);
        }
        let globs = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build exclude set: {e}")))?;

        Ok(Self {
            globs,
            substrings: patterns.to_vec(),
        })
    }

    /// Returns true when the path is excluded from the run.
    #[must_use]
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.globs.is_match(relative_path)
            || self
                .substrings
                .iter()
                .any(|pattern| relative_path.contains(pattern.as_str()))
    }

    /// Removes excluded entries from the worklist, preserving order.
    #[must_use]
    pub fn apply(&self, worklist: Vec<PathBuf>, ctx: &RunContext) -> Vec<PathBuf> {
        let before = worklist.len();
        let kept: Vec<PathBuf> = worklist
            .into_iter()
            .filter(|path| !self.is_excluded(&ctx.display_path(path)))
            .collect();

        if kept.len() < before {
            debug!("Excluded {} of {} files", before - kept.len(), before);
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| Path::new("/work").join(n)).collect()
    }

    #[test]
    fn test_no_patterns_keeps_everything() {
        let filter = ExcludeFilter::new(&[]).unwrap();
        let ctx = RunContext::new("/work");
        let kept = filter.apply(paths(&["a.coffee", "b.coffee"]), &ctx);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_glob_pattern_excludes_matches() {
        let filter = ExcludeFilter::new(&["vendor/**".to_string()]).unwrap();
        let ctx = RunContext::new("/work");
        let kept = filter.apply(paths(&["src/a.coffee", "vendor/lib.coffee"]), &ctx);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].ends_with("src/a.coffee"));
    }

    #[test]
    fn test_substring_pattern_excludes_matches() {
        let filter = ExcludeFilter::new(&["legacy".to_string()]).unwrap();
        let ctx = RunContext::new("/work");
        let kept = filter.apply(paths(&["src/legacy-app.coffee", "src/app.coffee"]), &ctx);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].ends_with("src/app.coffee"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let filter = ExcludeFilter::new(&["Vendor".to_string()]).unwrap();
        assert!(!filter.is_excluded("vendor/lib.coffee"));
        assert!(filter.is_excluded("Vendor/lib.coffee"));
    }

    #[test]
    fn test_pattern_matching_nothing_is_not_an_error() {
        let filter = ExcludeFilter::new(&["does-not-exist/**".to_string()]).unwrap();
        let ctx = RunContext::new("/work");
        let kept = filter.apply(paths(&["a.coffee"]), &ctx);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let filter = ExcludeFilter::new(&["**/*.coffee".to_string()]).unwrap();
        let ctx = RunContext::new("/work");
        let kept = filter.apply(paths(&["a.coffee", "b.coffee"]), &ctx);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let err = ExcludeFilter::new(&["a[".to_string()]).unwrap_err();
        assert!(err.is_config());
    }
}
