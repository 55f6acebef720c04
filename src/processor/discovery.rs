//! Input discovery
//!
//! Expands command line inputs into the list of bulletin files to decode.
//! An input may be a file, a directory (walked recursively) or a glob
//! pattern.

use crate::error::{Result, SynopError};
use glob::Pattern;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

fn is_glob(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

fn compile_pattern(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| SynopError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// True when the file name matches the optional pattern
fn matches_file_name(path: &Path, pattern: Option<&Pattern>) -> bool {
    match pattern {
        Some(pattern) => path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| pattern.matches(name)),
        None => true,
    }
}

/// All regular files below `dir` whose name matches `pattern`
fn walk_directory(dir: &Path, pattern: Option<&Pattern>) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| matches_file_name(path, pattern))
        .collect()
}

/// Files matching a glob pattern
fn expand_glob(input: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(input).map_err(|e| SynopError::Pattern {
        pattern: input.to_string(),
        reason: e.to_string(),
    })?;

    Ok(paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable glob match: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect())
}

/// Expand inputs into a sorted, de-duplicated list of files.
///
/// `pattern` filters the files found inside directories; files named
/// explicitly are always kept.
pub fn discover_inputs(inputs: &[PathBuf], pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = pattern.map(compile_pattern).transpose()?;
    let mut files = BTreeSet::new();

    for input in inputs {
        if input.is_file() {
            files.insert(input.clone());
        } else if input.is_dir() {
            let found = walk_directory(input, pattern.as_ref());
            debug!("Found {} files in {}", found.len(), input.display());
            files.extend(found);
        } else if let Some(text) = input.to_str().filter(|s| is_glob(s)) {
            let found = expand_glob(text)?;
            debug!("Pattern {} matched {} files", text, found.len());
            files.extend(found);
        } else {
            return Err(SynopError::InputNotFound {
                path: input.clone(),
            });
        }
    }

    Ok(files.into_iter().collect())
}
