//! Expansion of input arguments into the list of files to format

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

/// VHDL file extensions picked up from directories
const VHDL_EXTENSIONS: &[&str] = &["vhd", "vhdl", "vho", "vht"];

/// Check if a file has a VHDL extension (case-insensitive)
#[must_use]
pub fn is_vhdl_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| VHDL_EXTENSIONS.iter().any(|v| v.eq_ignore_ascii_case(ext)))
}

/// Check if a path matches any exclusion pattern
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let path_str = path.to_string_lossy();

    patterns.iter().any(|pattern| {
        // Full path, then file name, then each component (directory patterns)
        pattern.matches(&path_str)
            || path
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
            || path.components().any(|component| match component {
                std::path::Component::Normal(c) => pattern.matches(&c.to_string_lossy()),
                _ => false,
            })
    })
}

/// Collect the files to process, in argument order
///
/// Directories are expanded to the VHDL files they contain (recursively when
/// `recursive` is set), sorted by path. Any other argument is kept as given,
/// even if it does not exist, so the job for it can report the failure.
#[must_use]
pub fn collect_files(inputs: &[PathBuf], recursive: bool, exclude: &[String]) -> Vec<PathBuf> {
    let exclude_patterns: Vec<Pattern> = exclude
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::warn!("ignoring invalid exclude pattern {p:?}: {e}");
                None
            }
        })
        .collect();

    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            if !is_excluded(input, &exclude_patterns) {
                files.push(input.clone());
            }
            continue;
        }

        let mut found: Vec<PathBuf> = if recursive {
            // follow_links detects symlink loops; those entries are skipped
            WalkDir::new(input)
                .follow_links(true)
                .max_depth(256)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .map(walkdir::DirEntry::into_path)
                .filter(|path| path.is_file())
                .collect()
        } else {
            match std::fs::read_dir(input) {
                Ok(entries) => entries
                    .filter_map(std::result::Result::ok)
                    .map(|entry| entry.path())
                    .filter(|path| path.is_file())
                    .collect(),
                Err(e) => {
                    tracing::warn!("could not list {}: {e}", input.display());
                    Vec::new()
                }
            }
        };

        found.retain(|path| is_vhdl_file(path) && !is_excluded(path, &exclude_patterns));
        found.sort();
        files.extend(found);
    }

    files
}
