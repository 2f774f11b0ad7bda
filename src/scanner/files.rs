// src/scanner/files.rs
// =============================================================================
// This module decides which files get scanned, and reads them.
//
// Two modes, mirroring the CLI:
// - Default: every target is a single file, scanned directly
// - Recursive (-r): every target is a directory, walked for *.md files
//
// Mixing the modes up (a directory without -r, a file with -r) is a usage
// error that stops the run before any scanning happens.
//
// Rust concepts:
// - PathBuf vs &Path: owned vs borrowed filesystem paths
// - Option as a "skip this one" signal
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// Validates the target/flag combination before anything else runs
//
// Returns the one-line diagnostic to print when the combination is wrong,
// or None when the run may proceed.
pub fn check_usage(targets: &[PathBuf], recursive: bool) -> Option<String> {
    if !recursive && targets.iter().any(|t| t.is_dir()) {
        return Some("mdfresh: cannot validate a directory without the -r flag".to_string());
    }
    if recursive && targets.iter().any(|t| t.is_file()) {
        return Some("mdfresh: remove the -r flag to validate files directly".to_string());
    }
    None
}

// Expands the CLI targets into the list of files to scan
//
// Non-recursive mode passes the targets through untouched. Recursive mode
// walks each target directory and keeps every file whose name ends in .md,
// case-insensitively (README.MD counts).
pub fn collect_target_files(targets: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    if !recursive {
        return targets.to_vec();
    }

    let mut files = Vec::new();
    for target in targets {
        // Walk errors (permission denied, dangling symlinks) are skipped;
        // a file we cannot even stat contributes no findings
        for entry in WalkDir::new(target).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && is_markdown(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files
}

fn is_markdown(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_lowercase().ends_with(".md"))
        .unwrap_or(false)
}

// Reads one file as UTF-8 text
//
// Files that cannot be read or decoded are skipped silently - they simply
// contribute zero findings, which is not an error.
pub fn read_markdown(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}
