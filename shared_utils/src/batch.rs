//! Batch file collection
//!
//! Flat (non-recursive) scans of a source directory, filtered by extension and
//! sorted by file name so repeated runs see the same order.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Video containers accepted as batch input.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "flv", "wmv", "webm", "m4v"];

/// Regular files directly inside `dir` whose extension is in `extensions`
/// (case-insensitive), sorted by file name.
///
/// Symlinks are followed, so a link to a video counts as a file. A missing or
/// unreadable directory yields an empty list.
pub fn collect_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| crate::common_utils::has_extension(e.path(), extensions))
        .map(|e| e.into_path())
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}
