use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// A discovered input video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = shared_utils::file_name_lossy(&path);
        Self { path, file_name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem with its original bytes; may not be valid UTF-8.
    pub fn stem(&self) -> &OsStr {
        self.path.file_stem().unwrap_or_default()
    }

    pub fn extension(&self) -> String {
        shared_utils::get_extension_lowercase(&self.path)
    }
}

/// Result of one job. `detail` is the GIF path on success, otherwise
/// `"<source file name>: <reason>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub source_file_name: String,
    pub succeeded: bool,
    pub detail: String,
}

impl ConversionResult {
    pub fn success(source_file_name: &str, destination: &Path) -> Self {
        Self {
            source_file_name: source_file_name.to_string(),
            succeeded: true,
            detail: destination.display().to_string(),
        }
    }

    pub fn failure(source_file_name: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            source_file_name: source_file_name.to_string(),
            succeeded: false,
            detail: format!("{}: {}", source_file_name, reason),
        }
    }
}

/// Tally of one batch run; results stay in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<ConversionResult>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: ConversionResult) {
        if result.succeeded {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| !r.succeeded)
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count == 0
    }

    /// Percentage of succeeded jobs; an empty batch counts as 100%.
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            100.0
        } else {
            (self.success_count as f64 / self.total() as f64) * 100.0
        }
    }
}
