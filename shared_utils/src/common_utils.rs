//! Common file and path helpers.

use anyhow::{Context, Result};
use std::path::Path;

/// Lowercase extension without the dot, or an empty string.
///
/// ```
/// use std::path::Path;
/// use shared_utils::common_utils::get_extension_lowercase;
///
/// assert_eq!(get_extension_lowercase(Path::new("clip.MP4")), "mp4");
/// assert_eq!(get_extension_lowercase(Path::new("noext")), "");
/// ```
pub fn get_extension_lowercase(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Case-insensitive extension check; `extensions` are given without dots.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = get_extension_lowercase(path);
    !ext.is_empty() && extensions.contains(&ext.as_str())
}

/// Final path component as a (lossy) string.
pub fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `create_dir_all` with the directory in the error context. Existing directories are fine.
pub fn ensure_dir_exists(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_has_extension_case_insensitive() {
        let exts = &["mp4", "mkv"];
        assert!(has_extension(Path::new("a.MP4"), exts));
        assert!(has_extension(Path::new("b.mkv"), exts));
        assert!(!has_extension(Path::new("notes.txt"), exts));
        assert!(!has_extension(Path::new("mp4"), exts));
    }

    #[test]
    fn test_file_name_lossy() {
        let p = Path::new("/videos/holiday.clip.mov");
        assert_eq!(file_name_lossy(p), "holiday.clip.mov");
    }

    #[test]
    fn test_ensure_dir_exists_nested_and_idempotent() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b").join("c");
        ensure_dir_exists(&nested).unwrap();
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_ensure_dir_exists_fails_on_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let err = ensure_dir_exists(&file.join("child")).unwrap_err();
        assert!(err.to_string().contains("Failed to create directory"));
    }
}
