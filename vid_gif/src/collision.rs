//! Output name collisions
//!
//! `clip.mp4` and `clip.mov` both map to `clip.gif`. Within one batch the
//! first successful job owns a destination; what later jobs do is chosen by
//! [`CollisionPolicy`].

use crate::outcome::SourceFile;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub const GIF_EXTENSION: &str = "gif";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CollisionPolicy {
    /// Later files get `<stem>_<ext>.gif` (then `_2`, `_3`, ...)
    #[default]
    Rename,
    /// Later files fail without writing anything
    Fail,
    /// Later files replace the earlier GIF
    Overwrite,
}

/// Where a job should write, or why it must not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Write(PathBuf),
    Taken { path: PathBuf, claimed_by: String },
}

/// Destinations produced so far in one batch run.
#[derive(Debug, Default)]
pub struct DestinationClaims {
    claims: HashMap<PathBuf, String>,
}

/// `<output_dir>/<stem>.gif`, keeping the stem's bytes as they are.
pub fn default_destination(output_dir: &Path, file: &SourceFile) -> PathBuf {
    output_dir.join(gif_name(file.stem(), ""))
}

/// `<stem><tail>.gif`
fn gif_name(stem: &OsStr, tail: &str) -> OsString {
    let mut name = stem.to_os_string();
    name.push(tail);
    name.push(".");
    name.push(GIF_EXTENSION);
    name
}

impl DestinationClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self, output_dir: &Path, file: &SourceFile, policy: CollisionPolicy) -> Destination {
        let natural = default_destination(output_dir, file);
        let Some(owner) = self.claims.get(&natural) else {
            return Destination::Write(natural);
        };

        match policy {
            CollisionPolicy::Overwrite => {
                tracing::warn!(
                    destination = %natural.display(),
                    previous = %owner,
                    source = %file.file_name,
                    "Overwriting GIF produced earlier in this batch"
                );
                Destination::Write(natural)
            }
            CollisionPolicy::Fail => Destination::Taken {
                path: natural,
                claimed_by: owner.clone(),
            },
            CollisionPolicy::Rename => Destination::Write(self.free_name(output_dir, file)),
        }
    }

    fn free_name(&self, output_dir: &Path, file: &SourceFile) -> PathBuf {
        let base = format!("_{}", file.extension());
        let mut candidate = output_dir.join(gif_name(file.stem(), &base));
        let mut n = 2;
        while self.claims.contains_key(&candidate) {
            candidate = output_dir.join(gif_name(file.stem(), &format!("{}_{}", base, n)));
            n += 1;
        }
        candidate
    }

    pub fn claim(&mut self, destination: PathBuf, source_file_name: &str) {
        self.claims.insert(destination, source_file_name.to_string());
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn out() -> PathBuf {
        PathBuf::from("/out")
    }

    #[test]
    fn test_unclaimed_uses_stem() {
        let claims = DestinationClaims::new();
        let file = SourceFile::new("/in/a.mp4");
        assert_eq!(
            claims.plan(&out(), &file, CollisionPolicy::Fail),
            Destination::Write(PathBuf::from("/out/a.gif"))
        );
    }

    #[test]
    fn test_rename_appends_extension_then_counter() {
        let mut claims = DestinationClaims::new();
        claims.claim(PathBuf::from("/out/clip.gif"), "clip.mov");

        let mp4 = SourceFile::new("/in/clip.mp4");
        assert_eq!(
            claims.plan(&out(), &mp4, CollisionPolicy::Rename),
            Destination::Write(PathBuf::from("/out/clip_mp4.gif"))
        );

        claims.claim(PathBuf::from("/out/clip_mp4.gif"), "clip.mp4");
        let upper = SourceFile::new("/in/clip.MP4");
        assert_eq!(
            claims.plan(&out(), &upper, CollisionPolicy::Rename),
            Destination::Write(PathBuf::from("/out/clip_mp4_2.gif"))
        );
    }

    #[test]
    fn test_fail_reports_owner() {
        let mut claims = DestinationClaims::new();
        claims.claim(PathBuf::from("/out/clip.gif"), "clip.mov");
        let file = SourceFile::new("/in/clip.mp4");
        assert_eq!(
            claims.plan(&out(), &file, CollisionPolicy::Fail),
            Destination::Taken {
                path: PathBuf::from("/out/clip.gif"),
                claimed_by: "clip.mov".to_string()
            }
        );
    }

    #[test]
    fn test_overwrite_keeps_natural_name() {
        let mut claims = DestinationClaims::new();
        claims.claim(PathBuf::from("/out/clip.gif"), "clip.mov");
        let file = SourceFile::new("/in/clip.mp4");
        assert_eq!(
            claims.plan(&out(), &file, CollisionPolicy::Overwrite),
            Destination::Write(PathBuf::from("/out/clip.gif"))
        );
    }

    #[test]
    fn test_destination_keeps_dotted_stem() {
        let claims = DestinationClaims::new();
        let file = SourceFile::new("/in/trip.day1.mkv");
        assert_eq!(
            claims.plan(&out(), &file, CollisionPolicy::Rename),
            Destination::Write(PathBuf::from("/out/trip.day1.gif"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_stem_survives() {
        use std::os::unix::ffi::OsStrExt;

        let file = SourceFile::new(Path::new(OsStr::from_bytes(b"/in/caf\xE9.mp4")));
        let dest = default_destination(&out(), &file);
        assert_eq!(dest.as_os_str().as_bytes(), b"/out/caf\xE9.gif");

        let mut claims = DestinationClaims::new();
        claims.claim(dest, "caf\u{FFFD}.mov");
        match claims.plan(&out(), &file, CollisionPolicy::Rename) {
            Destination::Write(renamed) => {
                assert_eq!(renamed.as_os_str().as_bytes(), b"/out/caf\xE9_mp4.gif")
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
