//! Transcoding engine seam
//!
//! The pipeline never talks to ffmpeg directly. It decodes a source into a
//! [`FrameSource`], optionally resizes it, and asks the engine to encode it.
//! Tests swap in a recording engine; production uses
//! [`crate::ffmpeg_engine::FfmpegEngine`].

use crate::quality::QualityProfile;
use shared_utils::Result;
use std::path::Path;

/// A decoded (or at least opened) video.
///
/// Whatever the handle holds (temporary files, child resources) is released
/// in `Drop`, so every exit path of a job frees it, including early returns
/// on error.
pub trait FrameSource {
    /// Current output dimensions, after any resize.
    fn dimensions(&self) -> (u32, u32);

    /// Scale both dimensions by `factor` before frames are resampled.
    fn resize(&mut self, factor: f64) -> Result<()>;
}

pub trait TranscodeEngine {
    type Source: FrameSource;

    /// Opens `path`. Fails for unreadable or undecodable input.
    fn decode(&self, path: &Path) -> Result<Self::Source>;

    /// Writes `source` as an animated GIF at `destination` using the profile's
    /// frame rate, palette size and optimize flag.
    fn encode(
        &self,
        source: &mut Self::Source,
        profile: &QualityProfile,
        destination: &Path,
    ) -> Result<()>;
}
