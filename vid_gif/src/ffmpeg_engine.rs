//! ffmpeg-backed engine
//!
//! Decoding is an ffprobe pass that validates the input and records its
//! geometry. Encoding is the two-pass palette GIF encode: `palettegen` builds
//! a palette PNG sized to the profile, `paletteuse` maps the frames onto it.
//! The GIF is written to a hidden temporary file in the destination directory
//! and renamed into place, so a failed encode never leaves a half-written GIF
//! behind. Scratch names are short and independent of the source name.

use crate::engine::{FrameSource, TranscodeEngine};
use crate::quality::QualityProfile;
use shared_utils::{safe_path_arg, FfmpegProcess, GifError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempPath;
use tracing::debug;

const SCRATCH_PREFIX: &str = ".vid2gif-";
const PALETTE_SUFFIX: &str = ".png";
const PARTIAL_SUFFIX: &str = ".gif";

#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

impl FfmpegEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific ffmpeg binary instead of the one on `PATH`.
    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: path.into(),
        }
    }

    /// Both ffmpeg and ffprobe are resolvable.
    pub fn is_available(&self) -> bool {
        which::which(&self.ffmpeg).is_ok() && shared_utils::is_ffprobe_available()
    }
}

/// An opened source video plus the scratch files its encode creates.
/// Scratch files are deleted when the clip is dropped.
#[derive(Debug)]
pub struct FfmpegClip {
    path: PathBuf,
    source_dims: (u32, u32),
    target_dims: (u32, u32),
    scratch: Vec<TempPath>,
}

impl FfmpegClip {
    fn new(path: &Path, width: u32, height: u32) -> Self {
        Self {
            path: path.to_path_buf(),
            source_dims: (width, height),
            target_dims: (width, height),
            scratch: Vec::new(),
        }
    }

    fn is_resized(&self) -> bool {
        self.source_dims != self.target_dims
    }

    /// Shared filter head for both passes: resize first, then resample frames.
    fn filter_head(&self, profile: &QualityProfile) -> String {
        let fps = format!("fps={}", profile.frame_rate.max(1));
        if self.is_resized() {
            format!(
                "scale={}:{}:flags=lanczos,{}",
                self.target_dims.0, self.target_dims.1, fps
            )
        } else {
            fps
        }
    }

    fn palettegen_filter(&self, profile: &QualityProfile) -> String {
        let stats_mode = if profile.optimize { "diff" } else { "full" };
        format!(
            "{},palettegen=max_colors={}:stats_mode={}",
            self.filter_head(profile),
            profile.palette_size.clamp(4, 256),
            stats_mode
        )
    }

    fn paletteuse_filter(&self, profile: &QualityProfile) -> String {
        let mut use_opts = String::from("dither=bayer:bayer_scale=5");
        if profile.optimize {
            use_opts.push_str(":diff_mode=rectangle");
        }
        format!(
            "{}[x];[x][1:v]paletteuse={}",
            self.filter_head(profile),
            use_opts
        )
    }

    /// Creates an empty hidden file in `dir` owned by this clip.
    fn scratch_file(&mut self, dir: &Path, suffix: &str) -> Result<PathBuf> {
        let temp = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(suffix)
            .tempfile_in(dir)?
            .into_temp_path();
        let path = temp.to_path_buf();
        self.scratch.push(temp);
        Ok(path)
    }

    /// Moves a scratch file to `destination`, replacing any existing file.
    fn persist_scratch(&mut self, scratch: &Path, destination: &Path) -> Result<()> {
        let idx = self
            .scratch
            .iter()
            .position(|t| &**t == scratch)
            .ok_or_else(|| {
                GifError::GeneralError(format!("{} is not a scratch file", scratch.display()))
            })?;
        self.scratch
            .remove(idx)
            .persist(destination)
            .map_err(|e| GifError::IoError(e.error))
    }
}

impl FrameSource for FfmpegClip {
    fn dimensions(&self) -> (u32, u32) {
        self.target_dims
    }

    fn resize(&mut self, factor: f64) -> Result<()> {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(GifError::GeneralError(format!(
                "scale factor {} outside (0, 1]",
                factor
            )));
        }
        let (w, h) = self.source_dims;
        self.target_dims = (scaled_even(w, factor), scaled_even(h, factor));
        debug!(
            from = ?self.source_dims,
            to = ?self.target_dims,
            "Resize scheduled before frame sampling"
        );
        Ok(())
    }
}

/// `dim * factor`, rounded, forced even and at least 2.
fn scaled_even(dim: u32, factor: f64) -> u32 {
    let scaled = (dim as f64 * factor).round() as u32;
    (scaled & !1).max(2)
}

fn scratch_dir(destination: &Path) -> &Path {
    destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

impl TranscodeEngine for FfmpegEngine {
    type Source = FfmpegClip;

    fn decode(&self, path: &Path) -> Result<FfmpegClip> {
        let info = shared_utils::probe_video(path)?;
        debug!(
            file = %path.display(),
            format = %info.format_name,
            codec = %info.video_codec,
            width = info.width,
            height = info.height,
            frame_rate = info.frame_rate,
            duration = info.duration,
            "Inspected source video"
        );
        Ok(FfmpegClip::new(path, info.width, info.height))
    }

    fn encode(
        &self,
        source: &mut FfmpegClip,
        profile: &QualityProfile,
        destination: &Path,
    ) -> Result<()> {
        let dir = scratch_dir(destination);
        let palette = source.scratch_file(dir, PALETTE_SUFFIX)?;
        let partial = source.scratch_file(dir, PARTIAL_SUFFIX)?;

        let mut palette_cmd = Command::new(&self.ffmpeg);
        palette_cmd
            .args(["-y", "-v", "error", "-i"])
            .arg(safe_path_arg(&source.path))
            .arg("-vf")
            .arg(source.palettegen_filter(profile))
            .args(["-frames:v", "1", "-update", "1"])
            .arg(safe_path_arg(&palette));
        FfmpegProcess::run(&mut palette_cmd).map_err(|e| map_spawn_error(e, &self.ffmpeg))?;

        let mut gif_cmd = Command::new(&self.ffmpeg);
        gif_cmd
            .args(["-y", "-v", "error", "-i"])
            .arg(safe_path_arg(&source.path))
            .arg("-i")
            .arg(safe_path_arg(&palette))
            .arg("-lavfi")
            .arg(source.paletteuse_filter(profile))
            .args(["-loop", "0", "-f", "gif"])
            .arg(safe_path_arg(&partial));
        FfmpegProcess::run(&mut gif_cmd).map_err(|e| map_spawn_error(e, &self.ffmpeg))?;

        let written = fs::metadata(&partial).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(GifError::EmptyOutput(destination.to_path_buf()));
        }

        source.persist_scratch(&partial, destination)
    }
}

fn map_spawn_error(e: anyhow::Error, ffmpeg: &Path) -> GifError {
    let not_found = e
        .chain()
        .filter_map(|c| c.downcast_ref::<std::io::Error>())
        .any(|io| io.kind() == std::io::ErrorKind::NotFound);
    if not_found {
        GifError::ToolNotFound(ffmpeg.display().to_string())
    } else {
        GifError::FFmpegError(format!("{:#}", e))
    }
}
