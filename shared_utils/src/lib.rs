//! Shared Utilities for the vid2gif tools
//!
//! Common plumbing kept apart from the conversion pipeline:
//! - Logging (tracing, rolling log file)
//! - Error type for external-engine failures
//! - Flat, sorted file collection by extension
//! - FFmpeg process wrapper and FFprobe probing
//! - Progress bar factory and formatting helpers

pub mod batch;
pub mod common_utils;
pub mod errors;
pub mod ffmpeg_process;
pub mod ffprobe;
pub mod logging;
pub mod path_safety;
pub mod progress;

pub use batch::{collect_files, VIDEO_EXTENSIONS};
pub use common_utils::{ensure_dir_exists, file_name_lossy, get_extension_lowercase, has_extension};
pub use errors::{GifError, Result};
pub use ffmpeg_process::{format_ffmpeg_error, FfmpegProcess};
pub use ffprobe::{is_ffprobe_available, probe_video, ProbeResult};
pub use path_safety::safe_path_arg;
pub use progress::{create_progress_bar, format_bytes, format_duration, truncate_filename};
