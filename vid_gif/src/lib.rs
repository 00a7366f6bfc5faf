//! vid-gif - Batch Video to Animated GIF Conversion
//!
//! Converts every video directly inside a source directory into a GIF in an
//! output directory, using one of three quality presets:
//! - `high`: 15 fps, full size, 256 colors
//! - `medium`: 10 fps, 75% size, 128 colors (default, and the fallback)
//! - `low`: 8 fps, 50% size, 64 colors
//!
//! A bad file only ever produces a failed result; the rest of the batch runs.
//!
//! ```rust,ignore
//! use vid_gif::{BatchConverter, ConverterConfig, TracingSink};
//!
//! let converter = BatchConverter::with_ffmpeg(ConverterConfig::default())?;
//! let outcome = converter.convert_batch("low", &TracingSink)?;
//! println!("{} ok, {} failed", outcome.success_count, outcome.failure_count);
//! ```

pub mod collision;
pub mod converter;
pub mod engine;
pub mod error;
pub mod ffmpeg_engine;
pub mod outcome;
pub mod quality;
pub mod report;
pub mod sink;

pub use collision::CollisionPolicy;
pub use converter::{BatchConverter, ConverterConfig, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR};
pub use engine::{FrameSource, TranscodeEngine};
pub use error::BatchError;
pub use ffmpeg_engine::{FfmpegClip, FfmpegEngine};
pub use outcome::{BatchOutcome, ConversionResult, SourceFile};
pub use quality::{resolve, Quality, QualityProfile};
pub use sink::{ChannelSink, CollectingSink, NullSink, ProgressSink, TracingSink};
