//! Batch conversion pipeline
//!
//! `BatchConverter` owns a source/output directory pair. A batch discovers the
//! eligible videos, resolves the quality profile once, and runs one job per
//! file strictly in discovery order. A failing job is recorded and the batch
//! moves on; only an unusable output directory stops it.

use crate::collision::{default_destination, CollisionPolicy, Destination, DestinationClaims};
use crate::engine::{FrameSource, TranscodeEngine};
use crate::error::BatchError;
use crate::ffmpeg_engine::FfmpegEngine;
use crate::outcome::{BatchOutcome, ConversionResult, SourceFile};
use crate::quality::{self, Quality, QualityProfile};
use crate::sink::{ChannelSink, ProgressSink};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

pub const DEFAULT_SOURCE_DIR: &str = "gif/start";
pub const DEFAULT_OUTPUT_DIR: &str = "gif/finish";

#[derive(Debug, Clone, PartialEq)]
pub struct ConverterConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub collision_policy: CollisionPolicy,
}

impl Default for ConverterConfig {
    /// `gif/start` → `gif/finish`, relative to the working directory.
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_DIR, DEFAULT_OUTPUT_DIR)
    }
}

impl ConverterConfig {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            collision_policy: CollisionPolicy::default(),
        }
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}

fn loading_message(file: &SourceFile) -> String {
    format!("Loading video: {}", file.file_name)
}

fn converting_message(file: &SourceFile) -> String {
    format!("Converting: {}", file.file_name)
}

fn done_message(destination: &Path) -> String {
    format!("Done: {}", shared_utils::file_name_lossy(destination))
}

fn failed_message(result: &ConversionResult) -> String {
    format!("Failed: {}", result.detail)
}

pub const NO_FILES_MESSAGE: &str = "No video files found!";

fn started_message(total: usize) -> String {
    format!("Found {} video files, starting conversion...", total)
}

fn processing_message(index: usize, total: usize, file: &SourceFile) -> String {
    format!("[{}/{}] Processing: {}", index, total, file.file_name)
}

fn summary_message(outcome: &BatchOutcome) -> String {
    format!(
        "Conversion complete! Succeeded: {}, Failed: {}",
        outcome.success_count, outcome.failure_count
    )
}

pub struct BatchConverter<E: TranscodeEngine = FfmpegEngine> {
    config: ConverterConfig,
    engine: E,
}

impl BatchConverter<FfmpegEngine> {
    /// Converter backed by the ffmpeg on `PATH`.
    pub fn with_ffmpeg(config: ConverterConfig) -> Result<Self, BatchError> {
        Self::new(config, FfmpegEngine::new())
    }
}

impl<E: TranscodeEngine> BatchConverter<E> {
    /// Creates the output and source directories (with parents) when missing.
    pub fn new(config: ConverterConfig, engine: E) -> Result<Self, BatchError> {
        for dir in [&config.output_dir, &config.source_dir] {
            std::fs::create_dir_all(dir).map_err(|source| BatchError::DirectorySetup {
                path: dir.clone(),
                source,
            })?;
        }
        debug!(
            source = %config.source_dir.display(),
            output = %config.output_dir.display(),
            "Converter directories ready"
        );
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn source_dir(&self) -> &Path {
        &self.config.source_dir
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Videos directly in the source directory, sorted by name. Rescans on every call.
    pub fn list_eligible_files(&self) -> Vec<SourceFile> {
        shared_utils::collect_files(&self.config.source_dir, shared_utils::VIDEO_EXTENSIONS)
            .into_iter()
            .map(SourceFile::new)
            .collect()
    }

    /// Converts one file to `<output_dir>/<stem>.gif`. Never fails; problems
    /// come back as an unsuccessful result.
    pub fn convert_one(
        &self,
        file: &SourceFile,
        profile: &QualityProfile,
        sink: &dyn ProgressSink,
    ) -> ConversionResult {
        let destination = default_destination(&self.config.output_dir, file);
        self.convert_to(file, &destination, profile, sink)
    }

    fn convert_to(
        &self,
        file: &SourceFile,
        destination: &Path,
        profile: &QualityProfile,
        sink: &dyn ProgressSink,
    ) -> ConversionResult {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            self.transcode(file, destination, profile, sink)
        }));

        let result = match attempt {
            Ok(Ok(())) => {
                info!(
                    source = %file.file_name,
                    destination = %destination.display(),
                    "GIF written"
                );
                sink.notify(&done_message(destination));
                return ConversionResult::success(&file.file_name, destination);
            }
            Ok(Err(e)) => ConversionResult::failure(&file.file_name, e),
            Err(payload) => ConversionResult::failure(
                &file.file_name,
                format!("engine panicked: {}", panic_message(payload.as_ref())),
            ),
        };

        warn!(source = %file.file_name, detail = %result.detail, "Conversion failed");
        sink.notify(&failed_message(&result));
        result
    }

    /// Decode, resize, encode. The decoded source is dropped on every path out
    /// of this function, which releases whatever the engine holds for it.
    fn transcode(
        &self,
        file: &SourceFile,
        destination: &Path,
        profile: &QualityProfile,
        sink: &dyn ProgressSink,
    ) -> shared_utils::Result<()> {
        sink.notify(&loading_message(file));
        let mut source = self.engine.decode(file.path())?;

        if profile.needs_resize() {
            source.resize(profile.scale)?;
        }

        sink.notify(&converting_message(file));
        self.engine.encode(&mut source, profile, destination)?;
        drop(source);
        Ok(())
    }

    /// Runs every discovered file through a job, in order.
    ///
    /// Unknown quality identifiers fall back to `medium`. Per-file failures are
    /// part of the returned outcome; `Err` means the output directory itself
    /// became unusable, and carries whatever completed before that.
    pub fn convert_batch(
        &self,
        quality_id: &str,
        sink: &dyn ProgressSink,
    ) -> Result<BatchOutcome, BatchError> {
        if Quality::parse(quality_id).is_none() {
            warn!(quality = %quality_id, "Unknown quality, using medium");
        }
        let profile = quality::resolve(quality_id);

        let files = self.list_eligible_files();
        if files.is_empty() {
            info!(source = %self.config.source_dir.display(), "No video files found");
            sink.notify(NO_FILES_MESSAGE);
            return Ok(BatchOutcome::new());
        }

        let total = files.len();
        info!(
            total,
            quality = %quality_id,
            frame_rate = profile.frame_rate,
            scale = profile.scale,
            palette_size = profile.palette_size,
            "Starting batch"
        );

        let mut outcome = BatchOutcome::new();
        self.check_output(&mut outcome)?;

        sink.notify(&started_message(total));

        let mut claims = DestinationClaims::new();
        for (idx, file) in files.iter().enumerate() {
            sink.notify(&processing_message(idx + 1, total, file));

            let result = match claims.plan(
                &self.config.output_dir,
                file,
                self.config.collision_policy,
            ) {
                Destination::Write(destination) => {
                    let result = self.convert_to(file, &destination, &profile, sink);
                    if result.succeeded {
                        claims.claim(destination, &file.file_name);
                    }
                    result
                }
                Destination::Taken { path, claimed_by } => {
                    let result = ConversionResult::failure(
                        &file.file_name,
                        format!(
                            "{} was already written from {} in this batch",
                            shared_utils::file_name_lossy(&path),
                            claimed_by
                        ),
                    );
                    warn!(source = %file.file_name, detail = %result.detail, "Output name collision");
                    sink.notify(&failed_message(&result));
                    result
                }
            };

            let failed = !result.succeeded;
            outcome.record(result);

            // a failed job may be the first symptom of a dead output directory
            if failed {
                self.check_output(&mut outcome)?;
            }
        }

        info!(
            succeeded = outcome.success_count,
            failed = outcome.failure_count,
            "Batch finished"
        );
        sink.notify(&summary_message(&outcome));
        Ok(outcome)
    }

    fn check_output(&self, outcome: &mut BatchOutcome) -> Result<(), BatchError> {
        ensure_output_writable(&self.config.output_dir).map_err(|source| {
            BatchError::OutputUnavailable {
                path: self.config.output_dir.clone(),
                source,
                completed: std::mem::take(outcome),
            }
        })
    }
}

impl<E> BatchConverter<E>
where
    E: TranscodeEngine + Send + 'static,
{
    /// Runs [`BatchConverter::convert_batch`] on a dedicated thread, sending
    /// progress messages through `sender`.
    pub fn spawn_batch(
        self,
        quality_id: String,
        sender: Sender<String>,
    ) -> JoinHandle<Result<BatchOutcome, BatchError>> {
        thread::spawn(move || {
            let sink = ChannelSink::new(sender);
            self.convert_batch(&quality_id, &sink)
        })
    }
}

/// Recreates the output directory if it vanished and proves it accepts a new file.
fn ensure_output_writable(dir: &Path) -> std::io::Result<()> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir)?;
    }
    tempfile::Builder::new()
        .prefix(".vid2gif-write-check")
        .tempfile_in(dir)
        .map(drop)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
