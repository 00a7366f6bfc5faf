//! Logging Module
//!
//! tracing-based logging shared by the vid2gif tools:
//! - a daily rolling log file in the system temp directory
//! - a quieter stderr layer so progress output stays readable
//! - pruning of old log files
//! - structured records for external tool invocations (ffmpeg, ffprobe)
//!
//! # Examples
//!
//! ```no_run
//! use shared_utils::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! init_logging("vid_gif", LogConfig::default()).expect("Failed to initialize logging");
//! info!("Program started");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Crate targets that receive the configured file level.
const LOG_TARGETS: &[&str] = &["vid_gif", "vid2gif", "shared_utils"];

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for log files (system temp dir by default)
    pub log_dir: PathBuf,
    /// Number of log files kept after pruning
    pub max_files: usize,
    /// Level written to the log file
    pub level: Level,
    /// Level echoed to stderr
    pub console_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 5,
            level: Level::INFO,
            console_level: Level::WARN,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_console_level(mut self, level: Level) -> Self {
        self.console_level = level;
        self
    }

    /// Verbose runs log DEBUG to the file and INFO to stderr.
    pub fn verbose(self) -> Self {
        self.with_level(Level::DEBUG).with_console_level(Level::INFO)
    }

    fn default_directives(&self) -> String {
        LOG_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Installs the global subscriber. Log file name: `{program_name}.log.<date>`.
///
/// `RUST_LOG` overrides the configured file level when set.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let log_file_name = format!("{}.log", program_name);
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, &log_file_name);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_line_number(false)
        .with_filter(LevelFilter::from_level(config.console_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Logging was already initialized")?;

    tracing::info!(
        program = program_name,
        log_dir = ?config.log_dir,
        log_file = log_file_name,
        max_files = config.max_files,
        level = ?config.level,
        "Logging system initialized"
    );

    cleanup_old_logs(&config.log_dir, program_name, config.max_files)?;

    Ok(())
}

/// Removes all but the `max_files` most recently modified `{program_name}*.log*` files.
fn cleanup_old_logs(log_dir: &Path, program_name: &str, max_files: usize) -> Result<()> {
    let entries = std::fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .map(|n| {
                    let name = n.to_string_lossy();
                    name.starts_with(program_name) && name.contains(".log")
                })
                .unwrap_or(false)
        })
        .filter_map(|path| {
            let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some((path, modified))
        })
        .collect();

    if log_files.len() <= max_files {
        return Ok(());
    }

    // newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.iter().skip(max_files) {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = ?path, "Removed old log file"),
            Err(e) => tracing::warn!(path = ?path, error = %e, "Failed to remove old log file"),
        }
    }

    Ok(())
}

/// Records one external tool run (ffmpeg, ffprobe) with its outcome.
pub fn log_external_tool(
    tool_name: &str,
    args: &[String],
    output: &str,
    exit_code: Option<i32>,
    duration: Duration,
) {
    let command = format!("{} {}", tool_name, args.join(" "));

    match exit_code {
        Some(0) => {
            tracing::info!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                "External tool completed successfully"
            );
            tracing::debug!(tool = tool_name, output = %output, "External tool output");
        }
        Some(code) => {
            tracing::error!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                exit_code = code,
                output = %output,
                "External tool failed"
            );
        }
        None => {
            tracing::error!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                output = %output,
                "External tool terminated without exit code"
            );
        }
    }
}
