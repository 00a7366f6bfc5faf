//! FFmpeg process wrapper
//!
//! ffmpeg writes its whole log to stderr. If the pipe is left unread and the
//! log outgrows the OS pipe buffer (~64KB), ffmpeg blocks on write and never
//! exits. `FfmpegProcess` drains stderr on its own thread while the caller
//! waits on the child.
//!
//! ```ignore
//! use shared_utils::ffmpeg_process::FfmpegProcess;
//! use std::process::Command;
//!
//! let mut cmd = Command::new("ffmpeg");
//! cmd.arg("-y").arg("-i").arg("input.mp4").arg("output.gif");
//! let stderr = FfmpegProcess::run(&mut cmd)?;
//! ```

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::info;

pub struct FfmpegProcess {
    child: Child,
    program: String,
    args: Vec<String>,
    started: Instant,
    stderr_thread: Option<JoinHandle<String>>,
}

impl FfmpegProcess {
    /// Spawns `cmd` with stdout discarded and stderr drained in the background.
    pub fn spawn(cmd: &mut Command) -> Result<Self> {
        let program = cmd.get_program().to_string_lossy().into_owned();
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        info!(command = %format!("{} {}", program, args.join(" ")), "Executing FFmpeg command");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {}", program))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture {} stderr", program))?;

        let stderr_thread = thread::spawn(move || {
            let mut buf = String::new();
            for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                buf.push_str(&line);
                buf.push('\n');
            }
            buf
        });

        Ok(Self {
            child,
            program,
            args,
            started: Instant::now(),
            stderr_thread: Some(stderr_thread),
        })
    }

    /// Waits for exit and returns the status with the collected stderr.
    pub fn wait_with_output(mut self) -> Result<(ExitStatus, String)> {
        let status = self
            .child
            .wait()
            .with_context(|| format!("Failed to wait for {}", self.program))?;
        let stderr = self
            .stderr_thread
            .take()
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();

        crate::logging::log_external_tool(
            &self.program,
            &self.args,
            &stderr,
            status.code(),
            self.started.elapsed(),
        );

        Ok((status, stderr))
    }

    /// Spawn, wait, and turn a non-zero exit into an error carrying the most
    /// meaningful stderr line.
    pub fn run(cmd: &mut Command) -> Result<String> {
        let process = Self::spawn(cmd)?;
        let program = process.program.clone();
        let (status, stderr) = process.wait_with_output()?;
        if !status.success() {
            anyhow::bail!(
                "{} exited with {:?}: {}",
                program,
                status.code(),
                format_ffmpeg_error(&stderr)
            );
        }
        Ok(stderr)
    }
}

/// Picks the line of ffmpeg's stderr that best explains a failure.
///
/// Prefers the last line mentioning an error, then the last non-progress line.
pub fn format_ffmpeg_error(stderr: &str) -> String {
    if let Some(error_line) = stderr
        .lines()
        .rev()
        .find(|line| line.contains("Error") || line.contains("error") || line.contains("Invalid"))
    {
        return error_line.trim().to_string();
    }

    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && !line.starts_with("frame=")
                && !line.starts_with("fps=")
                && !line.starts_with("size=")
        })
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown FFmpeg error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_prefers_error_line() {
        let stderr = "ffmpeg version 6.1\n\
                      Input #0, mov,mp4\n\
                      broken.mp4: Invalid data found when processing input\n\
                      frame=    0 fps=0.0\n";
        assert_eq!(
            format_ffmpeg_error(stderr),
            "broken.mp4: Invalid data found when processing input"
        );
    }

    #[test]
    fn test_format_error_falls_back_to_last_meaningful_line() {
        let stderr = "Stream mapping:\n  Stream #0:0 -> #0:0 (gif)\nframe=   10 fps=5\n\n";
        assert_eq!(format_ffmpeg_error(stderr), "Stream #0:0 -> #0:0 (gif)");
    }

    #[test]
    fn test_format_error_empty() {
        assert_eq!(format_ffmpeg_error(""), "Unknown FFmpeg error");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_nonzero_exit() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo 'Error: no such stream' >&2; exit 3");
        let err = FfmpegProcess::run(&mut cmd).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Some(3)"), "{}", msg);
        assert!(msg.contains("Error: no such stream"), "{}", msg);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_collects_stderr_on_success() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo progress >&2");
        let stderr = FfmpegProcess::run(&mut cmd).unwrap();
        assert_eq!(stderr, "progress\n");
    }

    #[test]
    fn test_spawn_missing_binary() {
        let mut cmd = Command::new("definitely_not_a_real_tool_vid2gif");
        assert!(FfmpegProcess::spawn(&mut cmd).is_err());
    }
}
