use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GifError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read video: {0}")]
    VideoReadError(String),

    #[error("FFprobe failed: {0}")]
    FFprobeError(String),

    #[error("FFmpeg failed: {0}")]
    FFmpegError(String),

    #[error("Encoder produced no output: {}", .0.display())]
    EmptyOutput(PathBuf),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("General error: {0}")]
    GeneralError(String),
}

impl From<anyhow::Error> for GifError {
    fn from(e: anyhow::Error) -> Self {
        GifError::GeneralError(format!("{:#}", e))
    }
}

pub type Result<T> = std::result::Result<T, GifError>;
