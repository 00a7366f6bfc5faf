//! FFprobe wrapper
//!
//! Opens a video just far enough to learn its first video stream's geometry,
//! frame rate and duration. A file ffprobe cannot parse (zero-byte, truncated,
//! unknown container) fails here, before any encode is attempted.

use crate::errors::{GifError, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub format_name: String,
    pub video_codec: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
struct RawProbe {
    #[serde(default)]
    streams: Vec<RawStream>,
    format: Option<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

pub fn is_ffprobe_available() -> bool {
    which::which("ffprobe").is_ok()
}

pub fn probe_video(path: &Path) -> Result<ProbeResult> {
    if !path.is_file() {
        return Err(GifError::FileNotFound(path.to_path_buf()));
    }

    const FLAGS: [&str; 7] = [
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
        "--",
    ];
    let path_arg = crate::safe_path_arg(path);

    let started = Instant::now();
    let output = Command::new("ffprobe")
        .args(FLAGS)
        .arg(&path_arg)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GifError::ToolNotFound("ffprobe".to_string())
            } else {
                GifError::IoError(e)
            }
        })?;

    let args: Vec<String> = FLAGS
        .iter()
        .map(|f| f.to_string())
        .chain(std::iter::once(path_arg.to_string_lossy().into_owned()))
        .collect();

    let stderr = String::from_utf8_lossy(&output.stderr);
    crate::logging::log_external_tool(
        "ffprobe",
        &args,
        &stderr,
        output.status.code(),
        started.elapsed(),
    );

    if !output.status.success() {
        let reason = if stderr.trim().is_empty() {
            format!("exit code {:?}", output.status.code())
        } else {
            stderr.trim().to_string()
        };
        return Err(GifError::FFprobeError(reason));
    }

    parse_probe_json(&String::from_utf8_lossy(&output.stdout))
}

/// Parses `ffprobe -print_format json -show_format -show_streams` output.
pub fn parse_probe_json(json: &str) -> Result<ProbeResult> {
    let raw: RawProbe = serde_json::from_str(json)
        .map_err(|e| GifError::FFprobeError(format!("unreadable ffprobe output: {}", e)))?;

    let video = raw
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| GifError::VideoReadError("no video stream found".to_string()))?;

    let width = video.width.unwrap_or(0);
    let height = video.height.unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(GifError::VideoReadError(format!(
            "invalid video dimensions {}x{}",
            width, height
        )));
    }

    let duration = video
        .duration
        .as_deref()
        .or_else(|| raw.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(ProbeResult {
        format_name: raw
            .format
            .as_ref()
            .and_then(|f| f.format_name.clone())
            .unwrap_or_default(),
        video_codec: video.codec_name.clone().unwrap_or_default(),
        width,
        height,
        frame_rate: video
            .r_frame_rate
            .as_deref()
            .and_then(parse_frame_rate)
            .unwrap_or(0.0),
        duration,
    })
}

/// `"30000/1001"` or `"25"` to frames per second.
fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => rate.trim().parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            { "codec_type": "audio", "codec_name": "aac" },
            { "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080,
              "r_frame_rate": "30000/1001", "duration": "12.500000" }
        ],
        "format": { "format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "12.533000" }
    }"#;

    #[test]
    fn test_parse_probe_json_picks_video_stream() {
        let probe = parse_probe_json(SAMPLE).unwrap();
        assert_eq!(probe.video_codec, "h264");
        assert_eq!((probe.width, probe.height), (1920, 1080));
        assert!((probe.frame_rate - 29.97).abs() < 0.01);
        assert!((probe.duration - 12.5).abs() < 1e-9);
        assert!(probe.format_name.starts_with("mov"));
    }

    #[test]
    fn test_parse_probe_json_falls_back_to_format_duration() {
        let json = r#"{"streams":[{"codec_type":"video","width":320,"height":240}],
                       "format":{"duration":"3.0"}}"#;
        let probe = parse_probe_json(json).unwrap();
        assert!((probe.duration - 3.0).abs() < 1e-9);
        assert_eq!(probe.frame_rate, 0.0);
    }

    #[test]
    fn test_parse_probe_json_without_video() {
        let json = r#"{"streams":[{"codec_type":"audio"}],"format":{}}"#;
        let err = parse_probe_json(json).unwrap_err();
        assert!(matches!(err, GifError::VideoReadError(_)));
    }

    #[test]
    fn test_parse_probe_json_empty_object() {
        // ffprobe prints `{}` for some unreadable inputs
        assert!(parse_probe_json("{}").is_err());
        assert!(parse_probe_json("").is_err());
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn test_probe_missing_file() {
        let err = probe_video(Path::new("/nonexistent/vid2gif/clip.mp4")).unwrap_err();
        assert!(matches!(err, GifError::FileNotFound(_)));
    }
}
