//! Batch runs against the real ffmpeg. Skipped when ffmpeg/ffprobe are missing.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use vid_gif::{BatchConverter, CollectingSink, ConverterConfig, FfmpegEngine, NullSink};

fn ffmpeg_ready() -> bool {
    FfmpegEngine::new().is_available()
}

/// One second of `testsrc`, encoded with the built-in mpeg4 encoder.
fn make_clip(path: &Path) {
    let status = Command::new("ffmpeg")
        .args(["-y", "-v", "error", "-f", "lavfi", "-i"])
        .arg("testsrc=duration=1:size=160x120:rate=10")
        .args(["-c:v", "mpeg4"])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success(), "failed to generate {}", path.display());
}

#[test]
fn converts_valid_clips_and_skips_other_files() {
    if !ffmpeg_ready() {
        eprintln!("ffmpeg not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("start");
    let output = temp.path().join("finish");
    let converter =
        BatchConverter::new(ConverterConfig::new(&source, &output), FfmpegEngine::new()).unwrap();

    make_clip(&source.join("a.mp4"));
    make_clip(&source.join("b.avi"));
    fs::write(source.join("notes.txt"), "not a video").unwrap();

    let names: Vec<String> = converter
        .list_eligible_files()
        .into_iter()
        .map(|f| f.file_name)
        .collect();
    assert_eq!(names, vec!["a.mp4", "b.avi"]);

    let outcome = converter.convert_batch("low", &NullSink).unwrap();

    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.failure_count, 0);
    for gif in ["a.gif", "b.gif"] {
        let bytes = fs::read(output.join(gif)).unwrap();
        assert!(bytes.starts_with(b"GIF8"), "{} is not a GIF", gif);
    }

    // no palette or partial files left behind
    let leftovers: Vec<_> = fs::read_dir(&output)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with('.'))
        .collect();
    assert!(leftovers.is_empty(), "{:?}", leftovers);
}

#[test]
fn zero_byte_file_fails_alone() {
    if !ffmpeg_ready() {
        eprintln!("ffmpeg not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("start");
    let output = temp.path().join("finish");
    let converter =
        BatchConverter::new(ConverterConfig::new(&source, &output), FfmpegEngine::new()).unwrap();

    fs::write(source.join("broken.mp4"), b"").unwrap();
    make_clip(&source.join("good.mkv"));

    let sink = CollectingSink::new();
    let outcome = converter.convert_batch("medium", &sink).unwrap();

    assert_eq!(outcome.success_count, 1);
    assert_eq!(outcome.failure_count, 1);
    assert!(outcome.results[0].detail.contains("broken.mp4"));
    assert!(output.join("good.gif").is_file());
    assert!(sink
        .messages()
        .iter()
        .any(|m| m.starts_with("Failed: broken.mp4")));
}
