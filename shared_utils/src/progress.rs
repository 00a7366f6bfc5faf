//! Terminal progress helpers (indicatif)

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

pub mod progress_style {
    /// indicatif wants three characters: filled, current, empty
    pub const PROGRESS_CHARS: &str = "█▓░";

    pub const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

    pub const BATCH_TEMPLATE: &str = "{spinner:.green} {prefix:.cyan.bold} ▕{bar:35.green/black}▏ {pos}/{len} • ⏱️ {elapsed_precise} • {msg}";
}

/// Batch bar with `total` steps. Hidden bars accept every call and draw nothing.
pub fn create_progress_bar(total: u64, prefix: &str, hidden: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);

    if hidden {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }

    let style = ProgressStyle::default_bar()
        .template(progress_style::BATCH_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(progress_style::PROGRESS_CHARS)
        .tick_chars(progress_style::SPINNER_CHARS);
    pb.set_style(style);
    pb.set_prefix(prefix.to_string());
    pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Shortens long names to `head...tail`, counting characters.
pub fn truncate_filename(filename: &str, max_len: usize) -> String {
    let chars: Vec<char> = filename.chars().collect();
    if chars.len() <= max_len || max_len < 5 {
        return filename.to_string();
    }
    let keep = max_len - 3;
    let head = keep / 2;
    let tail = keep - head;
    let start: String = chars[..head].iter().collect();
    let end: String = chars[chars.len() - tail..].iter().collect();
    format!("{}...{}", start, end)
}
