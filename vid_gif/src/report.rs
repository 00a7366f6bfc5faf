//! Report Module
//!
//! End-of-batch summary for the terminal plus an optional JSON run report.

use crate::outcome::BatchOutcome;
use crate::quality::{Quality, QualityProfile};
use anyhow::{Context, Result};
use console::{measure_text_width, style};
use serde::Serialize;
use shared_utils::{format_bytes, format_duration};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sum of the sizes of every GIF the batch produced.
pub fn output_bytes(outcome: &BatchOutcome) -> u64 {
    outcome
        .results
        .iter()
        .filter(|r| r.succeeded)
        .filter_map(|r| std::fs::metadata(&r.detail).ok())
        .map(|m| m.len())
        .sum()
}

const BOX_WIDTH: usize = 58;
const LABEL_WIDTH: usize = 22;

/// `║ ... ║` with the content padded by display width, so wide glyphs keep the
/// right border aligned.
fn box_line(content: &str) -> String {
    let pad = BOX_WIDTH.saturating_sub(measure_text_width(content));
    format!("║{}{}║", content, " ".repeat(pad))
}

fn box_row(label: &str, value: &str) -> String {
    let gap = LABEL_WIDTH.saturating_sub(measure_text_width(label));
    box_line(&format!("  {}{}{:>10}", label, " ".repeat(gap), value))
}

fn box_rule(left: char, right: char) -> String {
    format!("{}{}{}", left, "═".repeat(BOX_WIDTH), right)
}

/// The boxed summary, one entry per terminal line.
pub fn summary_lines(outcome: &BatchOutcome, duration: Duration, quality: Quality) -> Vec<String> {
    let title = "📊 vid2gif Summary Report";
    let title_pad = BOX_WIDTH.saturating_sub(measure_text_width(title)) / 2;

    let mut lines = vec![
        box_rule('╔', '╗'),
        box_line(&format!("{}{}", " ".repeat(title_pad), title)),
        box_rule('╠', '╣'),
        box_row("🎨 Quality:", quality.as_str()),
        box_row("📁 Files Processed:", &outcome.total().to_string()),
        box_row("✅ Succeeded:", &outcome.success_count.to_string()),
        box_row("❌ Failed:", &outcome.failure_count.to_string()),
        box_row("📈 Success Rate:", &format!("{:.1}%", outcome.success_rate())),
        box_rule('╠', '╣'),
        box_row("💾 GIF Output:", &format_bytes(output_bytes(outcome))),
        box_row("🕒 Total Time:", &format_duration(duration)),
    ];
    if outcome.total() > 0 {
        let avg_time = duration.as_secs_f64() / outcome.total() as f64;
        lines.push(box_row("🕒 Avg Time/File:", &format!("{:.2}s", avg_time)));
    }
    lines.push(box_rule('╚', '╝'));
    lines
}

pub fn print_summary_report(outcome: &BatchOutcome, duration: Duration, quality: Quality) {
    println!();
    for line in summary_lines(outcome, duration, quality) {
        println!("{}", line);
    }

    if !outcome.is_clean() {
        println!();
        println!("{}", style("❌ Errors encountered:").red().bold());
        println!("{}", "━".repeat(BOX_WIDTH + 2));
        for result in outcome.failures() {
            println!("   {}", style(&result.detail).red());
        }
    }
}

/// Machine-readable record of one run.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub generated_at: String,
    pub quality: &'a str,
    pub profile: QualityProfile,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub elapsed_secs: f64,
    /// False when the run stopped on an unusable output directory
    pub completed: bool,
    pub outcome: &'a BatchOutcome,
}

impl<'a> RunReport<'a> {
    pub fn new(
        quality: Quality,
        source_dir: &Path,
        output_dir: &Path,
        elapsed: Duration,
        outcome: &'a BatchOutcome,
    ) -> Self {
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            quality: quality.as_str(),
            profile: quality.profile(),
            source_dir: source_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            elapsed_secs: elapsed.as_secs_f64(),
            completed: true,
            outcome,
        }
    }

    pub fn interrupted(mut self) -> Self {
        self.completed = false;
        self
    }
}

pub fn write_json_report(report: &RunReport<'_>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        shared_utils::ensure_dir_exists(parent)?;
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    tracing::info!(report = %path.display(), "Run report written");
    Ok(())
}
