use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::ProgressBar;
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::{create_progress_bar, truncate_filename};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::time::Instant;
use tracing::{error, info};

use vid_gif::report::{print_summary_report, write_json_report, RunReport};
use vid_gif::{
    BatchConverter, BatchError, BatchOutcome, CollisionPolicy, ConverterConfig, Quality,
    DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR,
};

const EXIT_JOB_FAILED: u8 = 1;
const EXIT_INFRASTRUCTURE: u8 = 2;

#[derive(Parser)]
#[command(name = "vid2gif")]
#[command(version, about = "Batch video to animated GIF converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for log files (system temp dir by default)
    #[arg(long, global = true, env = "VID2GIF_LOG_DIR", value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every video in the source directory
    #[command(name = "run")]
    Run {
        #[arg(short, long, env = "VID2GIF_SOURCE_DIR", default_value = DEFAULT_SOURCE_DIR)]
        source: PathBuf,
        #[arg(short, long, env = "VID2GIF_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
        /// high, medium or low (anything else falls back to medium)
        #[arg(short, long, default_value = "medium")]
        quality: String,
        /// What to do when two sources map to the same GIF name
        #[arg(long, value_enum, default_value_t = CollisionPolicy::Rename)]
        on_collision: CollisionPolicy,
        /// Write a JSON run report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
        /// Print progress messages as plain lines instead of a bar
        #[arg(long)]
        no_progress: bool,
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the videos a run would convert
    #[command(name = "list")]
    List {
        #[arg(short, long, env = "VID2GIF_SOURCE_DIR", default_value = DEFAULT_SOURCE_DIR)]
        source: PathBuf,
        #[arg(short, long, env = "VID2GIF_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
    },

    /// Show the quality presets
    #[command(name = "presets")]
    Presets,
}

struct RunArgs {
    source: PathBuf,
    output: PathBuf,
    quality: String,
    on_collision: CollisionPolicy,
    report: Option<PathBuf>,
    no_progress: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    let mut log_config = if verbose {
        LogConfig::default().verbose()
    } else {
        LogConfig::default()
    };
    if let Some(dir) = &cli.log_dir {
        log_config = log_config.with_log_dir(dir);
    }
    let _ = init_logging("vid2gif", log_config);

    let result = match cli.command {
        Commands::Run {
            source,
            output,
            quality,
            on_collision,
            report,
            no_progress,
            verbose: _,
        } => run(RunArgs {
            source,
            output,
            quality,
            on_collision,
            report,
            no_progress,
        }),
        Commands::List { source, output } => list(source, output),
        Commands::Presets => {
            presets();
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{} {:#}", style("❌").red(), e);
            ExitCode::from(EXIT_INFRASTRUCTURE)
        }
    }
}

fn run(args: RunArgs) -> Result<ExitCode> {
    let quality = Quality::parse_lenient(&args.quality);
    let config =
        ConverterConfig::new(&args.source, &args.output).with_collision_policy(args.on_collision);
    let converter = BatchConverter::with_ffmpeg(config)
        .context("Failed to prepare conversion directories")?;
    let config = converter.config().clone();

    if !converter.engine().is_available() {
        bail!("ffmpeg and ffprobe must be installed and on PATH");
    }

    let total = converter.list_eligible_files().len();
    info!(
        source = %config.source_dir.display(),
        output = %config.output_dir.display(),
        quality = %quality,
        total,
        "vid2gif run"
    );

    let pb = create_progress_bar(total as u64, "GIF", args.no_progress || total == 0);
    let (tx, rx) = mpsc::channel();
    let start = Instant::now();
    let handle = converter.spawn_batch(args.quality.clone(), tx);

    for message in rx {
        show_message(&pb, &message, args.no_progress);
    }
    pb.finish_and_clear();

    let result = handle
        .join()
        .map_err(|_| BatchError::WorkerPanicked)
        .and_then(|r| r);
    let elapsed = start.elapsed();

    match result {
        Ok(outcome) => {
            print_summary_report(&outcome, elapsed, quality);
            if let Some(path) = &args.report {
                let report = RunReport::new(
                    quality,
                    &config.source_dir,
                    &config.output_dir,
                    elapsed,
                    &outcome,
                );
                write_json_report(&report, path)?;
            }
            Ok(exit_code_for(&outcome))
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", style("❌ Batch aborted:").red().bold(), e);
            if let Some(partial) = e.completed() {
                print_summary_report(partial, elapsed, quality);
                if let Some(path) = &args.report {
                    let report = RunReport::new(
                        quality,
                        &config.source_dir,
                        &config.output_dir,
                        elapsed,
                        partial,
                    )
                    .interrupted();
                    write_json_report(&report, path)?;
                }
            }
            Ok(ExitCode::from(EXIT_INFRASTRUCTURE))
        }
    }
}

/// Per-file terminal messages advance the bar; failures stay on screen.
fn show_message(pb: &ProgressBar, message: &str, plain: bool) {
    if plain || pb.is_hidden() {
        println!("{}", message);
        return;
    }

    if message.starts_with("Failed: ") {
        pb.println(format!("{}", style(message).red()));
        pb.inc(1);
    } else if message.starts_with("Done: ") {
        pb.inc(1);
    } else {
        pb.set_message(truncate_filename(message, 48));
    }
}

fn exit_code_for(outcome: &BatchOutcome) -> ExitCode {
    if outcome.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_JOB_FAILED)
    }
}

fn list(source: PathBuf, output: PathBuf) -> Result<ExitCode> {
    let converter = BatchConverter::with_ffmpeg(ConverterConfig::new(&source, &output))
        .context("Failed to prepare conversion directories")?;
    let files = converter.list_eligible_files();
    let source = converter.source_dir();

    if files.is_empty() {
        println!("No video files found in {}", source.display());
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} video files in {}:", files.len(), source.display());
    for file in &files {
        println!("  {} {}", style("•").cyan(), file.file_name);
    }
    Ok(ExitCode::SUCCESS)
}

fn presets() {
    println!(
        "{:<8} {:>5} {:>7} {:>7} {:>9}",
        "preset", "fps", "scale", "colors", "optimize"
    );
    for quality in Quality::ALL {
        let p = quality.profile();
        let name = if quality == Quality::default() {
            format!("{}*", quality)
        } else {
            quality.to_string()
        };
        println!(
            "{:<8} {:>5} {:>7.2} {:>7} {:>9}",
            style(name).bold(),
            p.frame_rate,
            p.scale,
            p.palette_size,
            p.optimize
        );
    }
    println!("\n* default, and the fallback for unknown names");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_global_log_dir_and_policy() {
        let cli = Cli::try_parse_from([
            "vid2gif",
            "run",
            "--on-collision",
            "fail",
            "--log-dir",
            "/tmp/vid2gif-logs",
        ])
        .unwrap();
        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/vid2gif-logs")));
        match cli.command {
            Commands::Run { on_collision, .. } => assert_eq!(on_collision, CollisionPolicy::Fail),
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_creates_directories_before_tool_check() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("start");
        let output = temp.path().join("finish");

        // With or without ffmpeg on PATH, the directories exist afterwards.
        let _ = run(RunArgs {
            source: source.clone(),
            output: output.clone(),
            quality: "low".to_string(),
            on_collision: CollisionPolicy::Rename,
            report: None,
            no_progress: true,
        });

        assert!(source.is_dir());
        assert!(output.is_dir());
    }
}
