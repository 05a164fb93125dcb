/*!
 * Command-line interface for snapfs
 */

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use snapfs::config::{Args, Config};
use snapfs::report::{ReportFormat, Reporter, SnapshotReport};
use snapfs::snapshot::Snapshot;
use snapfs::types::{SnapshotContext, SnapshotOutcome};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Snapshot failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> snapfs::Result<()> {
    let config = Config::from_args(args)?;
    let context = SnapshotContext {
        generated_at: Local::now().fixed_offset(),
        environment: config.environment.clone(),
    };

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template(" {pos}/{len} [{bar:40.cyan/blue}] {percent:>3}% {wide_msg:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let start_time = Instant::now();
    let outcome = Snapshot::new(&config.project_root, &config.snapshot)
        .with_progress(Arc::new(progress.clone()))
        .run(&context);
    progress.finish_and_clear();

    match outcome? {
        SnapshotOutcome::NoFilesMatched => {
            println!("⚠️ No files matched your include/exclude rules.");
        }
        SnapshotOutcome::Written {
            output,
            files,
            total_bytes,
            redactions,
        } => {
            let report = SnapshotReport {
                output_file: output.display().to_string(),
                duration: start_time.elapsed(),
                files,
                total_bytes,
                redactions,
                scrub_enabled: config.snapshot.scrub.enabled,
            };
            Reporter::new(ReportFormat::ConsoleTable).print_report(&report);
        }
    }

    Ok(())
}
