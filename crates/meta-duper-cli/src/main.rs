mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, SourceArgs};
use dotenv::dotenv;
use meta_duper_core::metadata::SidecarFormat;
use meta_duper_core::{audit_log, config, removal, AppConfig, DedupeEngine, DedupeReport};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    if let Some(Commands::InitConfig) = args.command {
        if config::write_default_if_missing(&args.config)? {
            println!("Wrote default configuration to {}", args.config.display());
        } else {
            println!("{} already exists", args.config.display());
        }
        return Ok(());
    }

    let config = match config::load_configuration(&args.config) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    match args.command {
        Some(Commands::Scan(source)) => {
            run_scan(&config, &source)?;
        }
        Some(Commands::Resolve {
            source,
            delete,
            dry_run,
            yes,
        }) => {
            let deleting = delete || config.delete_on_resolve;
            if deleting {
                commands::check_delete_args(&source, dry_run, yes).map_err(anyhow::Error::msg)?;
            }
            let report = run_scan(&config, &source)?;
            if deleting {
                run_removal(&config, &source.path, &report, dry_run, yes)?;
            } else {
                info!("Deletion disabled; set delete_on_resolve or pass --delete");
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
        }
        Some(Commands::InitConfig) => {}
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_scan(config: &AppConfig, source: &SourceArgs) -> Result<DedupeReport> {
    let engine = DedupeEngine::new(config.clone(), &source.path);
    let candidate_source = source.candidate_source();
    info!("Searching duplicates from {}", candidate_source);

    let reporter = CliReporter::new();
    let report = engine
        .scan(&candidate_source, &reporter)
        .with_context(|| format!("Duplicate search failed for {}", candidate_source))?;

    print_report(&report, &engine.sidecar_format());

    if config.log_write_enabled {
        let log_path = source.path.join(&config.audit_log_path);
        audit_log::write_audit_log(&log_path, &report)
            .with_context(|| format!("Failed to write audit log {}", log_path.display()))?;
    }

    for conflict in &report.resolution.conflicts {
        warn!(
            "Candidate {} is in two clusters: {} and {}",
            conflict.index, conflict.existing, conflict.conflicting
        );
    }

    Ok(report)
}

fn print_report(report: &DedupeReport, format: &SidecarFormat) {
    let kept = report.kept_names();
    let removed = report.removed_names();

    println!(
        "\nKeep following records, count {}",
        format!("{}", kept.len()).green()
    );
    for name in &kept {
        println!("{}", format.recording_stem(name));
    }

    println!(
        "\nTo be removed records, count {}",
        format!("{}", removed.len()).red()
    );
    for name in &removed {
        println!("{}", format.recording_stem(name).red());
    }

    info!(
        "{} candidates, {} clusters, {} skipped by pattern, done in {}",
        report.candidates.len(),
        format!("{}", report.clusters.len()).cyan(),
        report.candidates.skipped().len(),
        format!("{:.2}s", report.duration.as_secs_f64()).green(),
    );
}

fn run_removal(
    config: &AppConfig,
    root: &Path,
    report: &DedupeReport,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let removed = report.removed_names();
    if removed.is_empty() {
        println!("No duplicates to remove.");
        return Ok(());
    }

    if !dry_run && !yes {
        let prompt = format!(
            "Are you SURE you want to permanently delete {} recordings?",
            removed.len()
        );
        if !prompt_confirm(&prompt, Some(false))? {
            println!("Nothing deleted.");
            return Ok(());
        }
    }

    let format = SidecarFormat::from_config(config);
    let summary = removal::execute_removal(root, report, &format, dry_run)?;

    for path in &summary.removed {
        if summary.dry_run {
            println!("   [dry-run] DELETE {}", path.display());
        } else {
            println!("   Deleted {}", path.display());
        }
    }
    for (path, err) in &summary.failed {
        eprintln!("   Failed to delete {}: {}", path.display(), err);
    }
    info!(
        "{} files {} at {}, {} failures",
        summary.removed.len(),
        if summary.dry_run { "would be deleted" } else { "deleted" },
        summary.executed_at.to_rfc3339(),
        summary.failed.len()
    );

    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
