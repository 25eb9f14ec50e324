//! Common utility functions shared across CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use logomatch_core::{ClusterReport, PipelineConfig};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{ClusterArgs, OutputFormat, ScrapeArgs};

/// Install the tracing subscriber. Logs go to stderr; stdout carries results.
///
/// `RUST_LOG` overrides the level picked from the flags.
pub fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "logomatch_core=debug,logomatch=debug"
    } else if quiet {
        "error"
    } else {
        "logomatch_core=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

/// Environment configuration with command-line overrides applied.
pub fn load_config(
    assets: Option<PathBuf>,
    scrape: Option<&ScrapeArgs>,
    cluster: Option<&ClusterArgs>,
) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::from_env();

    if let Some(dir) = assets {
        config.asset_dir = dir;
    }
    if let Some(args) = scrape {
        if let Some(n) = args.concurrency {
            config.concurrency = n;
        }
        if args.skip_existing {
            config.skip_existing = true;
        }
        if let Some(secs) = args.page_timeout {
            config.page_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = args.fetch_timeout {
            config.fetch_timeout = Duration::from_secs(secs);
        }
    }
    if let Some(args) = cluster {
        if let Some(threshold) = args.threshold {
            config.cluster.threshold = threshold;
        }
        if let Some(algorithm) = args.algorithm {
            config.cluster.algorithm = algorithm;
        }
        if let Some(strategy) = args.strategy {
            config.cluster.strategy = strategy;
        }
    }

    config.validate()?;
    debug!(?config, "Loaded configuration");
    Ok(config)
}

/// `Group N: a, b, c` lines, numbered from 1 in report order.
pub fn group_lines(report: &ClusterReport) -> Vec<String> {
    report
        .groups
        .iter()
        .enumerate()
        .map(|(idx, group)| {
            let members: Vec<&str> = group.members.iter().map(|d| d.as_str()).collect();
            format!("Group {}: {}", idx + 1, members.join(", "))
        })
        .collect()
}

/// Print a cluster report to stdout.
pub fn print_report(report: &ClusterReport, format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(report).context("Failed to serialize report")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            if !quiet {
                println!(
                    "{} {} ({} {}, threshold {})",
                    "Fingerprints:".dimmed(),
                    report.fingerprint_count,
                    report.algorithm,
                    report.strategy,
                    report.threshold
                );
                println!("{} {}", "Nodes:".dimmed(), report.node_count);
                println!("{} {}", "Edges:".dimmed(), report.edge_count);
                for skipped in &report.skipped {
                    println!(
                        "{} {} ({})",
                        "Skipped:".yellow(),
                        skipped.file,
                        skipped.reason
                    );
                }
                println!();
            }
            for line in group_lines(report) {
                println!("{line}");
            }
            if !quiet {
                println!();
                println!("{} {}", "Total groups:".bold(), report.group_count());
            }
        }
    }
    Ok(())
}
