//! Scrape command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use logomatch_core::{
    load_inventory, normalize_domains, scrape_sites, DomainOutcome, HttpAssetStore, HttpRenderer,
    PipelineConfig, ScrapeSummary,
};
use tracing::info;

use crate::utils::load_config;
use crate::ScrapeArgs;

/// Execute the scrape command.
pub async fn execute(
    inventory: PathBuf,
    assets: Option<PathBuf>,
    args: ScrapeArgs,
    quiet: bool,
) -> Result<ScrapeSummary> {
    let config = load_config(assets, Some(&args), None)?;
    scrape(&inventory, &config, quiet).await
}

/// Load, normalize and scrape an inventory with the HTTP collaborators.
pub async fn scrape(
    inventory: &std::path::Path,
    config: &PipelineConfig,
    quiet: bool,
) -> Result<ScrapeSummary> {
    let rows = load_inventory(inventory)
        .with_context(|| format!("Failed to load inventory: {}", inventory.display()))?;
    let sites = normalize_domains(&rows);
    info!(sites = sites.len(), asset_dir = %config.asset_dir.display(), "Scraping");

    let renderer = HttpRenderer::new(&config.page_client())?;
    let fetcher = HttpAssetStore::new(&config.asset_client(), &config.asset_dir, &config.referer)?;

    let summary = scrape_sites(&sites, &renderer, &fetcher, &config.scrape_options()).await;

    if !quiet {
        for report in &summary.reports {
            println!("{:<40} {}", report.domain.as_str(), describe(&report.outcome));
        }
        println!();
        println!(
            "{} {} sites, {} with logo, {} failed",
            "Scraped:".bold(),
            summary.total(),
            summary.with_asset(),
            summary.failures()
        );
    }

    Ok(summary)
}

fn describe(outcome: &DomainOutcome) -> String {
    match outcome {
        DomainOutcome::Saved { path, .. } => format!("{} {}", "saved".green(), path.display()),
        DomainOutcome::AlreadyPresent { path } => {
            format!("{} {}", "kept".green(), path.display())
        }
        DomainOutcome::InlineVector => "inline SVG logo".dimmed().to_string(),
        DomainOutcome::NoCandidate => "no logo found".dimmed().to_string(),
        DomainOutcome::Unfetchable { candidate } => {
            format!("{} {}", "unfetchable".yellow(), candidate)
        }
        DomainOutcome::RenderFailed { reason } => format!("{} {}", "render failed:".red(), reason),
        DomainOutcome::FetchFailed { reason, .. } => {
            format!("{} {}", "fetch failed:".red(), reason)
        }
    }
}
