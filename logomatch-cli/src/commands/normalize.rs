//! Normalize command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use logomatch_core::{load_inventory, normalize_domains};
use tracing::info;

/// Execute the normalize command.
pub fn execute(inventory: PathBuf, quiet: bool) -> Result<()> {
    let rows = load_inventory(&inventory)
        .with_context(|| format!("Failed to load inventory: {}", inventory.display()))?;
    let sites = normalize_domains(&rows);

    info!(rows = rows.len(), sites = sites.len(), "Normalized inventory");

    for site in &sites {
        println!("{site}");
    }

    let dropped = rows.len() - sites.len();
    if !quiet && dropped > 0 {
        eprintln!(
            "{}",
            format!("{dropped} duplicate or invalid rows dropped").yellow()
        );
    }
    Ok(())
}
