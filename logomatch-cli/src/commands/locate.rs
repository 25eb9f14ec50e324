//! Locate command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use logomatch_core::locate_logo;
use tracing::info;
use url::Url;

/// Execute the locate command.
pub fn execute(html: PathBuf, base_url: Url, quiet: bool) -> Result<()> {
    let page = std::fs::read_to_string(&html)
        .with_context(|| format!("Failed to read file: {}", html.display()))?;

    match locate_logo(&page, &base_url) {
        Some(candidate) => {
            info!(candidate = %candidate, fetchable = candidate.is_fetchable(), "Located logo");
            println!("{candidate}");
        }
        None => {
            info!(page = %html.display(), "No logo candidate");
            if !quiet {
                eprintln!("{}", "No logo candidate found".yellow());
            }
        }
    }
    Ok(())
}
