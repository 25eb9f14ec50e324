//! Run command implementation: scrape, then cluster.

use std::path::PathBuf;

use anyhow::Result;

use crate::commands::{cluster, scrape};
use crate::utils::{load_config, print_report};
use crate::{ClusterArgs, ScrapeArgs};

/// Execute the run command.
pub async fn execute(
    inventory: PathBuf,
    assets: Option<PathBuf>,
    scrape_args: ScrapeArgs,
    cluster_args: ClusterArgs,
    quiet: bool,
) -> Result<()> {
    let config = load_config(assets, Some(&scrape_args), Some(&cluster_args))?;

    scrape::scrape(&inventory, &config, quiet).await?;
    if !quiet {
        println!();
    }

    let report = cluster::cluster(&config)?;
    print_report(&report, cluster_args.format, quiet)
}
