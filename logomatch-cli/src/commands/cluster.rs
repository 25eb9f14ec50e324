//! Cluster command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use logomatch_core::{cluster_assets, ClusterReport, PipelineConfig};
use tracing::info;

use crate::utils::{load_config, print_report};
use crate::ClusterArgs;

/// Execute the cluster command.
pub fn execute(assets: Option<PathBuf>, args: ClusterArgs, quiet: bool) -> Result<()> {
    let config = load_config(assets, None, Some(&args))?;
    let report = cluster(&config)?;
    print_report(&report, args.format, quiet)
}

/// Fingerprint the configured asset directory and group the domains.
pub fn cluster(config: &PipelineConfig) -> Result<ClusterReport> {
    let report = cluster_assets(&config.asset_dir, &config.cluster).with_context(|| {
        format!("Failed to cluster assets in {}", config.asset_dir.display())
    })?;

    info!(
        groups = report.group_count(),
        shared = report.shared_groups().count(),
        "Cluster report ready"
    );
    Ok(report)
}
