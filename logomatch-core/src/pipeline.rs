//! Batch orchestration.
//!
//! [`scrape_sites`] drives render -> locate -> fetch for every site and
//! contains every failure to the domain it happened on. [`cluster_assets`]
//! runs the fingerprint and clustering engine over the resulting directory.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cluster::{cluster_fingerprints, ClusterOptions, ClusterReport};
use crate::domain::{CanonicalSite, Domain};
use crate::error::{LogoMatchError, Result};
use crate::fetch::{existing_asset, AssetFetcher};
use crate::fingerprint::{fingerprint_directory, Fingerprinter};
use crate::locator::{locate_logo, LogoCandidate};
use crate::render::PageRenderer;

/// What happened to one domain during scraping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DomainOutcome {
    /// Asset downloaded and written.
    Saved { candidate: String, path: PathBuf },
    /// An asset from an earlier run was kept.
    AlreadyPresent { path: PathBuf },
    /// The logo is inline SVG; nothing to download.
    InlineVector,
    /// The page had no logo candidate.
    NoCandidate,
    /// The candidate cannot be downloaded (e.g. a `data:` URI).
    Unfetchable { candidate: String },
    RenderFailed { reason: String },
    FetchFailed { candidate: String, reason: String },
}

impl DomainOutcome {
    /// Whether the domain has a persisted asset after this run.
    pub fn has_asset(&self) -> bool {
        matches!(self, Self::Saved { .. } | Self::AlreadyPresent { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::RenderFailed { .. } | Self::FetchFailed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainReport {
    pub domain: Domain,
    pub outcome: DomainOutcome,
}

/// Per-domain outcomes of a scrape, sorted by domain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeSummary {
    pub reports: Vec<DomainReport>,
}

impl ScrapeSummary {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn with_asset(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.has_asset()).count()
    }

    pub fn failures(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_failure()).count()
    }

    pub fn outcome(&self, domain: &Domain) -> Option<&DomainOutcome> {
        self.reports
            .iter()
            .find(|r| &r.domain == domain)
            .map(|r| &r.outcome)
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub asset_dir: PathBuf,
    /// Sites processed at once; 1 is strictly sequential.
    pub concurrency: usize,
    /// Keep assets persisted by an earlier run instead of fetching again.
    /// Off by default, so re-runs overwrite.
    pub skip_existing: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("logos"),
            concurrency: 4,
            skip_existing: false,
        }
    }
}

/// Render, locate and fetch the logo for one site.
pub async fn scrape_site(
    site: &CanonicalSite,
    renderer: &dyn PageRenderer,
    fetcher: &dyn AssetFetcher,
    options: &ScrapeOptions,
) -> DomainReport {
    let outcome = scrape_outcome(site, renderer, fetcher, options).await;

    match &outcome {
        DomainOutcome::Saved { candidate, .. } => {
            info!(domain = %site.domain, candidate = %candidate, "Saved logo")
        }
        DomainOutcome::RenderFailed { reason } => {
            warn!(domain = %site.domain, reason = %reason, "Render failed")
        }
        DomainOutcome::FetchFailed { candidate, reason } => {
            warn!(domain = %site.domain, candidate = %candidate, reason = %reason, "Fetch failed")
        }
        other => debug!(domain = %site.domain, outcome = ?other, "Scraped site"),
    }

    DomainReport {
        domain: site.domain.clone(),
        outcome,
    }
}

async fn scrape_outcome(
    site: &CanonicalSite,
    renderer: &dyn PageRenderer,
    fetcher: &dyn AssetFetcher,
    options: &ScrapeOptions,
) -> DomainOutcome {
    if options.skip_existing {
        if let Some(path) = existing_asset(&options.asset_dir, &site.domain) {
            return DomainOutcome::AlreadyPresent { path };
        }
    }

    let page = match renderer.render(&site.url).await {
        Ok(page) => page,
        Err(e) => {
            return DomainOutcome::RenderFailed {
                reason: e.to_string(),
            }
        }
    };

    let candidate = match locate_logo(&page.html, &page.base_url) {
        None => return DomainOutcome::NoCandidate,
        Some(LogoCandidate::InlineSvg { .. }) => return DomainOutcome::InlineVector,
        Some(candidate) => candidate,
    };

    match fetcher.fetch(&candidate, &site.domain).await {
        Ok(path) => DomainOutcome::Saved {
            candidate: candidate.to_string(),
            path,
        },
        Err(LogoMatchError::UnfetchableReference(_)) => DomainOutcome::Unfetchable {
            candidate: candidate.to_string(),
        },
        Err(e) => DomainOutcome::FetchFailed {
            candidate: candidate.to_string(),
            reason: e.to_string(),
        },
    }
}

/// Scrape every site, at most `options.concurrency` at a time.
///
/// Never fails as a whole: each domain's outcome is reported individually.
pub async fn scrape_sites(
    sites: &[CanonicalSite],
    renderer: &dyn PageRenderer,
    fetcher: &dyn AssetFetcher,
    options: &ScrapeOptions,
) -> ScrapeSummary {
    let mut reports: Vec<DomainReport> = stream::iter(sites)
        .map(|site| scrape_site(site, renderer, fetcher, options))
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;
    reports.sort_by(|a, b| a.domain.cmp(&b.domain));

    let summary = ScrapeSummary { reports };
    info!(
        sites = summary.total(),
        with_asset = summary.with_asset(),
        failures = summary.failures(),
        "Scrape finished"
    );
    summary
}

/// Fingerprint every asset in `dir` and group the domains.
pub fn cluster_assets(dir: &Path, options: &ClusterOptions) -> Result<ClusterReport> {
    let hasher = Fingerprinter::new(options.algorithm);
    let set = fingerprint_directory(dir, &hasher)?;
    Ok(cluster_fingerprints(&set, options))
}
