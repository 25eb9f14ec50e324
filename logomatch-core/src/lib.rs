//! Logomatch Core - group web domains that share a logo.
//!
//! The batch pipeline has four stages:
//!
//! 1. [`domain`] normalizes raw domain strings into sorted canonical URLs.
//! 2. [`locator`] picks the best logo reference out of a rendered page.
//! 3. [`render`] and [`fetch`] are the seams to the outside world: turning a
//!    URL into a page, and a logo reference into a file on disk.
//! 4. [`fingerprint`] and [`cluster`] hash every stored logo and group
//!    domains whose hashes are within a Hamming-distance threshold, closing
//!    similarity transitively.
//!
//! # Example
//!
//! ```no_run
//! use logomatch_core::{cluster_assets, ClusterOptions};
//!
//! # fn example() -> logomatch_core::Result<()> {
//! let report = cluster_assets("logos".as_ref(), &ClusterOptions::default())?;
//! for (idx, group) in report.groups.iter().enumerate() {
//!     println!("Group {}: {:?}", idx + 1, group.members);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod fingerprint;
#[cfg(feature = "network")]
pub mod http;
pub mod index;
pub mod inventory;
pub mod locator;
pub mod pipeline;
pub mod render;

// Re-export main types for convenience
pub use cluster::{
    cluster_fingerprints, ClusterOptions, ClusterReport, GraphStrategy, LogoGroup,
    SimilarityGraph, DEFAULT_THRESHOLD,
};
pub use config::PipelineConfig;
pub use domain::{normalize_domains, CanonicalSite, Domain};
pub use error::{LogoMatchError, Result};
pub use fetch::{AssetFetcher, MemoryAssetStore};
pub use fingerprint::{
    fingerprint_directory, Fingerprint, FingerprintSet, Fingerprinter, HashAlgorithm,
    SkippedAsset,
};
pub use inventory::load_inventory;
pub use locator::{locate_logo, LogoCandidate};
pub use pipeline::{
    cluster_assets, scrape_site, scrape_sites, DomainOutcome, DomainReport, ScrapeOptions,
    ScrapeSummary,
};
pub use render::{PageRenderer, RenderedPage, StaticRenderer};

// Network-dependent exports
#[cfg(feature = "network")]
pub use fetch::HttpAssetStore;
#[cfg(feature = "network")]
pub use http::HttpClientConfig;
#[cfg(feature = "network")]
pub use render::HttpRenderer;
