//! Domain normalization.
//!
//! Raw inventory rows are turned into canonical `https://{domain}/` URLs,
//! deduplicated and sorted so every later stage sees the same processing
//! order from run to run.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{LogoMatchError, Result};

/// A normalized hostname. Identity key for every stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    /// Parse a raw inventory value into a domain.
    ///
    /// Accepts bare hostnames as well as already canonical URLs, so that
    /// normalizing a normalized list is a no-op.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        let host = without_scheme.trim_end_matches('/').to_lowercase();

        if host.is_empty() || host.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(LogoMatchError::InvalidDomain(raw.to_string()));
        }

        Ok(Self(host))
    }

    /// Build the domain used to key assets for an arbitrary page URL.
    pub fn from_url(url: &Url) -> Result<Self> {
        url.host_str()
            .ok_or_else(|| LogoMatchError::InvalidDomain(url.to_string()))
            .and_then(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical `https://{domain}/` URL for this domain.
    pub fn canonical_url(&self) -> Result<Url> {
        Url::parse(&format!("https://{}/", self.0))
            .map_err(|e| LogoMatchError::InvalidDomain(format!("{}: {e}", self.0)))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A domain together with the URL its page is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSite {
    pub domain: Domain,
    pub url: Url,
}

impl CanonicalSite {
    pub fn new(domain: Domain) -> Result<Self> {
        let url = domain.canonical_url()?;
        Ok(Self { domain, url })
    }

    /// Pair a domain with an explicit URL (non-default port, local mirror).
    pub fn with_url(domain: Domain, url: Url) -> Self {
        Self { domain, url }
    }
}

impl fmt::Display for CanonicalSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Turn raw inventory rows into a sorted, duplicate-free list of sites.
///
/// Rows that cannot be parsed are logged and skipped.
pub fn normalize_domains<I, S>(rows: I) -> Vec<CanonicalSite>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sites: BTreeMap<String, CanonicalSite> = BTreeMap::new();

    for row in rows {
        let row = row.as_ref();
        let site = match Domain::parse(row).and_then(CanonicalSite::new) {
            Ok(site) => site,
            Err(e) => {
                warn!(row = %row, error = %e, "Skipping inventory row");
                continue;
            }
        };
        sites.entry(site.url.to_string()).or_insert(site);
    }

    debug!(count = sites.len(), "Normalized domains");
    sites.into_values().collect()
}
