//! Pipeline configuration.
//!
//! Loaded from environment variables with sensible defaults; command-line
//! flags override individual fields afterwards.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::cluster::{ClusterOptions, GraphStrategy, DEFAULT_THRESHOLD};
use crate::error::{LogoMatchError, Result};
use crate::fingerprint::{HashAlgorithm, FINGERPRINT_BITS};
use crate::pipeline::ScrapeOptions;

/// Browser-like User-Agent; many sites refuse or strip pages for unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Referer sent with asset downloads; some CDNs reject hotlinks without one.
pub const DEFAULT_REFERER: &str = "https://www.google.com/";

/// Full configuration of a batch run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding one logo file per domain (default: logos)
    pub asset_dir: PathBuf,
    /// Clustering parameters (default: phash, threshold 5, exhaustive)
    pub cluster: ClusterOptions,
    /// Sites scraped concurrently (default: 4)
    pub concurrency: usize,
    /// Keep assets from earlier runs instead of overwriting (default: false)
    pub skip_existing: bool,
    /// Page fetch timeout (default: 15s)
    pub page_timeout: Duration,
    /// Asset download timeout (default: 7s)
    pub fetch_timeout: Duration,
    /// User-Agent for all requests
    pub user_agent: String,
    /// Referer sent with asset downloads
    pub referer: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("logos"),
            cluster: ClusterOptions::default(),
            concurrency: 4,
            skip_existing: false,
            page_timeout: Duration::from_secs(15),
            fetch_timeout: Duration::from_secs(7),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: DEFAULT_REFERER.to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable environment value");
            None
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `LOGOMATCH_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let asset_dir = std::env::var("LOGOMATCH_ASSET_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.asset_dir);

        let cluster = ClusterOptions {
            threshold: env_parse("LOGOMATCH_THRESHOLD").unwrap_or(DEFAULT_THRESHOLD),
            algorithm: env_parse::<HashAlgorithm>("LOGOMATCH_ALGORITHM").unwrap_or_default(),
            strategy: env_parse::<GraphStrategy>("LOGOMATCH_STRATEGY").unwrap_or_default(),
        };

        let page_timeout = env_parse("LOGOMATCH_PAGE_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.page_timeout);

        let fetch_timeout = env_parse("LOGOMATCH_FETCH_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.fetch_timeout);

        Self {
            asset_dir,
            cluster,
            concurrency: env_parse("LOGOMATCH_CONCURRENCY").unwrap_or(defaults.concurrency),
            skip_existing: defaults.skip_existing,
            page_timeout,
            fetch_timeout,
            user_agent: std::env::var("LOGOMATCH_USER_AGENT").unwrap_or(defaults.user_agent),
            referer: defaults.referer,
        }
    }

    /// Reject values no run can use.
    pub fn validate(&self) -> Result<()> {
        if self.cluster.threshold > FINGERPRINT_BITS {
            return Err(LogoMatchError::Config(format!(
                "threshold {} exceeds fingerprint size of {FINGERPRINT_BITS} bits",
                self.cluster.threshold
            )));
        }
        if self.concurrency == 0 {
            return Err(LogoMatchError::Config("concurrency must be at least 1".into()));
        }
        if self.page_timeout.is_zero() || self.fetch_timeout.is_zero() {
            return Err(LogoMatchError::Config("timeouts must be non-zero".into()));
        }
        Ok(())
    }

    pub fn scrape_options(&self) -> ScrapeOptions {
        ScrapeOptions {
            asset_dir: self.asset_dir.clone(),
            concurrency: self.concurrency,
            skip_existing: self.skip_existing,
        }
    }

    #[cfg(feature = "network")]
    pub fn page_client(&self) -> crate::http::HttpClientConfig {
        crate::http::HttpClientConfig {
            timeout: self.page_timeout,
            user_agent: self.user_agent.clone(),
        }
    }

    #[cfg(feature = "network")]
    pub fn asset_client(&self) -> crate::http::HttpClientConfig {
        crate::http::HttpClientConfig {
            timeout: self.fetch_timeout,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.asset_dir, PathBuf::from("logos"));
        assert_eq!(config.cluster.threshold, 5);
        assert_eq!(config.cluster.algorithm, HashAlgorithm::PHash);
        assert_eq!(config.cluster.strategy, GraphStrategy::Exhaustive);
        assert_eq!(config.fetch_timeout, Duration::from_secs(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PipelineConfig::default();
        config.cluster.threshold = 65;
        assert!(matches!(config.validate(), Err(LogoMatchError::Config(_))));

        let config = PipelineConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_fatal());

        let config = PipelineConfig {
            page_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_of_64_is_allowed() {
        let mut config = PipelineConfig::default();
        config.cluster.threshold = 64;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scrape_options_follow_config() {
        let config = PipelineConfig {
            asset_dir: PathBuf::from("/tmp/assets"),
            concurrency: 1,
            skip_existing: true,
            ..Default::default()
        };
        let options = config.scrape_options();
        assert_eq!(options.asset_dir, PathBuf::from("/tmp/assets"));
        assert_eq!(options.concurrency, 1);
        assert!(options.skip_existing);
        assert!(!PipelineConfig::default().scrape_options().skip_existing);
    }
}
