//! Asset retrieval and persistence.
//!
//! A fetcher resolves a [`LogoCandidate`] to bytes and writes them to the
//! asset directory as `{domain}.png` or `{domain}.jpg`. That file layout is
//! the only contract the fingerprint engine relies on.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::ImageFormat;
use tracing::debug;

use crate::domain::Domain;
use crate::error::{LogoMatchError, Result};
use crate::fingerprint::ASSET_EXTENSIONS;
use crate::locator::LogoCandidate;

/// Retrieves a candidate's bytes and persists them for a domain.
///
/// Inline-vector candidates and `data:` URIs are refused with
/// [`LogoMatchError::UnfetchableReference`].
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, candidate: &LogoCandidate, domain: &Domain) -> Result<PathBuf>;
}

/// Pick the file extension for a payload: `jpg` for JPEG data, `png` otherwise.
pub fn sniff_extension(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => "jpg",
        _ => "png",
    }
}

/// Path of the asset for `domain` with the given extension.
pub fn asset_path(dir: &Path, domain: &Domain, extension: &str) -> PathBuf {
    dir.join(format!("{domain}.{extension}"))
}

/// The asset already stored for `domain`, if any.
pub fn existing_asset(dir: &Path, domain: &Domain) -> Option<PathBuf> {
    ASSET_EXTENSIONS
        .iter()
        .map(|ext| asset_path(dir, domain, ext))
        .find(|path| path.is_file())
}

/// Write `bytes` as the asset for `domain`, replacing any previous asset.
pub async fn persist_asset(dir: &Path, domain: &Domain, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let extension = sniff_extension(bytes);
    for stale in ASSET_EXTENSIONS.iter().filter(|ext| **ext != extension) {
        let path = asset_path(dir, domain, stale);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tokio::fs::remove_file(&path).await?;
        }
    }

    let path = asset_path(dir, domain, extension);
    tokio::fs::write(&path, bytes).await?;
    debug!(domain = %domain, path = %path.display(), bytes = bytes.len(), "Persisted asset");
    Ok(path)
}

fn fetchable_url(candidate: &LogoCandidate) -> Result<&url::Url> {
    match candidate {
        LogoCandidate::Remote { url } if candidate.is_fetchable() => Ok(url),
        other => Err(LogoMatchError::UnfetchableReference(other.to_string())),
    }
}

/// Fetcher serving bytes from memory, keyed by URL. Used in tests and for
/// replaying previously downloaded assets.
#[derive(Debug, Clone)]
pub struct MemoryAssetStore {
    asset_dir: PathBuf,
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssetStore {
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            assets: HashMap::new(),
        }
    }

    pub fn with_asset(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.assets.insert(url.to_string(), bytes);
        self
    }
}

#[async_trait]
impl AssetFetcher for MemoryAssetStore {
    async fn fetch(&self, candidate: &LogoCandidate, domain: &Domain) -> Result<PathBuf> {
        let url = fetchable_url(candidate)?;
        let bytes = self.assets.get(url.as_str()).ok_or_else(|| LogoMatchError::Fetch {
            url: url.to_string(),
            reason: "not found".into(),
        })?;
        persist_asset(&self.asset_dir, domain, bytes).await
    }
}

#[cfg(feature = "network")]
pub use network_impl::HttpAssetStore;

#[cfg(feature = "network")]
mod network_impl {
    use std::path::PathBuf;

    use async_trait::async_trait;
    use reqwest::header::REFERER;
    use reqwest::{Client, StatusCode};
    use tracing::debug;

    use super::{fetchable_url, persist_asset, AssetFetcher};
    use crate::domain::Domain;
    use crate::error::{LogoMatchError, Result};
    use crate::http::{build_client, HttpClientConfig};
    use crate::locator::LogoCandidate;

    /// Downloads candidates over HTTP into an asset directory.
    pub struct HttpAssetStore {
        client: Client,
        asset_dir: PathBuf,
        referer: String,
    }

    impl HttpAssetStore {
        pub fn new(
            config: &HttpClientConfig,
            asset_dir: impl Into<PathBuf>,
            referer: impl Into<String>,
        ) -> Result<Self> {
            Ok(Self {
                client: build_client(config)?,
                asset_dir: asset_dir.into(),
                referer: referer.into(),
            })
        }

        pub fn asset_dir(&self) -> &std::path::Path {
            &self.asset_dir
        }
    }

    #[async_trait]
    impl AssetFetcher for HttpAssetStore {
        async fn fetch(&self, candidate: &LogoCandidate, domain: &Domain) -> Result<PathBuf> {
            let url = fetchable_url(candidate)?;
            let failed = |reason: String| LogoMatchError::Fetch {
                url: url.to_string(),
                reason,
            };

            let response = self
                .client
                .get(url.clone())
                .header(REFERER, &self.referer)
                .send()
                .await
                .map_err(|e| failed(e.to_string()))?;

            let status = response.status();
            debug!(url = %url, status = %status, "Received asset response");
            if status != StatusCode::OK {
                return Err(failed(format!("status {status}")));
            }

            let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
            if bytes.is_empty() {
                return Err(failed("empty body".into()));
            }

            persist_asset(&self.asset_dir, domain, &bytes).await
        }
    }
}
