//! Page rendering seam.
//!
//! The locator only needs the page markup and the URL the page finally
//! resolved to. Anything able to produce that pair (a plain HTTP fetch, a
//! headless browser, a directory of saved pages) can drive the pipeline.

use std::collections::HashMap;

use async_trait::async_trait;
use url::Url;

use crate::error::{LogoMatchError, Result};

/// A rendered page: its markup and the base URL relative links resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
    pub base_url: Url,
}

/// Turns a URL into a rendered page.
///
/// Implementations must be thread-safe (`Send + Sync`). Any failure
/// (unreachable host, timeout, error status) is reported as
/// [`LogoMatchError::Render`]; the pipeline treats it as "no candidate".
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &Url) -> Result<RenderedPage>;
}

/// Renderer backed by an in-memory map of pages, for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticRenderer {
    pages: HashMap<String, RenderedPage>,
}

impl StaticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`, with `url` itself as the base.
    pub fn with_page(mut self, url: &Url, html: impl Into<String>) -> Self {
        self.insert(url, html, url.clone());
        self
    }

    /// Serve `html` for `url` as if the browser ended up at `base_url`.
    pub fn insert(&mut self, url: &Url, html: impl Into<String>, base_url: Url) {
        self.pages.insert(
            url.to_string(),
            RenderedPage {
                html: html.into(),
                base_url,
            },
        );
    }
}

#[async_trait]
impl PageRenderer for StaticRenderer {
    async fn render(&self, url: &Url) -> Result<RenderedPage> {
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| LogoMatchError::Render {
                url: url.to_string(),
                reason: "page not available".into(),
            })
    }
}

#[cfg(feature = "network")]
pub use network_impl::HttpRenderer;

#[cfg(feature = "network")]
mod network_impl {
    use async_trait::async_trait;
    use reqwest::Client;
    use tracing::debug;
    use url::Url;

    use super::{PageRenderer, RenderedPage};
    use crate::error::{LogoMatchError, Result};
    use crate::http::{build_client, HttpClientConfig};

    /// Fetches the served HTML over HTTP. Scripts are not executed, so logos
    /// injected client-side are invisible to this renderer.
    pub struct HttpRenderer {
        client: Client,
    }

    impl HttpRenderer {
        pub fn new(config: &HttpClientConfig) -> Result<Self> {
            Ok(Self {
                client: build_client(config)?,
            })
        }
    }

    #[async_trait]
    impl PageRenderer for HttpRenderer {
        async fn render(&self, url: &Url) -> Result<RenderedPage> {
            let failed = |reason: String| LogoMatchError::Render {
                url: url.to_string(),
                reason,
            };

            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| failed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(failed(format!("status {status}")));
            }

            let base_url = response.url().clone();
            let html = response.text().await.map_err(|e| failed(e.to_string()))?;
            if html.trim().is_empty() {
                return Err(failed("empty document".into()));
            }

            debug!(url = %url, base = %base_url, bytes = html.len(), "Rendered page");
            Ok(RenderedPage { html, base_url })
        }
    }
}
