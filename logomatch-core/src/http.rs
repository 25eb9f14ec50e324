//! Shared HTTP client construction for the page renderer and asset store.

use std::time::Duration;

use reqwest::Client;

use crate::config::DEFAULT_USER_AGENT;
use crate::error::{LogoMatchError, Result};

/// Configuration for an HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

/// Build a reqwest client that follows redirects and honours the timeout.
pub fn build_client(config: &HttpClientConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| LogoMatchError::Config(format!("Failed to create HTTP client: {e}")))
}
