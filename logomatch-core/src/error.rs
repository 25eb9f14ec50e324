use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogoMatchError {
    #[error("Invalid domain: {0:?}")]
    InvalidDomain(String),

    #[error("Inventory error: {0}")]
    Inventory(String),

    #[error("Render failed for {url}: {reason}")]
    Render { url: String, reason: String },

    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Reference is not fetchable: {0}")]
    UnfetchableReference(String),

    #[error("Fingerprint error: {0}")]
    Fingerprint(String),

    #[error("Asset directory not found: {}", .0.display())]
    MissingAssetDirectory(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogoMatchError {
    /// Whether this error should abort the whole batch rather than a single domain.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Inventory(_) | Self::MissingAssetDirectory(_) | Self::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LogoMatchError>;
