//! Remote asset host integration.
//!
//! Binary media and a mirror of each asset's tags live on a third-party host,
//! keyed by `assetId`. The local store owns the metadata. The two are never
//! updated transactionally; [`sync`] defines how they are reconciled.

pub mod reimage;
pub mod sync;

use async_trait::async_trait;
use thiserror::Error;

pub use reimage::ReImageClient;

/// Errors emitted by the remote asset host.
#[derive(Debug, Error)]
pub enum AssetHostError {
    #[error("asset host is not configured: {0}")]
    NotConfigured(String),

    #[error("asset host transport error: {0}")]
    Transport(String),

    #[error("asset host error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("asset host parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AssetHostError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    pub url: String,
    pub asset_id: String,
}

#[async_trait]
pub trait AssetHost: Send + Sync {
    async fn upload(&self, upload: AssetUpload) -> Result<UploadedAsset, AssetHostError>;

    /// Replaces the full tag set of `asset_id`.
    async fn replace_tags(&self, asset_id: &str, tags: &[String]) -> Result<(), AssetHostError>;
}
