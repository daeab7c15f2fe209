//! HTTP client for the ReImage asset host.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Url,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{AssetHost, AssetHostError, AssetUpload, UploadedAsset};
use crate::config::AssetHostConfig;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    original: String,
    object_id: String,
}

#[derive(Clone)]
pub struct ReImageClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    sync_timeout: Duration,
    upload_timeout: Duration,
}

impl ReImageClient {
    pub fn new(config: &AssetHostConfig) -> Result<Self, AssetHostError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            sync_timeout: Duration::from_secs(config.sync_timeout_secs),
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
        })
    }

    fn token(&self) -> Result<&str, AssetHostError> {
        self.token
            .as_deref()
            .ok_or_else(|| AssetHostError::NotConfigured("ASSET_HOST_TOKEN is not set".to_string()))
    }

    /// `{base}/tag/{asset_id}` with the id escaped as a single path segment.
    fn tag_url(&self, asset_id: &str) -> Result<Url, AssetHostError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AssetHostError::NotConfigured(format!("invalid ASSET_HOST_URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| AssetHostError::NotConfigured("ASSET_HOST_URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("tag")
            .push(asset_id);
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AssetHostError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(AssetHostError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AssetHost for ReImageClient {
    async fn upload(&self, upload: AssetUpload) -> Result<UploadedAsset, AssetHostError> {
        let token = self.token()?;

        let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| AssetHostError::Parse(e.to_string()))?;
        }
        let form = Form::new()
            .part("file", part)
            .text("tags", upload.tags.join(","));

        let response = self
            .http
            .post(format!("{}/upload/", self.base_url))
            .bearer_auth(token)
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await?;

        let body: UploadResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AssetHostError::Parse(e.to_string()))?;

        debug!(asset_id = %body.object_id, "Asset uploaded");

        Ok(UploadedAsset {
            url: body.original,
            asset_id: body.object_id,
        })
    }

    async fn replace_tags(&self, asset_id: &str, tags: &[String]) -> Result<(), AssetHostError> {
        let token = self.token()?;
        let url = self.tag_url(asset_id)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .timeout(self.sync_timeout)
            .json(&json!({ "tags": tags }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_missing_token_is_not_configured() {
        let mut config = Config::default_for_testing().asset_host;
        config.token = None;
        let client = ReImageClient::new(&config).unwrap();

        let err = client
            .replace_tags("asset-1", &["a".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AssetHostError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on loopback refuses connections.
        let config = Config::default_for_testing().asset_host;
        let client = ReImageClient::new(&config).unwrap();

        let err = client
            .replace_tags("asset-1", &["a".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AssetHostError::Transport(_)));
    }

    #[test]
    fn test_tag_url_escapes_asset_id() {
        let mut config = Config::default_for_testing().asset_host;
        config.base_url = "https://api.example.test/v1/".to_string();
        let client = ReImageClient::new(&config).unwrap();

        assert_eq!(
            client.tag_url("asset-1").unwrap().as_str(),
            "https://api.example.test/v1/tag/asset-1"
        );
        assert_eq!(
            client.tag_url("abc?x=1/y#z").unwrap().as_str(),
            "https://api.example.test/v1/tag/abc%3Fx=1%2Fy%23z"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let mut config = Config::default_for_testing().asset_host;
        config.base_url = "https://api.example.test/".to_string();
        let client = ReImageClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://api.example.test");
    }
}
