use anyhow::{Context, Result, bail};
use hmac::{Hmac, Mac};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use crate::config::CdnConfig;

type HmacSha256 = Hmac<Sha256>;

/// Parameters covered by an upload signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadParams {
    pub folder: String,
    pub timestamp: i64,
    pub transformation: String,
}

impl UploadParams {
    /// `key=value` pairs sorted by key and joined with `&`.
    #[must_use]
    pub fn canonical(&self) -> String {
        let mut pairs = [
            ("folder", self.folder.clone()),
            ("timestamp", self.timestamp.to_string()),
            ("transformation", self.transformation.clone()),
        ];
        pairs.sort_by_key(|(k, _)| *k);
        pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Hex HMAC-SHA256 of the canonical parameter string.
pub fn sign(secret: &str, params: &UploadParams) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid signing key: {e}"))?;
    mac.update(params.canonical().as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Clone)]
pub struct CdnClient {
    client: Client,
    upload_url: String,
    api_key: String,
    api_secret: String,
}

impl CdnClient {
    pub fn new(config: &CdnConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .user_agent("AutoSource/1.0")
            .build()
            .context("Failed to build CDN HTTP client")?;

        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    #[must_use]
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn sign(&self, params: &UploadParams) -> Result<String> {
        sign(&self.api_secret, params)
    }

    /// Posts a signed multipart upload and returns the delivered URL.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
        params: &UploadParams,
    ) -> Result<String> {
        let signature = self.sign(params)?;
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .context("Invalid content type for upload")?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", params.timestamp.to_string())
            .text("folder", params.folder.clone())
            .text("transformation", params.transformation.clone())
            .text("signature", signature);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .context("CDN upload request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("CDN returned {status}: {detail}");
        }

        let body: UploadResponse = response
            .json()
            .await
            .context("Unexpected CDN upload response")?;
        debug!(url = %body.secure_url, "CDN upload complete");
        Ok(body.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> UploadParams {
        UploadParams {
            folder: "vehicles".to_string(),
            timestamp: 1_767_225_600,
            transformation: "c_limit,w_1600".to_string(),
        }
    }

    #[test]
    fn test_canonical_is_sorted() {
        assert_eq!(
            params().canonical(),
            "folder=vehicles&timestamp=1767225600&transformation=c_limit,w_1600"
        );
    }

    #[test]
    fn test_signature_is_stable_hex() {
        let a = sign("secret", &params()).unwrap();
        let b = sign("secret", &params()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));

        let mut other = params();
        other.timestamp += 1;
        assert_ne!(a, sign("secret", &other).unwrap());
        assert_ne!(a, sign("other-secret", &params()).unwrap());
    }
}
