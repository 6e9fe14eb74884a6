//! Image uploads: a local directory in development, the CDN in production.
//!
//! Resizing is asked of the CDN through the `transformation` parameter; image bytes
//! are never decoded here.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::clients::cdn::{CdnClient, UploadParams};
use crate::config::{Config, StorageBackendKind, StorageConfig};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Upload provider error: {0}")]
    Upstream(String),
}

/// Everything a browser needs to upload straight to the CDN.
#[derive(Debug, Clone, Serialize)]
pub struct SignedUpload {
    pub upload_url: String,
    pub api_key: String,
    pub timestamp: i64,
    pub folder: String,
    pub transformation: String,
    pub signature: String,
}

pub struct UploadService {
    storage: StorageConfig,
    folder: String,
    transformation: String,
    cdn: Option<CdnClient>,
}

fn extension_for(content_type: &str, file_name: &str) -> String {
    match content_type {
        "image/jpeg" => "jpg".to_string(),
        "image/png" => "png".to_string(),
        "image/webp" => "webp".to_string(),
        "image/avif" => "avif".to_string(),
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first())
            .map(|ext| (*ext).to_string())
            .or_else(|| {
                std::path::Path::new(file_name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_lowercase)
            })
            .unwrap_or_else(|| "bin".to_string()),
    }
}

fn valid_folder(folder: &str) -> bool {
    !folder.is_empty()
        && folder.len() <= 100
        && !folder.contains("..")
        && folder
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'))
}

impl UploadService {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let cdn = match config.storage.backend {
            StorageBackendKind::Cdn => Some(CdnClient::new(&config.cdn)?),
            StorageBackendKind::Local => None,
        };

        Ok(Self {
            storage: config.storage.clone(),
            folder: config.cdn.folder.clone(),
            transformation: format!("c_limit,w_{}", config.cdn.max_width),
            cdn,
        })
    }

    #[must_use]
    pub const fn max_upload_bytes(&self) -> usize {
        self.storage.max_upload_bytes
    }

    #[must_use]
    pub fn local_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.local_dir)
    }

    /// Resolves the effective content type, falling back to the file name.
    fn content_type(&self, file_name: &str, content_type: Option<&str>) -> Result<String, UploadError> {
        let declared = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_lowercase())
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

        let resolved = declared.unwrap_or_else(|| {
            mime_guess::from_path(file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });

        if !self.storage.allowed_types.iter().any(|t| t == &resolved) {
            return Err(UploadError::UnsupportedType(resolved));
        }
        Ok(resolved)
    }

    /// Stores one image and returns its public URL.
    pub async fn store(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, UploadError> {
        let content_type = self.content_type(file_name, content_type)?;

        let max = self.storage.max_upload_bytes;
        if bytes.len() > max {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                max,
            });
        }
        if bytes.is_empty() {
            return Err(UploadError::Validation("file is empty".to_string()));
        }

        let size = bytes.len();
        let url = match &self.cdn {
            Some(cdn) => {
                let params = self.params(None)?;
                cdn.upload(bytes, file_name, &content_type, &params)
                    .await
                    .map_err(|e| UploadError::Upstream(e.to_string()))?
            }
            None => {
                let name = format!("{}.{}", Uuid::new_v4(), extension_for(&content_type, file_name));
                let dir = self.local_dir();
                tokio::fs::create_dir_all(&dir)
                    .await
                    .map_err(|e| UploadError::Storage(e.to_string()))?;
                tokio::fs::write(dir.join(&name), bytes)
                    .await
                    .map_err(|e| UploadError::Storage(e.to_string()))?;
                format!("{}/{name}", self.storage.public_prefix.trim_end_matches('/'))
            }
        };

        info!(event = "image_uploaded", size, content_type = %content_type, url = %url);
        Ok(url)
    }

    fn params(&self, folder: Option<&str>) -> Result<UploadParams, UploadError> {
        let folder = folder.map_or_else(|| self.folder.clone(), |f| f.trim().trim_matches('/').to_string());
        if !valid_folder(&folder) {
            return Err(UploadError::Validation(
                "folder may only contain letters, digits, '-', '_' and '/'".to_string(),
            ));
        }

        Ok(UploadParams {
            folder,
            timestamp: chrono::Utc::now().timestamp(),
            transformation: self.transformation.clone(),
        })
    }

    /// Signs a direct browser upload. Only available with the CDN backend.
    pub fn sign(&self, folder: Option<&str>) -> Result<SignedUpload, UploadError> {
        let Some(cdn) = &self.cdn else {
            return Err(UploadError::Validation(
                "signed uploads require the cdn storage backend".to_string(),
            ));
        };

        let params = self.params(folder)?;
        let signature = cdn
            .sign(&params)
            .map_err(|e| UploadError::Upstream(e.to_string()))?;

        Ok(SignedUpload {
            upload_url: cdn.upload_url().to_string(),
            api_key: cdn.api_key().to_string(),
            timestamp: params.timestamp,
            folder: params.folder,
            transformation: params.transformation,
            signature,
        })
    }
}
