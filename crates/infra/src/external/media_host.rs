//! Media host client: forwards a staged file and returns where it is hosted.

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, instrument};

use shopfloor_feed::MediaKind;

use super::UpstreamError;
use crate::config::MediaConfig;

pub const SERVICE: &str = "media host";

/// A file written to local temporary storage, ready to forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: String,
    pub kind: MediaKind,
}

/// Where the media host put the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedMedia {
    pub url: String,
    pub file_type: String,
    pub file_name: String,
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, upload: &StagedUpload) -> Result<HostedMedia, UpstreamError>;
}

/// HTTP media host speaking the ImageKit-style multipart upload API.
#[derive(Debug, Clone)]
pub struct HttpMediaHost {
    client: reqwest::Client,
    config: MediaConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
    name: Option<String>,
    #[serde(rename = "fileType")]
    file_type: Option<String>,
}

impl HttpMediaHost {
    pub fn new(config: MediaConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::Transport {
                service: SERVICE,
                message: e.to_string(),
            })?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl MediaHost for HttpMediaHost {
    #[instrument(skip(self), fields(file_name = %upload.file_name), err)]
    async fn upload(&self, upload: &StagedUpload) -> Result<HostedMedia, UpstreamError> {
        let bytes = tokio::fs::read(&upload.path)
            .await
            .map_err(|e| UpstreamError::Transport {
                service: SERVICE,
                message: format!("could not read staged file: {e}"),
            })?;

        let part = Part::bytes(bytes)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| UpstreamError::Transport {
                service: SERVICE,
                message: format!("invalid content type: {e}"),
            })?;
        let form = Form::new()
            .part("file", part)
            .text("fileName", upload.file_name.clone())
            .text("useUniqueFileName", "true")
            .text("folder", self.config.folder.clone())
            .text("tags", "backend-upload");

        let response = self
            .client
            .post(&self.config.upload_url)
            .basic_auth(&self.config.private_key, Some(""))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout {
                        service: SERVICE,
                        timeout: self.config.timeout,
                    }
                } else {
                    UpstreamError::Transport {
                        service: SERVICE,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Rejected {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let body: UploadResponse =
            response
                .json()
                .await
                .map_err(|e| UpstreamError::InvalidResponse {
                    service: SERVICE,
                    message: e.to_string(),
                })?;
        debug!(url = %body.url, "media host accepted upload");

        Ok(HostedMedia {
            url: body.url,
            // The host reports "image" or "non-image"; keep our own family instead.
            file_type: match body.file_type.as_deref() {
                Some("image") => MediaKind::Image.as_str().to_string(),
                _ => upload.kind.as_str().to_string(),
            },
            file_name: body.name.unwrap_or_else(|| upload.file_name.clone()),
        })
    }
}
