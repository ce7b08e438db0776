use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Extension, Multipart},
    response::{IntoResponse, Response},
};

use shopfloor_feed::{NewPost, UploadMeta};
use shopfloor_infra::external::{media_host, StagedUpload};
use shopfloor_infra::{PostRepository, UpstreamError};

use crate::app::dto::{self, FeedView, PostView};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::app::staging::StagedFile;

struct IncomingFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// `POST /upload`: stage the `file` part, forward it to the media host and
/// record a post once the host has accepted it.
pub async fn upload(
    Extension(services): Extension<Arc<AppServices>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = multipart?;
    let mut caption = None;
    let mut incoming = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                incoming = Some(IncomingFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("caption") => caption = Some(field.text().await?),
            _ => {}
        }
    }

    let incoming = incoming.ok_or_else(|| ApiError::validation("multipart field 'file' is required"))?;
    let meta = UploadMeta {
        file_name: incoming.file_name,
        content_type: incoming.content_type,
        size: incoming.bytes.len(),
    };
    let kind = meta.media_kind()?;

    let staged = StagedFile::write(&services.upload.staging_dir, incoming.bytes).await?;
    let upload = StagedUpload {
        path: staged.path().to_path_buf(),
        file_name: meta.file_name.clone(),
        content_type: meta.content_type.clone(),
        kind,
    };
    let timeout = services.upload.timeout;
    let outcome = tokio::time::timeout(timeout, services.media.upload(&upload)).await;
    staged.close();

    let hosted = match outcome {
        Ok(Ok(hosted)) => hosted,
        Ok(Err(e)) => {
            tracing::warn!(service = e.service(), file_name = %meta.file_name, error = %e, "upload failed");
            return Err(e.into());
        }
        Err(_) => {
            let e = UpstreamError::Timeout {
                service: media_host::SERVICE,
                timeout,
            };
            tracing::warn!(service = e.service(), file_name = %meta.file_name, error = %e, "upload timed out");
            return Err(e.into());
        }
    };

    let post = services
        .repo
        .create_post(NewPost {
            caption,
            url: hosted.url,
            file_type: hosted.file_type,
            file_name: hosted.file_name,
        })
        .await?;
    tracing::info!(post_id = %post.id, file_type = %post.file_type, "post created");
    Ok(dto::ok(PostView::from(post)).into_response())
}

/// `GET /feed`: every post, newest first.
pub async fn list_feed(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, ApiError> {
    let posts = services
        .repo
        .list_posts()
        .await?
        .into_iter()
        .map(PostView::from)
        .collect();
    Ok(axum::Json(FeedView { posts }).into_response())
}
