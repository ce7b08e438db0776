//! Process-wide collaborators handed to every handler.

use std::sync::Arc;

use anyhow::Context;

use shopfloor_infra::config::{AppConfig, StoreConfig, UploadConfig};
use shopfloor_infra::external::{HttpMediaHost, SmtpMailer};
use shopfloor_infra::{InMemoryRepository, Mailer, MediaHost, PostgresRepository, Repository};

/// Explicit dependency bundle: built once at startup, shared via `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub repo: Arc<dyn Repository>,
    pub media: Arc<dyn MediaHost>,
    pub mailer: Arc<dyn Mailer>,
    pub upload: UploadConfig,
}

impl AppServices {
    pub fn new(
        repo: Arc<dyn Repository>,
        media: Arc<dyn MediaHost>,
        mailer: Arc<dyn Mailer>,
        upload: UploadConfig,
    ) -> Self {
        Self {
            repo,
            media,
            mailer,
            upload,
        }
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let repo: Arc<dyn Repository> = match &config.store {
        StoreConfig::InMemory => {
            tracing::info!("using in-memory repository");
            Arc::new(InMemoryRepository::new())
        }
        StoreConfig::Postgres { database_url } => {
            tracing::info!("using postgres repository");
            Arc::new(
                PostgresRepository::connect(database_url)
                    .await
                    .context("failed to connect to Postgres")?,
            )
        }
    };

    if config.media.private_key.is_empty() {
        tracing::warn!("MEDIA_PRIVATE_KEY not set; uploads will be rejected by the media host");
    }
    let media = HttpMediaHost::new(config.media.clone()).context("failed to build media host client")?;
    let mailer = SmtpMailer::new(&config.smtp).context("failed to build SMTP transport")?;

    tokio::fs::create_dir_all(&config.upload.staging_dir)
        .await
        .with_context(|| {
            format!(
                "failed to create upload staging dir {}",
                config.upload.staging_dir.display()
            )
        })?;

    Ok(AppServices::new(
        repo,
        Arc::new(media),
        Arc::new(mailer),
        config.upload.clone(),
    ))
}
