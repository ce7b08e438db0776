//! Configuration loading and representation.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Parsing is done against a lookup function so tests never touch the
//! real environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    pub upload_url: String,
    pub private_key: String,
    pub folder: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub staging_dir: PathBuf,
    pub max_bytes: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub starttls: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub media: MediaConfig,
    pub upload: UploadConfig,
    pub smtp: SmtpConfig,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("failed to read .env");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or(&get, "BIND_ADDR", "0.0.0.0:8080".parse::<SocketAddr>()?)?;

        let store = if parse_or(&get, "USE_PERSISTENT_STORES", false)? {
            let database_url = get("DATABASE_URL").ok_or_else(|| {
                anyhow!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")
            })?;
            StoreConfig::Postgres { database_url }
        } else {
            StoreConfig::InMemory
        };

        let timeout = Duration::from_secs(parse_or(&get, "UPLOAD_TIMEOUT_SECS", 30u64)?);

        let media = MediaConfig {
            upload_url: get("MEDIA_UPLOAD_URL")
                .unwrap_or_else(|| "https://upload.imagekit.io/api/v1/files/upload".to_string()),
            private_key: get("MEDIA_PRIVATE_KEY").unwrap_or_default(),
            folder: get("MEDIA_FOLDER").unwrap_or_else(|| "/posts".to_string()),
            timeout,
        };

        let upload = UploadConfig {
            staging_dir: get("UPLOAD_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            max_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?,
            timeout,
        };

        let smtp = SmtpConfig {
            host: get("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(&get, "SMTP_PORT", 587u16)?,
            username: get("SMTP_USERNAME"),
            password: get("SMTP_PASSWORD"),
            from: get("MAIL_FROM").unwrap_or_else(|| "noreply@shopfloor.local".to_string()),
            starttls: parse_or(&get, "SMTP_STARTTLS", true)?,
            timeout: Duration::from_secs(parse_or(&get, "SMTP_TIMEOUT_SECS", 10u64)?),
        };

        Ok(Self {
            bind_addr,
            store,
            media,
            upload,
            smtp,
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("invalid value for {key} ('{raw}'): {e}")),
        None => Ok(default),
    }
}
