//! External service clients/adapters (media host, mail relay).

use std::time::Duration;

use thiserror::Error;

pub mod mailer;
pub mod media_host;

pub use mailer::{Mailer, OutgoingMail, SmtpMailer};
pub use media_host::{HostedMedia, HttpMediaHost, MediaHost, StagedUpload};

/// Failure of a third-party service this process depends on but does not control.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The service answered with a non-success status.
    #[error("{service} rejected the request with status {status}: {body}")]
    Rejected {
        service: &'static str,
        status: u16,
        body: String,
    },
    /// The request never got an answer (connect, TLS, IO).
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },
    /// The service answered but the payload was unusable.
    #[error("{service} returned an invalid response: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
    #[error("{service} did not answer within {timeout:?}")]
    Timeout {
        service: &'static str,
        timeout: Duration,
    },
}

impl UpstreamError {
    pub fn service(&self) -> &'static str {
        match self {
            UpstreamError::Rejected { service, .. }
            | UpstreamError::Transport { service, .. }
            | UpstreamError::InvalidResponse { service, .. }
            | UpstreamError::Timeout { service, .. } => service,
        }
    }
}
