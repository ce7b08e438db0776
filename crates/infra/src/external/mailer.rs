//! Outbound mail via an SMTP relay.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::instrument;

use super::UpstreamError;
use crate::config::SmtpConfig;

pub const SERVICE: &str = "mail relay";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), UpstreamError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, UpstreamError> {
        let from: Mailbox = config.from.parse().map_err(|e| UpstreamError::Transport {
            service: SERVICE,
            message: format!("invalid sender address '{}': {e}", config.from),
        })?;

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host).map_err(|e| {
                UpstreamError::Transport {
                    service: SERVICE,
                    message: e.to_string(),
                }
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        let builder = builder.port(config.port).timeout(Some(config.timeout));
        let builder = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => {
                builder.credentials(Credentials::new(user.clone(), pass.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

/// Build the wire message; recipient or header problems never reach the relay.
fn compose(from: &Mailbox, mail: OutgoingMail) -> Result<Message, UpstreamError> {
    let mut builder = Message::builder()
        .from(from.clone())
        .subject(mail.subject)
        .header(ContentType::TEXT_PLAIN);
    for to in &mail.to {
        let mailbox: Mailbox = to.parse().map_err(|e| UpstreamError::Transport {
            service: SERVICE,
            message: format!("invalid recipient address '{to}': {e}"),
        })?;
        builder = builder.to(mailbox);
    }
    builder.body(mail.body).map_err(|e| UpstreamError::Transport {
        service: SERVICE,
        message: e.to_string(),
    })
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, mail), fields(recipients = mail.to.len()), err)]
    async fn send(&self, mail: OutgoingMail) -> Result<(), UpstreamError> {
        let message = compose(&self.from, mail)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| UpstreamError::Transport {
                service: SERVICE,
                message: e.to_string(),
            })?;
        if !response.is_positive() {
            return Err(UpstreamError::Rejected {
                service: SERVICE,
                status: response.code().to_string().parse().unwrap_or_default(),
                body: response.message().collect::<Vec<_>>().join(" "),
            });
        }
        Ok(())
    }
}
