use async_trait::async_trait;
use lettre::{
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;

use super::EmailError;
use crate::config::{EmailClientSettings, SmtpTls};

/// The outbound side of the service: something that accepts a fully built message for delivery.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn relay(&self, message: Message) -> Result<(), EmailError>;
}

/// Relays messages to an SMTP server.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    pub fn new(settings: &EmailClientSettings) -> Result<Self, SmtpError> {
        let builder = match settings.tls {
            SmtpTls::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            }
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?,
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host),
        };

        let mut builder = builder
            .port(settings.port)
            .timeout(Some(settings.timeout()));
        if !settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password.expose_secret().clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Relay for SmtpRelay {
    async fn relay(&self, message: Message) -> Result<(), EmailError> {
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| EmailError::Relay(Box::new(e)))?;
        tracing::debug!(code = %response.code(), "relay accepted the message");
        Ok(())
    }
}
