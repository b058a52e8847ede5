use std::sync::Arc;

use lettre::{
    message::{header::ContentType, Attachment as AttachmentPart, Mailbox, MultiPart},
    Message,
};

use crate::{
    config::NewsletterSettings,
    domain::newsletter::{email::Email, NewsletterRequest},
};

pub mod relay;
pub mod template;

pub use self::relay::{Relay, SmtpRelay};
pub use self::template::Issue;

#[derive(thiserror::Error, Debug)]
pub enum EmailError {
    #[error("the attachment content type is invalid")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),
    #[error("failed to build the message")]
    Build(#[from] lettre::error::Error),
    #[error("failed to render the newsletter")]
    Template(#[from] askama::Error),
    #[error("the relay did not accept the message")]
    Relay(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Builds one message per recipient and hands it to the relay.
#[derive(Clone)]
pub struct EmailClient {
    relay: Arc<dyn Relay>,
    sender: Mailbox,
    branding: NewsletterSettings,
}

impl EmailClient {
    pub fn new(relay: Arc<dyn Relay>, sender: Mailbox, branding: NewsletterSettings) -> Self {
        Self {
            relay,
            sender,
            branding,
        }
    }

    pub fn render(&self, request: &NewsletterRequest) -> Result<Issue, EmailError> {
        Ok(Issue::render(request, &self.branding)?)
    }

    #[tracing::instrument(name = "Send email", skip(self, recipient, issue), fields(recipient = %recipient))]
    pub async fn send_email(&self, recipient: &Email, issue: &Issue) -> Result<(), EmailError> {
        let message = self.build_message(recipient, issue)?;
        self.relay.relay(message).await
    }

    fn build_message(&self, recipient: &Email, issue: &Issue) -> Result<Message, EmailError> {
        let builder = Message::builder()
            .from(self.sender.clone())
            .to(Mailbox::new(None, recipient.address().clone()))
            .subject(issue.subject.as_str());

        let alternative = MultiPart::alternative_plain_html(issue.text.clone(), issue.html.clone());
        if issue.attachments.is_empty() {
            return Ok(builder.multipart(alternative)?);
        }

        let mut mixed = MultiPart::mixed().multipart(alternative);
        for attachment in &issue.attachments {
            let content_type = ContentType::parse(attachment.content_type())?;
            mixed = mixed.singlepart(
                AttachmentPart::new(attachment.filename().to_owned())
                    .body(attachment.content().to_vec(), content_type),
            );
        }

        Ok(builder.multipart(mixed)?)
    }
}
