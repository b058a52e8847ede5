use serde::{Deserialize, Serialize};

use crate::{
    app::error::AppError,
    dispatch::RecipientOutcome,
    domain::newsletter::{
        attachment::Attachment, body::Body, email::Email, link::Link, subject::Subject,
        NewsletterRequest,
    },
};

/// The raw request, decoded from JSON or a url-encoded form, or collected from multipart fields.
///
/// Every field is optional at this stage so that missing data is reported as a 400.
/// The `[]` aliases cover forms that post lists as `emails[]=…&emails[]=…`.
#[derive(Deserialize, Default)]
pub struct SendNewsletterRequestBody {
    #[serde(
        default,
        alias = "recipients",
        alias = "emails[]",
        alias = "recipients[]"
    )]
    pub emails: Vec<String>,
    pub subject: Option<String>,
    #[serde(alias = "body")]
    pub message: Option<String>,
    #[serde(default, alias = "links[]")]
    pub links: Vec<String>,
    #[serde(skip)]
    pub attachments: Vec<UploadedFile>,
}

pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InvalidRequest {
    #[error("{0}")]
    Missing(&'static str),
    #[error("{field}: {message}")]
    Field { field: String, message: String },
}

impl From<InvalidRequest> for AppError {
    fn from(e: InvalidRequest) -> Self {
        match e {
            InvalidRequest::Missing(message) => AppError::ValidationError(message.into()),
            InvalidRequest::Field { field, message } => AppError::InvalidField { field, message },
        }
    }
}

fn field<T>(name: &str, parsed: Result<T, String>) -> Result<T, InvalidRequest> {
    parsed.map_err(|message| InvalidRequest::Field {
        field: name.to_owned(),
        message,
    })
}

/// Parses every element of a list field, naming the first bad one as `name[index]`.
fn each<I, T>(
    name: &str,
    values: Vec<I>,
    parse: impl Fn(I) -> Result<T, String>,
) -> Result<Vec<T>, InvalidRequest> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| field(&format!("{}[{}]", name, index), parse(value)))
        .collect()
}

impl TryFrom<SendNewsletterRequestBody> for NewsletterRequest {
    type Error = InvalidRequest;
    fn try_from(value: SendNewsletterRequestBody) -> Result<Self, Self::Error> {
        if value.emails.is_empty() {
            return Err(InvalidRequest::Missing("No recipient emails provided."));
        }

        let (subject, message) = match (value.subject, value.message) {
            (Some(subject), Some(message))
                if !subject.trim().is_empty() && !message.trim().is_empty() =>
            {
                (subject, message)
            }
            _ => return Err(InvalidRequest::Missing("Subject and message are required.")),
        };

        let recipients = each("emails", value.emails, Email::try_from)?;
        let subject = field("subject", Subject::try_from(subject))?;
        let body = field("message", Body::try_from(message))?;
        let links = each("links", value.links, Link::try_from)?;
        let attachments = each("attachments", value.attachments, |file: UploadedFile| {
            Attachment::new(&file.filename, file.content_type, file.content)
        })?;

        Ok(Self {
            recipients,
            subject,
            body,
            links,
            attachments,
        })
    }
}

#[derive(Serialize)]
pub struct SendNewsletterResponseBody {
    pub success: bool,
    pub message: String,
    pub sent: usize,
}

#[derive(Serialize)]
pub struct DeliveryReportBody {
    pub delivered: usize,
    pub failed: usize,
    pub outcomes: Vec<OutcomeBody>,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Delivered,
    Failed,
}

#[derive(Serialize)]
pub struct OutcomeBody {
    pub recipient: String,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Vec<RecipientOutcome>> for DeliveryReportBody {
    fn from(outcomes: Vec<RecipientOutcome>) -> Self {
        let outcomes: Vec<OutcomeBody> = outcomes
            .into_iter()
            .map(|o| match o.outcome {
                Ok(()) => OutcomeBody {
                    recipient: o.recipient.to_string(),
                    status: DeliveryStatus::Delivered,
                    error: None,
                },
                Err(e) => OutcomeBody {
                    recipient: o.recipient.to_string(),
                    status: DeliveryStatus::Failed,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o.status, DeliveryStatus::Failed))
            .count();

        Self {
            delivered: outcomes.len() - failed,
            failed,
            outcomes,
        }
    }
}
