use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use axum_extra::extract::Form;

use super::error::AppError;
use super::newsletter::schema::{SendNewsletterRequestBody, UploadedFile};

/// Accepts a newsletter as a JSON document, as a url-encoded form, or as
/// `multipart/form-data` with attachments.
///
/// Extraction failures are reported as validation errors, so a malformed body is a 400.
pub struct NewsletterForm(pub SendNewsletterRequestBody);

#[async_trait]
impl<S> FromRequest<S> for NewsletterForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;
            return read_multipart(multipart).await.map(Self);
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            // Repeated keys (`emails=a&emails=b`) collect into lists.
            let Form(body) = Form::<SendNewsletterRequestBody>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::ValidationError(rejection.to_string()))?;
            return Ok(Self(body));
        }

        let Json(body) = Json::<SendNewsletterRequestBody>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;
        Ok(Self(body))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<SendNewsletterRequestBody, AppError> {
    let mut body = SendNewsletterRequestBody::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_owned();

        if let Some(filename) = field.file_name().map(ToOwned::to_owned) {
            let content_type = field.content_type().map(ToOwned::to_owned);
            let content = field
                .bytes()
                .await
                .map_err(|e| AppError::ValidationError(format!("Failed to read file: {}", e)))?;

            // An unselected file input still sends an empty part.
            if filename.is_empty() && content.is_empty() {
                continue;
            }

            body.attachments.push(UploadedFile {
                filename,
                content_type,
                content: content.to_vec(),
            });
            continue;
        }

        let value = field.text().await.map_err(|e| {
            AppError::ValidationError(format!("Invalid value for field `{}`: {}", name, e))
        })?;

        match name.as_str() {
            "emails" | "emails[]" | "recipients" | "recipients[]" => body.emails.push(value),
            "subject" => body.subject = Some(value),
            "message" | "body" => body.message = Some(value),
            "links" | "links[]" => body.links.push(value),
            _ => tracing::debug!(field = %name, "ignoring unknown multipart field"),
        }
    }

    Ok(body)
}
