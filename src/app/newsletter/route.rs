use anyhow::anyhow;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::schema;
use crate::{
    app::{
        error::AppResult,
        extractor::NewsletterForm,
        AppState,
    },
    config::DeliveryMode,
    dispatch::{dispatch, dispatch_independently},
    domain::newsletter::NewsletterRequest,
};

#[tracing::instrument(
    name = "Send newsletter",
    skip(state, body),
    fields(recipients = body.emails.len(), attachments = body.attachments.len())
)]
pub async fn send_newsletter(
    State(state): State<AppState>,
    NewsletterForm(body): NewsletterForm,
) -> AppResult<Response> {
    let request = NewsletterRequest::try_from(body)?;

    let issue = state
        .email_client
        .render(&request)
        .map_err(|e| anyhow!(e).context("Failed to render the newsletter."))?;

    match state.delivery.mode {
        DeliveryMode::Sequential => {
            let result = dispatch(&state.email_client, &request.recipients, &issue).await;

            if let Some(failure) = result.failure {
                tracing::warn!(sent = result.sent_count, "newsletter batch aborted");
                return Err(anyhow!(failure.cause)
                    .context(format!(
                        "Failed to send newsletter issue to {}.",
                        failure.recipient
                    ))
                    .into());
            }

            Ok(Json(schema::SendNewsletterResponseBody {
                success: true,
                message: "Emails sent successfully!".into(),
                sent: result.sent_count,
            })
            .into_response())
        }
        DeliveryMode::Independent => {
            let outcomes = dispatch_independently(
                &state.email_client,
                &request.recipients,
                issue,
                state.delivery.max_in_flight,
            )
            .await;

            let report = schema::DeliveryReportBody::from(outcomes);
            let status = if report.failed == 0 {
                StatusCode::OK
            } else {
                tracing::warn!(
                    delivered = report.delivered,
                    failed = report.failed,
                    "some newsletter emails were not delivered"
                );
                StatusCode::MULTI_STATUS
            };

            Ok((status, Json(report)).into_response())
        }
    }
}
