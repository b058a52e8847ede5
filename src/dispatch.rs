//! Fans a rendered issue out to the recipients of a batch.
//!
//! [`dispatch`] is the sequential, abort-on-first-failure loop. [`dispatch_independently`]
//! gives every recipient its own task and reports each outcome.

use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};
use tracing::Instrument;

use crate::{
    domain::newsletter::email::Email,
    email::{EmailClient, EmailError, Issue},
};

pub struct DispatchResult {
    pub sent_count: usize,
    pub failure: Option<DispatchFailure>,
}

pub struct DispatchFailure {
    pub recipient: Email,
    pub cause: EmailError,
}

pub struct RecipientOutcome {
    pub recipient: Email,
    pub outcome: Result<(), DeliveryFailure>,
}

#[derive(thiserror::Error, Debug)]
pub enum DeliveryFailure {
    #[error(transparent)]
    Email(#[from] EmailError),
    #[error("the delivery task did not complete")]
    Aborted,
}

/// Sends `issue` to every recipient in order and stops at the first failure.
///
/// Recipients after the failing one are never attempted.
#[tracing::instrument(name = "Dispatch newsletter", skip_all, fields(recipients = recipients.len()))]
pub async fn dispatch(client: &EmailClient, recipients: &[Email], issue: &Issue) -> DispatchResult {
    let mut sent_count = 0;

    for recipient in recipients {
        if let Err(cause) = client.send_email(recipient, issue).await {
            return DispatchResult {
                sent_count,
                failure: Some(DispatchFailure {
                    recipient: recipient.clone(),
                    cause,
                }),
            };
        }
        sent_count += 1;
    }

    DispatchResult {
        sent_count,
        failure: None,
    }
}

/// Sends `issue` to every recipient in its own task, at most `max_in_flight` at a time.
///
/// Outcomes are returned in the order of `recipients`.
#[tracing::instrument(
    name = "Dispatch newsletter independently",
    skip_all,
    fields(recipients = recipients.len(), max_in_flight = max_in_flight)
)]
pub async fn dispatch_independently(
    client: &EmailClient,
    recipients: &[Email],
    issue: Issue,
    max_in_flight: usize,
) -> Vec<RecipientOutcome> {
    let issue = Arc::new(issue);
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut tasks = JoinSet::new();

    for (index, recipient) in recipients.iter().cloned().enumerate() {
        let client = client.clone();
        let issue = Arc::clone(&issue);
        let permits = Arc::clone(&permits);
        tasks.spawn(
            async move {
                let _permit = permits.acquire_owned().await;
                let outcome = client.send_email(&recipient, &issue).await;
                (index, outcome)
            }
            .in_current_span(),
        );
    }

    let mut outcomes: Vec<Option<Result<(), EmailError>>> =
        recipients.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => tracing::error!(error = %e, "a delivery task failed to complete"),
        }
    }

    recipients
        .iter()
        .cloned()
        .zip(outcomes)
        .map(|(recipient, outcome)| RecipientOutcome {
            recipient,
            outcome: match outcome {
                Some(result) => result.map_err(DeliveryFailure::from),
                None => Err(DeliveryFailure::Aborted),
            },
        })
        .collect()
}
