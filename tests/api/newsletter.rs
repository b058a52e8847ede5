use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::helper::{spawn_app, spawn_app_with, RecordingRelay};
use newsletter_relay::config::DeliveryMode;

const THREE_RECIPIENTS: &str = r#"{
    "emails": ["ash@example.com", "misty@example.com", "brock@example.com"],
    "subject": "Weekly digest",
    "message": "Hello everyone.\n\nSee you next week."
}"#;

#[tokio::test]
async fn newsletters_are_sent_to_every_recipient_individually() {
    let app = spawn_app().await;

    let response = app.post_newsletter(THREE_RECIPIENTS).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["sent"], 3);
    assert_eq!(
        app.relayed_recipients(),
        vec!["ash@example.com", "misty@example.com", "brock@example.com"]
    );
}

#[tokio::test]
async fn every_email_carries_the_same_subject_and_body() {
    let app = spawn_app().await;

    app.post_newsletter(THREE_RECIPIENTS).await;

    let attempts = app.relay.attempts();
    assert_eq!(attempts.len(), 3);
    for (_, raw) in attempts {
        assert!(raw.contains("Subject: Weekly digest"));
        assert!(raw.contains("Hello everyone."));
        assert!(raw.contains("See you next week."));
    }
}

#[tokio::test]
async fn send_newsletter_returns_a_400_when_required_data_is_missing() {
    let app = spawn_app().await;
    let test_cases = [
        (
            r#"{"emails": [], "subject": "Hi", "message": "Hello"}"#,
            "an empty recipient list",
        ),
        (r#"{"subject": "Hi", "message": "Hello"}"#, "no recipients"),
        (
            r#"{"emails": ["ash@example.com"], "message": "Hello"}"#,
            "a missing subject",
        ),
        (
            r#"{"emails": ["ash@example.com"], "subject": "Hi"}"#,
            "a missing message",
        ),
        (
            r#"{"emails": ["ash@example.com"], "subject": " ", "message": "Hello"}"#,
            "a blank subject",
        ),
        ("{}", "an empty object"),
    ];

    for (invalid_body, description) in test_cases {
        let response = app.post_newsletter(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 when the payload had {}.",
            description
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], 400);
    }

    assert!(app.relay.attempts().is_empty());
}

#[tokio::test]
async fn send_newsletter_returns_a_400_when_fields_are_present_but_invalid() {
    let app = spawn_app().await;
    let test_cases = [
        (
            r#"{"emails": ["ash@example.com", "definitely-not-an-email"], "subject": "Hi", "message": "Hello"}"#,
            "an invalid recipient",
        ),
        (
            r#"{"emails": ["a..b@example.com"], "subject": "Hi", "message": "Hello"}"#,
            "a recipient with consecutive dots",
        ),
        (
            r#"{"emails": [".a@example.com"], "subject": "Hi", "message": "Hello"}"#,
            "a recipient starting with a dot",
        ),
        (
            r#"{"emails": ["ash@example.com"], "subject": "Hi", "message": "Hello", "links": ["nope"]}"#,
            "an invalid link",
        ),
        (
            r#"{"emails": "ash@example.com", "subject": "Hi", "message": "Hello"}"#,
            "recipients that are not a list",
        ),
    ];

    for (invalid_body, description) in test_cases {
        let response = app.post_newsletter(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload had {}.",
            description
        );
    }

    assert!(app.relay.attempts().is_empty());
}

#[tokio::test]
async fn an_invalid_field_is_named_in_the_error_details() {
    let app = spawn_app().await;

    let response = app
        .post_newsletter(
            r#"{"emails": ["ash@example.com", "a..b@example.com"], "subject": "Hi", "message": "Hello"}"#,
        )
        .await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 400);
    assert_eq!(body["details"][0]["field"], "emails[1]");
    assert!(body["details"][0]["message"]
        .as_str()
        .unwrap()
        .contains("a..b@example.com"));
    assert!(app.relay.attempts().is_empty());
}

#[tokio::test]
async fn missing_data_has_no_error_details() {
    let app = spawn_app().await;

    let response = app.post_newsletter("{}").await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No recipient emails provided.");
    assert!(body["details"].is_null());
}

#[tokio::test]
async fn malformed_json_is_a_400() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/send-newsletter", app.addr))
        .header("Content-Type", "application/json")
        .body(r#"{"emails": ["#)
        .send()
        .await
        .expect("The request should succeed.");

    assert_eq!(400, response.status().as_u16());
    assert!(app.relay.attempts().is_empty());
}

#[tokio::test]
async fn a_relay_failure_aborts_the_batch_with_a_500() {
    let app = spawn_app_with(RecordingRelay::refusing(&[2]), |_| {}).await;

    let response = app.post_newsletter(THREE_RECIPIENTS).await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Unexpected error");
    assert_eq!(
        app.relayed_recipients(),
        vec!["ash@example.com", "misty@example.com"]
    );
}

#[tokio::test]
async fn a_failure_on_the_first_recipient_sends_nothing_else() {
    let app = spawn_app_with(RecordingRelay::refusing(&[1]), |_| {}).await;

    let response = app.post_newsletter(THREE_RECIPIENTS).await;

    assert_eq!(500, response.status().as_u16());
    assert_eq!(app.relay.attempts().len(), 1);
}

#[tokio::test]
async fn multipart_requests_carry_attachments_to_every_recipient() {
    let app = spawn_app().await;
    let form = Form::new()
        .text("emails", "ash@example.com")
        .text("emails", "misty@example.com")
        .text("subject", "Monthly report")
        .text("message", "The report is attached.")
        .text("links", "https://example.com/reports")
        .part(
            "attachments",
            Part::bytes(b"%PDF-1.4 report".to_vec()).file_name("report.pdf"),
        );

    let response = app.post_newsletter_form(form).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["sent"], 2);
    assert_eq!(
        app.relayed_recipients(),
        vec!["ash@example.com", "misty@example.com"]
    );
    for (_, raw) in app.relay.attempts() {
        assert!(raw.contains("Subject: Monthly report"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("report.pdf"));
        assert!(raw.contains("https://example.com/reports"));
    }
}

#[tokio::test]
async fn multipart_requests_without_a_subject_are_a_400() {
    let app = spawn_app().await;
    let form = Form::new()
        .text("emails", "ash@example.com")
        .text("message", "Hello");

    let response = app.post_newsletter_form(form).await;

    assert_eq!(400, response.status().as_u16());
    assert!(app.relay.attempts().is_empty());
}

#[tokio::test]
async fn url_encoded_forms_are_accepted() {
    let app = spawn_app().await;

    let response = app
        .post_newsletter_urlencoded(&[
            ("emails", "ash@example.com"),
            ("emails", "misty@example.com"),
            ("subject", "Weekly digest"),
            ("message", "Hello from a plain form."),
        ])
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["sent"], 2);
    assert_eq!(
        app.relayed_recipients(),
        vec!["ash@example.com", "misty@example.com"]
    );
}

#[tokio::test]
async fn url_encoded_forms_without_a_message_are_a_400() {
    let app = spawn_app().await;

    let response = app
        .post_newsletter_urlencoded(&[("emails", "ash@example.com"), ("subject", "Hi")])
        .await;

    assert_eq!(400, response.status().as_u16());
    assert!(app.relay.attempts().is_empty());
}

#[tokio::test]
async fn bodies_over_the_size_limit_are_rejected_before_sending() {
    let app = spawn_app_with(RecordingRelay::default(), |config| {
        config.application.max_body_bytes = 1024;
    })
    .await;
    let form = Form::new()
        .text("emails", "ash@example.com")
        .text("subject", "Too big")
        .text("message", "See attachment.")
        .part(
            "attachments",
            Part::bytes(vec![b'x'; 4096]).file_name("big.txt"),
        );

    let response = app.post_newsletter_form(form).await;

    assert!(
        response.status().is_client_error(),
        "An oversized body was answered with {}.",
        response.status()
    );
    assert!(app.relay.attempts().is_empty());
}

#[tokio::test]
async fn independent_delivery_reports_every_outcome() {
    let app = spawn_app_with(RecordingRelay::refusing(&[2]), |config| {
        config.delivery.mode = DeliveryMode::Independent;
        config.delivery.max_in_flight = 1;
    })
    .await;

    let response = app.post_newsletter(THREE_RECIPIENTS).await;

    assert_eq!(207, response.status().as_u16());
    assert_eq!(app.relay.attempts().len(), 3);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["delivered"], 2);
    assert_eq!(body["failed"], 1);
    let statuses: Vec<&str> = body["outcomes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses.iter().filter(|s| **s == "failed").count(), 1);
    assert_eq!(body["outcomes"][0]["recipient"], "ash@example.com");
    assert_eq!(body["outcomes"][2]["recipient"], "brock@example.com");
}

#[tokio::test]
async fn independent_delivery_returns_200_when_everything_is_delivered() {
    let app = spawn_app_with(RecordingRelay::default(), |config| {
        config.delivery.mode = DeliveryMode::Independent;
    })
    .await;

    let response = app.post_newsletter(THREE_RECIPIENTS).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["delivered"], 3);
    assert_eq!(body["failed"], 0);
}
