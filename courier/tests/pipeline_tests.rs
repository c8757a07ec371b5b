//! A configured courier talking to a real (local) SMTP listener.
#![allow(clippy::expect_used, clippy::unwrap_used)]

mod support;

use std::path::Path;

use courier::{Courier, SubmissionOutcome};
use courier_common::{ContactForm, SubjectCategory, Timeline};
use courier_relay::DeliveryError;
use pretty_assertions::assert_eq;
use support::SmtpSink;

fn config(store: &Path, port: u16) -> Courier {
    Courier::from_ron(&format!(
        r#"
        Courier (
            store: (type: "File", path: "{}"),
            relay: (
                host: "127.0.0.1",
                port: {port},
                owner: "owner@example.com",
                credentials: (username: "owner@example.com"),
                tls: (policy: disabled),
                timeouts: (connect_secs: 2, ehlo_secs: 2, auth_secs: 2, data_secs: 2),
            ),
            fallback_contact: "hello@example.com",
        )
        "#,
        store.display()
    ))
    .unwrap()
    .with_password(Some("app-password".to_string()))
}

#[tokio::test]
async fn test_submission_reaches_the_store_and_the_owner() {
    let sink = SmtpSink::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("messages.json");

    let controller = config(&store_path, sink.port())
        .into_controller()
        .await
        .unwrap();

    let mut form = ContactForm::new("Ada", "ada@example.org", "Hello!\n.\nStill here");
    form.subject = SubjectCategory::FreelanceProject;
    form.timeline = Timeline::Medium;

    let outcome = controller.submit(form).await;
    assert!(outcome.is_delivered(), "{outcome:?}");

    let document = std::fs::read_to_string(&store_path).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&document).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["email"], "ada@example.org");
    assert_eq!(records[0]["subject"], "Freelance Project");
    assert_eq!(records[0]["timeline"], "Medium");

    let messages = sink.messages().await;
    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert!(message.contains("Subject: New contact form submission: Freelance Project\r\n"));
    assert!(message.contains("Reply-To: ada@example.org\r\n"));
    assert!(message.contains("To: owner@example.com\r\n"));
    // The sink does not undo dot-stuffing
    assert!(message.contains("\r\n..\r\n"));
}

#[tokio::test]
async fn test_unreachable_relay_leaves_the_record_stored() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("messages.json");

    // Bind and drop to find a port nothing listens on
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let courier = config(&store_path, port);
    let fallback = courier.fallback_contact().to_string();
    let controller = courier.into_controller().await.unwrap();

    let outcome = controller
        .submit(ContactForm::new("Ada", "ada@example.org", "Hello!"))
        .await;

    let SubmissionOutcome::StoredOnly(report) = &outcome else {
        panic!("expected StoredOnly, got {outcome:?}");
    };
    assert!(matches!(
        report.delivery_error,
        Some(DeliveryError::Temporary(_))
    ));
    assert!(outcome.user_message(&fallback).contains("hello@example.com"));

    let stored = controller.store().list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], report.submission);
}
