//! The email the owner receives for each submission.

use std::fmt::Write;

use courier_common::{Submission, internal};
use courier_smtp::client::{MessageBuilder, Result};

const SUBJECT_PREFIX: &str = "New contact form submission";

/// Subject line of the notification.
#[must_use]
pub fn notification_subject(submission: &Submission) -> String {
    format!("{SUBJECT_PREFIX}: {}", submission.subject())
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

/// Plain-text body listing every field of the submission.
#[must_use]
pub fn notification_body(submission: &Submission) -> String {
    let timeline = submission.timeline();
    let mut body = String::with_capacity(512 + submission.message().len());

    body.push_str("You have received a new message through the contact form.\n\n");

    // Writing to a String cannot fail
    let _ = writeln!(body, "Name:              {}", submission.name());
    let _ = writeln!(body, "Email:             {}", submission.email());
    let _ = writeln!(body, "Phone:             {}", or_dash(submission.phone()));
    let _ = writeln!(body, "Company:           {}", or_dash(submission.company()));
    let _ = writeln!(body, "Subject:           {}", submission.subject());
    let _ = writeln!(
        body,
        "Preferred contact: {}",
        submission.contact_preference()
    );
    let _ = writeln!(
        body,
        "Timeline:          {timeline} ({})",
        timeline.response_window()
    );
    let _ = writeln!(
        body,
        "Submitted:         {}",
        submission.timestamp().to_rfc3339()
    );

    body.push_str("\nMessage:\n");
    body.push_str(submission.message());
    body.push('\n');

    body
}

/// The complete RFC 5322 message sent to the owner.
///
/// `From` and `To` are the owner so the relay accepts it as the
/// authenticated sender; `Reply-To` points back at the visitor. A visitor
/// address that is not ASCII cannot appear in a header without SMTPUTF8,
/// so it is left to the body.
///
/// # Errors
///
/// Returns an error if the owner address is empty.
pub fn build_notification(submission: &Submission, owner: &str) -> Result<String> {
    let mut builder = MessageBuilder::new().date(submission.timestamp());

    if submission.email().is_ascii() {
        builder = builder.reply_to(submission.email());
    } else {
        internal!(
            level = DEBUG,
            "Omitting Reply-To for non-ASCII address {}",
            submission.email()
        );
    }

    let builder = builder
        .subject(notification_subject(submission))
        .header("X-Courier-Timeline", submission.timeline().to_string())
        .body(notification_body(submission));

    if owner.trim().is_empty() {
        return builder.build();
    }

    builder.from(owner).to(owner).build()
}
