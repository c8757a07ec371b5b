//! The submission pipeline: validate, stamp, store, then notify.

use std::sync::Arc;

use courier_common::{ContactForm, Submission, ValidationError, internal, validate};
use courier_relay::{DeliveryError, Relay};
use courier_store::{MessageStore, StoreError};

use crate::clock::MonotonicClock;

/// What happened to a valid submission after it was stamped.
#[derive(Debug)]
pub struct SubmissionReport {
    pub submission: Submission,
    /// Set when the submission could not be recorded
    pub store_error: Option<StoreError>,
    /// Set when the owner could not be notified
    pub delivery_error: Option<DeliveryError>,
}

/// The result of one call to [`SubmissionController::submit`].
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// The form was invalid; nothing was stored or sent
    Rejected(ValidationError),
    /// The owner was notified. The store may still have failed, see the report
    Delivered(SubmissionReport),
    /// Recorded, but the owner was not notified
    StoredOnly(SubmissionReport),
    /// Neither recorded nor delivered
    Failed(SubmissionReport),
}

impl SubmissionOutcome {
    fn from_report(report: SubmissionReport) -> Self {
        match (&report.store_error, &report.delivery_error) {
            (_, None) => Self::Delivered(report),
            (None, Some(_)) => Self::StoredOnly(report),
            (Some(_), Some(_)) => Self::Failed(report),
        }
    }

    /// The report for every outcome except [`SubmissionOutcome::Rejected`].
    #[must_use]
    pub const fn report(&self) -> Option<&SubmissionReport> {
        match self {
            Self::Rejected(_) => None,
            Self::Delivered(report) | Self::StoredOnly(report) | Self::Failed(report) => {
                Some(report)
            }
        }
    }

    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    /// Short, stable name for logs and exit reporting.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "rejected",
            Self::Delivered(_) => "delivered",
            Self::StoredOnly(_) => "stored_only",
            Self::Failed(_) => "failed",
        }
    }

    /// The text to show the visitor.
    ///
    /// Degraded outcomes point at `fallback_contact` so the visitor can
    /// still reach the owner.
    #[must_use]
    pub fn user_message(&self, fallback_contact: &str) -> String {
        match self {
            Self::Rejected(ValidationError::MalformedEmail(_)) => {
                "Please enter a valid email address.".to_string()
            }
            Self::Rejected(error) => format!(
                "Please fill in all required fields (missing: {}).",
                error.field()
            ),
            Self::Delivered(report) if report.store_error.is_some() => format!(
                "Message sent successfully! I'll get back to you soon. \
                 If you don't hear back, please contact me directly at {fallback_contact}."
            ),
            Self::Delivered(_) => "Message sent successfully! I'll get back to you soon.".to_string(),
            Self::StoredOnly(_) => format!(
                "Your message was saved, but I couldn't be notified right away. \
                 For anything urgent, please contact me directly at {fallback_contact}."
            ),
            Self::Failed(_) => format!(
                "Sorry, there was an error sending your message. \
                 Please try again or contact me directly at {fallback_contact}."
            ),
        }
    }
}

/// Runs contact forms through validation, the store and the relay.
#[derive(Debug, Clone)]
pub struct SubmissionController {
    store: Arc<dyn MessageStore>,
    relay: Arc<dyn Relay>,
    clock: Arc<MonotonicClock>,
}

impl SubmissionController {
    #[must_use]
    pub fn new(store: Arc<dyn MessageStore>, relay: Arc<dyn Relay>) -> Self {
        Self {
            store,
            relay,
            clock: Arc::new(MonotonicClock::new()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    /// Process one form to completion.
    ///
    /// The store append always finishes before the relay is called. A store
    /// failure is recorded in the report and delivery is still attempted.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn submit(&self, form: ContactForm) -> SubmissionOutcome {
        let validated = match validate(&form) {
            Ok(validated) => validated,
            Err(e) => {
                internal!(level = INFO, "Rejected submission: {e}");
                return SubmissionOutcome::Rejected(e);
            }
        };

        let submission = Submission::new(validated, self.clock.now());

        let store_error = self.store.append(&submission).await.err();
        if let Some(e) = &store_error {
            internal!(
                level = ERROR,
                "Failed to record submission from {}: {e}",
                submission.email()
            );
        }

        let delivery_error = self.relay.deliver(&submission).await.err();

        let outcome = SubmissionOutcome::from_report(SubmissionReport {
            submission,
            store_error,
            delivery_error,
        });

        if let Some(report) = outcome.report() {
            tracing::info!(
                outcome = outcome.kind(),
                email = report.submission.email(),
                subject = %report.submission.subject(),
                timestamp = %report.submission.timestamp().to_rfc3339(),
                stored = report.store_error.is_none(),
                delivered = report.delivery_error.is_none(),
                "Submission processed"
            );
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use courier_relay::{PermanentError, TemporaryError};
    use pretty_assertions::assert_eq;

    use super::*;

    fn report(store_error: Option<StoreError>, delivery_error: Option<DeliveryError>) -> SubmissionReport {
        let form = ContactForm::new("Ada", "ada@example.com", "Hello");
        SubmissionReport {
            submission: Submission::new(validate(&form).unwrap(), Utc::now()),
            store_error,
            delivery_error,
        }
    }

    #[test]
    fn outcome_follows_relay_then_store() {
        let delivered = SubmissionOutcome::from_report(report(None, None));
        assert_eq!(delivered.kind(), "delivered");

        let delivered_unstored = SubmissionOutcome::from_report(report(
            Some(StoreError::Unavailable("disk gone".to_string())),
            None,
        ));
        assert_eq!(delivered_unstored.kind(), "delivered");

        let stored_only = SubmissionOutcome::from_report(report(
            None,
            Some(TemporaryError::ServerBusy("421".to_string()).into()),
        ));
        assert_eq!(stored_only.kind(), "stored_only");

        let failed = SubmissionOutcome::from_report(report(
            Some(StoreError::Unavailable("disk gone".to_string())),
            Some(PermanentError::AuthenticationFailed("535".to_string()).into()),
        ));
        assert_eq!(failed.kind(), "failed");
    }

    #[test]
    fn user_messages() {
        let fallback = "owner@example.com";

        assert_eq!(
            SubmissionOutcome::from_report(report(None, None)).user_message(fallback),
            "Message sent successfully! I'll get back to you soon."
        );

        let rejected = SubmissionOutcome::Rejected(ValidationError::MissingField("message"));
        assert_eq!(
            rejected.user_message(fallback),
            "Please fill in all required fields (missing: message)."
        );

        let malformed = SubmissionOutcome::Rejected(ValidationError::MalformedEmail("nope".into()));
        assert_eq!(
            malformed.user_message(fallback),
            "Please enter a valid email address."
        );

        let stored_only = SubmissionOutcome::from_report(report(
            None,
            Some(TemporaryError::Timeout("DATA".to_string()).into()),
        ));
        assert!(stored_only.user_message(fallback).contains(fallback));

        let failed = SubmissionOutcome::from_report(report(
            Some(StoreError::Unavailable("disk gone".to_string())),
            Some(TemporaryError::Timeout("DATA".to_string()).into()),
        ));
        assert_eq!(
            failed.user_message(fallback),
            "Sorry, there was an error sending your message. \
             Please try again or contact me directly at owner@example.com."
        );
    }
}
