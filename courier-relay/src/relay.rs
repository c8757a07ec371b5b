use std::sync::Arc;

use async_trait::async_trait;
use courier_common::{Submission, internal};

use crate::{DeliveryError, RelayConfig, SmtpTransaction, notification::build_notification};

/// Notifies the site owner of a submission.
///
/// A single call is a single attempt; implementations do not retry.
#[async_trait]
pub trait Relay: Send + Sync + std::fmt::Debug {
    /// Deliver the owner notification for `submission`.
    ///
    /// # Errors
    ///
    /// Returns the classified cause when the notification was not accepted.
    async fn deliver(&self, submission: &Submission) -> Result<(), DeliveryError>;
}

/// Delivers notifications through the authenticated SMTP relay in
/// [`RelayConfig`].
#[derive(Debug, Clone)]
pub struct SmtpRelay {
    config: Arc<RelayConfig>,
}

impl SmtpRelay {
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

#[async_trait]
impl Relay for SmtpRelay {
    #[tracing::instrument(level = "debug", skip_all, fields(relay = %self.config.address()))]
    async fn deliver(&self, submission: &Submission) -> Result<(), DeliveryError> {
        let message = build_notification(submission, &self.config.owner)?;

        match SmtpTransaction::new(&self.config, &message).execute().await {
            Ok(()) => {
                internal!(
                    level = INFO,
                    "Notified {} of submission from {}",
                    self.config.owner,
                    submission.email()
                );
                Ok(())
            }
            Err(e) => {
                internal!(level = WARN, "Notification not delivered: {e}");
                Err(e)
            }
        }
    }
}
