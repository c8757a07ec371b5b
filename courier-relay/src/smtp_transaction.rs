//! One SMTP conversation with the relay
//!
//! The transaction covers the whole exchange for one notification:
//! - greeting and EHLO
//! - TLS negotiation via STARTTLS, per the configured policy
//! - AUTH PLAIN, or AUTH LOGIN when that is all the relay offers
//! - MAIL FROM / RCPT TO the owner
//! - DATA and the message content
//! - QUIT
//!
//! Every step is bounded by its own timeout. There is exactly one attempt:
//! the first failure ends the transaction.

use std::{future::Future, time::Duration};

use courier_common::{config::TlsPolicy, internal};
use courier_smtp::client::{Response, SmtpClient};

use crate::{
    RelayConfig,
    error::{DeliveryError, PermanentError, TemporaryError},
};

/// Run one client call under a deadline.
async fn bounded<T>(
    limit: Duration,
    stage: &str,
    call: impl Future<Output = courier_smtp::client::Result<T>>,
) -> Result<T, DeliveryError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| TemporaryError::Timeout(format!("{stage} timed out after {limit:?}")))?
        .map_err(DeliveryError::from)
}

/// A single delivery of a prepared message to the configured relay.
pub struct SmtpTransaction<'a> {
    config: &'a RelayConfig,
    /// The complete message, headers and body
    message: &'a str,
}

impl<'a> SmtpTransaction<'a> {
    #[must_use]
    pub const fn new(config: &'a RelayConfig, message: &'a str) -> Self {
        Self { config, message }
    }

    /// Connect to the relay and read its greeting
    ///
    /// # Errors
    /// Returns an error if connection or greeting fails
    async fn connect_and_greet(&self) -> Result<SmtpClient, DeliveryError> {
        let address = self.config.address();
        let timeouts = &self.config.timeouts;

        let mut client = tokio::time::timeout(
            timeouts.connect(),
            SmtpClient::connect(&address, self.config.host.clone()),
        )
        .await
        .map_err(|_| {
            TemporaryError::Timeout(format!(
                "Connecting to {address} timed out after {:?}",
                timeouts.connect()
            ))
        })?
        .map_err(|e| TemporaryError::ConnectionFailed(format!("Failed to connect to {address}: {e}")))?
        .accept_invalid_certs(self.config.tls.accepts_invalid_certs());

        let greeting = bounded(timeouts.ehlo(), "Greeting", client.read_greeting()).await?;
        if greeting.is_temporary_error() {
            return Err(TemporaryError::ServerBusy(format!(
                "Server rejected connection: {} {}",
                greeting.code,
                greeting.message()
            ))
            .into());
        }
        if !greeting.is_success() {
            return Err(DeliveryError::from_reply(
                "connection",
                &greeting,
                PermanentError::MessageRejected,
            ));
        }

        Ok(client)
    }

    /// Execute the complete SMTP transaction
    ///
    /// # Errors
    /// Returns an error if any part of the SMTP transaction fails
    #[tracing::instrument(level = "info", skip_all, fields(server = %self.config.address()))]
    pub async fn execute(self) -> Result<(), DeliveryError> {
        if self.config.tls.accepts_invalid_certs() {
            internal!(
                level = WARN,
                "SECURITY WARNING: TLS certificate validation is disabled for the relay"
            );
        }

        let mut client = self.connect_and_greet().await?;

        let capabilities = self.ehlo(&mut client, "EHLO").await?;
        let capabilities = self.negotiate_tls(&mut client, capabilities).await?;

        self.authenticate(&mut client, &capabilities).await?;
        self.send_envelope(&mut client).await?;
        self.send_message_data(&mut client).await?;

        // The relay already accepted the message; a failed QUIT changes nothing
        if let Err(e) = bounded(self.config.timeouts.quit(), "QUIT", client.quit()).await {
            internal!(level = WARN, "QUIT failed after successful delivery: {e}");
        }

        Ok(())
    }

    async fn ehlo(&self, client: &mut SmtpClient, stage: &str) -> Result<Response, DeliveryError> {
        let response = bounded(
            self.config.timeouts.ehlo(),
            stage,
            client.ehlo(&self.config.helo_domain),
        )
        .await?;

        if !response.is_success() {
            return Err(DeliveryError::from_reply(
                stage,
                &response,
                PermanentError::MessageRejected,
            ));
        }

        Ok(response)
    }

    /// Upgrade the connection according to the TLS policy
    ///
    /// Returns the capabilities that apply from here on: the post-TLS EHLO
    /// when the upgrade happened, the original ones otherwise.
    ///
    /// # Errors
    /// Returns an error if TLS is required and unavailable, or if an
    /// attempted upgrade fails
    async fn negotiate_tls(
        &self,
        client: &mut SmtpClient,
        capabilities: Response,
    ) -> Result<Response, DeliveryError> {
        let policy = self.config.tls.policy;

        if policy == TlsPolicy::Disabled {
            internal!(level = DEBUG, "TLS disabled by configuration");
            return Ok(capabilities);
        }

        if !capabilities.supports("STARTTLS") {
            if policy == TlsPolicy::Required {
                return Err(PermanentError::TlsRequired(
                    "Server does not advertise STARTTLS".to_string(),
                )
                .into());
            }
            internal!(
                level = WARN,
                "Relay does not offer STARTTLS, continuing in plaintext"
            );
            return Ok(capabilities);
        }

        let starttls = bounded(self.config.timeouts.starttls(), "STARTTLS", client.starttls()).await;
        let response = match (starttls, policy) {
            (Ok(response), _) => response,
            (Err(e), TlsPolicy::Required) => {
                return Err(PermanentError::TlsRequired(format!("STARTTLS failed: {e}")).into());
            }
            (Err(e), _) => return Err(e),
        };

        if !response.is_success() {
            let message = format!(
                "Server rejected STARTTLS: {} {}",
                response.code,
                response.message()
            );
            return Err(if policy == TlsPolicy::Required {
                PermanentError::TlsRequired(message).into()
            } else {
                TemporaryError::TlsHandshakeFailed(message).into()
            });
        }

        internal!(level = DEBUG, "TLS negotiated via STARTTLS");

        // Capabilities must be re-read over the secured channel
        self.ehlo(client, "EHLO after STARTTLS").await
    }

    /// Log in with the configured credentials
    ///
    /// # Errors
    /// Returns an error if the relay refuses the credentials
    async fn authenticate(
        &self,
        client: &mut SmtpClient,
        capabilities: &Response,
    ) -> Result<(), DeliveryError> {
        let credentials = &self.config.credentials;
        let mechanisms = capabilities.auth_mechanisms();
        let use_login =
            mechanisms.iter().any(|m| m == "LOGIN") && !mechanisms.iter().any(|m| m == "PLAIN");

        if !client.is_tls() {
            internal!(
                level = WARN,
                "Sending credentials for {} over an unencrypted connection",
                credentials.username
            );
        }

        let response = if use_login {
            bounded(
                self.config.timeouts.auth(),
                "AUTH LOGIN",
                client.auth_login(&credentials.username, credentials.password.expose()),
            )
            .await?
        } else {
            bounded(
                self.config.timeouts.auth(),
                "AUTH PLAIN",
                client.auth_plain(&credentials.username, credentials.password.expose()),
            )
            .await?
        };

        if !response.is_success() {
            return Err(DeliveryError::from_reply(
                "authentication",
                &response,
                PermanentError::AuthenticationFailed,
            ));
        }

        internal!(
            level = DEBUG,
            "Authenticated as {} using {}",
            credentials.username,
            if use_login { "LOGIN" } else { "PLAIN" }
        );
        Ok(())
    }

    /// Send MAIL FROM and RCPT TO, both for the owner
    ///
    /// # Errors
    /// Returns an error if either command is refused
    async fn send_envelope(&self, client: &mut SmtpClient) -> Result<(), DeliveryError> {
        let owner = &self.config.owner;
        let timeouts = &self.config.timeouts;

        let response = bounded(timeouts.mail_from(), "MAIL FROM", client.mail_from(owner)).await?;
        if !response.is_success() {
            return Err(DeliveryError::from_reply(
                "MAIL FROM",
                &response,
                PermanentError::MessageRejected,
            ));
        }

        let response = bounded(timeouts.rcpt_to(), "RCPT TO", client.rcpt_to(owner)).await?;
        if !response.is_success() {
            return Err(DeliveryError::from_reply(
                "RCPT TO",
                &response,
                PermanentError::InvalidRecipient,
            ));
        }

        Ok(())
    }

    /// Send DATA command and message content
    ///
    /// # Errors
    /// Returns an error if the DATA command or message sending fails
    async fn send_message_data(&self, client: &mut SmtpClient) -> Result<(), DeliveryError> {
        let data_timeout = self.config.timeouts.data();

        let response = bounded(data_timeout, "DATA", client.data()).await?;
        if !response.is_intermediate() {
            return Err(DeliveryError::from_reply(
                "DATA",
                &response,
                PermanentError::MessageRejected,
            ));
        }

        let response = bounded(
            data_timeout,
            "Sending message data",
            client.send_data(self.message),
        )
        .await?;
        if !response.is_success() {
            return Err(DeliveryError::from_reply(
                "message data",
                &response,
                PermanentError::MessageRejected,
            ));
        }

        Ok(())
    }
}
