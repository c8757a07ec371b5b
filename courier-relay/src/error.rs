//! Typed errors for notification delivery.
//!
//! Failures are split by whether a later attempt could succeed:
//! - Permanent: the relay refused (5xx codes, bad credentials, no TLS)
//! - Temporary: network trouble, timeouts, 4xx codes
//! - System: the notification could not be built or the conversation broke protocol
//!
//! Nothing retries automatically; the split tells the operator what to fix.

use courier_smtp::client::{ClientError, Response};
use thiserror::Error;

/// Top-level delivery error type.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Permanent failure: {0}")]
    Permanent(#[from] PermanentError),

    #[error("Temporary failure: {0}")]
    Temporary(#[from] TemporaryError),

    #[error("System error: {0}")]
    System(#[from] SystemError),
}

/// Failures that will repeat until configuration or the relay changes.
#[derive(Debug, Error)]
pub enum PermanentError {
    /// The relay refused the owner address as recipient.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// The relay refused the sender or the message content.
    #[error("Message rejected: {0}")]
    MessageRejected(String),

    /// The relay refused the configured credentials.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// TLS is required but the relay does not offer it or the upgrade failed.
    #[error("TLS required: {0}")]
    TlsRequired(String),
}

/// Failures that may clear up on their own.
#[derive(Debug, Error)]
pub enum TemporaryError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The relay greeted with an error or is shedding load.
    #[error("Server busy: {0}")]
    ServerBusy(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    /// The relay answered with a 4xx code.
    #[error("Temporary SMTP error: {0}")]
    SmtpTemporary(String),

    #[error("TLS handshake failed: {0}")]
    TlsHandshakeFailed(String),
}

/// Internal problems on our side of the connection.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeliveryError {
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }

    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self, Self::System(_))
    }

    /// Classify a reply that refused the command sent at `stage`.
    ///
    /// - **4xx** → Temporary
    /// - **535 / 534** → Permanent authentication failure
    /// - **other 5xx** → Permanent, as named by `permanent` for this stage
    /// - **anything else** → System, the relay broke protocol
    pub fn from_reply(
        stage: &str,
        response: &Response,
        permanent: impl FnOnce(String) -> PermanentError,
    ) -> Self {
        let code = response.code;
        let text = response.message();
        let detail = format!("Server rejected {stage}: {code} {text}");

        match code {
            400..500 => TemporaryError::SmtpTemporary(detail).into(),
            534 | 535 => PermanentError::AuthenticationFailed(detail).into(),
            500..600 => permanent(detail).into(),
            _ => SystemError::Internal(format!(
                "Unexpected SMTP response to {stage}: {code} {text}"
            ))
            .into(),
        }
    }
}

/// Classify SMTP client failures. Refused replies are not client failures;
/// see [`DeliveryError::from_reply`].
///
/// - **Connection/I/O errors** → Temporary
/// - **TLS errors** → Temporary
/// - **Parse/message errors** → System
impl From<ClientError> for DeliveryError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Io(e) => {
                Self::Temporary(TemporaryError::ConnectionFailed(format!("I/O error: {e}")))
            }

            ClientError::ConnectionClosed => Self::Temporary(TemporaryError::ConnectionFailed(
                "Connection closed unexpectedly".to_string(),
            )),

            ClientError::TlsError(msg) => Self::Temporary(TemporaryError::TlsHandshakeFailed(msg)),

            ClientError::ParseError(msg) => Self::System(SystemError::Internal(format!(
                "SMTP protocol parse error: {msg}"
            ))),

            ClientError::MessageError(msg) => Self::System(SystemError::Configuration(format!(
                "Cannot build notification: {msg}"
            ))),

            ClientError::Utf8Error(e) => {
                Self::System(SystemError::Internal(format!("UTF-8 decoding error: {e}")))
            }
        }
    }
}
