//! Timeouts for the outbound SMTP conversation with the mail relay.
//!
//! Delivery happens inside the handling of a visitor's request, so every
//! step of the conversation is bounded. A relay that stops answering turns
//! into a delivery failure instead of a hung request.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-step SMTP client timeouts, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTimeouts {
    /// Timeout for establishing TCP connection and reading the greeting.
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::connect_secs")]
    pub connect_secs: u64,

    /// Timeout for EHLO/HELO command.
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::ehlo_secs")]
    pub ehlo_secs: u64,

    /// Timeout for STARTTLS command and the TLS handshake.
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::starttls_secs")]
    pub starttls_secs: u64,

    /// Timeout for the whole AUTH exchange.
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::auth_secs")]
    pub auth_secs: u64,

    /// Timeout for MAIL FROM command.
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::mail_from_secs")]
    pub mail_from_secs: u64,

    /// Timeout for RCPT TO command.
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::rcpt_to_secs")]
    pub rcpt_to_secs: u64,

    /// Timeout for DATA command and message transfer.
    ///
    /// Default: 120 seconds (2 minutes)
    #[serde(default = "defaults::data_secs")]
    pub data_secs: u64,

    /// Timeout for QUIT command.
    ///
    /// Default: 10 seconds (doesn't fail delivery if timeout occurs)
    #[serde(default = "defaults::quit_secs")]
    pub quit_secs: u64,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: defaults::connect_secs(),
            ehlo_secs: defaults::ehlo_secs(),
            starttls_secs: defaults::starttls_secs(),
            auth_secs: defaults::auth_secs(),
            mail_from_secs: defaults::mail_from_secs(),
            rcpt_to_secs: defaults::rcpt_to_secs(),
            data_secs: defaults::data_secs(),
            quit_secs: defaults::quit_secs(),
        }
    }
}

impl ClientTimeouts {
    /// Every step bounded by the same duration; handy in tests.
    #[must_use]
    pub const fn uniform(secs: u64) -> Self {
        Self {
            connect_secs: secs,
            ehlo_secs: secs,
            starttls_secs: secs,
            auth_secs: secs,
            mail_from_secs: secs,
            rcpt_to_secs: secs,
            data_secs: secs,
            quit_secs: secs,
        }
    }

    #[must_use]
    pub const fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    #[must_use]
    pub const fn ehlo(&self) -> Duration {
        Duration::from_secs(self.ehlo_secs)
    }

    #[must_use]
    pub const fn starttls(&self) -> Duration {
        Duration::from_secs(self.starttls_secs)
    }

    #[must_use]
    pub const fn auth(&self) -> Duration {
        Duration::from_secs(self.auth_secs)
    }

    #[must_use]
    pub const fn mail_from(&self) -> Duration {
        Duration::from_secs(self.mail_from_secs)
    }

    #[must_use]
    pub const fn rcpt_to(&self) -> Duration {
        Duration::from_secs(self.rcpt_to_secs)
    }

    #[must_use]
    pub const fn data(&self) -> Duration {
        Duration::from_secs(self.data_secs)
    }

    #[must_use]
    pub const fn quit(&self) -> Duration {
        Duration::from_secs(self.quit_secs)
    }

    /// Upper bound on a complete delivery attempt.
    #[must_use]
    pub const fn total(&self) -> Duration {
        Duration::from_secs(
            self.connect_secs
                + 2 * self.ehlo_secs
                + self.starttls_secs
                + self.auth_secs
                + self.mail_from_secs
                + self.rcpt_to_secs
                + self.data_secs
                + self.quit_secs,
        )
    }
}

/// Default timeout values.
mod defaults {
    pub const fn connect_secs() -> u64 {
        30
    }
    pub const fn ehlo_secs() -> u64 {
        30
    }
    pub const fn starttls_secs() -> u64 {
        30
    }
    pub const fn auth_secs() -> u64 {
        30
    }
    pub const fn mail_from_secs() -> u64 {
        30
    }
    pub const fn rcpt_to_secs() -> u64 {
        30
    }
    pub const fn data_secs() -> u64 {
        120 // 2 minutes
    }
    pub const fn quit_secs() -> u64 {
        10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_timeouts_defaults() {
        let timeouts = ClientTimeouts::default();
        assert_eq!(timeouts.connect_secs, 30);
        assert_eq!(timeouts.ehlo_secs, 30);
        assert_eq!(timeouts.starttls_secs, 30);
        assert_eq!(timeouts.auth_secs, 30);
        assert_eq!(timeouts.mail_from_secs, 30);
        assert_eq!(timeouts.rcpt_to_secs, 30);
        assert_eq!(timeouts.data_secs, 120);
        assert_eq!(timeouts.quit_secs, 10);
    }

    #[test]
    fn test_total_counts_both_ehlos() {
        let timeouts = ClientTimeouts::uniform(1);
        assert_eq!(timeouts.total(), Duration::from_secs(9));
        assert_eq!(timeouts.data(), Duration::from_secs(1));
    }
}
