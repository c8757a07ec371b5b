//! TLS settings for the connection to the mail relay.

use serde::{Deserialize, Serialize};

/// When to upgrade the relay connection with STARTTLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TlsPolicy {
    /// Require STARTTLS; fail delivery if the relay cannot provide it.
    ///
    /// Credentials are sent during AUTH, so this is the default.
    #[default]
    Required,

    /// Upgrade when the relay advertises STARTTLS, otherwise stay in plaintext.
    ///
    /// A failed upgrade is still a delivery failure: there is no reconnect.
    Opportunistic,

    /// Never use TLS, always use plaintext.
    ///
    /// **WARNING**: Only use against a local relay or in tests.
    Disabled,
}

/// TLS certificate validation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TlsCertificatePolicy {
    /// Whether to accept invalid TLS certificates (self-signed, expired, etc.).
    ///
    /// **SECURITY WARNING**: Setting this to `true` disables certificate validation
    /// and makes the connection vulnerable to man-in-the-middle attacks.
    ///
    /// Default: `false` (validate certificates)
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Complete TLS configuration for the relay connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TlsConfig {
    /// Default: `Required`
    #[serde(default)]
    pub policy: TlsPolicy,

    /// Default: `accept_invalid_certs = false`
    #[serde(default)]
    pub certificate: TlsCertificatePolicy,
}

impl TlsConfig {
    /// Require TLS with full certificate validation.
    #[must_use]
    pub const fn required() -> Self {
        Self {
            policy: TlsPolicy::Required,
            certificate: TlsCertificatePolicy {
                accept_invalid_certs: false,
            },
        }
    }

    /// Upgrade only if the relay offers it.
    #[must_use]
    pub const fn opportunistic() -> Self {
        Self {
            policy: TlsPolicy::Opportunistic,
            certificate: TlsCertificatePolicy {
                accept_invalid_certs: false,
            },
        }
    }

    /// Plaintext only.
    ///
    /// **WARNING**: Only use for local relays and tests.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            policy: TlsPolicy::Disabled,
            certificate: TlsCertificatePolicy {
                accept_invalid_certs: false,
            },
        }
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self.policy, TlsPolicy::Required)
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        matches!(self.policy, TlsPolicy::Disabled)
    }

    /// **SECURITY WARNING**: `true` means certificate validation is disabled.
    #[must_use]
    pub const fn accepts_invalid_certs(&self) -> bool {
        self.certificate.accept_invalid_certs
    }
}
