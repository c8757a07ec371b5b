//! Where and how the relay connects.

use std::fmt;

use courier_common::config::{ClientTimeouts, TlsConfig};
use serde::Deserialize;

/// A value that must never appear in logs.
///
/// `Debug` prints a placeholder; the value is only reachable through
/// [`Secret::expose`].
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Account used to authenticate with the relay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    /// May be left empty here and supplied through the environment instead
    #[serde(default)]
    pub password: Secret,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password),
        }
    }
}

/// Connection settings for the outbound relay.
///
/// ```ron
/// relay: (
///     host: "smtp.gmail.com",
///     port: 587,
///     owner: "owner@example.com",
///     credentials: (username: "owner@example.com"),
///     tls: (policy: required),
///     timeouts: (connect_secs: 10),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayConfig {
    pub host: String,

    /// Default: 587 (submission)
    #[serde(default = "RelayConfig::default_port")]
    pub port: u16,

    /// The site owner: sender and recipient of every notification
    pub owner: String,

    pub credentials: Credentials,

    /// Default: STARTTLS required, certificates verified
    #[serde(default)]
    pub tls: TlsConfig,

    #[serde(default)]
    pub timeouts: ClientTimeouts,

    /// Name sent with EHLO. Default: `localhost`
    #[serde(default = "RelayConfig::default_helo_domain")]
    pub helo_domain: String,
}

impl RelayConfig {
    const fn default_port() -> u16 {
        587
    }

    fn default_helo_domain() -> String {
        "localhost".to_string()
    }

    /// A configuration with every optional setting at its default.
    #[must_use]
    pub fn new(host: impl Into<String>, owner: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            port: Self::default_port(),
            owner: owner.into(),
            credentials,
            tls: TlsConfig::default(),
            timeouts: ClientTimeouts::default(),
            helo_domain: Self::default_helo_domain(),
        }
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub const fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: ClientTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// `host:port` as passed to the TCP connect.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
