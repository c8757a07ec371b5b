//! The configuration root, read from a RON file.
//!
//! ```ron
//! Courier (
//!     store: (type: "File", path: "/var/lib/courier/messages.json"),
//!     relay: (
//!         host: "smtp.gmail.com",
//!         owner: "owner@example.com",
//!         credentials: (username: "owner@example.com"),
//!     ),
//!     fallback_contact: "owner@example.com",
//! )
//! ```

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use courier_common::internal;
use courier_relay::{RelayConfig, Secret, SmtpRelay};
use courier_store::{StoreConfig, StoreError};
use serde::Deserialize;
use thiserror::Error;

use crate::controller::SubmissionController;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "COURIER_CONFIG";

/// Environment variable holding the relay password
pub const PASSWORD_ENV: &str = "COURIER_SMTP_PASSWORD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("COURIER_CONFIG points to non-existent file: {}", .0.display())]
    MissingOverride(PathBuf),

    #[error("No configuration file found. Tried:\n  - COURIER_CONFIG environment variable\n{tried}")]
    NotFound { tried: String },

    #[error("Failed to read config from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to open the message store: {0}")]
    Store(#[from] StoreError),
}

/// Everything needed to build a [`SubmissionController`].
#[derive(Debug, Clone, Deserialize)]
pub struct Courier {
    #[serde(default)]
    pub store: StoreConfig,

    pub relay: RelayConfig,

    /// Shown to visitors when their message may not have reached the owner.
    /// Defaults to the relay's owner address.
    #[serde(default)]
    fallback_contact: Option<String>,
}

impl Courier {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid RON for this shape, or
    /// names no owner address.
    pub fn from_ron(document: &str) -> Result<Self, ConfigError> {
        let courier: Self = ron::from_str(document)?;

        if courier.relay.owner.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "relay.owner must be an email address".to_string(),
            ));
        }

        Ok(courier)
    }

    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_ron(&document)
    }

    /// Replace the relay password when one is supplied, typically from
    /// [`PASSWORD_ENV`].
    #[must_use]
    pub fn with_password(mut self, password: Option<String>) -> Self {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.relay.credentials.password = Secret::new(password);
        }
        self
    }

    #[must_use]
    pub fn fallback_contact(&self) -> &str {
        self.fallback_contact
            .as_deref()
            .unwrap_or(&self.relay.owner)
    }

    /// Open the configured store and build a controller around it and an
    /// [`SmtpRelay`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be initialised.
    pub async fn into_controller(self) -> Result<SubmissionController, ConfigError> {
        if self.relay.credentials.password.is_empty() {
            internal!(
                level = WARN,
                "No relay password configured; set {PASSWORD_ENV} or relay.credentials.password"
            );
        }

        let store = self.store.into_store().await?;
        let relay = Arc::new(SmtpRelay::new(self.relay));

        Ok(SubmissionController::new(store, relay))
    }
}

/// The configuration file locations tried after [`CONFIG_ENV`].
#[must_use]
pub fn default_config_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("./courier.config.ron"),
        PathBuf::from("/etc/courier/courier.config.ron"),
    ]
}

/// Find the configuration file using the following precedence:
/// 1. `COURIER_CONFIG` environment variable
/// 2. ./courier.config.ron (current working directory)
/// 3. /etc/courier/courier.config.ron (system-wide config)
///
/// # Errors
///
/// Returns an error if the override does not exist or no candidate does.
pub fn find_config_file() -> Result<PathBuf, ConfigError> {
    locate_config(
        std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        &default_config_paths(),
    )
}

/// [`find_config_file`] with the override and candidates supplied.
///
/// # Errors
///
/// Returns an error if `overridden` does not exist or no candidate does.
pub fn locate_config(
    overridden: Option<PathBuf>,
    candidates: &[PathBuf],
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = overridden {
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::MissingOverride(path));
    }

    if let Some(path) = candidates.iter().find(|path| path.exists()) {
        return Ok(path.clone());
    }

    let tried = candidates
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::NotFound { tried })
}
