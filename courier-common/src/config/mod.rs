//! Configuration types shared by the relay and the controller.
//!
//! - [`timeouts`]: per-command bounds for the outbound SMTP conversation
//! - [`tls`]: when to upgrade the relay connection and how to verify it

pub mod timeouts;
pub mod tls;

pub use timeouts::ClientTimeouts;
pub use tls::{TlsCertificatePolicy, TlsConfig, TlsPolicy};
