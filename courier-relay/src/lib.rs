pub mod config;
pub mod error;
pub mod notification;
pub mod relay;
pub mod smtp_transaction;

pub use config::{Credentials, RelayConfig, Secret};
pub use error::{DeliveryError, PermanentError, SystemError, TemporaryError};
pub use notification::{build_notification, notification_body, notification_subject};
pub use relay::{Relay, SmtpRelay};
pub use smtp_transaction::SmtpTransaction;
