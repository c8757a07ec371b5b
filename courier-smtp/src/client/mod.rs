//! SMTP client used to hand notifications to the owner's mail relay.
//!
//! The client is deliberately low level: each method sends one command and
//! returns the server's [`Response`] without judging it. Deciding whether a
//! response is acceptable belongs to the caller.
//!
//! # Examples
//!
//! ```no_run
//! use courier_smtp::client::{MessageBuilder, SmtpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = SmtpClient::connect("smtp.example.com:587", "smtp.example.com".to_string()).await?;
//! client.read_greeting().await?;
//! client.ehlo("portfolio.example.com").await?;
//! client.starttls().await?;
//! client.ehlo("portfolio.example.com").await?;
//! client.auth_plain("owner@example.com", "app-password").await?;
//! client.mail_from("owner@example.com").await?;
//! client.rcpt_to("owner@example.com").await?;
//! client.data().await?;
//!
//! let message = MessageBuilder::new()
//!     .from("owner@example.com")
//!     .to("owner@example.com")
//!     .subject("Hello")
//!     .body("Hello World")
//!     .build()?;
//! client.send_data(&message).await?;
//! client.quit().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod message;
mod response;
mod smtp_client;

pub use error::{ClientError, Result};
pub use message::{MessageBuilder, sanitize_header_value};
pub use response::{Response, ResponseLine};
pub use smtp_client::SmtpClient;
