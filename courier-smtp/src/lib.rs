//! The client side of SMTP, as far as the courier relay needs it.
//!
//! Only the submission path is implemented: greeting, EHLO, STARTTLS, AUTH,
//! a single envelope and QUIT. Receiving mail is not a goal of this crate.

pub mod client;

pub use client::{ClientError, MessageBuilder, Response, SmtpClient};
