//! Shared fixtures for the pipeline tests: scripted relays and an SMTP
//! sink that accepts everything.
#![allow(dead_code)]

pub mod relays;
pub mod sink;

pub use relays::RecordingRelay;
pub use sink::SmtpSink;
