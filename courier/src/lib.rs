pub mod clock;
pub mod config;
pub mod controller;

pub use clock::MonotonicClock;
pub use config::{ConfigError, Courier, find_config_file};
pub use controller::{SubmissionController, SubmissionOutcome, SubmissionReport};
