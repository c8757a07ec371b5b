pub mod config;
pub mod error;
pub mod logging;
pub mod submission;
pub mod validation;

pub use error::UnknownVariant;
pub use submission::{ContactForm, ContactPreference, Subject, SubjectCategory, Submission, Timeline};
pub use tracing;
pub use validation::{ValidatedForm, ValidationError, validate};
