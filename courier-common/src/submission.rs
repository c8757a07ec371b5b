//! The contact form entity and its enumerated fields.
//!
//! A [`ContactForm`] is the raw input handed over by the presentation layer.
//! It becomes a [`Submission`] only after passing [`crate::validate`] and
//! being stamped by the controller, at which point it is immutable.

use core::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::UnknownVariant, validation::ValidatedForm};

/// Lowercase and drop separators so `job-opportunity`, `Job Opportunity`
/// and `JOB_OPPORTUNITY` all compare equal.
fn normalise(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// The fixed set of subject categories offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubjectCategory {
    #[default]
    #[serde(rename = "General Inquiry")]
    GeneralInquiry,
    #[serde(rename = "Job Opportunity")]
    JobOpportunity,
    #[serde(rename = "Internship Opportunity")]
    InternshipOpportunity,
    #[serde(rename = "Freelance Project")]
    FreelanceProject,
    #[serde(rename = "Collaboration Request")]
    CollaborationRequest,
    #[serde(rename = "Technical Question")]
    TechnicalQuestion,
    /// Free text supplied separately by the visitor
    Other,
}

impl SubjectCategory {
    pub const ALL: [Self; 7] = [
        Self::GeneralInquiry,
        Self::JobOpportunity,
        Self::InternshipOpportunity,
        Self::FreelanceProject,
        Self::CollaborationRequest,
        Self::TechnicalQuestion,
        Self::Other,
    ];

    /// The label shown on the form and written to the store.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GeneralInquiry => "General Inquiry",
            Self::JobOpportunity => "Job Opportunity",
            Self::InternshipOpportunity => "Internship Opportunity",
            Self::FreelanceProject => "Freelance Project",
            Self::CollaborationRequest => "Collaboration Request",
            Self::TechnicalQuestion => "Technical Question",
            Self::Other => "Other",
        }
    }

    /// Exact label lookup, used when reading stored subjects back.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == label)
    }
}

impl Display for SubjectCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SubjectCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalise(s);
        Self::ALL
            .into_iter()
            .find(|category| normalise(category.label()) == wanted)
            .ok_or_else(|| UnknownVariant::new("subject category", s))
    }
}

/// The subject of a validated submission.
///
/// Either one of the fixed categories, or the visitor's own text when they
/// picked [`SubjectCategory::Other`]. Serialized as a plain string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Category(SubjectCategory),
    Custom(String),
}

impl Subject {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Category(category) => category.label(),
            Self::Custom(text) => text,
        }
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Subject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Subject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Ok(SubjectCategory::from_label(&text).map_or(Self::Custom(text), Self::Category))
    }
}

/// How the visitor would like to be contacted back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContactPreference {
    #[default]
    Email,
    Phone,
    Either,
}

impl Display for ContactPreference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Either => "Either",
        })
    }
}

impl FromStr for ContactPreference {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "either" => Ok(Self::Either),
            _ => Err(UnknownVariant::new("contact preference", s)),
        }
    }
}

/// How urgently the visitor expects a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeline {
    #[default]
    Low,
    Medium,
    High,
}

impl Timeline {
    /// The response window promised on the form for this urgency.
    #[must_use]
    pub const fn response_window(self) -> &'static str {
        match self {
            Self::Low => "Response within a week",
            Self::Medium => "Response within 2-3 days",
            Self::High => "Response within 24 hours",
        }
    }
}

impl Display for Timeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        })
    }
}

impl FromStr for Timeline {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(UnknownVariant::new("timeline", s)),
        }
    }
}

/// Raw form input, exactly as completed by the visitor.
///
/// Missing text fields are empty strings; nothing here has been checked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub subject: SubjectCategory,
    /// Only consulted when `subject` is [`SubjectCategory::Other`]
    pub custom_subject: Option<String>,
    pub message: String,
    pub contact_preference: ContactPreference,
    pub timeline: Timeline,
}

impl ContactForm {
    /// A form with just the required fields filled in.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            ..Self::default()
        }
    }
}

/// A validated, timestamped contact form entry.
///
/// Fields are only readable; a `Submission` never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    name: String,
    email: String,
    phone: String,
    company: String,
    subject: Subject,
    message: String,
    contact_preference: ContactPreference,
    timeline: Timeline,
    timestamp: DateTime<Utc>,
}

impl Submission {
    /// Stamp a validated form with its creation instant.
    #[must_use]
    pub fn new(form: ValidatedForm, timestamp: DateTime<Utc>) -> Self {
        let ValidatedForm {
            name,
            email,
            phone,
            company,
            subject,
            message,
            contact_preference,
            timeline,
        } = form;

        Self {
            name,
            email,
            phone,
            company,
            subject,
            message,
            contact_preference,
            timeline,
            timestamp,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    #[must_use]
    pub fn company(&self) -> &str {
        &self.company
    }

    #[must_use]
    pub const fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn contact_preference(&self) -> ContactPreference {
        self.contact_preference
    }

    #[must_use]
    pub const fn timeline(&self) -> Timeline {
        self.timeline
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
