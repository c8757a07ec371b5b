//! Required-field and format checks for incoming contact forms.

use thiserror::Error;

use crate::submission::{ContactForm, ContactPreference, Subject, SubjectCategory, Timeline};

/// Why a contact form was rejected. These are always correctable by the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The email address has no `@` separator.
    #[error("Malformed email address: '{0}'")]
    MalformedEmail(String),
}

impl ValidationError {
    /// The form field the visitor needs to fix.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) => field,
            Self::MalformedEmail(_) => "email",
        }
    }
}

/// A contact form that passed [`validate`], ready to be stamped into a
/// [`crate::Submission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) company: String,
    pub(crate) subject: Subject,
    pub(crate) message: String,
    pub(crate) contact_preference: ContactPreference,
    pub(crate) timeline: Timeline,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Check a raw form.
///
/// Rules are applied in order: required fields (`name`, `email`, `message`),
/// then the `@` in `email`, then the custom subject when the category is
/// [`SubjectCategory::Other`]. Values are carried through untouched.
///
/// # Errors
///
/// Returns the first rule the form breaks.
pub fn validate(form: &ContactForm) -> Result<ValidatedForm, ValidationError> {
    for (field, value) in [
        ("name", &form.name),
        ("email", &form.email),
        ("message", &form.message),
    ] {
        if is_blank(value) {
            return Err(ValidationError::MissingField(field));
        }
    }

    if !form.email.contains('@') {
        return Err(ValidationError::MalformedEmail(form.email.clone()));
    }

    let subject = match form.subject {
        SubjectCategory::Other => {
            let custom = form
                .custom_subject
                .as_deref()
                .filter(|text| !is_blank(text))
                .ok_or(ValidationError::MissingField("subject"))?;

            // Text that spells out a category label is stored as that category
            SubjectCategory::from_label(custom)
                .map_or_else(|| Subject::Custom(custom.to_string()), Subject::Category)
        }
        category => Subject::Category(category),
    };

    Ok(ValidatedForm {
        name: form.name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        company: form.company.clone(),
        subject,
        message: form.message.clone(),
        contact_preference: form.contact_preference,
        timeline: form.timeline,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn valid() -> ContactForm {
        ContactForm::new("A", "a@x.com", "hi")
    }

    #[test]
    fn test_accepts_minimal_form() {
        let validated = validate(&valid()).unwrap();
        assert_eq!(validated.name, "A");
        assert_eq!(
            validated.subject,
            Subject::Category(SubjectCategory::GeneralInquiry)
        );
        assert_eq!(validated.phone, "");
    }

    #[test]
    fn test_missing_fields_are_named() {
        for (field, form) in [
            ("name", ContactForm { name: String::new(), ..valid() }),
            ("email", ContactForm { email: "   ".to_string(), ..valid() }),
            ("message", ContactForm { message: "\n\t".to_string(), ..valid() }),
        ] {
            assert_eq!(validate(&form), Err(ValidationError::MissingField(field)));
        }
    }

    #[test]
    fn test_missing_fields_checked_in_order() {
        let form = ContactForm::default();
        assert_eq!(validate(&form), Err(ValidationError::MissingField("name")));
    }

    #[test]
    fn test_email_needs_at_sign() {
        let form = ContactForm {
            email: "a.x.com".to_string(),
            ..valid()
        };
        let err = validate(&form).unwrap_err();
        assert_eq!(err, ValidationError::MalformedEmail("a.x.com".to_string()));
        assert_eq!(err.field(), "email");
    }

    #[test]
    fn test_other_requires_custom_subject() {
        let blank = ContactForm {
            subject: SubjectCategory::Other,
            custom_subject: Some("  ".to_string()),
            ..valid()
        };
        assert_eq!(
            validate(&blank),
            Err(ValidationError::MissingField("subject"))
        );

        let absent = ContactForm {
            subject: SubjectCategory::Other,
            ..valid()
        };
        assert_eq!(
            validate(&absent),
            Err(ValidationError::MissingField("subject"))
        );
    }

    #[test]
    fn test_other_custom_subject_replaces_category() {
        let form = ContactForm {
            subject: SubjectCategory::Other,
            custom_subject: Some("Guest lecture".to_string()),
            ..valid()
        };
        assert_eq!(
            validate(&form).unwrap().subject,
            Subject::Custom("Guest lecture".to_string())
        );
    }

    #[test]
    fn test_custom_subject_ignored_for_fixed_category() {
        let form = ContactForm {
            subject: SubjectCategory::JobOpportunity,
            custom_subject: Some("ignored".to_string()),
            ..valid()
        };
        assert_eq!(
            validate(&form).unwrap().subject,
            Subject::Category(SubjectCategory::JobOpportunity)
        );
    }

    #[test]
    fn test_custom_subject_matching_label_resolves_to_category() {
        let form = ContactForm {
            subject: SubjectCategory::Other,
            custom_subject: Some("Freelance Project".to_string()),
            ..valid()
        };
        assert_eq!(
            validate(&form).unwrap().subject,
            Subject::Category(SubjectCategory::FreelanceProject)
        );
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let form = ContactForm::new(" Ada ", "ada@example.com", " hello ");
        let validated = validate(&form).unwrap();
        assert_eq!(validated.name, " Ada ");
        assert_eq!(validated.message, " hello ");
    }
}
