//! Error types shared across the courier crates.

use thiserror::Error;

/// A form value did not match any variant of one of the enumerated fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    /// Which enumeration was being parsed (e.g. "timeline").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variant_display() {
        let err = UnknownVariant::new("timeline", "yesterday");
        assert_eq!(err.to_string(), "Unknown timeline: 'yesterday'");
    }
}
