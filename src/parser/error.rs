use thiserror::Error;

/// Why an extractor produced no value.
///
/// Callers only ever decide between including and omitting a key; none of
/// these variants is fatal to a section or page.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// The field is not present on this page.
    #[error("field not present")]
    Absent,
    /// The source explicitly reports the value as "NA".
    #[error("value reported as NA")]
    NotApplicable,
    /// Text is present but does not have the expected shape.
    #[error("malformed {what}: {input:?}")]
    Malformed { what: &'static str, input: String },
    /// A composite ended up with no entries.
    #[error("no entries")]
    Empty,
}

impl ExtractError {
    pub fn malformed(what: &'static str, input: &str) -> Self {
        ExtractError::Malformed {
            what,
            input: input.to_string(),
        }
    }

    /// Short label used in logs and extraction reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Absent => "absent",
            ExtractError::NotApplicable => "not_applicable",
            ExtractError::Malformed { .. } => "malformed",
            ExtractError::Empty => "empty",
        }
    }
}

pub type Extracted<T> = Result<T, ExtractError>;
