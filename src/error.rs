use chrono::NaiveDate;
use thiserror::Error;

/// Fatal conditions for a single operation over a rank matrix.
///
/// Header and cell parse failures are deliberately absent: they only exclude
/// data and are reported through [`crate::process::BuildDiagnostics`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankError {
    #[error("could not parse date `{input}`; expected one of: {expected}")]
    UserInputParse { input: String, expected: String },

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("insufficient data: need {needed} date(s), found {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("date {0} not found in rank data")]
    DateNotFound(NaiveDate),

    #[error("keyword `{0}` not found in rank data")]
    KeywordNotFound(String),

    #[error("unknown range preset `{0}`")]
    UnknownPreset(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RankError {
    /// Stable snake_case name, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            RankError::UserInputParse { .. } => "user_input_parse",
            RankError::InvalidRange { .. } => "invalid_range",
            RankError::InsufficientData { .. } => "insufficient_data",
            RankError::DateNotFound(_) => "date_not_found",
            RankError::KeywordNotFound(_) => "keyword_not_found",
            RankError::UnknownPreset(_) => "unknown_preset",
            RankError::InvalidConfig(_) => "invalid_config",
        }
    }
}

pub type Result<T> = std::result::Result<T, RankError>;
