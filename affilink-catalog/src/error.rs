use std::fmt;

use thiserror::Error;

/// Errors raised while reading a product table from CSV.
///
/// Any of these aborts the load entirely; no partial table is returned.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required 'id' column (also accepted: 'record_id')")]
    MissingIdColumn,

    #[error("Column '{0}' maps to a field that is already present")]
    DuplicateColumn(String),

    #[error("Row on line {line} has an empty id")]
    EmptyId { line: u64 },

    #[error("Duplicate id '{id}' on line {line}")]
    DuplicateId { id: String, line: u64 },
}

/// Why a slug candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    Empty,
    InvalidCharacters,
    EdgeHyphen,
    ConsecutiveHyphens,
    TooShort { min: usize },
    TooLong { max: usize },
    Reserved,
    /// Another record already carries this slug (case-insensitive).
    Taken { owner: String },
    /// Every suffixed variant was already taken.
    Exhausted { attempts: usize },
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "slug cannot be empty"),
            Self::InvalidCharacters => write!(
                f,
                "slug can only contain lowercase letters, numbers, and hyphens"
            ),
            Self::EdgeHyphen => write!(f, "slug cannot start or end with a hyphen"),
            Self::ConsecutiveHyphens => write!(f, "slug cannot contain consecutive hyphens"),
            Self::TooShort { min } => write!(f, "slug must be at least {min} characters long"),
            Self::TooLong { max } => write!(f, "slug cannot be longer than {max} characters"),
            Self::Reserved => write!(f, "slug is a reserved word"),
            Self::Taken { owner } => write!(f, "slug is already used by record {owner}"),
            Self::Exhausted { attempts } => {
                write!(f, "no free slug found after {attempts} attempts")
            }
        }
    }
}

/// A slug failed format, policy, or uniqueness checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid slug '{slug}': {reason}")]
pub struct ValidationError {
    pub slug: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(slug: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            slug: slug.into(),
            reason,
        }
    }
}

/// Invalid link configuration, detected once when the formatter is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("base URL cannot be empty")]
    EmptyBaseUrl,

    #[error("unbalanced braces in affiliate path template '{0}'")]
    UnbalancedBrace(String),

    #[error("unknown placeholder '{{{0}}}' in affiliate path template")]
    UnknownPlaceholder(String),

    #[error("affiliate path template is missing the '{{{0}}}' placeholder")]
    MissingPlaceholder(&'static str),
}
