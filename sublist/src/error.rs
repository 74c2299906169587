//! FILENAME: sublist/src/error.rs

use field_format::FormatError;
use thiserror::Error;

/// A failure reported by the host record itself. Hosts identify errors by a
/// stable name plus a human readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct HostError {
    pub name: String,
    pub message: String,
}

impl HostError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        HostError {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SublistError {
    #[error("insertion index ({insert_at}) cannot be greater than sublist length ({length})")]
    InsertOutOfBounds { insert_at: usize, length: usize },

    #[error("do not call commit_line() on '{sublist_id}' while the record is in standard mode, it is only needed in dynamic mode")]
    InvalidCommit { sublist_id: String },

    #[error("field '{0}' is not declared on this line type")]
    UnknownField(String),

    #[error("field '{0}' is a subrecord and cannot be assigned")]
    ReadOnlyField(String),

    #[error("field '{0}' is a subrecord, read it with Line::subrecord")]
    SubrecordField(String),

    #[error("field '{0}' is not a subrecord field")]
    NotSubrecord(String),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SublistError {
    /// Stable error name, matching the naming hosts use for their own errors.
    pub fn name(&self) -> &str {
        match self {
            SublistError::InsertOutOfBounds { .. } => "INSERT_LINE_OUT_OF_BOUNDS",
            SublistError::InvalidCommit { .. } => "COMMIT_LINE_NOT_DYNAMIC_MODE",
            SublistError::UnknownField(_) => "UNKNOWN_FIELD",
            SublistError::ReadOnlyField(_) => "READ_ONLY_FIELD",
            SublistError::SubrecordField(_) => "SUBRECORD_FIELD",
            SublistError::NotSubrecord(_) => "NOT_A_SUBRECORD_FIELD",
            SublistError::Host(e) => &e.name,
            SublistError::Format(_) => "FORMAT_ERROR",
            SublistError::Json(_) => "JSON_ERROR",
        }
    }
}

pub type SublistResult<T> = Result<T, SublistError>;
