//! FILENAME: field-format/src/error.rs

use thiserror::Error;

use crate::format_type::FormatType;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("cannot parse '{value}' as {format_type}")]
    Unparseable { format_type: FormatType, value: String },

    #[error("{format_type} expects a numeric value, got '{value}'")]
    NotNumeric { format_type: FormatType, value: String },

    #[error("{value} is out of range for {format_type}")]
    OutOfRange { format_type: FormatType, value: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format settings: {0}")]
    Settings(#[from] serde_json::Error),
}
