//! FILENAME: field-format/src/settings.rs
//! PURPOSE: User/company formatting preferences consumed by the formatter.
//! CONTEXT: A host renders dates and numbers according to preferences that
//! live outside any single record. These settings carry the subset the
//! standard formatter needs and can be loaded from a JSON document; missing
//! keys fall back to US-locale defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::FormatError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    /// chrono pattern for `date` fields, e.g. "%m/%d/%Y"
    pub date_format: String,
    /// chrono pattern for `datetime` fields
    pub datetime_format: String,
    /// chrono pattern for `timeofday` fields
    pub time_format: String,
    /// chrono pattern for `mmyydate` fields
    pub month_year_format: String,
    /// Fixed decimals for all currency tags
    pub currency_precision: u8,
    /// Fixed decimals for `rate`
    pub rate_precision: u8,
    /// Maximum decimals for `ratehighprecision` (trailing zeros trimmed)
    pub high_precision_rate_digits: u8,
}

impl Default for FormatSettings {
    fn default() -> Self {
        FormatSettings {
            date_format: "%m/%d/%Y".to_string(),
            datetime_format: "%m/%d/%Y %I:%M:%S %p".to_string(),
            time_format: "%I:%M %p".to_string(),
            month_year_format: "%m/%Y".to_string(),
            currency_precision: 2,
            rate_precision: 2,
            high_precision_rate_digits: 5,
        }
    }
}

impl FormatSettings {
    pub fn from_json_str(json: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, FormatError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
