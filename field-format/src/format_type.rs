//! FILENAME: field-format/src/format_type.rs
//! PURPOSE: The closed set of host format-type tags.
//! CONTEXT: A formatted sublist field names one of these tags. The tag picks
//! the parse/format rule, and `is_numeric` decides whether a formatted write
//! is coerced back to a number before it reaches the host.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    Checkbox,
    Currency,
    Currency2,
    Date,
    DateTime,
    Email,
    Float,
    Integer,
    MmYyDate,
    NonNegCurrency,
    NonNegFloat,
    Percent,
    Phone,
    PosCurrency,
    PosFloat,
    PosInteger,
    Rate,
    RateHighPrecision,
    Text,
    TimeOfDay,
    Url,
}

impl FormatType {
    /// Tags whose host fields only accept canonically formatted numbers.
    pub const NUMERIC: [FormatType; 11] = [
        FormatType::Currency,
        FormatType::Currency2,
        FormatType::Float,
        FormatType::Integer,
        FormatType::NonNegCurrency,
        FormatType::NonNegFloat,
        FormatType::PosCurrency,
        FormatType::PosFloat,
        FormatType::PosInteger,
        FormatType::Rate,
        FormatType::RateHighPrecision,
    ];

    pub fn is_numeric(self) -> bool {
        Self::NUMERIC.contains(&self)
    }

    pub fn is_currency(self) -> bool {
        matches!(
            self,
            FormatType::Currency
                | FormatType::Currency2
                | FormatType::NonNegCurrency
                | FormatType::PosCurrency
        )
    }

    /// The host's own spelling of the tag.
    pub fn as_str(self) -> &'static str {
        match self {
            FormatType::Checkbox => "checkbox",
            FormatType::Currency => "currency",
            FormatType::Currency2 => "currency2",
            FormatType::Date => "date",
            FormatType::DateTime => "datetime",
            FormatType::Email => "email",
            FormatType::Float => "float",
            FormatType::Integer => "integer",
            FormatType::MmYyDate => "mmyydate",
            FormatType::NonNegCurrency => "nonnegcurrency",
            FormatType::NonNegFloat => "nonnegfloat",
            FormatType::Percent => "percent",
            FormatType::Phone => "phone",
            FormatType::PosCurrency => "poscurrency",
            FormatType::PosFloat => "posfloat",
            FormatType::PosInteger => "posinteger",
            FormatType::Rate => "rate",
            FormatType::RateHighPrecision => "ratehighprecision",
            FormatType::Text => "text",
            FormatType::TimeOfDay => "timeofday",
            FormatType::Url => "url",
        }
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
