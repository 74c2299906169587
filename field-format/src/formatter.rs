//! FILENAME: field-format/src/formatter.rs
//! PURPOSE: Parse/format rules that translate between host strings and typed values.
//! CONTEXT: `Formatter` is the seam the sublist layer calls for formatted
//! fields. `StandardFormatter` is the default implementation, driven by
//! `FormatSettings`. `parse` turns whatever the host stored into a typed
//! value; `format` turns a typed value into the string the host accepts.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::{self, Write};

use crate::error::FormatError;
use crate::format_type::FormatType;
use crate::number::{format_fixed, format_general, format_integer, format_trimmed, parse_number};
use crate::settings::FormatSettings;
use crate::value::FieldValue;

const LOG_CATEGORY: &str = "FORMAT";

pub trait Formatter {
    /// Converts a raw host value into its typed form for `format_type`.
    fn parse(&self, format_type: FormatType, raw: &FieldValue) -> Result<FieldValue, FormatError>;

    /// Converts a typed value into the string representation the host expects.
    fn format(&self, format_type: FormatType, value: &FieldValue) -> Result<String, FormatError>;
}

#[derive(Debug, Clone, Default)]
pub struct StandardFormatter {
    settings: FormatSettings,
}

impl StandardFormatter {
    pub fn new(settings: FormatSettings) -> Self {
        StandardFormatter { settings }
    }

    pub fn settings(&self) -> &FormatSettings {
        &self.settings
    }

    // ========================================================================
    // FORMAT (typed -> host string)
    // ========================================================================

    fn format_numeric(&self, format_type: FormatType, value: &FieldValue) -> Result<String, FormatError> {
        let number = to_number(format_type, value)?;
        check_sign(format_type, number)?;

        let rendered = match format_type {
            t if t.is_currency() => format_fixed(number, self.settings.currency_precision),
            FormatType::Integer | FormatType::PosInteger => format_integer(number),
            FormatType::Rate => format_fixed(number, self.settings.rate_precision),
            FormatType::RateHighPrecision => {
                format_trimmed(number, self.settings.high_precision_rate_digits)
            }
            _ => format_general(number),
        };
        Ok(rendered)
    }

    fn format_date(&self, format_type: FormatType, value: &FieldValue) -> Result<String, FormatError> {
        let pattern = match format_type {
            FormatType::Date => &self.settings.date_format,
            FormatType::MmYyDate => &self.settings.month_year_format,
            _ => &self.settings.datetime_format,
        };

        let rendered = match (format_type, value) {
            (FormatType::TimeOfDay, FieldValue::DateTime(dt)) => {
                render(format_type, dt.format(&self.settings.time_format))?
            }
            (FormatType::TimeOfDay, FieldValue::Date(d)) => {
                return Err(FormatError::Unparseable {
                    format_type,
                    value: d.to_string(),
                })
            }
            (FormatType::DateTime, FieldValue::Date(d)) => {
                render(format_type, d.and_time(NaiveTime::MIN).format(pattern))?
            }
            (_, FieldValue::Date(d)) => render(format_type, d.format(pattern))?,
            (_, FieldValue::DateTime(dt)) => render(format_type, dt.format(pattern))?,
            // Strings must already be in the host's shape; validate by parsing.
            (_, FieldValue::Text(s)) => {
                self.parse_temporal(format_type, s)?;
                s.clone()
            }
            (_, other) => {
                return Err(FormatError::Unparseable {
                    format_type,
                    value: other.display_value(),
                })
            }
        };
        Ok(rendered)
    }

    // ========================================================================
    // PARSE (host string -> typed)
    // ========================================================================

    fn parse_temporal(&self, format_type: FormatType, text: &str) -> Result<FieldValue, FormatError> {
        let unparseable = || FormatError::Unparseable {
            format_type,
            value: text.to_string(),
        };
        let text = text.trim();

        match format_type {
            FormatType::Date => NaiveDate::parse_from_str(text, &self.settings.date_format)
                .map(FieldValue::Date)
                .map_err(|_| unparseable()),
            FormatType::DateTime => NaiveDateTime::parse_from_str(text, &self.settings.datetime_format)
                .or_else(|_| {
                    NaiveDate::parse_from_str(text, &self.settings.date_format)
                        .map(|d| d.and_time(NaiveTime::MIN))
                })
                .map(FieldValue::DateTime)
                .map_err(|_| unparseable()),
            FormatType::TimeOfDay => NaiveTime::parse_from_str(text, &self.settings.time_format)
                .map(|t| FieldValue::DateTime(NaiveDate::default().and_time(t)))
                .map_err(|_| unparseable()),
            FormatType::MmYyDate => {
                // chrono needs a day to build a date; pin it to the 1st.
                let pattern = format!("%d/{}", self.settings.month_year_format);
                NaiveDate::parse_from_str(&format!("01/{}", text), &pattern)
                    .map(FieldValue::Date)
                    .map_err(|_| unparseable())
            }
            _ => Ok(FieldValue::Text(text.to_string())),
        }
    }
}

impl Formatter for StandardFormatter {
    fn parse(&self, format_type: FormatType, raw: &FieldValue) -> Result<FieldValue, FormatError> {
        log::debug!(target: LOG_CATEGORY, "parse {} from {:?}", format_type, raw);

        match (format_type, raw) {
            (_, FieldValue::Null) => Ok(FieldValue::Null),

            (t, FieldValue::Text(s)) if t.is_numeric() || t == FormatType::Percent => parse_number(s)
                .map(FieldValue::Number)
                .ok_or_else(|| FormatError::Unparseable {
                    format_type,
                    value: s.clone(),
                }),

            (FormatType::Checkbox, FieldValue::Text(s)) => match s.as_str() {
                "T" => Ok(FieldValue::Bool(true)),
                "F" | "" => Ok(FieldValue::Bool(false)),
                _ => Err(FormatError::Unparseable {
                    format_type,
                    value: s.clone(),
                }),
            },

            (
                FormatType::Date | FormatType::DateTime | FormatType::TimeOfDay | FormatType::MmYyDate,
                FieldValue::Text(s),
            ) => self.parse_temporal(format_type, s),

            (FormatType::Date, FieldValue::DateTime(dt)) => Ok(FieldValue::Date(dt.date())),
            (FormatType::DateTime, FieldValue::Date(d)) => {
                Ok(FieldValue::DateTime(d.and_time(NaiveTime::MIN)))
            }

            // Already typed (or a plain text tag): hand back as-is.
            _ => Ok(raw.clone()),
        }
    }

    fn format(&self, format_type: FormatType, value: &FieldValue) -> Result<String, FormatError> {
        log::debug!(target: LOG_CATEGORY, "format {} from {:?}", format_type, value);

        if value.is_null() {
            return Ok(String::new());
        }

        match format_type {
            t if t.is_numeric() => self.format_numeric(t, value),
            FormatType::Percent => match value {
                FieldValue::Text(s) if s.trim_end().ends_with('%') => Ok(s.clone()),
                _ => Ok(format!("{}%", format_general(to_number(format_type, value)?))),
            },
            FormatType::Checkbox => match value {
                FieldValue::Bool(b) => Ok(if *b { "T" } else { "F" }.to_string()),
                FieldValue::Text(s) if s == "T" || s == "F" => Ok(s.clone()),
                other => Err(FormatError::Unparseable {
                    format_type,
                    value: other.display_value(),
                }),
            },
            FormatType::Date | FormatType::DateTime | FormatType::TimeOfDay | FormatType::MmYyDate => {
                self.format_date(format_type, value)
            }
            _ => Ok(value.display_value()),
        }
    }
}

fn to_number(format_type: FormatType, value: &FieldValue) -> Result<f64, FormatError> {
    match value {
        FieldValue::Number(n) if n.is_finite() => Ok(*n),
        FieldValue::Text(s) => parse_number(s).ok_or_else(|| FormatError::NotNumeric {
            format_type,
            value: s.clone(),
        }),
        other => Err(FormatError::NotNumeric {
            format_type,
            value: other.display_value(),
        }),
    }
}

/// chrono reports unusable patterns through `fmt::Error`; surface that as a
/// format error instead of letting `to_string` panic.
fn render(format_type: FormatType, formatted: impl fmt::Display) -> Result<String, FormatError> {
    let mut out = String::new();
    write!(out, "{}", formatted).map_err(|_| FormatError::Unparseable {
        format_type,
        value: out.clone(),
    })?;
    Ok(out)
}

fn check_sign(format_type: FormatType, number: f64) -> Result<(), FormatError> {
    let in_range = match format_type {
        FormatType::NonNegCurrency | FormatType::NonNegFloat => number >= 0.0,
        FormatType::PosCurrency | FormatType::PosFloat | FormatType::PosInteger => number > 0.0,
        _ => true,
    };
    if in_range {
        Ok(())
    } else {
        Err(FormatError::OutOfRange {
            format_type,
            value: number,
        })
    }
}
