//! FILENAME: sublist/src/field.rs
//! PURPOSE: Declarative description of the fields a line type exposes.
//! CONTEXT: Each line type publishes a static table of `FieldDescriptor`s.
//! The table decides, per field, which accessor handles reads and writes
//! (passthrough, formatted, subrecord) and whether a passthrough field is the
//! text projection of another field (keys ending in `Text`).

use field_format::{FieldValue, FormatType};
use serde::Serialize;

use crate::error::SublistResult;
use crate::host::{FieldMetadata, SharedRecord};
use crate::line::FromRecord;

const TEXT_SUFFIX: &str = "Text";

/// Renders a subrecord field into JSON through the nested line type.
pub type SubrecordJson = fn(SharedRecord) -> SublistResult<serde_json::Value>;

#[derive(Debug, Clone, Copy)]
pub enum AccessorKind {
    /// value (or text, for `...Text` keys) exactly as the host returns it
    Passthrough,
    /// parsed on read and canonically formatted on write
    Formatted(FormatType),
    /// read-only nested record
    Subrecord(SubrecordJson),
}

/// Host field kinds that bind the passthrough accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SublistFieldType {
    Checkbox,
    Currency,
    Date,
    DateTime,
    Email,
    FreeFormText,
    DecimalNumber,
    Float,
    Hyperlink,
    Image,
    InlineHtml,
    IntegerNumber,
    LongText,
    MultiSelect,
    Percent,
    Select,
    TextArea,
}

impl SublistFieldType {
    /// Host field type name, as reported in `FieldMetadata::field_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            SublistFieldType::Checkbox => "checkbox",
            SublistFieldType::Currency => "currency",
            SublistFieldType::Date => "date",
            SublistFieldType::DateTime => "datetime",
            SublistFieldType::Email => "email",
            SublistFieldType::FreeFormText => "freeformtext",
            SublistFieldType::DecimalNumber => "decimalnumber",
            SublistFieldType::Float => "float",
            SublistFieldType::Hyperlink => "hyperlink",
            SublistFieldType::Image => "image",
            SublistFieldType::InlineHtml => "inlinehtml",
            SublistFieldType::IntegerNumber => "integernumber",
            SublistFieldType::LongText => "longtext",
            SublistFieldType::MultiSelect => "multiselect",
            SublistFieldType::Percent => "percent",
            SublistFieldType::Select => "select",
            SublistFieldType::TextArea => "textarea",
        }
    }

    /// Whether the host metadata agrees with the declared type.
    pub fn matches(self, metadata: &FieldMetadata) -> bool {
        metadata.field_type.eq_ignore_ascii_case(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub kind: AccessorKind,
    pub field_type: Option<SublistFieldType>,
}

impl FieldDescriptor {
    pub const fn passthrough(key: &'static str) -> Self {
        FieldDescriptor {
            key,
            kind: AccessorKind::Passthrough,
            field_type: None,
        }
    }

    pub const fn typed(key: &'static str, field_type: SublistFieldType) -> Self {
        FieldDescriptor {
            key,
            kind: AccessorKind::Passthrough,
            field_type: Some(field_type),
        }
    }

    pub const fn formatted(key: &'static str, format_type: FormatType) -> Self {
        FieldDescriptor {
            key,
            kind: AccessorKind::Formatted(format_type),
            field_type: None,
        }
    }

    pub const fn subrecord(key: &'static str, to_json: SubrecordJson) -> Self {
        FieldDescriptor {
            key,
            kind: AccessorKind::Subrecord(to_json),
            field_type: None,
        }
    }

    /// Whether the key names the display-text projection of a field.
    pub fn is_text_variant(&self) -> bool {
        self.key.len() > TEXT_SUFFIX.len() && self.key.ends_with(TEXT_SUFFIX)
    }

    /// Whether reads/writes go through the host's text calls.
    pub fn uses_text_api(&self) -> bool {
        matches!(self.kind, AccessorKind::Passthrough) && self.is_text_variant()
    }

    /// The host field id the accessor talks to: `rateText` -> `rate`.
    pub fn host_field(&self) -> &'static str {
        let key: &'static str = self.key;
        if self.uses_text_api() {
            &key[..key.len() - TEXT_SUFFIX.len()]
        } else {
            key
        }
    }
}

/// `SubrecordJson` for any nested type that can wrap a record and serialize.
pub fn subrecord_json<T: FromRecord + Serialize>(record: SharedRecord) -> SublistResult<serde_json::Value> {
    Ok(serde_json::to_value(T::from_record(record))?)
}

/// A field write. `Unset` leaves the host untouched; `Value(FieldValue::Null)`
/// is an explicit clear.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Assign {
    #[default]
    Unset,
    Value(FieldValue),
}

impl From<FieldValue> for Assign {
    fn from(value: FieldValue) -> Self {
        Assign::Value(value)
    }
}

impl From<Option<FieldValue>> for Assign {
    fn from(value: Option<FieldValue>) -> Self {
        value.map_or(Assign::Unset, Assign::Value)
    }
}

impl From<f64> for Assign {
    fn from(value: f64) -> Self {
        Assign::Value(FieldValue::Number(value))
    }
}

impl From<i64> for Assign {
    fn from(value: i64) -> Self {
        Assign::Value(FieldValue::from(value))
    }
}

impl From<bool> for Assign {
    fn from(value: bool) -> Self {
        Assign::Value(FieldValue::Bool(value))
    }
}

impl From<&str> for Assign {
    fn from(value: &str) -> Self {
        Assign::Value(FieldValue::from(value))
    }
}

impl From<String> for Assign {
    fn from(value: String) -> Self {
        Assign::Value(FieldValue::Text(value))
    }
}
