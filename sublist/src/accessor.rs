//! FILENAME: sublist/src/accessor.rs
//! PURPOSE: Per-field read/write strategies.
//! CONTEXT: A descriptor's `AccessorKind` picks one of three strategies. Each
//! takes the owning line explicitly; the line supplies the protocol-aware host
//! calls (`read_host` / `write_host`) and the formatter.

use field_format::{FieldValue, FormatError, FormatType};

use crate::error::{SublistError, SublistResult};
use crate::field::{AccessorKind, Assign, FieldDescriptor};
use crate::line::Line;
use crate::logging::{log_debug, log_info, LINE};

impl FieldDescriptor {
    pub(crate) fn get(&self, line: &Line) -> SublistResult<FieldValue> {
        match self.kind {
            AccessorKind::Passthrough => passthrough_get(line, self),
            AccessorKind::Formatted(format_type) => formatted_get(line, self.key, format_type),
            AccessorKind::Subrecord(_) => Err(SublistError::SubrecordField(self.key.to_string())),
        }
    }

    pub(crate) fn set(&self, line: &Line, value: Assign) -> SublistResult<()> {
        match self.kind {
            AccessorKind::Passthrough => passthrough_set(line, self, value),
            AccessorKind::Formatted(format_type) => formatted_set(line, self.key, format_type, value),
            AccessorKind::Subrecord(_) => Err(SublistError::ReadOnlyField(self.key.to_string())),
        }
    }
}

// ============================================================================
// PASSTHROUGH
// ============================================================================

fn passthrough_get(line: &Line, field: &FieldDescriptor) -> SublistResult<FieldValue> {
    line.read_host(field.host_field(), field.uses_text_api())
}

fn passthrough_set(line: &Line, field: &FieldDescriptor, value: Assign) -> SublistResult<()> {
    match value {
        Assign::Unset => {
            log_debug!(LINE, "ignoring field [{}], field value is unset", field.key);
            Ok(())
        }
        Assign::Value(value) => line.write_host(field.host_field(), value, field.uses_text_api()),
    }
}

// ============================================================================
// FORMATTED
// ============================================================================

fn formatted_get(line: &Line, field_id: &str, format_type: FormatType) -> SublistResult<FieldValue> {
    let raw = line.read_host(field_id, false)?;
    log_debug!(LINE, "transforming field [{}] of type [{}] with value {:?}", field_id, format_type, raw);

    // Empty/absent values are returned as-is, never parsed.
    if !raw.is_truthy() {
        return Ok(raw);
    }
    Ok(line.formatter().parse(format_type, &raw)?)
}

fn formatted_set(line: &Line, field_id: &str, format_type: FormatType, value: Assign) -> SublistResult<()> {
    let value = match value {
        Assign::Unset => {
            log_info!(LINE, "not setting sublist {} field, value was unset", field_id);
            return Ok(());
        }
        Assign::Value(value) => value,
    };

    if value.is_null() {
        log_debug!(LINE, "clearing sublist field [{}:{}]", field_id, format_type);
        return line.write_host(field_id, FieldValue::Null, false);
    }

    let formatted = line.formatter().format(format_type, &value)?;
    let host_value = if format_type.is_numeric() {
        // Numeric host fields only accept the canonical rendering, as a number.
        let number = formatted.trim().parse::<f64>().map_err(|_| FormatError::Unparseable {
            format_type,
            value: formatted.clone(),
        })?;
        FieldValue::Number(number)
    } else {
        FieldValue::Text(formatted)
    };

    log_debug!(
        LINE,
        "setting sublist field [{}:{}] to formatted value [{:?}] (unformatted value: {:?})",
        field_id,
        format_type,
        host_value,
        value
    );
    line.write_host(field_id, host_value, false)
}
