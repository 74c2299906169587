//! FILENAME: sublist/src/line.rs
//! PURPOSE: One row of a sublist, addressed by (sublist id, line index).
//! CONTEXT: A `Line` owns no data. Every field read or write becomes a host
//! call, routed through the protocol chosen by `mode.rs`. Typed line types
//! wrap a `Line` and publish their field table via `SublistLine`.
//!
//! A line's address is only valid for the row set it was built in. Once the
//! owning `Sublist` rebuilds (insert, remove, commit, protocol toggle) the line
//! is stale: it still talks to the host, but possibly about a different row.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use field_format::{FieldValue, Formatter, StandardFormatter};
use serde::{Serialize, Serializer};

use crate::error::{SublistError, SublistResult};
use crate::field::{AccessorKind, Assign, FieldDescriptor};
use crate::host::{FieldMetadata, SharedRecord};
use crate::logging::{log_debug, LINE};
use crate::mode::Protocol;

/// A typed projection of a sublist row.
///
/// ```ignore
/// struct ItemLine { line: Line }
///
/// impl SublistLine for ItemLine {
///     const FIELDS: &'static [FieldDescriptor] = &[
///         FieldDescriptor::typed("item", SublistFieldType::Select),
///         FieldDescriptor::passthrough("itemText"),
///         FieldDescriptor::formatted("rate", FormatType::Currency),
///     ];
///     fn from_line(line: Line) -> Self { ItemLine { line } }
///     fn line(&self) -> &Line { &self.line }
/// }
/// ```
pub trait SublistLine: Sized {
    const FIELDS: &'static [FieldDescriptor];

    fn from_line(line: Line) -> Self;

    fn line(&self) -> &Line;

    /// Builds a line outside any collection. The protocol flag follows the
    /// record's own dynamic flag.
    fn attach(record: SharedRecord, sublist_id: &str, index: usize) -> Self {
        Self::from_line(Line::new(record, sublist_id, index, Self::FIELDS))
    }
}

/// Nested record types exposed through subrecord fields.
pub trait FromRecord {
    fn from_record(record: SharedRecord) -> Self;
}

#[derive(Clone)]
pub struct Line {
    record: SharedRecord,
    formatter: Rc<dyn Formatter>,
    fields: &'static [FieldDescriptor],
    sublist_id: Rc<str>,
    index: usize,
    use_dynamic_api: bool,
    ignore_field_change: Cell<bool>,
    generation: u64,
}

impl Line {
    pub fn new(record: SharedRecord, sublist_id: &str, index: usize, fields: &'static [FieldDescriptor]) -> Self {
        let use_dynamic_api = record.borrow().is_dynamic();
        Line::materialize(
            record,
            Rc::new(StandardFormatter::default()),
            fields,
            Rc::from(sublist_id),
            index,
            use_dynamic_api,
            0,
        )
    }

    pub(crate) fn materialize(
        record: SharedRecord,
        formatter: Rc<dyn Formatter>,
        fields: &'static [FieldDescriptor],
        sublist_id: Rc<str>,
        index: usize,
        use_dynamic_api: bool,
        generation: u64,
    ) -> Self {
        Line {
            record,
            formatter,
            fields,
            sublist_id,
            index,
            use_dynamic_api,
            ignore_field_change: Cell::new(false),
            generation,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn sublist_id(&self) -> &str {
        &self.sublist_id
    }

    pub fn record(&self) -> &SharedRecord {
        &self.record
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    /// Rebuild counter of the collection this line came from (0 if standalone).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn uses_dynamic_api(&self) -> bool {
        self.use_dynamic_api
    }

    pub fn ignores_field_change(&self) -> bool {
        self.ignore_field_change.get()
    }

    /// Suppresses host field-change handlers on current-selection writes.
    pub fn set_ignore_field_change(&self, ignore: bool) {
        self.ignore_field_change.set(ignore);
    }

    pub fn protocol(&self) -> Protocol {
        Protocol::for_record(self.use_dynamic_api, &*self.record.borrow())
    }

    pub(crate) fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    // ========================================================================
    // FIELD ACCESS
    // ========================================================================

    pub fn descriptor(&self, key: &str) -> SublistResult<&'static FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .ok_or_else(|| SublistError::UnknownField(key.to_string()))
    }

    pub fn get(&self, key: &str) -> SublistResult<FieldValue> {
        self.descriptor(key)?.get(self)
    }

    pub fn set(&self, key: &str, value: impl Into<Assign>) -> SublistResult<()> {
        self.descriptor(key)?.set(self, value.into())
    }

    /// Host metadata for a declared field on this line. A host type that
    /// disagrees with the declared field type is logged, not rejected.
    pub fn field(&self, key: &str) -> SublistResult<Option<FieldMetadata>> {
        let field = self.descriptor(key)?;
        let metadata = self
            .record
            .borrow()
            .sublist_field(&self.sublist_id, field.host_field(), self.index)?;

        if let (Some(declared), Some(metadata)) = (field.field_type, &metadata) {
            if !declared.matches(metadata) {
                log_debug!(
                    LINE,
                    "field [{}] declared as {} but host reports {}",
                    key,
                    declared.as_str(),
                    metadata.field_type
                );
            }
        }
        Ok(metadata)
    }

    /// Reads a subrecord field and wraps it in its nested type.
    pub fn subrecord<T: FromRecord>(&self, key: &str) -> SublistResult<T> {
        let field = self.descriptor(key)?;
        match field.kind {
            AccessorKind::Subrecord(_) => Ok(T::from_record(self.sublist_subrecord(field.key)?)),
            _ => Err(SublistError::NotSubrecord(key.to_string())),
        }
    }

    /// Fetches the nested record behind `field_id` on this line, selecting the
    /// line first under current-selection protocol.
    pub fn sublist_subrecord(&self, field_id: &str) -> SublistResult<SharedRecord> {
        let protocol = self.protocol();
        let mut record = self.record.borrow_mut();
        let subrecord = match protocol {
            Protocol::CurrentSelection => {
                record.select_line(&self.sublist_id, self.index)?;
                record.current_sublist_subrecord(&self.sublist_id, field_id)?
            }
            Protocol::DirectIndex => record.sublist_subrecord(&self.sublist_id, field_id, self.index)?,
        };
        Ok(subrecord)
    }

    pub(crate) fn read_host(&self, field_id: &str, text: bool) -> SublistResult<FieldValue> {
        log_debug!(
            LINE,
            "getting sublist {} sublist: {} field: {} line: {}",
            if text { "text" } else { "value" },
            self.sublist_id,
            field_id,
            self.index
        );

        let protocol = self.protocol();
        let mut record = self.record.borrow_mut();
        let value = match protocol {
            Protocol::CurrentSelection => {
                record.select_line(&self.sublist_id, self.index)?;
                if text {
                    record.current_sublist_text(&self.sublist_id, field_id)?
                } else {
                    record.current_sublist_value(&self.sublist_id, field_id)?
                }
            }
            Protocol::DirectIndex => {
                if text {
                    record.sublist_text(&self.sublist_id, field_id, self.index)?
                } else {
                    record.sublist_value(&self.sublist_id, field_id, self.index)?
                }
            }
        };
        Ok(value)
    }

    pub(crate) fn write_host(&self, field_id: &str, value: FieldValue, text: bool) -> SublistResult<()> {
        let protocol = self.protocol();
        let mut record = self.record.borrow_mut();
        match protocol {
            Protocol::CurrentSelection => {
                let ignore = self.ignore_field_change.get();
                record.select_line(&self.sublist_id, self.index)?;
                if text {
                    record.set_current_sublist_text(&self.sublist_id, field_id, value, ignore)?;
                } else {
                    record.set_current_sublist_value(&self.sublist_id, field_id, value, ignore)?;
                }
            }
            Protocol::DirectIndex => {
                if text {
                    record.set_sublist_text(&self.sublist_id, field_id, self.index, value)?;
                } else {
                    record.set_sublist_value(&self.sublist_id, field_id, self.index, value)?;
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    /// Maps every declared field to its current value. Bookkeeping (sublist id,
    /// index, protocol flag, ignore-field-change) is never included.
    ///
    /// Text projections are skipped entirely while the record has no persisted
    /// identity: hosts refuse text reads of values set on an unsaved record.
    pub fn to_json(&self) -> SublistResult<serde_json::Value> {
        let persisted = self.record.borrow().has_persisted_identity();
        let mut object = serde_json::Map::with_capacity(self.fields.len());

        for field in self.fields {
            if !persisted && field.is_text_variant() {
                log_debug!(LINE, "to_json skipping field {}, record has no id yet", field.key);
                continue;
            }

            let value = match field.kind {
                AccessorKind::Subrecord(render) => render(self.sublist_subrecord(field.key)?)?,
                _ => serde_json::to_value(field.get(self)?)?,
            };
            object.insert(field.key.to_string(), value);
        }

        Ok(serde_json::Value::Object(object))
    }
}

impl Serialize for Line {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Line")
            .field("sublist_id", &self.sublist_id)
            .field("index", &self.index)
            .field("use_dynamic_api", &self.use_dynamic_api)
            .field("ignore_field_change", &self.ignore_field_change.get())
            .field("generation", &self.generation)
            .finish()
    }
}
