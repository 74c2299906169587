//! FILENAME: memory-record/src/record.rs
//! PURPOSE: A host record held entirely in memory.
//! CONTEXT: Emulates the behaviour the sublist layer depends on:
//! - standard mode: lines addressed by index; writing at index == count appends
//! - dynamic mode: select a line (or the new line), edit a buffer, commit it;
//!   the line count only changes on commit
//! - text reads of values written on an unsaved record are refused
//! - nested subrecords per (line, field), created on first access

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use sublist::{FieldMetadata, FieldValue, HostError, HostRecord, SharedRecord};

use crate::journal::HostCall;

const INVALID_SUBLIST_OPERATION: &str = "SSS_INVALID_SUBLIST_OPERATION";
const INVALID_API_USAGE: &str = "INVALID_API_USAGE";
const NOT_DYNAMIC: &str = "SSS_NOT_IN_DYNAMIC_MODE";

#[derive(Debug, Clone, Default)]
struct StoredField {
    value: FieldValue,
    text: Option<FieldValue>,
    /// written through a value call during this session
    set_by_value: bool,
}

#[derive(Clone, Default)]
struct LineData {
    fields: FxHashMap<String, StoredField>,
    subrecords: FxHashMap<String, SharedRecord>,
}

impl LineData {
    fn value(&self, field_id: &str) -> FieldValue {
        self.fields
            .get(field_id)
            .map(|field| field.value.clone())
            .unwrap_or_default()
    }

    fn text(&self, field_id: &str, persisted: bool) -> Result<FieldValue, HostError> {
        match self.fields.get(field_id) {
            None => Ok(FieldValue::text("")),
            Some(field) => match &field.text {
                Some(text) => Ok(text.clone()),
                None if field.set_by_value && !persisted => Err(HostError::new(
                    INVALID_API_USAGE,
                    "Invalid API usage. You must use getSublistValue to return the value set with setSublistValue.",
                )),
                None => Ok(FieldValue::Text(field.value.display_value())),
            },
        }
    }

    fn set_value(&mut self, field_id: &str, value: FieldValue) {
        self.fields.insert(
            field_id.to_string(),
            StoredField {
                value,
                text: None,
                set_by_value: true,
            },
        );
    }

    fn set_text(&mut self, field_id: &str, text: FieldValue) {
        self.fields.insert(
            field_id.to_string(),
            StoredField {
                value: text.clone(),
                text: Some(text),
                set_by_value: false,
            },
        );
    }

    fn subrecord(&mut self, field_id: &str, dynamic: bool) -> SharedRecord {
        let child = self.subrecords.entry(field_id.to_string()).or_insert_with(|| {
            let record = if dynamic { MemoryRecord::dynamic() } else { MemoryRecord::new() };
            Rc::new(RefCell::new(record))
        });
        Rc::clone(child)
    }
}

/// The line being edited in dynamic mode. `index` is None for the new line.
#[derive(Clone)]
struct CurrentLine {
    index: Option<usize>,
    buffer: LineData,
}

#[derive(Default)]
struct SublistData {
    lines: Vec<LineData>,
    current: Option<CurrentLine>,
    fields: FxHashMap<String, FieldMetadata>,
}

impl SublistData {
    fn line(&self, sublist_id: &str, line: usize) -> Result<&LineData, HostError> {
        self.lines.get(line).ok_or_else(|| out_of_range(sublist_id, line))
    }

    fn line_mut(&mut self, sublist_id: &str, line: usize) -> Result<&mut LineData, HostError> {
        self.lines.get_mut(line).ok_or_else(|| out_of_range(sublist_id, line))
    }

    /// The current line, implicitly the new line when nothing is selected.
    fn current_mut(&mut self) -> &mut CurrentLine {
        self.current.get_or_insert_with(|| CurrentLine {
            index: None,
            buffer: LineData::default(),
        })
    }

    fn select(&mut self, sublist_id: &str, line: usize) -> Result<(), HostError> {
        let count = self.lines.len();
        if line > count {
            return Err(out_of_range(sublist_id, line));
        }

        let target = if line == count { None } else { Some(line) };
        let already_selected = matches!(&self.current, Some(current) if current.index == target);
        if !already_selected {
            let buffer = match target {
                Some(index) => self.lines[index].clone(),
                None => LineData::default(),
            };
            self.current = Some(CurrentLine { index: target, buffer });
        }
        Ok(())
    }
}

fn out_of_range(sublist_id: &str, line: usize) -> HostError {
    HostError::new(
        INVALID_SUBLIST_OPERATION,
        format!("line {} does not exist on sublist '{}'", line, sublist_id),
    )
}

pub struct MemoryRecord {
    id: Option<String>,
    dynamic: bool,
    sublists: FxHashMap<String, SublistData>,
    journal: Vec<HostCall>,
}

impl MemoryRecord {
    /// A new, unsaved record in standard mode.
    pub fn new() -> Self {
        MemoryRecord {
            id: None,
            dynamic: false,
            sublists: FxHashMap::default(),
            journal: Vec::new(),
        }
    }

    /// A new, unsaved record in dynamic mode.
    pub fn dynamic() -> Self {
        MemoryRecord {
            dynamic: true,
            ..MemoryRecord::new()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Appends a committed line as if loaded from storage.
    pub fn with_line(mut self, sublist_id: &str, values: &[(&str, FieldValue)]) -> Self {
        let mut line = LineData::default();
        for (field_id, value) in values {
            line.fields.insert(
                field_id.to_string(),
                StoredField {
                    value: value.clone(),
                    text: None,
                    set_by_value: false,
                },
            );
        }
        self.sublist_mut(sublist_id).lines.push(line);
        self
    }

    /// Sets the display text of a loaded field (e.g. the name behind a select id).
    pub fn with_text(mut self, sublist_id: &str, line: usize, field_id: &str, text: &str) -> Self {
        if let Some(data) = self.sublist_mut(sublist_id).lines.get_mut(line) {
            let field = data.fields.entry(field_id.to_string()).or_default();
            field.text = Some(FieldValue::text(text));
        }
        self
    }

    pub fn with_field(mut self, sublist_id: &str, metadata: FieldMetadata) -> Self {
        self.sublist_mut(sublist_id)
            .fields
            .insert(metadata.id.clone(), metadata);
        self
    }

    pub fn shared(self) -> Rc<RefCell<MemoryRecord>> {
        Rc::new(RefCell::new(self))
    }

    /// Simulates the first save assigning an id.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn set_dynamic(&mut self, dynamic: bool) {
        self.dynamic = dynamic;
    }

    pub fn journal(&self) -> &[HostCall] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Committed value of a field, for assertions.
    pub fn stored_value(&self, sublist_id: &str, field_id: &str, line: usize) -> Option<FieldValue> {
        self.sublists
            .get(sublist_id)
            .and_then(|data| data.lines.get(line))
            .and_then(|data| data.fields.get(field_id))
            .map(|field| field.value.clone())
    }

    fn sublist_mut(&mut self, sublist_id: &str) -> &mut SublistData {
        self.sublists.entry(sublist_id.to_string()).or_default()
    }

    fn sublist(&self, sublist_id: &str) -> Result<&SublistData, HostError> {
        self.sublists.get(sublist_id).ok_or_else(|| {
            HostError::new(
                INVALID_SUBLIST_OPERATION,
                format!("sublist '{}' has no lines", sublist_id),
            )
        })
    }

    fn persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl Default for MemoryRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRecord for MemoryRecord {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    fn line_count(&self, sublist_id: &str) -> usize {
        self.sublists.get(sublist_id).map_or(0, |data| data.lines.len())
    }

    // ========================================================================
    // STRUCTURE
    // ========================================================================

    fn select_line(&mut self, sublist_id: &str, line: usize) -> Result<(), HostError> {
        self.journal.push(HostCall::SelectLine {
            sublist_id: sublist_id.to_string(),
            line,
        });
        self.sublist_mut(sublist_id).select(sublist_id, line)
    }

    fn select_new_line(&mut self, sublist_id: &str) -> Result<(), HostError> {
        self.journal.push(HostCall::SelectNewLine {
            sublist_id: sublist_id.to_string(),
        });
        if !self.dynamic {
            return Err(HostError::new(NOT_DYNAMIC, "selectNewLine requires dynamic mode"));
        }
        self.sublist_mut(sublist_id).current = Some(CurrentLine {
            index: None,
            buffer: LineData::default(),
        });
        Ok(())
    }

    fn commit_line(&mut self, sublist_id: &str) -> Result<(), HostError> {
        self.journal.push(HostCall::CommitLine {
            sublist_id: sublist_id.to_string(),
        });
        if !self.dynamic {
            return Err(HostError::new(NOT_DYNAMIC, "commitLine requires dynamic mode"));
        }

        let data = self.sublist_mut(sublist_id);
        let current = data.current.take().unwrap_or(CurrentLine {
            index: None,
            buffer: LineData::default(),
        });
        match current.index {
            Some(index) if index < data.lines.len() => data.lines[index] = current.buffer,
            Some(index) => return Err(out_of_range(sublist_id, index)),
            None => data.lines.push(current.buffer),
        }
        log::debug!(target: "MEMORY", "committed line on {}, count {}", sublist_id, data.lines.len());
        Ok(())
    }

    fn insert_line(&mut self, sublist_id: &str, line: usize, ignore_recalc: bool) -> Result<(), HostError> {
        self.journal.push(HostCall::InsertLine {
            sublist_id: sublist_id.to_string(),
            line,
            ignore_recalc,
        });

        let data = self.sublist_mut(sublist_id);
        if line > data.lines.len() {
            return Err(out_of_range(sublist_id, line));
        }
        data.lines.insert(line, LineData::default());
        data.current = None;
        Ok(())
    }

    fn remove_line(&mut self, sublist_id: &str, line: usize, ignore_recalc: bool) -> Result<(), HostError> {
        self.journal.push(HostCall::RemoveLine {
            sublist_id: sublist_id.to_string(),
            line,
            ignore_recalc,
        });

        let data = self.sublist_mut(sublist_id);
        if line >= data.lines.len() {
            return Err(out_of_range(sublist_id, line));
        }
        data.lines.remove(line);
        data.current = None;
        Ok(())
    }

    // ========================================================================
    // DIRECT-INDEX FIELD ACCESS
    // ========================================================================

    fn sublist_value(&self, sublist_id: &str, field_id: &str, line: usize) -> Result<FieldValue, HostError> {
        Ok(self.sublist(sublist_id)?.line(sublist_id, line)?.value(field_id))
    }

    fn sublist_text(&self, sublist_id: &str, field_id: &str, line: usize) -> Result<FieldValue, HostError> {
        self.sublist(sublist_id)?
            .line(sublist_id, line)?
            .text(field_id, self.persisted())
    }

    fn set_sublist_value(
        &mut self,
        sublist_id: &str,
        field_id: &str,
        line: usize,
        value: FieldValue,
    ) -> Result<(), HostError> {
        self.journal.push(HostCall::SetValue {
            sublist_id: sublist_id.to_string(),
            field_id: field_id.to_string(),
            line: Some(line),
            value: value.clone(),
            ignore_field_change: false,
        });

        let data = self.sublist_mut(sublist_id);
        // Writing one past the end appends, as standard-mode hosts do.
        if line == data.lines.len() {
            data.lines.push(LineData::default());
        }
        data.line_mut(sublist_id, line)?.set_value(field_id, value);
        Ok(())
    }

    fn set_sublist_text(
        &mut self,
        sublist_id: &str,
        field_id: &str,
        line: usize,
        text: FieldValue,
    ) -> Result<(), HostError> {
        self.journal.push(HostCall::SetText {
            sublist_id: sublist_id.to_string(),
            field_id: field_id.to_string(),
            line: Some(line),
            text: text.clone(),
            ignore_field_change: false,
        });

        let data = self.sublist_mut(sublist_id);
        if line == data.lines.len() {
            data.lines.push(LineData::default());
        }
        data.line_mut(sublist_id, line)?.set_text(field_id, text);
        Ok(())
    }

    // ========================================================================
    // CURRENT-SELECTION FIELD ACCESS
    // ========================================================================

    fn current_sublist_value(&self, sublist_id: &str, field_id: &str) -> Result<FieldValue, HostError> {
        let value = self
            .sublists
            .get(sublist_id)
            .and_then(|data| data.current.as_ref())
            .map(|current| current.buffer.value(field_id))
            .unwrap_or_default();
        Ok(value)
    }

    fn current_sublist_text(&self, sublist_id: &str, field_id: &str) -> Result<FieldValue, HostError> {
        match self.sublists.get(sublist_id).and_then(|data| data.current.as_ref()) {
            Some(current) => current.buffer.text(field_id, self.persisted()),
            None => Ok(FieldValue::text("")),
        }
    }

    fn set_current_sublist_value(
        &mut self,
        sublist_id: &str,
        field_id: &str,
        value: FieldValue,
        ignore_field_change: bool,
    ) -> Result<(), HostError> {
        self.journal.push(HostCall::SetValue {
            sublist_id: sublist_id.to_string(),
            field_id: field_id.to_string(),
            line: None,
            value: value.clone(),
            ignore_field_change,
        });
        self.sublist_mut(sublist_id)
            .current_mut()
            .buffer
            .set_value(field_id, value);
        Ok(())
    }

    fn set_current_sublist_text(
        &mut self,
        sublist_id: &str,
        field_id: &str,
        text: FieldValue,
        ignore_field_change: bool,
    ) -> Result<(), HostError> {
        self.journal.push(HostCall::SetText {
            sublist_id: sublist_id.to_string(),
            field_id: field_id.to_string(),
            line: None,
            text: text.clone(),
            ignore_field_change,
        });
        self.sublist_mut(sublist_id)
            .current_mut()
            .buffer
            .set_text(field_id, text);
        Ok(())
    }

    // ========================================================================
    // SUBRECORDS & METADATA
    // ========================================================================

    fn sublist_subrecord(&mut self, sublist_id: &str, field_id: &str, line: usize) -> Result<SharedRecord, HostError> {
        let dynamic = self.dynamic;
        let data = self.sublist_mut(sublist_id);
        Ok(data.line_mut(sublist_id, line)?.subrecord(field_id, dynamic))
    }

    fn current_sublist_subrecord(&mut self, sublist_id: &str, field_id: &str) -> Result<SharedRecord, HostError> {
        let dynamic = self.dynamic;
        Ok(self
            .sublist_mut(sublist_id)
            .current_mut()
            .buffer
            .subrecord(field_id, dynamic))
    }

    fn sublist_field(
        &self,
        sublist_id: &str,
        field_id: &str,
        _line: usize,
    ) -> Result<Option<FieldMetadata>, HostError> {
        Ok(self
            .sublists
            .get(sublist_id)
            .and_then(|data| data.fields.get(field_id))
            .cloned())
    }
}
