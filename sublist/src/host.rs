//! FILENAME: sublist/src/host.rs
//! PURPOSE: The contract a host record must fulfil for sublist projection.
//! CONTEXT: The host owns all state. It exposes two ways of touching a
//! sublist row: direct-index calls that name the line explicitly, and
//! current-selection calls that act on whichever line was last selected.
//! The sublist layer decides which family to use (see `mode.rs`); the host
//! only has to implement both.

use std::cell::RefCell;
use std::rc::Rc;

use field_format::FieldValue;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// A host record shared between a sublist and every line projected from it.
pub type SharedRecord = Rc<RefCell<dyn HostRecord>>;

/// Attribute-level description of a sublist field (not its value).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub id: String,
    pub label: String,
    /// Host field type name, e.g. "currency", "select"
    pub field_type: String,
    pub is_disabled: bool,
    pub is_mandatory: bool,
    pub is_display: bool,
}

impl FieldMetadata {
    pub fn new(id: impl Into<String>, field_type: impl Into<String>) -> Self {
        FieldMetadata {
            id: id.into(),
            field_type: field_type.into(),
            ..FieldMetadata::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

pub trait HostRecord {
    /// Internal id once the record has been saved at least once.
    fn id(&self) -> Option<&str>;

    /// Unsaved records may not expose derived text projections.
    fn has_persisted_identity(&self) -> bool {
        self.id().is_some()
    }

    /// True when the record was opened in dynamic (interactive editing) mode.
    fn is_dynamic(&self) -> bool;

    /// Number of committed lines.
    fn line_count(&self, sublist_id: &str) -> usize;

    // ========================================================================
    // STRUCTURE
    // ========================================================================

    fn select_line(&mut self, sublist_id: &str, line: usize) -> Result<(), HostError>;

    fn select_new_line(&mut self, sublist_id: &str) -> Result<(), HostError>;

    fn commit_line(&mut self, sublist_id: &str) -> Result<(), HostError>;

    fn insert_line(&mut self, sublist_id: &str, line: usize, ignore_recalc: bool) -> Result<(), HostError>;

    fn remove_line(&mut self, sublist_id: &str, line: usize, ignore_recalc: bool) -> Result<(), HostError>;

    // ========================================================================
    // DIRECT-INDEX FIELD ACCESS
    // ========================================================================

    fn sublist_value(&self, sublist_id: &str, field_id: &str, line: usize) -> Result<FieldValue, HostError>;

    fn sublist_text(&self, sublist_id: &str, field_id: &str, line: usize) -> Result<FieldValue, HostError>;

    fn set_sublist_value(
        &mut self,
        sublist_id: &str,
        field_id: &str,
        line: usize,
        value: FieldValue,
    ) -> Result<(), HostError>;

    fn set_sublist_text(
        &mut self,
        sublist_id: &str,
        field_id: &str,
        line: usize,
        text: FieldValue,
    ) -> Result<(), HostError>;

    // ========================================================================
    // CURRENT-SELECTION FIELD ACCESS
    // ========================================================================

    fn current_sublist_value(&self, sublist_id: &str, field_id: &str) -> Result<FieldValue, HostError>;

    fn current_sublist_text(&self, sublist_id: &str, field_id: &str) -> Result<FieldValue, HostError>;

    fn set_current_sublist_value(
        &mut self,
        sublist_id: &str,
        field_id: &str,
        value: FieldValue,
        ignore_field_change: bool,
    ) -> Result<(), HostError>;

    fn set_current_sublist_text(
        &mut self,
        sublist_id: &str,
        field_id: &str,
        text: FieldValue,
        ignore_field_change: bool,
    ) -> Result<(), HostError>;

    // ========================================================================
    // SUBRECORDS & METADATA
    // ========================================================================

    fn sublist_subrecord(&mut self, sublist_id: &str, field_id: &str, line: usize) -> Result<SharedRecord, HostError>;

    fn current_sublist_subrecord(&mut self, sublist_id: &str, field_id: &str) -> Result<SharedRecord, HostError>;

    fn sublist_field(
        &self,
        sublist_id: &str,
        field_id: &str,
        line: usize,
    ) -> Result<Option<FieldMetadata>, HostError>;
}
