//! FILENAME: memory-record/src/journal.rs
//! PURPOSE: Ordered log of the state-changing calls a host record received.
//! CONTEXT: Tests assert on *how* the sublist layer talked to the host
//! (which protocol, which line, in what order), not just on the end state.

use sublist::FieldValue;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    SelectLine {
        sublist_id: String,
        line: usize,
    },
    SelectNewLine {
        sublist_id: String,
    },
    CommitLine {
        sublist_id: String,
    },
    InsertLine {
        sublist_id: String,
        line: usize,
        ignore_recalc: bool,
    },
    RemoveLine {
        sublist_id: String,
        line: usize,
        ignore_recalc: bool,
    },
    /// `line` is None for current-selection writes
    SetValue {
        sublist_id: String,
        field_id: String,
        line: Option<usize>,
        value: FieldValue,
        ignore_field_change: bool,
    },
    SetText {
        sublist_id: String,
        field_id: String,
        line: Option<usize>,
        text: FieldValue,
        ignore_field_change: bool,
    },
}

impl HostCall {
    pub fn is_current_selection_write(&self) -> bool {
        matches!(
            self,
            HostCall::SetValue { line: None, .. } | HostCall::SetText { line: None, .. }
        )
    }
}
