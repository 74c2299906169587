//! FILENAME: sublist/src/mode.rs
//! PURPOSE: Chooses which host protocol a sublist operation uses.
//! CONTEXT: A record opened in dynamic mode usually wants the current-selection
//! calls, but some sublists behave better through direct-index calls even on
//! a dynamic record, so the collection carries its own "use dynamic API"
//! switch. Current-selection is used only when both agree.

use crate::host::HostRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// select a line, then act on the implicit current line; commit to count it
    CurrentSelection,
    /// address lines by explicit index; no select or commit step
    DirectIndex,
}

impl Protocol {
    pub fn resolve(use_dynamic_api: bool, record_is_dynamic: bool) -> Self {
        if use_dynamic_api && record_is_dynamic {
            Protocol::CurrentSelection
        } else {
            Protocol::DirectIndex
        }
    }

    pub fn for_record(use_dynamic_api: bool, record: &dyn HostRecord) -> Self {
        Self::resolve(use_dynamic_api, record.is_dynamic())
    }

    pub fn is_current_selection(self) -> bool {
        self == Protocol::CurrentSelection
    }
}
