//! FILENAME: sublist/src/sublist.rs
//! PURPOSE: Ordered, indexable projection over every row of one sublist.
//! CONTEXT: The collection never patches rows in place. Every structural
//! change (insert, remove, commit, protocol toggle) throws away the row set and
//! builds a fresh one from the host's line count, so indexes can never drift
//! from the host. Each rebuild bumps `generation`; lines from an older
//! generation are stale.
//!
//! On a dynamic record the host keeps one uncommitted, editable line after the
//! last committed one. It is exposed as `pending_line()`, outside `len()`,
//! iteration and serialization, so field access works on a fresh line before
//! its first commit.

use std::fmt;
use std::ops::Index;
use std::rc::Rc;

use field_format::{Formatter, StandardFormatter};
use serde::{Serialize, Serializer};

use crate::error::{SublistError, SublistResult};
use crate::host::{FieldMetadata, SharedRecord};
use crate::line::{Line, SublistLine};
use crate::logging::{log_debug, log_info, SUBLIST};
use crate::mode::Protocol;

pub struct Sublist<L> {
    record: SharedRecord,
    formatter: Rc<dyn Formatter>,
    sublist_id: Rc<str>,
    use_dynamic_api: bool,
    rows: Vec<Rc<L>>,
    pending: Option<Rc<L>>,
    generation: u64,
}

impl<L: SublistLine> Sublist<L> {
    /// Projects `sublist_id` of `record` with the default formatter.
    pub fn new(record: SharedRecord, sublist_id: &str) -> Self {
        Self::with_formatter(record, sublist_id, Rc::new(StandardFormatter::default()))
    }

    pub fn with_formatter(record: SharedRecord, sublist_id: &str, formatter: Rc<dyn Formatter>) -> Self {
        // Dynamic records default to the dynamic API; callers may opt out later.
        let use_dynamic_api = record.borrow().is_dynamic();
        let mut sublist = Sublist {
            record,
            formatter,
            sublist_id: Rc::from(sublist_id),
            use_dynamic_api,
            rows: Vec::new(),
            pending: None,
            generation: 0,
        };
        sublist.rebuild();
        sublist
    }

    pub fn sublist_id(&self) -> &str {
        &self.sublist_id
    }

    pub fn record(&self) -> &SharedRecord {
        &self.record
    }

    /// Committed line count, straight from the host.
    pub fn len(&self) -> usize {
        self.record.borrow().line_count(&self.sublist_id)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Rc<L>> {
        self.rows.get(index).cloned()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rc<L>> {
        self.rows.iter()
    }

    /// The uncommitted editable line of a dynamic record, at index `len()`.
    pub fn pending_line(&self) -> Option<Rc<L>> {
        self.pending.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `line` belongs to the current row set.
    pub fn is_current(&self, line: &L) -> bool {
        line.line().generation() == self.generation
    }

    pub fn protocol(&self) -> Protocol {
        Protocol::for_record(self.use_dynamic_api, &*self.record.borrow())
    }

    pub fn use_dynamic_api(&self) -> bool {
        self.use_dynamic_api
    }

    /// Forces (or releases) direct-index calls on a dynamic record. Rebuilds so
    /// every line picks up the new setting.
    pub fn set_use_dynamic_api(&mut self, use_dynamic_api: bool) {
        self.use_dynamic_api = use_dynamic_api;
        self.rebuild();
    }

    // ========================================================================
    // STRUCTURAL OPERATIONS
    // ========================================================================

    /// Appends a line (recalc suppressed).
    pub fn add_line(&mut self) -> SublistResult<Rc<L>> {
        let length = self.len();
        self.add_line_at(length, true)
    }

    /// Inserts a line at `insert_at` and returns it.
    ///
    /// Under current-selection protocol the host always appends via
    /// select-new-line, so `insert_at` is only bounds-checked and the returned
    /// line is the pending one at `len()`.
    pub fn add_line_at(&mut self, insert_at: usize, ignore_recalc: bool) -> SublistResult<Rc<L>> {
        let length = self.len();
        log_info!(SUBLIST, "inserting line sublist: {} insert at line: {}", self.sublist_id, insert_at);

        if insert_at > length {
            return Err(SublistError::InsertOutOfBounds { insert_at, length });
        }

        let added = match self.protocol() {
            Protocol::CurrentSelection => {
                self.record.borrow_mut().select_new_line(&self.sublist_id)?;
                match &self.pending {
                    Some(pending) => Rc::clone(pending),
                    None => Rc::new(self.materialize_pending(self.len())),
                }
            }
            Protocol::DirectIndex => {
                self.record
                    .borrow_mut()
                    .insert_line(&self.sublist_id, insert_at, ignore_recalc)?;
                self.rebuild();
                match self.rows.get(insert_at) {
                    Some(row) => Rc::clone(row),
                    None => Rc::new(self.materialize(insert_at)),
                }
            }
        };

        log_info!(SUBLIST, "line count after adding {}", self.len());
        Ok(added)
    }

    /// Removes every line with recalc suppressed.
    pub fn remove_all_lines(&mut self) -> SublistResult<&mut Self> {
        self.remove_all_lines_with(true)
    }

    /// Removes every line, last to first, then rebuilds.
    pub fn remove_all_lines_with(&mut self, ignore_recalc: bool) -> SublistResult<&mut Self> {
        let count = self.len();

        // Tail-first so no remaining line is reindexed between removals.
        let removed = (0..count).rev().try_for_each(|line| {
            self.record
                .borrow_mut()
                .remove_line(&self.sublist_id, line, ignore_recalc)?;
            log_debug!(SUBLIST, "removed line {}", line);
            Ok::<(), SublistError>(())
        });

        self.rebuild();
        removed?;
        Ok(self)
    }

    /// Commits the currently selected line. Only meaningful on dynamic records.
    pub fn commit_line(&mut self) -> SublistResult<()> {
        if !self.record.borrow().is_dynamic() {
            return Err(SublistError::InvalidCommit {
                sublist_id: self.sublist_id.to_string(),
            });
        }

        log_info!(SUBLIST, "committing line sublist: {}", self.sublist_id);
        self.record.borrow_mut().commit_line(&self.sublist_id)?;
        self.rebuild();
        Ok(())
    }

    pub fn select_line(&self, line: usize) -> SublistResult<()> {
        log_debug!(SUBLIST, "selecting line {}", line);
        self.record.borrow_mut().select_line(&self.sublist_id, line)?;
        Ok(())
    }

    /// Removes one line, letting the host recalc.
    pub fn remove_line(&mut self, line: usize) -> SublistResult<()> {
        self.remove_line_with(line, false)
    }

    pub fn remove_line_with(&mut self, line: usize, ignore_recalc: bool) -> SublistResult<()> {
        self.record
            .borrow_mut()
            .remove_line(&self.sublist_id, line, ignore_recalc)?;
        self.rebuild();
        Ok(())
    }

    /// Host metadata for a sublist field, taken from line 0. For inspecting
    /// the field itself (disabled, mandatory, ...), not its value.
    pub fn field(&self, field_id: &str) -> SublistResult<Option<FieldMetadata>> {
        Ok(self.record.borrow().sublist_field(&self.sublist_id, field_id, 0)?)
    }

    /// Committed lines as a JSON array. The pending line is never included.
    pub fn to_json(&self) -> SublistResult<serde_json::Value> {
        let lines = self
            .rows
            .iter()
            .map(|row| row.line().to_json())
            .collect::<SublistResult<Vec<_>>>()?;
        Ok(serde_json::Value::Array(lines))
    }

    // ========================================================================
    // REBUILD
    // ========================================================================

    fn materialize(&self, index: usize) -> L {
        self.materialize_with(index, self.use_dynamic_api)
    }

    /// The uncommitted line only exists on dynamic records and is only
    /// reachable through the current line, whatever the collection flag says.
    fn materialize_pending(&self, index: usize) -> L {
        let record_is_dynamic = self.record.borrow().is_dynamic();
        self.materialize_with(index, record_is_dynamic)
    }

    fn materialize_with(&self, index: usize, use_dynamic_api: bool) -> L {
        L::from_line(Line::materialize(
            Rc::clone(&self.record),
            Rc::clone(&self.formatter),
            L::FIELDS,
            Rc::clone(&self.sublist_id),
            index,
            use_dynamic_api,
            self.generation,
        ))
    }

    fn rebuild(&mut self) {
        self.rows.clear();
        self.pending = None;
        self.generation += 1;

        let count = self.len();
        log_info!(SUBLIST, "building sublist type: {}, linecount: {}", self.sublist_id, count);

        let rows: Vec<Rc<L>> = (0..count).map(|index| Rc::new(self.materialize(index))).collect();
        self.rows = rows;

        if self.record.borrow().is_dynamic() {
            self.pending = Some(Rc::new(self.materialize_pending(count)));
        }
    }
}

impl<L: SublistLine> Index<usize> for Sublist<L> {
    type Output = L;

    fn index(&self, index: usize) -> &L {
        &self.rows[index]
    }
}

impl<L> fmt::Debug for Sublist<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sublist")
            .field("sublist_id", &self.sublist_id)
            .field("use_dynamic_api", &self.use_dynamic_api)
            .field("rows", &self.rows.len())
            .field("pending", &self.pending.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}

impl<'a, L> IntoIterator for &'a Sublist<L> {
    type Item = &'a Rc<L>;
    type IntoIter = std::slice::Iter<'a, Rc<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl<L: SublistLine> Serialize for Sublist<L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
