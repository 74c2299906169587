//! Line types shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use memory_record::MemoryRecord;
use serde::{Serialize, Serializer};
use sublist::{
    subrecord_json, FieldDescriptor, FieldValue, FormatType, FromRecord, Line, SharedRecord, Sublist,
    SublistFieldType, SublistLine,
};

pub const ITEM: &str = "item";
pub const ASSIGNMENT: &str = "inventoryassignment";

#[derive(Debug)]
pub struct ItemLine {
    line: Line,
}

impl SublistLine for ItemLine {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::typed("item", SublistFieldType::Select),
        FieldDescriptor::passthrough("itemText"),
        FieldDescriptor::formatted("quantity", FormatType::Float),
        FieldDescriptor::formatted("rate", FormatType::Currency),
        FieldDescriptor::typed("description", SublistFieldType::TextArea),
        FieldDescriptor::subrecord("inventorydetail", subrecord_json::<InventoryDetail>),
    ];

    fn from_line(line: Line) -> Self {
        ItemLine { line }
    }

    fn line(&self) -> &Line {
        &self.line
    }
}

pub struct AssignmentLine {
    line: Line,
}

impl SublistLine for AssignmentLine {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::typed("issueinventorynumber", SublistFieldType::Select),
        FieldDescriptor::formatted("quantity", FormatType::Float),
    ];

    fn from_line(line: Line) -> Self {
        AssignmentLine { line }
    }

    fn line(&self) -> &Line {
        &self.line
    }
}

pub struct ScheduleLine {
    line: Line,
}

impl SublistLine for ScheduleLine {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::formatted("expectedshipdate", FormatType::Date),
        FieldDescriptor::formatted("memo", FormatType::Text),
    ];

    fn from_line(line: Line) -> Self {
        ScheduleLine { line }
    }

    fn line(&self) -> &Line {
        &self.line
    }
}

/// Nested record behind an item line's inventory detail field.
pub struct InventoryDetail {
    pub assignments: Sublist<AssignmentLine>,
}

impl FromRecord for InventoryDetail {
    fn from_record(record: SharedRecord) -> Self {
        InventoryDetail {
            assignments: Sublist::new(record, ASSIGNMENT),
        }
    }
}

impl Serialize for InventoryDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Json<'a> {
            inventoryassignment: &'a Sublist<AssignmentLine>,
        }
        Json {
            inventoryassignment: &self.assignments,
        }
        .serialize(serializer)
    }
}

/// Keeps the concrete handle for journal inspection alongside the shared one.
pub fn share(record: MemoryRecord) -> (Rc<RefCell<MemoryRecord>>, SharedRecord) {
    let concrete = record.shared();
    let shared: SharedRecord = concrete.clone();
    (concrete, shared)
}

/// Three loaded item lines with ids 10, 20, 30.
pub fn three_items(record: MemoryRecord) -> MemoryRecord {
    [10.0, 20.0, 30.0].iter().fold(record, |record, id| {
        record.with_line(
            ITEM,
            &[
                ("item", FieldValue::Number(*id)),
                ("quantity", FieldValue::Number(1.0)),
                ("rate", FieldValue::text("5.00")),
            ],
        )
    })
}
