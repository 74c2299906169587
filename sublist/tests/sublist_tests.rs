//! End-to-end behaviour of `Sublist` and `Line` against an in-memory host.

mod common;

use std::rc::Rc;

use chrono::NaiveDate;
use common::{share, three_items, AssignmentLine, InventoryDetail, ItemLine, ScheduleLine, ASSIGNMENT, ITEM};
use memory_record::{HostCall, MemoryRecord};
use serde_json::json;
use sublist::{
    Assign, FieldMetadata, FieldValue, Protocol, Sublist, SublistError, SublistLine,
};

// ============================================================================
// INDEXING
// ============================================================================

#[test]
fn test_length_and_indexing_follow_host() {
    let (_, record) = share(three_items(MemoryRecord::new()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    assert_eq!(items.len(), 3);
    assert!(!items.is_empty());
    assert_eq!(items.iter().count(), 3);
    for (i, line) in items.iter().enumerate() {
        assert_eq!(line.line().index(), i);
        assert_eq!(line.line().sublist_id(), ITEM);
    }
    assert_eq!(items[1].line().get("item").unwrap(), FieldValue::Number(20.0));
    assert!(items.get(3).is_none());
    assert!(items.pending_line().is_none());
}

#[test]
fn test_empty_sublist() {
    let (_, record) = share(MemoryRecord::new());
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    assert!(items.is_empty());
    assert_eq!(items.to_json().unwrap(), json!([]));
}

// ============================================================================
// STRUCTURAL OPERATIONS
// ============================================================================

#[test]
fn test_add_line_past_end_is_rejected() {
    let (concrete, record) = share(three_items(MemoryRecord::new()));
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    let err = items.add_line_at(4, true).unwrap_err();
    assert!(matches!(err, SublistError::InsertOutOfBounds { insert_at: 4, length: 3 }));
    assert_eq!(err.name(), "INSERT_LINE_OUT_OF_BOUNDS");
    assert!(concrete.borrow().journal().is_empty());
    assert_eq!(items.len(), 3);
}

#[test]
fn test_add_line_direct_index_inserts_and_rebuilds() {
    let (concrete, record) = share(three_items(MemoryRecord::new()));
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);
    let before = items.generation();

    let added = items.add_line().unwrap();
    assert_eq!(added.line().index(), 3);
    assert_eq!(items.len(), 4);
    assert!(items.generation() > before);
    assert!(Rc::ptr_eq(&added, &items.get(3).unwrap()));
    assert_eq!(
        concrete.borrow().journal(),
        &[HostCall::InsertLine {
            sublist_id: ITEM.to_string(),
            line: 3,
            ignore_recalc: true,
        }]
    );

    let middle = items.add_line_at(1, false).unwrap();
    assert_eq!(middle.line().index(), 1);
    assert_eq!(items.len(), 5);
    // The old line 1 shifted down.
    assert_eq!(items[2].line().get("item").unwrap(), FieldValue::Number(20.0));
}

#[test]
fn test_remove_all_lines_goes_last_to_first() {
    let (concrete, record) = share(three_items(MemoryRecord::new()));
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    items.remove_all_lines().unwrap();
    assert_eq!(items.len(), 0);
    assert_eq!(items.iter().count(), 0);

    let removed: Vec<usize> = concrete
        .borrow()
        .journal()
        .iter()
        .filter_map(|call| match call {
            HostCall::RemoveLine { line, ignore_recalc, .. } => {
                assert!(*ignore_recalc);
                Some(*line)
            }
            _ => None,
        })
        .collect();
    assert_eq!(removed, vec![2, 1, 0]);
}

#[test]
fn test_remove_all_lines_on_empty_sublist_makes_no_calls() {
    let (concrete, record) = share(MemoryRecord::new());
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    assert!(items.remove_all_lines_with(false).unwrap().is_empty());
    assert!(concrete.borrow().journal().is_empty());
}

#[test]
fn test_remove_line_rebuilds() {
    let (_, record) = share(three_items(MemoryRecord::new()));
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);
    let old_first = items.get(0).unwrap();

    items.remove_line(0).unwrap();
    assert_eq!(items.len(), 2);
    assert!(!items.is_current(&old_first));
    assert_eq!(items[0].line().get("item").unwrap(), FieldValue::Number(20.0));
}

#[test]
fn test_commit_on_standard_record_is_rejected() {
    let (concrete, record) = share(three_items(MemoryRecord::new()));
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    let err = items.commit_line().unwrap_err();
    assert!(matches!(err, SublistError::InvalidCommit { .. }));
    assert_eq!(err.name(), "COMMIT_LINE_NOT_DYNAMIC_MODE");
    assert!(concrete.borrow().journal().is_empty());
}

// ============================================================================
// DYNAMIC MODE
// ============================================================================

#[test]
fn test_dynamic_add_edit_commit() {
    let (concrete, record) = share(MemoryRecord::dynamic());
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);
    assert_eq!(items.protocol(), Protocol::CurrentSelection);

    let line = items.add_line().unwrap();
    assert_eq!(line.line().index(), 0);
    assert_eq!(items.len(), 0);

    line.line().set("item", 42.0).unwrap();
    line.line().set("quantity", 2.0).unwrap();
    items.commit_line().unwrap();

    assert_eq!(items.len(), 1);
    assert!(!items.is_current(&line));
    assert_eq!(items[0].line().get("quantity").unwrap(), FieldValue::Number(2.0));
    assert_eq!(
        concrete.borrow().stored_value(ITEM, "item", 0),
        Some(FieldValue::Number(42.0))
    );

    // A fresh pending line sits after the committed one.
    let pending = items.pending_line().unwrap();
    assert_eq!(pending.line().index(), 1);
    assert!(items.is_current(&pending));
}

#[test]
fn test_current_selection_writes_select_first() {
    let (concrete, record) = share(three_items(MemoryRecord::dynamic()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    items[1].line().set("description", "blue").unwrap();
    items[2].line().set_ignore_field_change(true);
    items[2].line().set("description", "red").unwrap();

    let journal = concrete.borrow().journal().to_vec();
    assert_eq!(
        journal,
        vec![
            HostCall::SelectLine {
                sublist_id: ITEM.to_string(),
                line: 1,
            },
            HostCall::SetValue {
                sublist_id: ITEM.to_string(),
                field_id: "description".to_string(),
                line: None,
                value: FieldValue::text("blue"),
                ignore_field_change: false,
            },
            HostCall::SelectLine {
                sublist_id: ITEM.to_string(),
                line: 2,
            },
            HostCall::SetValue {
                sublist_id: ITEM.to_string(),
                field_id: "description".to_string(),
                line: None,
                value: FieldValue::text("red"),
                ignore_field_change: true,
            },
        ]
    );
    assert!(journal.iter().filter(|call| call.is_current_selection_write()).count() == 2);
}

#[test]
fn test_toggling_dynamic_api_rebuilds_every_line() {
    let (concrete, record) = share(three_items(MemoryRecord::dynamic()));
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);
    let before: Vec<_> = items.iter().cloned().collect();
    let generation = items.generation();

    items.set_use_dynamic_api(false);
    assert_eq!(items.protocol(), Protocol::DirectIndex);
    assert!(items.generation() > generation);
    for (old, new) in before.iter().zip(items.iter()) {
        assert!(!Rc::ptr_eq(old, new));
        assert!(!items.is_current(old));
        assert!(!new.line().uses_dynamic_api());
    }

    items[0].line().set("description", "direct").unwrap();
    assert_eq!(
        concrete.borrow().journal(),
        &[HostCall::SetValue {
            sublist_id: ITEM.to_string(),
            field_id: "description".to_string(),
            line: Some(0),
            value: FieldValue::text("direct"),
            ignore_field_change: false,
        }]
    );
}

#[test]
fn test_dynamic_api_flag_is_ignored_on_standard_record() {
    let (_, record) = share(three_items(MemoryRecord::new()));
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    items.set_use_dynamic_api(true);
    assert!(items.use_dynamic_api());
    assert_eq!(items.protocol(), Protocol::DirectIndex);
}

// ============================================================================
// FIELD ACCESS
// ============================================================================

#[test]
fn test_formatted_numeric_write_stores_a_number() {
    let (concrete, record) = share(three_items(MemoryRecord::new()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    items[0].line().set("rate", 12.5).unwrap();
    assert_eq!(
        concrete.borrow().stored_value(ITEM, "rate", 0),
        Some(FieldValue::Number(12.5))
    );

    // Currency precision rounds before the host sees it.
    items[0].line().set("rate", 3.14159).unwrap();
    assert_eq!(
        concrete.borrow().stored_value(ITEM, "rate", 0),
        Some(FieldValue::Number(3.14))
    );
}

#[test]
fn test_formatted_null_clears_and_unset_is_ignored() {
    let (concrete, record) = share(three_items(MemoryRecord::new()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    items[0].line().set("quantity", Assign::Unset).unwrap();
    assert!(concrete.borrow().journal().is_empty());
    assert_eq!(
        concrete.borrow().stored_value(ITEM, "quantity", 0),
        Some(FieldValue::Number(1.0))
    );

    items[0].line().set("quantity", FieldValue::Null).unwrap();
    assert_eq!(
        concrete.borrow().stored_value(ITEM, "quantity", 0),
        Some(FieldValue::Null)
    );
}

#[test]
fn test_formatted_read_parses_truthy_values_only() {
    let (_, record) = share(
        MemoryRecord::new().with_line(
            ITEM,
            &[
                ("rate", FieldValue::text("1,250.75")),
                ("quantity", FieldValue::Number(0.0)),
            ],
        ),
    );
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    assert_eq!(items[0].line().get("rate").unwrap(), FieldValue::Number(1250.75));
    assert_eq!(items[0].line().get("quantity").unwrap(), FieldValue::Number(0.0));
    assert_eq!(items[0].line().get("description").unwrap(), FieldValue::Null);
}

#[test]
fn test_formatted_write_rejects_unparseable_input() {
    let (concrete, record) = share(three_items(MemoryRecord::new()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    let err = items[0].line().set("rate", "abc").unwrap_err();
    assert!(matches!(err, SublistError::Format(_)));
    assert!(concrete.borrow().journal().is_empty());
}

#[test]
fn test_text_variant_reads_display_text() {
    let (concrete, record) = share(three_items(MemoryRecord::new()).with_text(ITEM, 0, "item", "Widget"));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    assert_eq!(items[0].line().get("itemText").unwrap(), FieldValue::text("Widget"));

    items[0].line().set("itemText", "Gadget").unwrap();
    assert!(matches!(
        &concrete.borrow().journal()[0],
        HostCall::SetText { field_id, .. } if field_id == "item"
    ));
}

#[test]
fn test_field_errors() {
    let (_, record) = share(three_items(MemoryRecord::new()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);
    let line = items[0].line();

    assert!(matches!(line.get("nope"), Err(SublistError::UnknownField(_))));
    assert!(matches!(line.get("inventorydetail"), Err(SublistError::SubrecordField(_))));
    assert!(matches!(
        line.set("inventorydetail", "x"),
        Err(SublistError::ReadOnlyField(_))
    ));
    assert!(matches!(
        line.subrecord::<InventoryDetail>("rate"),
        Err(SublistError::NotSubrecord(_))
    ));
}

#[test]
fn test_host_errors_propagate_with_host_name() {
    let (_, record) = share(MemoryRecord::new());
    let stray = ItemLine::attach(record, ITEM, 5);

    let err = stray.line().get("item").unwrap_err();
    assert_eq!(err.name(), "SSS_INVALID_SUBLIST_OPERATION");
}

#[test]
fn test_standalone_line_follows_record_mode() {
    let (concrete, record) = share(three_items(MemoryRecord::dynamic()));
    let line = ItemLine::attach(record, ITEM, 2);

    assert!(line.line().uses_dynamic_api());
    assert_eq!(line.line().generation(), 0);
    assert_eq!(line.line().get("item").unwrap(), FieldValue::Number(30.0));
    assert_eq!(
        concrete.borrow().journal(),
        &[HostCall::SelectLine {
            sublist_id: ITEM.to_string(),
            line: 2,
        }]
    );
}

#[test]
fn test_field_metadata_comes_from_host() {
    let metadata = FieldMetadata::new("rate", "currency").with_label("Rate");
    let (_, record) = share(three_items(MemoryRecord::new()).with_field(ITEM, metadata.clone()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    assert_eq!(items.field("rate").unwrap(), Some(metadata));
    assert_eq!(items.field("amount").unwrap(), None);
}

// ============================================================================
// SUBRECORDS
// ============================================================================

#[test]
fn test_subrecord_is_wrapped_in_nested_type() {
    let (_, record) = share(three_items(MemoryRecord::new()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    let mut detail: InventoryDetail = items[0].line().subrecord("inventorydetail").unwrap();
    let assignment: Rc<AssignmentLine> = detail.assignments.add_line().unwrap();
    assignment.line().set("issueinventorynumber", 7.0).unwrap();
    assignment.line().set("quantity", 1.0).unwrap();

    // Same nested record on the next access.
    let again: InventoryDetail = items[0].line().subrecord("inventorydetail").unwrap();
    assert_eq!(again.assignments.len(), 1);
    assert_eq!(
        again.assignments[0].line().get("issueinventorynumber").unwrap(),
        FieldValue::Number(7.0)
    );
    assert_eq!(again.assignments.sublist_id(), ASSIGNMENT);
}

// ============================================================================
// SERIALIZATION
// ============================================================================

#[test]
fn test_to_json_skips_text_fields_without_record_id() {
    let (_, record) = share(three_items(MemoryRecord::new()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    let line = items[0].line().to_json().unwrap();
    assert_eq!(
        line,
        json!({
            "item": 10.0,
            "quantity": 1.0,
            "rate": 5.0,
            "description": null,
            "inventorydetail": { "inventoryassignment": [] },
        })
    );
    let keys: Vec<&String> = line.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["item", "quantity", "rate", "description", "inventorydetail"]);
}

#[test]
fn test_to_json_includes_text_fields_once_saved() {
    let (_, record) = share(
        three_items(MemoryRecord::new().with_id("1001")).with_text(ITEM, 0, "item", "Widget"),
    );
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    let json = items.to_json().unwrap();
    assert_eq!(json.as_array().unwrap().len(), 3);
    assert_eq!(json[0]["itemText"], json!("Widget"));
    assert_eq!(json[1]["itemText"], json!("20"));
    assert_eq!(serde_json::to_value(&items).unwrap(), json);
}

#[test]
fn test_to_json_never_includes_pending_line() {
    let (_, record) = share(three_items(MemoryRecord::dynamic()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    assert!(items.pending_line().is_some());
    assert_eq!(items.to_json().unwrap().as_array().unwrap().len(), 3);
}

#[test]
fn test_nested_lines_serialize_through_parent() {
    let (_, record) = share(three_items(MemoryRecord::new()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    let mut detail: InventoryDetail = items[0].line().subrecord("inventorydetail").unwrap();
    detail
        .assignments
        .add_line()
        .unwrap()
        .line()
        .set("quantity", 4.0)
        .unwrap();

    let json = items[0].line().to_json().unwrap();
    assert_eq!(
        json["inventorydetail"],
        json!({ "inventoryassignment": [{ "issueinventorynumber": null, "quantity": 4.0 }] })
    );
}

// ============================================================================
// EDGE CASES
// ============================================================================

#[test]
fn test_first_line_on_empty_standard_sublist() {
    let (concrete, record) = share(MemoryRecord::new());
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    let added = items.add_line().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(added.line().index(), 0);
    assert!(Rc::ptr_eq(&added, &items.get(0).unwrap()));
    assert_eq!(
        concrete.borrow().journal(),
        &[HostCall::InsertLine {
            sublist_id: ITEM.to_string(),
            line: 0,
            ignore_recalc: true,
        }]
    );
}

#[test]
fn test_dynamic_insert_position_is_ignored() {
    let (concrete, record) = share(three_items(MemoryRecord::dynamic()));
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    let added = items.add_line_at(0, true).unwrap();
    assert_eq!(added.line().index(), 3);
    assert_eq!(items.len(), 3);
    assert!(Rc::ptr_eq(&added, &items.pending_line().unwrap()));
    assert_eq!(
        concrete.borrow().journal(),
        &[HostCall::SelectNewLine {
            sublist_id: ITEM.to_string(),
        }]
    );
}

#[test]
fn test_pending_line_keeps_current_selection_after_toggle() {
    let (concrete, record) = share(three_items(MemoryRecord::dynamic()));
    let mut items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    items.set_use_dynamic_api(false);
    let pending = items.pending_line().unwrap();
    assert!(pending.line().uses_dynamic_api());
    assert_eq!(pending.line().protocol(), Protocol::CurrentSelection);
    assert!(!items[0].line().uses_dynamic_api());

    assert_eq!(pending.line().get("item").unwrap(), FieldValue::Null);
    pending.line().set("item", 40.0).unwrap();
    items.commit_line().unwrap();

    assert_eq!(items.len(), 4);
    assert_eq!(
        concrete.borrow().stored_value(ITEM, "item", 3),
        Some(FieldValue::Number(40.0))
    );
}

#[test]
fn test_passthrough_unset_is_skipped_and_null_is_written() {
    let (concrete, record) = share(
        MemoryRecord::new().with_line(ITEM, &[("description", FieldValue::text("blue"))]),
    );
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    items[0].line().set("description", Assign::Unset).unwrap();
    assert!(concrete.borrow().journal().is_empty());
    assert_eq!(
        concrete.borrow().stored_value(ITEM, "description", 0),
        Some(FieldValue::text("blue"))
    );

    items[0].line().set("description", FieldValue::Null).unwrap();
    assert_eq!(
        concrete.borrow().stored_value(ITEM, "description", 0),
        Some(FieldValue::Null)
    );
}

#[test]
fn test_subrecord_under_current_selection_selects_line_first() {
    let (concrete, record) = share(three_items(MemoryRecord::dynamic()));
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    let detail: InventoryDetail = items[1].line().subrecord("inventorydetail").unwrap();
    assert!(detail.assignments.is_empty());
    assert_eq!(
        concrete.borrow().journal(),
        &[HostCall::SelectLine {
            sublist_id: ITEM.to_string(),
            line: 1,
        }]
    );
}

#[test]
fn test_formatted_date_writes_host_string() {
    let (concrete, record) = share(MemoryRecord::new().with_line("schedule", &[]));
    let schedule: Sublist<ScheduleLine> = Sublist::new(record, "schedule");
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

    schedule[0].line().set("expectedshipdate", FieldValue::Date(date)).unwrap();
    schedule[0].line().set("memo", "rush").unwrap();
    assert_eq!(
        concrete.borrow().stored_value("schedule", "expectedshipdate", 0),
        Some(FieldValue::text("02/29/2024"))
    );
    assert_eq!(
        concrete.borrow().stored_value("schedule", "memo", 0),
        Some(FieldValue::text("rush"))
    );

    assert_eq!(
        schedule[0].line().get("expectedshipdate").unwrap(),
        FieldValue::Date(date)
    );
}

#[test]
fn test_line_field_metadata_uses_host_field_id() {
    let (_, record) = share(
        three_items(MemoryRecord::new())
            .with_field(ITEM, FieldMetadata::new("item", "select").with_label("Item")),
    );
    let items: Sublist<ItemLine> = Sublist::new(record, ITEM);

    let metadata = items[0].line().field("itemText").unwrap().unwrap();
    assert_eq!(metadata.label, "Item");
    assert_eq!(items[0].line().field("rate").unwrap(), None);
    assert!(matches!(items[0].line().field("nope"), Err(SublistError::UnknownField(_))));
}
