//! FILENAME: sublist/src/lib.rs
//! Typed sublist projection.
//!
//! Lets strongly typed line objects read and write the rows of a host
//! record's sublist without caring which host protocol is in play.
//!
//! Layers:
//! - `host`: what the host record must provide (both protocols)
//! - `mode`: which protocol a given call uses
//! - `field` / `accessor`: per-field descriptors and read/write strategies
//! - `line`: one row, addressed by (sublist id, index)
//! - `sublist`: the ordered row set and its structural operations

mod accessor;
mod error;
mod logging;

pub mod field;
pub mod host;
pub mod line;
pub mod mode;
pub mod sublist;

pub use error::{HostError, SublistError, SublistResult};
pub use field::{subrecord_json, AccessorKind, Assign, FieldDescriptor, SublistFieldType, SubrecordJson};
pub use host::{FieldMetadata, HostRecord, SharedRecord};
pub use line::{FromRecord, Line, SublistLine};
pub use mode::Protocol;
pub use sublist::Sublist;

// The value and formatting vocabulary is part of this crate's API.
pub use field_format::{FieldValue, FormatSettings, FormatType, Formatter, StandardFormatter};
