//! FILENAME: field-format/src/lib.rs
//! PURPOSE: Field values and the formatting collaborator for sublist fields.
//! CONTEXT: The sublist layer never interprets strings itself. It hands raw
//! host values to a `Formatter` keyed by a `FormatType` tag and gets typed
//! values back (and the reverse on writes).

mod error;
pub mod format_type;
pub mod formatter;
pub mod number;
pub mod settings;
pub mod value;

// Re-export commonly used types at the crate root
pub use error::FormatError;
pub use format_type::FormatType;
pub use formatter::{Formatter, StandardFormatter};
pub use settings::FormatSettings;
pub use value::FieldValue;
