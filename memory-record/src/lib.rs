//! FILENAME: memory-record/src/lib.rs
//! PURPOSE: Reference host record kept entirely in memory.
//! CONTEXT: Implements both sublist protocols so the sublist layer can be
//! driven end to end without a real host. Every state-changing call is
//! recorded in a journal for tests to assert on.

pub mod journal;
pub mod record;

pub use journal::HostCall;
pub use record::MemoryRecord;
