//! FILENAME: sublist/src/logging.rs
//! PURPOSE: Category-tagged logging macros over the `log` facade.
//! CONTEXT: The library only emits records; installing a logger is the embedder's job.

pub(crate) const SUBLIST: &str = "SUBLIST";
pub(crate) const LINE: &str = "LINE";

macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        ::log::debug!(target: $cat, $($arg)*)
    };
}

macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        ::log::info!(target: $cat, $($arg)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_info;
