//! OFFSETDUMP - struct field offsets from DWARF debug information
//!
//! This library indexes the structure declarations and typedefs of a
//! binary's debug information and resolves the layouts of a caller-supplied
//! set of types, so that a profiler can read fields of live objects in a
//! process it was never linked against.

pub mod config;
pub mod dwarf;
pub mod layout;
pub mod report;
pub mod schema;

/// Re-export key types for easier access in tests
pub use dwarf::{index_bytes, index_file, Entry, EntryId, EntryList, EntryStream, EntryTag};
pub use layout::{Field, IndexBuilder, IndexFault, StreamError, Type, TypeIndex};
pub use report::{BinaryReport, OffsetValue, Version, NOT_FOUND};
pub use schema::{FieldRequest, Schema, TypeRequest};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialize the logging system
pub fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("offsetdump", level)
        .format_timestamp_secs()
        .init();
}
