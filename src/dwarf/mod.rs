//! DWARF debug-entry providers

pub mod entry;
pub mod reader;

pub use entry::{Entry, EntryId, EntryList, EntryStream, EntryTag};
pub use reader::{index_bytes, index_file, UnitEntries};
