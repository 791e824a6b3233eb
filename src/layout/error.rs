use thiserror::Error;

use crate::dwarf::entry::EntryId;
use crate::layout::types::Type;

/// Failure to decode the next debug entry
#[derive(Debug, Error)]
pub enum StreamError {
    /// The object file container could not be read
    #[error("cannot read object file: {0}")]
    Container(#[from] object::Error),
    /// The DWARF sections are malformed or truncated
    #[error("malformed DWARF data: {0}")]
    Dwarf(#[from] gimli::Error),
    /// An entry lives outside `.debug_info` and has no global identity
    #[error("entry at unit offset 0x{0:x} has no .debug_info offset")]
    Unaddressable(u64),
}

/// Fatal construction fault
///
/// Any of these means the debug information is either corrupt or genuinely
/// ambiguous. No result derived from the offending binary is trustworthy.
#[derive(Debug, Error)]
pub enum IndexFault {
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// A typedef refers to an entry that is not a registered structure
    #[error("typedef {alias} refers to {target}, which is not an indexed structure")]
    DanglingAlias { alias: String, target: EntryId },
    /// Two occurrences of one typedef resolve to different layouts
    #[error("typedef {alias} has conflicting definitions: {first} vs {other}")]
    AliasMismatch {
        alias: String,
        first: Box<Type>,
        other: Box<Type>,
    },
    /// An offset or size too large to report
    #[error("{label} is {value}, beyond any reportable offset")]
    OutOfRange { label: String, value: u64 },
    /// Two structures share a name but not a layout
    #[error("structure {name} has conflicting definitions: {first} vs {other}")]
    NameMismatch {
        name: String,
        first: Box<Type>,
        other: Box<Type>,
    },
}
