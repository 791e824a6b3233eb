//! Debug-entry stream abstraction
//!
//! The indexer never talks to gimli directly. It consumes a flat, depth-first
//! sequence of [`Entry`] records through the [`EntryStream`] trait, with an
//! explicit [`EntryTag::Terminator`] marking the end of every child list.

use std::collections::VecDeque;
use std::fmt;

use crate::layout::error::StreamError;

/// Stable identity of one debug entry within a single indexing pass
///
/// For real binaries this is the entry's offset in `.debug_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<0x{:x}>", self.0)
    }
}

/// Classification of a debug entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTag {
    /// Structure type declaration
    Structure,
    /// Typedef
    Alias,
    /// Data member of a structure
    Member,
    /// End of a child list
    Terminator,
    /// Anything else
    Other,
}

/// One record of the debug-entry stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub tag: EntryTag,
    /// Whether a child list (closed by a terminator) follows this entry
    pub has_children: bool,
    pub name: Option<String>,
    pub byte_size: Option<u64>,
    pub member_offset: Option<u64>,
    pub type_ref: Option<EntryId>,
}

impl Entry {
    fn bare(id: u64, tag: EntryTag) -> Self {
        Self {
            id: EntryId(id),
            tag,
            has_children: false,
            name: None,
            byte_size: None,
            member_offset: None,
            type_ref: None,
        }
    }

    /// Structure declaration; `size` of `None` models a forward declaration
    pub fn structure(id: u64, name: &str, size: Option<u64>) -> Self {
        Self {
            name: Some(name.to_string()),
            byte_size: size,
            has_children: true,
            ..Self::bare(id, EntryTag::Structure)
        }
    }

    /// Data member with both a name and an offset
    pub fn member(id: u64, name: &str, offset: u64) -> Self {
        Self {
            name: Some(name.to_string()),
            member_offset: Some(offset),
            ..Self::bare(id, EntryTag::Member)
        }
    }

    /// Typedef pointing at `target`
    pub fn alias(id: u64, name: &str, target: Option<u64>) -> Self {
        Self {
            name: Some(name.to_string()),
            type_ref: target.map(EntryId),
            ..Self::bare(id, EntryTag::Alias)
        }
    }

    pub fn terminator(id: u64) -> Self {
        Self::bare(id, EntryTag::Terminator)
    }

    pub fn other(id: u64, has_children: bool) -> Self {
        Self {
            has_children,
            ..Self::bare(id, EntryTag::Other)
        }
    }

    pub fn with_children(mut self, has_children: bool) -> Self {
        self.has_children = has_children;
        self
    }

    pub fn is_terminator(&self) -> bool {
        self.tag == EntryTag::Terminator
    }
}

/// Sequential source of debug entries
///
/// A stream has exactly one consumer; it is read strictly in order.
#[cfg_attr(test, mockall::automock)]
pub trait EntryStream {
    /// Read the next entry, or `None` once the stream is exhausted
    fn next_entry(&mut self) -> Result<Option<Entry>, StreamError>;

    /// Consume the whole subtree below `parent`, including its terminator
    fn skip_children(&mut self, parent: &Entry) -> Result<(), StreamError> {
        if !parent.has_children {
            return Ok(());
        }

        let mut depth = 1usize;
        while depth > 0 {
            let Some(entry) = self.next_entry()? else {
                return Ok(());
            };
            if entry.is_terminator() {
                depth -= 1;
            } else if entry.has_children {
                depth += 1;
            }
        }

        Ok(())
    }
}

/// In-memory entry stream
///
/// Used to feed the indexer with synthetic debug information.
#[derive(Debug, Clone, Default)]
pub struct EntryList {
    entries: VecDeque<Entry>,
}

impl EntryList {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}

impl From<Vec<Entry>> for EntryList {
    fn from(entries: Vec<Entry>) -> Self {
        Self::new(entries)
    }
}

impl EntryStream for EntryList {
    fn next_entry(&mut self) -> Result<Option<Entry>, StreamError> {
        Ok(self.entries.pop_front())
    }
}
