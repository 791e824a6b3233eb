//! Single-pass indexing of structure layouts and typedefs

use std::collections::HashMap;

use log::debug;

use crate::dwarf::entry::{Entry, EntryId, EntryStream, EntryTag};
use crate::layout::error::IndexFault;
use crate::layout::types::{Alias, Field, Type};

/// Index under construction
///
/// Offers no queries. Every pass takes the builder by value, so a failed
/// pass leaves nothing behind that could be mistaken for a valid index.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    types: HashMap<EntryId, Type>,
    aliases: HashMap<String, Alias>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `stream` to exhaustion, registering every sized structure and
    /// every typedef occurrence
    pub fn consume<S>(mut self, stream: &mut S) -> Result<Self, IndexFault>
    where
        S: EntryStream + ?Sized,
    {
        while let Some(entry) = stream.next_entry()? {
            match entry.tag {
                EntryTag::Alias => self.add_alias(entry),
                EntryTag::Structure => self.add_structure(stream, entry)?,
                _ => {}
            }
        }

        Ok(self)
    }

    fn add_alias(&mut self, entry: Entry) {
        let Some(name) = entry.name.filter(|name| !name.is_empty()) else {
            return;
        };

        let alias = self
            .aliases
            .entry(name)
            .or_insert_with_key(|name| Alias::new(name.as_str()));
        if let Some(target) = entry.type_ref {
            alias.push_target(target);
        }
    }

    fn add_structure<S>(&mut self, stream: &mut S, entry: Entry) -> Result<(), IndexFault>
    where
        S: EntryStream + ?Sized,
    {
        let size = entry.byte_size.unwrap_or(0);
        if size == 0 {
            // Forward declaration: layout unknown here
            stream.skip_children(&entry)?;
            return Ok(());
        }

        let fields = self.read_members(stream, &entry)?;
        let name = entry.name.unwrap_or_default();
        self.types.insert(entry.id, Type::new(name, size, fields));
        Ok(())
    }

    /// Read the direct children of `parent` and collect its data members
    ///
    /// Children lacking a name or an offset are dropped. Structures and
    /// typedefs declared inside `parent` are registered like top-level ones,
    /// and every other nested subtree is walked for them, so the stream ends
    /// up right after `parent`'s child list.
    pub fn read_members<S>(
        &mut self,
        stream: &mut S,
        parent: &Entry,
    ) -> Result<Vec<Field>, IndexFault>
    where
        S: EntryStream + ?Sized,
    {
        let mut fields = Vec::new();
        if !parent.has_children {
            return Ok(fields);
        }

        while let Some(child) = stream.next_entry()? {
            match child.tag {
                EntryTag::Terminator => break,
                EntryTag::Structure => self.add_structure(stream, child)?,
                EntryTag::Alias => {
                    let nested = child.has_children;
                    self.add_alias(child);
                    if nested {
                        self.consume_children(stream)?;
                    }
                }
                EntryTag::Member | EntryTag::Other => {
                    if child.has_children {
                        self.consume_children(stream)?;
                    }
                    if let (Some(name), Some(offset)) = (child.name, child.member_offset) {
                        fields.push(Field { name, offset });
                    }
                }
            }
        }

        Ok(fields)
    }

    /// Index the rest of a child list, up to and including its terminator
    fn consume_children<S>(&mut self, stream: &mut S) -> Result<(), IndexFault>
    where
        S: EntryStream + ?Sized,
    {
        while let Some(entry) = stream.next_entry()? {
            let nested = entry.has_children;
            match entry.tag {
                EntryTag::Terminator => break,
                EntryTag::Structure => self.add_structure(stream, entry)?,
                EntryTag::Alias => {
                    self.add_alias(entry);
                    if nested {
                        self.consume_children(stream)?;
                    }
                }
                EntryTag::Member | EntryTag::Other => {
                    if nested {
                        self.consume_children(stream)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Freeze the index
    pub fn finish(self) -> TypeIndex {
        debug!(
            "Indexed {} structures and {} typedef names",
            self.types.len(),
            self.aliases.len()
        );
        TypeIndex {
            types: self.types,
            aliases: self.aliases,
        }
    }
}

/// Immutable index of structure layouts and typedef names
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    pub(crate) types: HashMap<EntryId, Type>,
    pub(crate) aliases: HashMap<String, Alias>,
}

impl TypeIndex {
    /// Index a single stream
    pub fn build<S>(stream: &mut S) -> Result<Self, IndexFault>
    where
        S: EntryStream + ?Sized,
    {
        Ok(IndexBuilder::new().consume(stream)?.finish())
    }

    /// Structure registered under `id`
    pub fn type_by_id(&self, id: EntryId) -> Option<&Type> {
        self.types.get(&id)
    }

    pub fn alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}
