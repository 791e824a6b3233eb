//! Resolved structure layouts

use std::fmt;

use crate::dwarf::entry::EntryId;

/// One data member's position within its owning structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub offset: u64,
}

impl Field {
    pub fn new(name: impl Into<String>, offset: u64) -> Self {
        Self {
            name: name.into(),
            offset,
        }
    }
}

/// Layout of one structure declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    name: String,
    size: u64,
    fields: Vec<Field>,
}

impl Type {
    pub fn new(name: impl Into<String>, size: u64, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            size,
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Find a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Compare name, size and the ordered field list
    pub fn structurally_eq(&self, other: &Type) -> bool {
        self.name == other.name
            && self.size == other.size
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.name == b.name && a.offset == b.offset)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "struct {} (size {}) {{", self.name, self.size)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}@{}", field.name, field.offset)?;
        }
        write!(f, " }}")
    }
}

/// Typedef record accumulated across compilation units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    name: String,
    targets: Vec<EntryId>,
}

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            targets: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Referenced identities, one per occurrence that named a type
    pub fn targets(&self) -> &[EntryId] {
        &self.targets
    }

    pub(crate) fn push_target(&mut self, target: EntryId) {
        self.targets.push(target);
    }
}
