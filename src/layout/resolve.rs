//! Name resolution against a built [`TypeIndex`]

use crate::layout::error::IndexFault;
use crate::layout::index::TypeIndex;
use crate::layout::types::Type;

impl TypeIndex {
    /// Resolve `name` through its typedef if one exists, otherwise by
    /// structure name
    ///
    /// All occurrences of the typedef must point at indexed structures with
    /// identical layouts. A typedef shadows any same-named structure.
    pub fn resolve_preferring_alias(&self, name: &str) -> Result<Option<&Type>, IndexFault> {
        if name.is_empty() {
            return Ok(None);
        }

        let Some(alias) = self.alias(name) else {
            return self.resolve_by_name(name);
        };

        let mut resolved: Option<&Type> = None;
        for &target in alias.targets() {
            let ty = self
                .type_by_id(target)
                .ok_or_else(|| IndexFault::DanglingAlias {
                    alias: name.to_string(),
                    target,
                })?;

            match resolved {
                Some(first) if !first.structurally_eq(ty) => {
                    return Err(IndexFault::AliasMismatch {
                        alias: name.to_string(),
                        first: Box::new(first.clone()),
                        other: Box::new(ty.clone()),
                    });
                }
                Some(_) => {}
                None => resolved = Some(ty),
            }
        }

        Ok(resolved)
    }

    /// Resolve `name` by scanning every indexed structure
    ///
    /// Same-named structures with identical layouts collapse into one.
    pub fn resolve_by_name(&self, name: &str) -> Result<Option<&Type>, IndexFault> {
        if name.is_empty() {
            return Ok(None);
        }

        let mut resolved: Option<&Type> = None;
        for ty in self.types.values().filter(|ty| ty.name() == name) {
            match resolved {
                Some(first) if !first.structurally_eq(ty) => {
                    return Err(IndexFault::NameMismatch {
                        name: name.to_string(),
                        first: Box::new(first.clone()),
                        other: Box::new(ty.clone()),
                    });
                }
                Some(_) => {}
                None => resolved = Some(ty),
            }
        }

        Ok(resolved)
    }
}
