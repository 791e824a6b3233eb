use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use gimli::{
    AttributeValue, DebuggingInformationEntry, Dwarf, EndianSlice, EntriesCursor, RunTimeEndian,
    Unit,
};
use log::{debug, info};
use object::{Object, ObjectSection};

use crate::dwarf::entry::{Entry, EntryId, EntryStream, EntryTag};
use crate::layout::error::{IndexFault, StreamError};
use crate::layout::index::{IndexBuilder, TypeIndex};

type Reader<'data> = EndianSlice<'data, RunTimeEndian>;

/// Index the DWARF information of the binary at `path`
pub fn index_file<P: AsRef<Path>>(path: P) -> Result<TypeIndex> {
    let path = path.as_ref();
    let data = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;

    let index = index_bytes(&data).with_context(|| format!("cannot index {}", path.display()))?;
    info!(
        "Indexed {}: {} structures, {} typedef names",
        path.display(),
        index.type_count(),
        index.alias_count()
    );

    Ok(index)
}

/// Index the DWARF information of an in-memory object file
pub fn index_bytes(data: &[u8]) -> Result<TypeIndex, IndexFault> {
    let file = object::File::parse(data).map_err(StreamError::from)?;
    let endian = if file.is_little_endian() {
        RunTimeEndian::Little
    } else {
        RunTimeEndian::Big
    };

    let sections = Dwarf::load(|id| load_section(&file, id))?;
    let dwarf = sections.borrow(|section| EndianSlice::new(section, endian));

    let mut builder = IndexBuilder::new();
    let mut units = dwarf.units();
    let mut unit_count = 0usize;
    while let Some(header) = units.next().map_err(StreamError::from)? {
        let unit = dwarf.unit(header).map_err(StreamError::from)?;
        builder = builder.consume(&mut UnitEntries::new(&dwarf, &unit))?;
        unit_count += 1;
    }

    debug!("Walked {} compilation units", unit_count);
    Ok(builder.finish())
}

/// Section contents, decompressed if needed; missing sections are empty
fn load_section<'data>(
    file: &object::File<'data>,
    id: gimli::SectionId,
) -> Result<Cow<'data, [u8]>, StreamError> {
    match file.section_by_name(id.name()) {
        Some(section) => Ok(section.uncompressed_data()?),
        None => Ok(Cow::Borrowed(&[])),
    }
}

/// Entry stream over one compilation unit
pub struct UnitEntries<'a, 'data> {
    dwarf: &'a Dwarf<Reader<'data>>,
    unit: &'a Unit<Reader<'data>>,
    cursor: EntriesCursor<'a, 'a, Reader<'data>>,
    /// Identity of the last real entry; terminators carry no offset of their own
    last: EntryId,
}

impl<'a, 'data> UnitEntries<'a, 'data> {
    pub fn new(dwarf: &'a Dwarf<Reader<'data>>, unit: &'a Unit<Reader<'data>>) -> Self {
        Self {
            dwarf,
            unit,
            cursor: unit.entries(),
            last: EntryId(0),
        }
    }

    fn convert(
        &self,
        die: &DebuggingInformationEntry<'_, '_, Reader<'data>>,
    ) -> Result<Entry, StreamError> {
        let unit_offset = die.offset();
        let id = unit_offset
            .to_debug_info_offset(&self.unit.header)
            .ok_or(StreamError::Unaddressable(unit_offset.0 as u64))?;

        let tag = match die.tag() {
            gimli::DW_TAG_structure_type => EntryTag::Structure,
            gimli::DW_TAG_typedef => EntryTag::Alias,
            gimli::DW_TAG_member => EntryTag::Member,
            _ => EntryTag::Other,
        };

        let mut entry = Entry {
            id: EntryId(id.0 as u64),
            tag,
            has_children: die.has_children(),
            name: None,
            byte_size: None,
            member_offset: None,
            type_ref: None,
        };

        match tag {
            EntryTag::Structure => {
                entry.name = self.name(die)?;
                entry.byte_size = die
                    .attr_value(gimli::DW_AT_byte_size)?
                    .and_then(|value| value.udata_value());
            }
            EntryTag::Alias => {
                entry.name = self.name(die)?;
                entry.type_ref = self.type_ref(die)?;
            }
            EntryTag::Member => {
                entry.name = self.name(die)?;
                entry.member_offset = self.member_offset(die)?;
            }
            EntryTag::Terminator | EntryTag::Other => {}
        }

        Ok(entry)
    }

    fn name(
        &self,
        die: &DebuggingInformationEntry<'_, '_, Reader<'data>>,
    ) -> Result<Option<String>, StreamError> {
        let Some(value) = die.attr_value(gimli::DW_AT_name)? else {
            return Ok(None);
        };

        let name = self.dwarf.attr_string(self.unit, value)?;
        Ok(Some(name.to_string_lossy().into_owned()))
    }

    fn type_ref(
        &self,
        die: &DebuggingInformationEntry<'_, '_, Reader<'data>>,
    ) -> Result<Option<EntryId>, StreamError> {
        Ok(match die.attr_value(gimli::DW_AT_type)? {
            Some(AttributeValue::UnitRef(offset)) => offset
                .to_debug_info_offset(&self.unit.header)
                .map(|offset| EntryId(offset.0 as u64)),
            Some(AttributeValue::DebugInfoRef(offset)) => Some(EntryId(offset.0 as u64)),
            _ => None,
        })
    }

    fn member_offset(
        &self,
        die: &DebuggingInformationEntry<'_, '_, Reader<'data>>,
    ) -> Result<Option<u64>, StreamError> {
        Ok(match die.attr_value(gimli::DW_AT_data_member_location)? {
            Some(AttributeValue::Exprloc(expr)) => plus_uconst(expr, self.unit.encoding()),
            Some(value) => value.udata_value(),
            None => None,
        })
    }
}

/// Offset encoded as a lone `DW_OP_plus_uconst`, as DWARF 2 producers emit it
fn plus_uconst(expr: gimli::Expression<Reader<'_>>, encoding: gimli::Encoding) -> Option<u64> {
    let mut ops = expr.operations(encoding);
    let Ok(Some(gimli::Operation::PlusConstant { value })) = ops.next() else {
        return None;
    };

    match ops.next() {
        Ok(None) => Some(value),
        _ => None,
    }
}

impl EntryStream for UnitEntries<'_, '_> {
    fn next_entry(&mut self) -> Result<Option<Entry>, StreamError> {
        if self.cursor.next_entry()?.is_none() {
            return Ok(None);
        }

        match self.cursor.current() {
            Some(die) => {
                let entry = self.convert(die)?;
                self.last = entry.id;
                Ok(Some(entry))
            }
            None => Ok(Some(Entry::terminator(self.last.0))),
        }
    }
}
