#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use offsetdump::{Entry, EntryList, EntryTag, TypeIndex};

#[derive(Arbitrary, Debug)]
struct FuzzEntry {
    // Picks the tag
    tag_idx: u8,
    has_children: bool,
    // Small name pool so that names collide
    name_idx: Option<u8>,
    byte_size: Option<u8>,
    member_offset: Option<u16>,
    type_ref: Option<u8>,
}

fn to_tag(idx: u8) -> EntryTag {
    match idx % 5 {
        0 => EntryTag::Structure,
        1 => EntryTag::Alias,
        2 => EntryTag::Member,
        3 => EntryTag::Terminator,
        _ => EntryTag::Other,
    }
}

const NAMES: [&str; 4] = ["Frame", "_frame", "PyObject", "Point"];

fuzz_target!(|input: Vec<FuzzEntry>| {
    let entries: Vec<Entry> = input
        .iter()
        .enumerate()
        .map(|(i, e)| Entry {
            id: offsetdump::EntryId(i as u64),
            tag: to_tag(e.tag_idx),
            has_children: e.has_children,
            name: e.name_idx.map(|n| NAMES[n as usize % NAMES.len()].to_string()),
            byte_size: e.byte_size.map(u64::from),
            member_offset: e.member_offset.map(u64::from),
            type_ref: e.type_ref.map(|r| offsetdump::EntryId(u64::from(r))),
        })
        .collect();

    let index =
        TypeIndex::build(&mut EntryList::new(entries)).expect("synthetic streams never fail");
    for name in NAMES {
        // Faults are fine; panics are not
        let _ = index.resolve_preferring_alias(name);
        let _ = index.resolve_by_name(name);
    }
});
