use offsetdump::{index_bytes, IndexFault, StreamError};

use crate::test_helpers::{rewrite_debug_sections, ObjectBuilder};

#[test]
fn test_point_end_to_end() {
    let mut obj = ObjectBuilder::new();
    let root = obj.root();
    let point = obj.structure(root, "Point", Some(8));
    obj.member(point, "x", 0);
    obj.member(point, "y", 4);

    let index = index_bytes(&obj.build()).unwrap();
    let ty = index.resolve_preferring_alias("Point").unwrap().unwrap();
    assert_eq!(ty.size(), 8);
    assert_eq!(ty.field("y").unwrap().offset, 4);
    assert_eq!(ty.field("x").unwrap().offset, 0);
}

fn frame_in_two_units(second_code_offset: u64) -> Vec<u8> {
    let mut obj = ObjectBuilder::new();
    for code_offset in [8, second_code_offset] {
        let root = obj.root();
        let frame = obj.structure(root, "_frame", Some(16));
        obj.member(frame, "f_back", 0);
        obj.member(frame, "f_code", code_offset);
        obj.typedef("Frame", frame);
        obj.next_unit();
    }
    obj.build()
}

#[test]
fn test_typedef_repeated_across_units_resolves() {
    let index = index_bytes(&frame_in_two_units(8)).unwrap();

    assert_eq!(index.alias("Frame").unwrap().targets().len(), 2);
    let ty = index.resolve_preferring_alias("Frame").unwrap().unwrap();
    assert_eq!(ty.name(), "_frame");
    assert_eq!(ty.field("f_back").unwrap().offset, 0);
    assert_eq!(ty.field("f_code").unwrap().offset, 8);
}

#[test]
fn test_typedef_with_diverging_layouts_faults() {
    let index = index_bytes(&frame_in_two_units(12)).unwrap();

    let err = index.resolve_preferring_alias("Frame").unwrap_err();
    assert!(matches!(err, IndexFault::AliasMismatch { .. }));
    assert!(matches!(
        index.resolve_by_name("_frame"),
        Err(IndexFault::NameMismatch { .. })
    ));
}

#[test]
fn test_forward_declaration_in_other_unit() {
    let mut obj = ObjectBuilder::new();
    let root = obj.root();
    let opaque = obj.structure(root, "_is", None);
    obj.typedef("PyInterpreterState", opaque);
    obj.next_unit();
    let root = obj.root();
    let full = obj.structure(root, "_is", Some(32));
    obj.member(full, "next", 0);
    obj.member(full, "id", 8);

    let index = index_bytes(&obj.build()).unwrap();
    assert_eq!(index.type_count(), 1);

    let ty = index.resolve_by_name("_is").unwrap().unwrap();
    assert_eq!(ty.field("id").unwrap().offset, 8);

    // The typedef only ever saw the declaration
    assert!(matches!(
        index.resolve_preferring_alias("PyInterpreterState"),
        Err(IndexFault::DanglingAlias { .. })
    ));
}

#[test]
fn test_member_location_expressions_and_static_members() {
    let mut obj = ObjectBuilder::new();
    let root = obj.root();
    let code = obj.structure(root, "PyCodeObject", Some(128));
    obj.member_expr(code, "co_filename", 104);
    obj.static_member(code, "co_cache");
    obj.member(code, "co_name", 112);

    let index = index_bytes(&obj.build()).unwrap();
    let ty = index.resolve_by_name("PyCodeObject").unwrap().unwrap();
    let fields: Vec<_> = ty
        .fields()
        .iter()
        .map(|field| (field.name.as_str(), field.offset))
        .collect();
    assert_eq!(fields, [("co_filename", 104), ("co_name", 112)]);
}

#[test]
fn test_structures_inside_namespaces_and_nested_structures() {
    let mut obj = ObjectBuilder::new();
    let ns = obj.namespace("interp");
    let state = obj.structure(ns, "ThreadState", Some(24));
    obj.member(state, "prev", 0);
    let inner = obj.structure(state, "Inner", Some(4));
    obj.member(inner, "flag", 0);
    obj.member(state, "next", 8);

    let index = index_bytes(&obj.build()).unwrap();
    let ty = index.resolve_by_name("ThreadState").unwrap().unwrap();
    assert_eq!(ty.fields().len(), 2);
    assert_eq!(ty.field("next").unwrap().offset, 8);
    assert!(ty.field("flag").is_none());

    let inner = index.resolve_by_name("Inner").unwrap().unwrap();
    assert_eq!(inner.size(), 4);
    assert_eq!(inner.field("flag").unwrap().offset, 0);
    assert_eq!(index.type_count(), 2);
}

#[test]
fn test_typedef_referring_into_another_unit() {
    let mut obj = ObjectBuilder::new();
    let root = obj.root();
    let frame = obj.structure(root, "_frame", Some(16));
    obj.member(frame, "f_back", 0);
    obj.member(frame, "f_code", 8);
    let first_unit = obj.unit();
    obj.next_unit();
    obj.typedef_ref("PyFrameObject", first_unit, frame);

    let index = index_bytes(&obj.build()).unwrap();
    let ty = index
        .resolve_preferring_alias("PyFrameObject")
        .unwrap()
        .unwrap();
    assert_eq!(ty.name(), "_frame");
    assert_eq!(ty.field("f_code").unwrap().offset, 8);
}

#[test]
fn test_names_from_string_table() {
    let mut obj = ObjectBuilder::new().with_string_table();
    let root = obj.root();
    let point = obj.structure(root, "Point", Some(8));
    obj.member(point, "x", 0);
    obj.member(point, "y", 4);

    let index = index_bytes(&obj.build()).unwrap();
    let ty = index.resolve_by_name("Point").unwrap().unwrap();
    assert_eq!(ty.field("y").unwrap().offset, 4);
}

#[test]
fn test_missing_string_table_faults() {
    let mut obj = ObjectBuilder::new().with_string_table();
    let root = obj.root();
    let point = obj.structure(root, "Point", Some(8));
    obj.member(point, "x", 0);

    let bytes = rewrite_debug_sections(&obj.build(), |name, data| {
        (name != ".debug_str").then_some((data, 0))
    });

    let err = index_bytes(&bytes).unwrap_err();
    assert!(matches!(err, IndexFault::Stream(StreamError::Dwarf(_))));
}

#[test]
fn test_corrupt_compressed_debug_info_faults() {
    let mut obj = ObjectBuilder::new();
    let root = obj.root();
    let point = obj.structure(root, "Point", Some(8));
    obj.member(point, "x", 0);

    let bytes = rewrite_debug_sections(&obj.build(), |name, data| {
        if name != ".debug_info" {
            return Some((data, 0));
        }
        // Elf64_Chdr announcing zlib data, followed by bytes that are not
        let mut compressed = Vec::new();
        compressed.extend_from_slice(&object::elf::ELFCOMPRESS_ZLIB.to_le_bytes());
        compressed.extend_from_slice(&0u32.to_le_bytes());
        compressed.extend_from_slice(&(data.len() as u64).to_le_bytes());
        compressed.extend_from_slice(&1u64.to_le_bytes());
        compressed.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x11, 0x22, 0x33]);
        Some((compressed, u64::from(object::elf::SHF_COMPRESSED)))
    });

    let err = index_bytes(&bytes).unwrap_err();
    assert!(matches!(err, IndexFault::Stream(StreamError::Container(_))));
}

#[test]
fn test_object_without_debug_info_is_empty() {
    let obj = object::write::Object::new(
        object::BinaryFormat::Elf,
        object::Architecture::X86_64,
        object::Endianness::Little,
    );
    let index = index_bytes(&obj.write().unwrap()).unwrap();

    assert_eq!(index.type_count(), 0);
    assert!(index.resolve_preferring_alias("Point").unwrap().is_none());
}

#[test]
fn test_truncated_debug_info_faults() {
    let mut obj = ObjectBuilder::new();
    let root = obj.root();
    let point = obj.structure(root, "Point", Some(8));
    obj.member(point, "x", 0);
    let bytes = obj.build();

    let truncated = rewrite_debug_sections(&bytes, |name, mut data| {
        if name == ".debug_info" {
            data.truncate(data.len() - 6);
        }
        Some((data, 0))
    });

    let err = index_bytes(&truncated).unwrap_err();
    assert!(matches!(err, IndexFault::Stream(_)));
}
