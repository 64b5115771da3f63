//! Descriptor (`.pmd`) structures.

use prism_common::Token;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Descriptor file header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct PmdHeader {
    pub version: u32,
    pub material_count: u32,
    pub look_count: u32,
    pub part_count: u32,
    pub variant_count: u32,
    pub part_attribs_count: u32,
    pub attribs_count: u32,
    /// Size of one variant's block of attribute values.
    pub attribs_values_size: u32,
    pub material_block_size: u32,
    pub look_offset: u32,
    pub variant_offset: u32,
    pub part_attribs_offset: u32,
    pub attribs_value_offset: u32,
    pub attribs_offset: u32,
    /// Table of `look_count * material_count` string offsets.
    pub material_offset: u32,
    pub material_data_offset: u32,
}

impl PmdHeader {
    /// The only descriptor version this crate reads.
    pub const SUPPORTED_VERSION: u32 = 0x04;
}

/// Range `[from, to)` of attribute definitions owned by one part.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct AttribLink {
    pub from: i32,
    pub to: i32,
}

/// Attribute definition shared by all variants.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct AttribDef {
    pub name: Token,
    pub kind: i32,
    /// Offset of the value inside a variant's value block.
    pub offset: i32,
}

impl AttribDef {
    /// Type code of integer attributes.
    pub const KIND_INT: i32 = 0;
}

const _: () = assert!(std::mem::size_of::<PmdHeader>() == 64);
const _: () = assert!(std::mem::size_of::<AttribLink>() == 8);
const _: () = assert!(std::mem::size_of::<AttribDef>() == 16);
