//! Geometry version 0x14 structures.

use prism_common::{Float3, Token};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Geometry 0x14 header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Pmg14Header {
    pub version: u8,
    pub signature: [u8; 3],
    pub piece_count: i32,
    pub part_count: i32,
    pub bone_count: i32,
    /// Bone influences per skinned vertex, shared by every piece.
    pub weight_width: i32,
    pub locator_count: i32,
    pub skeleton_hash: Token,
    pub center: Float3,
    pub radius: f32,
    pub bb_min: Float3,
    pub bb_max: Float3,
    pub skeleton_offset: i32,
    pub parts_offset: i32,
    pub locators_offset: i32,
    pub pieces_offset: i32,
    pub string_pool_offset: i32,
    pub string_pool_size: i32,
    pub vertex_pool_offset: i32,
    pub vertex_pool_size: i32,
    pub index_pool_offset: i32,
    pub index_pool_size: i32,
}

impl Pmg14Header {
    pub const SUPPORTED_VERSION: u8 = 0x14;
}

/// Geometry 0x14 piece record. Stream offsets are absolute.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Pmg14Piece {
    pub edges: u32,
    pub verts: u32,
    pub texcoord_mask: u32,
    pub texcoord_width: u32,
    pub material: i32,
    pub center: Float3,
    pub radius: f32,
    pub bb_min: Float3,
    pub bb_max: Float3,
    pub vert_position_offset: i32,
    pub vert_normal_offset: i32,
    pub vert_texcoord_offset: i32,
    pub vert_color_offset: i32,
    pub vert_color2_offset: i32,
    pub vert_tangent_offset: i32,
    /// Four packed bone index bytes per vertex.
    pub vert_bone_index_offset: i32,
    /// Four packed bone weight bytes per vertex.
    pub vert_bone_weight_offset: i32,
    pub index_offset: i32,
}

const _: () = assert!(std::mem::size_of::<Pmg14Header>() == 112);
const _: () = assert!(std::mem::size_of::<Pmg14Piece>() == 96);
