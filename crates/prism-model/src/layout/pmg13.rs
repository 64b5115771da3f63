//! Geometry version 0x13 structures.

use prism_common::Float3;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Geometry 0x13 header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Pmg13Header {
    pub version: u8,
    pub signature: [u8; 3],
    pub piece_count: i32,
    pub part_count: i32,
    pub bone_count: i32,
    pub locator_count: i32,
    pub center: Float3,
    pub radius: f32,
    pub bb_min: Float3,
    pub bb_max: Float3,
    pub bone_offset: i32,
    pub part_offset: i32,
    pub locator_offset: i32,
    pub piece_offset: i32,
    /// Origin of the locator hookup pool.
    pub locator_name_offset: i32,
    /// Size of the locator hookup pool.
    pub locator_name_size: i32,
    pub anim_bind_offset: i32,
    pub anim_bind_size: i32,
    pub geometry_offset: i32,
    pub geometry_size: i32,
}

impl Pmg13Header {
    pub const SUPPORTED_VERSION: u8 = 0x13;
}

/// Geometry 0x13 piece record. Stream offsets are absolute.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Pmg13Piece {
    pub edges: i32,
    pub verts: i32,
    pub uv_mask: u32,
    pub uv_channels: i32,
    pub bone_count: i32,
    pub material: i32,
    pub center: Float3,
    pub radius: f32,
    pub bb_min: Float3,
    pub bb_max: Float3,
    pub vert_position_offset: i32,
    pub vert_normal_offset: i32,
    pub vert_uv_offset: i32,
    pub vert_rgba_offset: i32,
    pub vert_rgba2_offset: i32,
    pub vert_tangent_offset: i32,
    pub triangle_offset: i32,
    /// Per-vertex `u16` bind index.
    pub anim_bind_offset: i32,
    /// Bone index rows, `bone_count` signed bytes per bind index.
    pub anim_bind_bones_offset: i32,
    /// Bone weight rows, `bone_count` bytes per bind index.
    pub anim_bind_bones_weight_offset: i32,
}

const _: () = assert!(std::mem::size_of::<Pmg13Header>() == 100);
const _: () = assert!(std::mem::size_of::<Pmg13Piece>() == 104);
