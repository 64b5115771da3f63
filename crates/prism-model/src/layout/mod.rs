//! On-disk record layouts.
//!
//! All records are little-endian and packed. Bone, part and locator records
//! share one layout across both geometry versions; headers and piece records
//! are version specific and live in [`pmg13`] and [`pmg14`].

pub mod pmd;
pub mod pmg13;
pub mod pmg14;

use prism_common::{Float3, Mat4, Quat, Token};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Offset value marking an absent stream, table or hookup.
pub const ABSENT: i32 = -1;

/// Signature bytes following the version byte of a geometry file.
pub const PMG_SIGNATURE: [u8; 3] = *b"gmP";

/// Skeleton bone record.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct BoneRecord {
    pub name: Token,
    pub transformation: Mat4,
    pub transformation_reversed: Mat4,
    pub stretch: Quat,
    pub rotation: Quat,
    pub translation: Float3,
    pub scale: Float3,
    pub sign_of_determinant: f32,
    /// Parent bone index, -1 for the root.
    pub parent: i8,
    pub pad: [u8; 3],
}

/// Part record: a named range of pieces and locators.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct PartRecord {
    pub name: Token,
    pub piece_count: i32,
    pub piece_start: i32,
    pub locator_count: i32,
    pub locator_start: i32,
}

/// Locator record.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LocatorRecord {
    pub name: Token,
    pub position: Float3,
    pub scale: f32,
    pub rotation: Quat,
    /// Byte offset of the hookup string within the string pool, or [`ABSENT`].
    pub hookup_offset: i32,
}

/// Packed per-vertex tangent.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct TangentRecord {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Packed per-vertex color, one byte per channel.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct ColorRecord {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Three vertex indices local to the owning piece.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct TriangleRecord {
    pub a: [u16; 3],
}

const _: () = assert!(std::mem::size_of::<BoneRecord>() == 200);
const _: () = assert!(std::mem::size_of::<PartRecord>() == 24);
const _: () = assert!(std::mem::size_of::<LocatorRecord>() == 44);
const _: () = assert!(std::mem::size_of::<TangentRecord>() == 16);
const _: () = assert!(std::mem::size_of::<ColorRecord>() == 4);
const _: () = assert!(std::mem::size_of::<TriangleRecord>() == 6);
