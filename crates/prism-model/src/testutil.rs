//! Synthetic model files for unit tests.

use std::mem::size_of;

use prism_common::Token;
use zerocopy::{FromZeros, IntoBytes};

use crate::layout::pmd::{AttribDef, AttribLink, PmdHeader};
use crate::layout::pmg14::{Pmg14Header, Pmg14Piece};
use crate::layout::{BoneRecord, LocatorRecord, PartRecord, ABSENT, PMG_SIGNATURE};

/// Growable byte buffer; every push returns the offset it landed at.
#[derive(Debug, Default)]
pub(crate) struct Buffer {
    pub bytes: Vec<u8>,
}

impl Buffer {
    pub fn push(&mut self, bytes: &[u8]) -> i32 {
        let offset = self.bytes.len() as i32;
        self.bytes.extend_from_slice(bytes);
        offset
    }

    pub fn push_f32s(&mut self, values: &[f32]) -> i32 {
        let offset = self.bytes.len() as i32;
        for value in values {
            self.bytes.extend_from_slice(&value.to_le_bytes());
        }
        offset
    }

    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) {
        self.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

pub(crate) fn bone(name: &str, parent: i8) -> BoneRecord {
    let mut record = BoneRecord::new_zeroed();
    record.name = Token::new(name);
    record.parent = parent;
    record.transformation = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.5, 1.5, 2.5, 1.0],
    ];
    record
}

pub(crate) fn part(name: &str, pieces: (i32, i32), locators: (i32, i32)) -> PartRecord {
    PartRecord {
        name: Token::new(name),
        piece_start: pieces.0,
        piece_count: pieces.1,
        locator_start: locators.0,
        locator_count: locators.1,
    }
}

pub(crate) fn locator(name: &str, hookup_offset: i32) -> LocatorRecord {
    let mut record = LocatorRecord::new_zeroed();
    record.name = Token::new(name);
    record.position = [1.0, 2.0, 3.0];
    record.rotation = [1.0, 0.0, 0.0, 0.0];
    record.scale = 1.0;
    record.hookup_offset = hookup_offset;
    record
}

pub(crate) fn pmg14_header() -> Pmg14Header {
    let mut header = Pmg14Header::new_zeroed();
    header.version = Pmg14Header::SUPPORTED_VERSION;
    header.signature = PMG_SIGNATURE;
    header.skeleton_hash = Token::new("skel");
    header.skeleton_offset = ABSENT;
    header.parts_offset = ABSENT;
    header.locators_offset = ABSENT;
    header.pieces_offset = ABSENT;
    header.string_pool_offset = ABSENT;
    header
}

pub(crate) fn pmg14_piece() -> Pmg14Piece {
    let mut piece = Pmg14Piece::new_zeroed();
    piece.texcoord_mask = 0xFFFF_FFF0;
    piece.vert_position_offset = ABSENT;
    piece.vert_normal_offset = ABSENT;
    piece.vert_texcoord_offset = ABSENT;
    piece.vert_color_offset = ABSENT;
    piece.vert_color2_offset = ABSENT;
    piece.vert_tangent_offset = ABSENT;
    piece.vert_bone_index_offset = ABSENT;
    piece.vert_bone_weight_offset = ABSENT;
    piece.index_offset = ABSENT;
    piece
}

/// Version 0x14 geometry: one part, one locator hooked to `light`, and one
/// piece with three vertices (position and normal) forming one triangle.
///
/// When `skinned`, two bones are added and every vertex carries bone words.
pub(crate) fn triangle_geometry(skinned: bool) -> Vec<u8> {
    let mut buffer = Buffer::default();
    buffer.push(&[0; size_of::<Pmg14Header>()]);
    let mut header = pmg14_header();

    if skinned {
        header.bone_count = 2;
        header.weight_width = 2;
        header.skeleton_offset = buffer.push(bone("root", -1).as_bytes());
        buffer.push(bone("arm", 0).as_bytes());
    }

    header.string_pool_offset = buffer.push(b"light\0");
    header.string_pool_size = 6;
    header.locator_count = 1;
    header.locators_offset = buffer.push(locator("l_lamp", 0).as_bytes());

    let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let weights: [[u8; 4]; 3] = [[255, 0, 0, 0], [128, 127, 0, 0], [0, 255, 0, 0]];
    let base = buffer.bytes.len() as i32;
    for (position, weight) in positions.iter().zip(weights) {
        buffer.push_f32s(position);
        buffer.push_f32s(&[0.0, 0.0, 1.0]);
        if skinned {
            buffer.push(&[0, 1, 0, 0]);
            buffer.push(&weight);
        }
    }

    let mut record = pmg14_piece();
    record.verts = 3;
    record.edges = 3;
    record.vert_position_offset = base;
    record.vert_normal_offset = base + 12;
    if skinned {
        record.vert_bone_index_offset = base + 24;
        record.vert_bone_weight_offset = base + 28;
    }
    record.index_offset = buffer.push([0u16, 1, 2].as_bytes());

    header.part_count = 1;
    header.parts_offset = buffer.push(part("body", (0, 1), (0, 1)).as_bytes());
    header.piece_count = 1;
    header.pieces_offset = buffer.push(record.as_bytes());

    buffer.write_at(0, header.as_bytes());
    buffer.bytes
}

/// Builder for descriptor files.
#[derive(Debug, Default)]
pub(crate) struct DescriptorBuilder {
    pub version: Option<u32>,
    /// Look name and one material path per slot.
    pub looks: Vec<(&'static str, Vec<&'static str>)>,
    pub part_count: u32,
    pub variants: Vec<&'static str>,
    /// Attribute range `[from, to)` per part.
    pub links: Vec<(i32, i32)>,
    /// Name, type code and value offset per attribute definition.
    pub definitions: Vec<(&'static str, i32, i32)>,
    /// Value block per variant.
    pub values: Vec<Vec<i32>>,
}

impl DescriptorBuilder {
    /// One look with one relative material, one part with a `visible` attribute.
    pub fn single_part() -> Self {
        Self {
            looks: vec![("default", vec!["paint.mat"])],
            part_count: 1,
            variants: vec!["default"],
            links: vec![(0, 1)],
            definitions: vec![("visible", AttribDef::KIND_INT, 0)],
            values: vec![vec![1]],
            ..Self::default()
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Buffer::default();
        buffer.push(&[0; size_of::<PmdHeader>()]);

        let mut header = PmdHeader::new_zeroed();
        header.version = self.version.unwrap_or(PmdHeader::SUPPORTED_VERSION);
        header.material_count = self.looks.first().map_or(0, |(_, paths)| paths.len() as u32);
        header.look_count = self.looks.len() as u32;
        header.part_count = self.part_count;
        header.variant_count = self.variants.len() as u32;
        header.part_attribs_count = self.links.len() as u32;
        header.attribs_count = self.definitions.len() as u32;
        header.attribs_values_size = self.values.first().map_or(0, |block| 4 * block.len() as u32);

        let look_names: Vec<Token> = self.looks.iter().map(|(name, _)| Token::new(name)).collect();
        header.look_offset = buffer.push(look_names.as_bytes()) as u32;

        let path_offsets: Vec<u32> = self
            .looks
            .iter()
            .flat_map(|(_, paths)| paths.iter())
            .map(|path| {
                let offset = buffer.push(path.as_bytes()) as u32;
                buffer.push(&[0]);
                offset
            })
            .collect();
        header.material_offset = buffer.push(path_offsets.as_bytes()) as u32;

        let variant_names: Vec<Token> = self.variants.iter().map(|name| Token::new(name)).collect();
        header.variant_offset = buffer.push(variant_names.as_bytes()) as u32;

        let links: Vec<AttribLink> = self
            .links
            .iter()
            .map(|&(from, to)| AttribLink { from, to })
            .collect();
        header.part_attribs_offset = buffer.push(links.as_bytes()) as u32;

        let definitions: Vec<AttribDef> = self
            .definitions
            .iter()
            .map(|&(name, kind, offset)| AttribDef {
                name: Token::new(name),
                kind,
                offset,
            })
            .collect();
        header.attribs_offset = buffer.push(definitions.as_bytes()) as u32;

        let values: Vec<i32> = self.values.iter().flatten().copied().collect();
        header.attribs_value_offset = buffer.push(values.as_bytes()) as u32;

        buffer.write_at(0, header.as_bytes());
        buffer.bytes
    }
}
