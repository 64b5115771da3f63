//! Geometry version 0x13.
//!
//! Vertex streams are split into a static block (position, normal, tangent)
//! and a dynamic block (texcoords, colors) with separate strides. Skin weights
//! go through a per-vertex bind index into shared rows of bone indices and
//! weights.

use crate::error::Result;
use crate::layout::pmg13::{Pmg13Header, Pmg13Piece};
use crate::mesh::{Piece, Vertex, MAX_INFLUENCES};
use crate::warning::Warning;

use super::{
    check_channels, check_influences, check_signature, count, element, optional_offset,
    read_bones, read_locators, read_parts, read_table, required_offset, Blob, Geometry,
    GeometryDecoder, PieceLayout, StreamOffsets, StringPool, VertexLayout,
};

/// Decoder for version 0x13 geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pmg13Decoder;

impl GeometryDecoder for Pmg13Decoder {
    fn version(&self) -> u8 {
        Pmg13Header::SUPPORTED_VERSION
    }

    fn decode(&self, data: &[u8]) -> Result<Geometry> {
        let blob = Blob::new(data);
        check_signature(&blob, Pmg13Header::SUPPORTED_VERSION)?;
        let header: Pmg13Header = blob.record("header", 0)?;

        let piece_count = count("piece count", header.piece_count)?;
        let part_count = count("part count", header.part_count)?;
        let bone_count = count("bone count", header.bone_count)?;
        let locator_count = count("locator count", header.locator_count)?;

        let mut geometry = Geometry {
            bones: read_bones(&blob, header.bone_offset, bone_count)?,
            parts: read_parts(&blob, header.part_offset, part_count)?,
            ..Geometry::default()
        };

        let pool = StringPool::new(header.locator_name_offset, header.locator_name_size);
        geometry.locators = read_locators(&blob, header.locator_offset, locator_count, &pool)?;

        let records: Vec<Pmg13Piece> =
            read_table(&blob, "piece table", header.piece_offset, piece_count)?;
        geometry.pieces = records
            .iter()
            .enumerate()
            .map(|(i, record)| decode_piece(&blob, i, record, &mut geometry.warnings))
            .collect::<Result<_>>()?;

        geometry.validate()?;
        Ok(geometry)
    }
}

fn decode_piece(
    blob: &Blob<'_>,
    index: usize,
    record: &Pmg13Piece,
    warnings: &mut Vec<Warning>,
) -> Result<Piece> {
    let field = |name: &str| format!("piece {index} {name}");

    let vertex_count = count(&field("vertex count"), record.verts)?;
    let edge_count = count(&field("edge count"), record.edges)?;
    let channels = count(&field("texcoord channel count"), record.uv_channels)?;
    let bone_count = count(&field("bone count"), record.bone_count)?;
    check_channels(index, channels)?;
    check_influences(index, bone_count, warnings);

    let offsets = StreamOffsets {
        position: optional_offset(&field("position offset"), record.vert_position_offset)?,
        normal: optional_offset(&field("normal offset"), record.vert_normal_offset)?,
        tangent: optional_offset(&field("tangent offset"), record.vert_tangent_offset)?,
        texcoord: optional_offset(&field("texcoord offset"), record.vert_uv_offset)?,
        color: optional_offset(&field("color offset"), record.vert_rgba_offset)?,
        color2: optional_offset(&field("color2 offset"), record.vert_rgba2_offset)?,
    };

    let layout = PieceLayout {
        index,
        material: record.material,
        bone_count: bone_count as u32,
        vertex_count,
        triangle_count: edge_count / 3,
        texcoord_count: channels as u32,
        texcoord_mask: record.uv_mask,
        vertices: VertexLayout::split(offsets, channels, bone_count > 0),
        triangle_offset: record.triangle_offset,
    };
    let mut piece = layout.decode(blob)?;

    if let Some(bind_base) = optional_offset(&field("bind offset"), record.anim_bind_offset)? {
        let tables = BindTables {
            bind_base,
            bones_base: required_offset(&field("bind bone table"), record.anim_bind_bones_offset)?,
            weights_base: required_offset(
                &field("bind weight table"),
                record.anim_bind_bones_weight_offset,
            )?,
            row_size: bone_count,
        };
        tables.read(blob, piece.vertices_mut())?;
    }

    Ok(piece)
}

/// Bind index indirection of a skinned piece.
struct BindTables {
    bind_base: usize,
    bones_base: usize,
    weights_base: usize,
    /// Influences per row, the piece's bone count.
    row_size: usize,
}

impl BindTables {
    fn read(&self, blob: &Blob<'_>, vertices: &mut [Vertex]) -> Result<()> {
        let slots = self.row_size.min(MAX_INFLUENCES);

        for (j, vertex) in vertices.iter_mut().enumerate() {
            let bind = blob.u16("bind index", element("bind index", self.bind_base, 2, j, 0)?)?;
            let row = usize::from(bind);

            for k in 0..slots {
                let at = element("bind bone", self.bones_base, self.row_size, row, k)?;
                vertex.bone_index[k] = blob.i8("bind bone", at)?;
                let at = element("bind weight", self.weights_base, self.row_size, row, k)?;
                vertex.bone_weight[k] = blob.u8("bind weight", at)?;
            }
            vertex.clear_influences_from(slots);
        }
        Ok(())
    }
}
