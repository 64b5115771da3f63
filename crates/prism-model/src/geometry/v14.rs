//! Geometry version 0x14.
//!
//! Every vertex stream of a piece is interleaved with one stride. Skinned
//! pieces append two packed words per vertex: four bone index bytes and four
//! weight bytes.

use crate::error::Result;
use crate::layout::pmg14::{Pmg14Header, Pmg14Piece};
use crate::mesh::{Piece, Vertex};
use crate::warning::Warning;

use super::{
    check_channels, check_influences, check_signature, check_stream, count, element,
    optional_offset, read_bones, read_locators, read_parts, read_table, Blob, Geometry,
    GeometryDecoder, PieceLayout, StreamOffsets, StringPool, VertexLayout,
};

/// Influences packed into each bone word.
const PACKED_INFLUENCES: usize = 4;

/// Bytes per vertex taken by the bone index and bone weight words.
const BONE_WORDS_SIZE: usize = 8;

/// Decoder for version 0x14 geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pmg14Decoder;

impl GeometryDecoder for Pmg14Decoder {
    fn version(&self) -> u8 {
        Pmg14Header::SUPPORTED_VERSION
    }

    fn decode(&self, data: &[u8]) -> Result<Geometry> {
        let blob = Blob::new(data);
        check_signature(&blob, Pmg14Header::SUPPORTED_VERSION)?;
        let header: Pmg14Header = blob.record("header", 0)?;

        let piece_count = count("piece count", header.piece_count)?;
        let part_count = count("part count", header.part_count)?;
        let bone_count = count("bone count", header.bone_count)?;
        let locator_count = count("locator count", header.locator_count)?;
        let weight_width = count("weight width", header.weight_width)?;

        let mut geometry = Geometry {
            bones: read_bones(&blob, header.skeleton_offset, bone_count)?,
            parts: read_parts(&blob, header.parts_offset, part_count)?,
            ..Geometry::default()
        };

        let pool = StringPool::new(header.string_pool_offset, header.string_pool_size);
        geometry.locators = read_locators(&blob, header.locators_offset, locator_count, &pool)?;

        let records: Vec<Pmg14Piece> =
            read_table(&blob, "piece table", header.pieces_offset, piece_count)?;
        geometry.pieces = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                decode_piece(&blob, i, record, weight_width, &mut geometry.warnings)
            })
            .collect::<Result<_>>()?;

        geometry.validate()?;
        Ok(geometry)
    }
}

fn decode_piece(
    blob: &Blob<'_>,
    index: usize,
    record: &Pmg14Piece,
    weight_width: usize,
    warnings: &mut Vec<Warning>,
) -> Result<Piece> {
    let field = |name: &str| format!("piece {index} {name}");

    let channels = record.texcoord_width as usize;
    check_channels(index, channels)?;
    check_influences(index, weight_width, warnings);

    let offsets = StreamOffsets {
        position: optional_offset(&field("position offset"), record.vert_position_offset)?,
        normal: optional_offset(&field("normal offset"), record.vert_normal_offset)?,
        tangent: optional_offset(&field("tangent offset"), record.vert_tangent_offset)?,
        texcoord: optional_offset(&field("texcoord offset"), record.vert_texcoord_offset)?,
        color: optional_offset(&field("color offset"), record.vert_color_offset)?,
        color2: optional_offset(&field("color2 offset"), record.vert_color2_offset)?,
    };
    let bone_index = optional_offset(&field("bone index offset"), record.vert_bone_index_offset)?;
    let bone_weight =
        optional_offset(&field("bone weight offset"), record.vert_bone_weight_offset)?;

    let extra = if bone_index.is_some() { BONE_WORDS_SIZE } else { 0 };
    let vertices = VertexLayout::interleaved(offsets, channels, extra);
    let stride = vertices.stride();

    let layout = PieceLayout {
        index,
        material: record.material,
        bone_count: weight_width as u32,
        vertex_count: record.verts as usize,
        triangle_count: record.edges as usize / 3,
        texcoord_count: record.texcoord_width,
        texcoord_mask: record.texcoord_mask,
        vertices,
        triangle_offset: record.index_offset,
    };
    let mut piece = layout.decode(blob)?;

    if let (Some(index_base), Some(weight_base)) = (bone_index, bone_weight) {
        let words = BoneWords {
            index_base,
            weight_base,
            stride,
        };
        words.check_extent(blob, index, piece.vertices().len())?;
        words.read(blob, piece.vertices_mut())?;
    }

    Ok(piece)
}

/// Packed influence words of a skinned piece.
struct BoneWords {
    index_base: usize,
    weight_base: usize,
    stride: usize,
}

impl BoneWords {
    fn check_extent(&self, blob: &Blob<'_>, piece: usize, vertex_count: usize) -> Result<()> {
        let Some(last) = vertex_count.checked_sub(1) else {
            return Ok(());
        };
        check_stream(
            blob,
            &format!("piece {piece} bone index stream"),
            self.index_base,
            self.stride,
            last,
            4,
        )?;
        check_stream(
            blob,
            &format!("piece {piece} bone weight stream"),
            self.weight_base,
            self.stride,
            last,
            4,
        )
    }

    fn read(&self, blob: &Blob<'_>, vertices: &mut [Vertex]) -> Result<()> {
        for (j, vertex) in vertices.iter_mut().enumerate() {
            let at = element("bone index stream", self.index_base, self.stride, j, 0)?;
            let indices = blob.u32("bone index stream", at)?;
            let at = element("bone weight stream", self.weight_base, self.stride, j, 0)?;
            let weights = blob.u32("bone weight stream", at)?;

            for k in 0..PACKED_INFLUENCES {
                vertex.bone_index[k] = ((indices >> (8 * k)) & 0xFF) as u8 as i8;
                vertex.bone_weight[k] = ((weights >> (8 * k)) & 0xFF) as u8;
            }
            vertex.clear_influences_from(PACKED_INFLUENCES);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use zerocopy::IntoBytes;

    use crate::error::Error;
    use crate::geometry::decode;
    use crate::testutil::{
        bone, locator, part, pmg14_header as header, pmg14_piece as piece, Buffer,
    };

    const HEADER_SIZE: usize = std::mem::size_of::<Pmg14Header>();

    fn start() -> Buffer {
        let mut buffer = Buffer::default();
        buffer.push(&[0; HEADER_SIZE]);
        buffer
    }

    fn finish(mut buffer: Buffer, mut header: Pmg14Header, pieces: &[Pmg14Piece]) -> Vec<u8> {
        header.piece_count = pieces.len() as i32;
        header.pieces_offset = buffer.push(pieces.as_bytes());
        buffer.write_at(0, header.as_bytes());
        buffer.bytes
    }

    /// Push one vertex of the full layout: position, normal, tangent, two
    /// texcoords, color, color2 and the two bone words.
    fn push_vertex(buffer: &mut Buffer, seed: f32, indices: [u8; 4], weights: [u8; 4]) -> i32 {
        let offset = buffer.push_f32s(&[seed, seed + 1.0, seed + 2.0]);
        buffer.push_f32s(&[0.0, 0.0, 1.0]);
        buffer.push_f32s(&[0.1, 0.2, 0.3, -1.0]);
        buffer.push_f32s(&[seed, 0.5, 0.25, seed]);
        buffer.push(&[255, 255, 255, 255]);
        buffer.push(&[0, 51, 0, 255]);
        buffer.push(&indices);
        buffer.push(&weights);
        offset
    }

    fn skinned_model() -> Vec<u8> {
        let mut buffer = start();
        let mut header = header();

        header.bone_count = 3;
        header.weight_width = 4;
        header.skeleton_offset = buffer.push(bone("root", -1).as_bytes());
        buffer.push(bone("spine", 0).as_bytes());
        buffer.push(bone("head", 1).as_bytes());

        let base = push_vertex(&mut buffer, 0.0, [0, 1, 2, 0], [128, 64, 63, 0]);
        push_vertex(&mut buffer, 10.0, [2, 0, 0, 0], [255, 0, 0, 0]);
        let indices = buffer.push([0u16, 1, 1].as_bytes());

        let mut record = piece();
        record.verts = 2;
        record.edges = 3;
        record.texcoord_width = 2;
        record.texcoord_mask = 0xFFFF_FF10;
        record.material = 1;
        record.vert_position_offset = base;
        record.vert_normal_offset = base + 12;
        record.vert_tangent_offset = base + 24;
        record.vert_texcoord_offset = base + 40;
        record.vert_color_offset = base + 56;
        record.vert_color2_offset = base + 60;
        record.vert_bone_index_offset = base + 64;
        record.vert_bone_weight_offset = base + 68;
        record.index_offset = indices;

        header.part_count = 1;
        header.parts_offset = buffer.push(part("body", (0, 1), (0, 0)).as_bytes());
        finish(buffer, header, &[record])
    }

    #[test]
    fn test_interleaved_streams() {
        let geometry = decode(&skinned_model()).unwrap();
        let piece = &geometry.pieces[0];

        assert_eq!(piece.material, 1);
        assert_eq!(piece.bone_count, 4);
        assert_eq!(piece.texcoord_count, 2);
        assert_eq!(piece.stream_count, 7);
        assert_eq!(piece.triangles()[0].indices, [0, 1, 1]);

        let v1 = &piece.vertices()[1];
        assert_eq!(v1.position, [10.0, 11.0, 12.0]);
        assert_eq!(v1.normal, [0.0, 0.0, 1.0]);
        assert_eq!(v1.tangent, [-1.0, 0.1, 0.2, 0.3]);
        assert_eq!(v1.texcoords[0], [10.0, 0.5]);
        assert_eq!(v1.texcoords[1], [0.25, 10.0]);
        assert_eq!(v1.color, [2.0; 4]);
        assert_eq!(v1.color2, [0.0, 0.4, 0.0, 2.0]);
    }

    #[test]
    fn test_packed_influences() {
        let geometry = decode(&skinned_model()).unwrap();
        let vertices = geometry.pieces[0].vertices();

        assert_eq!(vertices[0].bone_index, [0, 1, 2, 0, -1, -1, -1, -1]);
        assert_eq!(vertices[0].bone_weight, [128, 64, 63, 0, 0, 0, 0, 0]);
        assert_eq!(vertices[1].bone_index, [2, 0, 0, 0, -1, -1, -1, -1]);
        assert_eq!(vertices[1].bone_weight, [255, 0, 0, 0, 0, 0, 0, 0]);
        assert!(geometry.warnings.is_empty());
    }

    #[test]
    fn test_locator_hookups_use_string_pool() {
        let mut buffer = start();
        let mut header = header();

        header.string_pool_offset = buffer.push(b"wheel\0");
        header.string_pool_size = 6;
        header.locator_count = 1;
        header.locators_offset = buffer.push(locator("l_wheel", 0).as_bytes());
        header.part_count = 1;
        header.parts_offset = buffer.push(part("body", (0, 0), (0, 1)).as_bytes());

        let geometry = decode(&finish(buffer, header, &[])).unwrap();
        assert_eq!(geometry.locators[0].hookup, "wheel\0");
        assert_eq!(geometry.locators[0].hookup.len(), 6);
    }

    #[test]
    fn test_hookup_past_pool_is_corrupt() {
        let mut buffer = start();
        let mut header = header();

        header.string_pool_offset = buffer.push(b"wheel\0");
        header.string_pool_size = 6;
        header.locator_count = 1;
        header.locators_offset = buffer.push(locator("l_wheel", 7).as_bytes());

        assert!(matches!(
            decode(&finish(buffer, header, &[])).unwrap_err(),
            Error::CorruptGeometry { offset: 7, .. }
        ));
    }

    #[test]
    fn test_too_many_texcoord_channels() {
        let mut record = piece();
        record.texcoord_width = 9;

        assert!(matches!(
            decode(&finish(start(), header(), &[record])).unwrap_err(),
            Error::CorruptGeometry { offset: 9, .. }
        ));
    }

    #[test]
    fn test_bone_words_out_of_range() {
        let mut buffer = start();
        let mut header = header();
        header.weight_width = 4;

        let base = buffer.push_f32s(&[0.0; 6]);
        let mut record = piece();
        record.verts = 2;
        record.vert_position_offset = base;
        record.vert_bone_index_offset = 1_000_000;
        record.vert_bone_weight_offset = 1_000_004;

        let err = decode(&finish(buffer, header, &[record])).unwrap_err();
        assert!(
            matches!(&err, Error::CorruptGeometry { what, .. } if what == "piece 0 bone index stream"),
            "{err}"
        );
    }

    #[test]
    fn test_rejects_v13_data() {
        let mut data = finish(start(), header(), &[]);
        data[0] = 0x13;
        assert!(matches!(
            Pmg14Decoder.decode(&data).unwrap_err(),
            Error::UnsupportedVersion { .. }
        ));
    }
}
