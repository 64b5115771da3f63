//! Geometry (`.pmg`) decoding.
//!
//! Two on-disk versions exist. Both start with a version byte followed by the
//! `gmP` signature and address every table through absolute offsets:
//!
//! | version | decoder | vertex layout |
//! |---------|---------|---------------|
//! | `0x13` | [`Pmg13Decoder`] | static and dynamic strides, skin weights through a bind table |
//! | `0x14` | [`Pmg14Decoder`] | one interleaved stride, packed skin weight words |
//!
//! [`decode`] picks the decoder from the version byte. Every offset read from
//! the file is bounds checked; a bad one fails with
//! [`Error::CorruptGeometry`] instead of reading outside the buffer.

mod v13;
mod v14;

pub use v13::Pmg13Decoder;
pub use v14::Pmg14Decoder;

use std::mem::size_of;

use prism_common::BinaryReader;
use zerocopy::FromBytes;

use crate::bone::Bone;
use crate::error::{Container, Error, Result};
use crate::layout::{
    BoneRecord, ColorRecord, LocatorRecord, PartRecord, TangentRecord, TriangleRecord, ABSENT,
    PMG_SIGNATURE,
};
use crate::mesh::{decode_color, Piece, StreamSet, Vertex, MAX_INFLUENCES, MAX_TEXCOORDS};
use crate::part::{Locator, Part};
use crate::warning::Warning;

const POSITION_SIZE: usize = 12;
const NORMAL_SIZE: usize = 12;
const TANGENT_SIZE: usize = 16;
const TEXCOORD_SIZE: usize = 8;
const COLOR_SIZE: usize = 4;

/// A decoder for one geometry version.
pub trait GeometryDecoder: Sync {
    /// Version byte this decoder accepts.
    fn version(&self) -> u8;

    /// Decode a whole geometry file.
    fn decode(&self, data: &[u8]) -> Result<Geometry>;
}

static DECODERS: &[&dyn GeometryDecoder] = &[&Pmg13Decoder, &Pmg14Decoder];

/// Look up the decoder for a version byte.
pub fn decoder_for(version: u8) -> Option<&'static dyn GeometryDecoder> {
    DECODERS.iter().copied().find(|decoder| decoder.version() == version)
}

/// Decoded contents of a geometry file.
#[derive(Debug, Default)]
pub struct Geometry {
    pub bones: Vec<Bone>,
    pub parts: Vec<Part>,
    pub locators: Vec<Locator>,
    pub pieces: Vec<Piece>,
    pub warnings: Vec<Warning>,
}

impl Geometry {
    /// Check cross references between the decoded tables.
    fn validate(&self) -> Result<()> {
        let bone_count = self.bones.len();
        for bone in &self.bones {
            let valid = bone.parent == ABSENT
                || usize::try_from(bone.parent).is_ok_and(|parent| parent < bone_count);
            if !valid {
                return Err(invalid(
                    format!("bone {} parent index", bone.index),
                    i64::from(bone.parent),
                ));
            }
        }

        for (i, part) in self.parts.iter().enumerate() {
            if part.pieces().end > self.pieces.len() {
                return Err(invalid(
                    format!("part {i} piece range {:?}", part.pieces()),
                    part.piece_start as i64,
                ));
            }
            if part.locators().end > self.locators.len() {
                return Err(invalid(
                    format!("part {i} locator range {:?}", part.locators()),
                    part.locator_start as i64,
                ));
            }
        }
        Ok(())
    }
}

/// Decode a geometry file of any supported version.
pub fn decode(data: &[u8]) -> Result<Geometry> {
    let [version, a, b, c]: [u8; 4] = Blob::new(data).record("signature", 0)?;
    let signature = [a, b, c];

    match decoder_for(version) {
        Some(decoder) if signature == PMG_SIGNATURE => decoder.decode(data),
        _ => Err(unsupported(
            DECODERS
                .iter()
                .map(|decoder| format!("{:#04x}", decoder.version()))
                .collect::<Vec<_>>()
                .join(" or "),
            version,
            signature,
        )),
    }
}

/// Check the version byte and signature at the start of the buffer.
pub(crate) fn check_signature(blob: &Blob<'_>, expected: u8) -> Result<()> {
    let [version, a, b, c]: [u8; 4] = blob.record("signature", 0)?;
    let signature = [a, b, c];
    if version == expected && signature == PMG_SIGNATURE {
        Ok(())
    } else {
        Err(unsupported(format!("{expected:#04x}"), version, signature))
    }
}

fn unsupported(expected: String, version: u8, signature: [u8; 3]) -> Error {
    Error::UnsupportedVersion {
        container: Container::Geometry,
        expected: format!("{expected} \"gmP\""),
        actual: format!("{version:#04x} \"{}\"", String::from_utf8_lossy(&signature)),
    }
}

/// A value that is structurally invalid rather than out of bounds.
fn invalid(what: String, offset: i64) -> Error {
    Error::CorruptGeometry {
        what,
        offset,
        needed: 0,
        available: 0,
    }
}

/// Bounds-checked view of a geometry buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    fn out_of_bounds(&self, what: &str, offset: usize, needed: usize) -> Error {
        Error::CorruptGeometry {
            what: what.to_string(),
            offset: offset as i64,
            needed,
            available: self.data.len().saturating_sub(offset),
        }
    }

    /// Fail unless `len` bytes at `offset` lie inside the buffer.
    pub fn check_span(&self, what: &str, offset: usize, len: usize) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(self.out_of_bounds(what, offset, len)),
        }
    }

    /// Fail unless `count` records of `T` starting at `offset` lie inside the buffer.
    pub fn check_table<T>(&self, what: &str, offset: usize, count: usize) -> Result<()> {
        let len = count
            .checked_mul(size_of::<T>())
            .ok_or_else(|| self.out_of_bounds(what, offset, usize::MAX))?;
        self.check_span(what, offset, len)
    }

    pub fn bytes(&self, what: &str, offset: usize, len: usize) -> Result<&'a [u8]> {
        BinaryReader::new_at(self.data, offset)
            .read_bytes(len)
            .map_err(|_| self.out_of_bounds(what, offset, len))
    }

    pub fn record<T: FromBytes>(&self, what: &str, offset: usize) -> Result<T> {
        BinaryReader::new_at(self.data, offset)
            .read_struct()
            .map_err(|_| self.out_of_bounds(what, offset, size_of::<T>()))
    }

    /// Record `index` of a table of `T` starting at `base`.
    pub fn table<T: FromBytes>(&self, what: &str, base: usize, index: usize) -> Result<T> {
        self.record(what, element(what, base, size_of::<T>(), index, 0)?)
    }

    pub fn f32s<const N: usize>(&self, what: &str, offset: usize) -> Result<[f32; N]> {
        BinaryReader::new_at(self.data, offset)
            .read_f32_array()
            .map_err(|_| self.out_of_bounds(what, offset, 4 * N))
    }

    pub fn u8(&self, what: &str, offset: usize) -> Result<u8> {
        BinaryReader::new_at(self.data, offset)
            .read_u8()
            .map_err(|_| self.out_of_bounds(what, offset, 1))
    }

    pub fn i8(&self, what: &str, offset: usize) -> Result<i8> {
        BinaryReader::new_at(self.data, offset)
            .read_i8()
            .map_err(|_| self.out_of_bounds(what, offset, 1))
    }

    pub fn u16(&self, what: &str, offset: usize) -> Result<u16> {
        BinaryReader::new_at(self.data, offset)
            .read_u16()
            .map_err(|_| self.out_of_bounds(what, offset, 2))
    }

    pub fn u32(&self, what: &str, offset: usize) -> Result<u32> {
        BinaryReader::new_at(self.data, offset)
            .read_u32()
            .map_err(|_| self.out_of_bounds(what, offset, 4))
    }
}

/// `base + stride * index + extra`, failing on overflow.
pub(crate) fn element(
    what: &str,
    base: usize,
    stride: usize,
    index: usize,
    extra: usize,
) -> Result<usize> {
    stride
        .checked_mul(index)
        .and_then(|offset| offset.checked_add(base))
        .and_then(|offset| offset.checked_add(extra))
        .ok_or_else(|| invalid(format!("{what} address overflow"), base as i64))
}

/// A count field; negative values are corrupt.
pub(crate) fn count(what: &str, raw: i32) -> Result<usize> {
    usize::try_from(raw).map_err(|_| invalid(what.to_string(), i64::from(raw)))
}

/// An offset that must be present.
pub(crate) fn required_offset(what: &str, raw: i32) -> Result<usize> {
    usize::try_from(raw).map_err(|_| invalid(what.to_string(), i64::from(raw)))
}

/// An offset where `-1` marks absence.
pub(crate) fn optional_offset(what: &str, raw: i32) -> Result<Option<usize>> {
    if raw == ABSENT {
        Ok(None)
    } else {
        required_offset(what, raw).map(Some)
    }
}

/// Read `count` consecutive records starting at `raw_offset`.
pub(crate) fn read_table<T: FromBytes>(
    blob: &Blob<'_>,
    what: &str,
    raw_offset: i32,
    count: usize,
) -> Result<Vec<T>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let base = required_offset(what, raw_offset)?;
    blob.check_table::<T>(what, base, count)?;
    (0..count).map(|i| blob.table(what, base, i)).collect()
}

pub(crate) fn read_bones(blob: &Blob<'_>, raw_offset: i32, count: usize) -> Result<Vec<Bone>> {
    let records: Vec<BoneRecord> = read_table(blob, "bone table", raw_offset, count)?;
    Ok(records
        .iter()
        .enumerate()
        .map(|(i, record)| Bone::from_record(i, record))
        .collect())
}

pub(crate) fn read_parts(blob: &Blob<'_>, raw_offset: i32, count: usize) -> Result<Vec<Part>> {
    let records: Vec<PartRecord> = read_table(blob, "part table", raw_offset, count)?;
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            Part::from_record(record).ok_or_else(|| negative_part_field(i, record))
        })
        .collect()
}

fn negative_part_field(part: usize, record: &PartRecord) -> Error {
    let fields = [
        ("piece start", record.piece_start),
        ("piece count", record.piece_count),
        ("locator start", record.locator_start),
        ("locator count", record.locator_count),
    ];
    let (field, value) = fields
        .into_iter()
        .find(|(_, value)| *value < 0)
        .unwrap_or(("range", 0));
    invalid(format!("part {part} {field}"), i64::from(value))
}

pub(crate) fn read_locators(
    blob: &Blob<'_>,
    raw_offset: i32,
    count: usize,
    pool: &StringPool,
) -> Result<Vec<Locator>> {
    let records: Vec<LocatorRecord> = read_table(blob, "locator table", raw_offset, count)?;
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let hookup = pool.hookup(blob, record.hookup_offset)?;
            Ok(Locator::from_record(i, record, hookup))
        })
        .collect()
}

/// The block locator hookups point into.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StringPool {
    origin: i32,
    size: i32,
}

impl StringPool {
    pub fn new(origin: i32, size: i32) -> Self {
        Self { origin, size }
    }

    /// The hookup at `offset`: every byte from there to the end of the pool.
    pub fn hookup(&self, blob: &Blob<'_>, offset: i32) -> Result<String> {
        if offset == ABSENT {
            return Ok(String::new());
        }
        if offset < 0 || offset > self.size {
            return Err(invalid(
                format!("hookup offset outside string pool of {} bytes", self.size),
                i64::from(offset),
            ));
        }
        let origin = required_offset("string pool", self.origin)?;
        let start = element("hookup", origin, 1, offset as usize, 0)?;
        let bytes = blob.bytes("hookup", start, (self.size - offset) as usize)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Absolute start of each vertex stream, `None` when absent.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StreamOffsets {
    pub position: Option<usize>,
    pub normal: Option<usize>,
    pub tangent: Option<usize>,
    pub texcoord: Option<usize>,
    pub color: Option<usize>,
    pub color2: Option<usize>,
}

impl StreamOffsets {
    fn streams(&self) -> StreamSet {
        StreamSet {
            position: self.position.is_some(),
            normal: self.normal.is_some(),
            tangent: self.tangent.is_some(),
            texcoord: self.texcoord.is_some(),
            color: self.color.is_some(),
            color2: self.color2.is_some(),
        }
    }

    /// Bytes per vertex of position, normal and tangent.
    fn static_size(&self) -> usize {
        self.position.map_or(0, |_| POSITION_SIZE)
            + self.normal.map_or(0, |_| NORMAL_SIZE)
            + self.tangent.map_or(0, |_| TANGENT_SIZE)
    }

    /// Bytes per vertex of texcoords and colors.
    fn dynamic_size(&self, channels: usize) -> usize {
        self.texcoord.map_or(0, |_| TEXCOORD_SIZE * channels)
            + self.color.map_or(0, |_| COLOR_SIZE)
            + self.color2.map_or(0, |_| COLOR_SIZE)
    }
}

/// Where each attribute of vertex `j` lives.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VertexLayout {
    offsets: StreamOffsets,
    channels: usize,
    static_stride: usize,
    dynamic_stride: usize,
}

impl VertexLayout {
    /// Separate strides for static and dynamic streams. Rigid pieces store
    /// every stream in one interleaved block, so both strides become the sum.
    pub fn split(offsets: StreamOffsets, channels: usize, skinned: bool) -> Self {
        let mut static_stride = offsets.static_size();
        let mut dynamic_stride = offsets.dynamic_size(channels);
        if !skinned {
            dynamic_stride += static_stride;
            static_stride = dynamic_stride;
        }
        Self {
            offsets,
            channels,
            static_stride,
            dynamic_stride,
        }
    }

    /// One stride for all streams plus `extra` trailing bytes per vertex.
    pub fn interleaved(offsets: StreamOffsets, channels: usize, extra: usize) -> Self {
        let stride = offsets.static_size() + offsets.dynamic_size(channels) + extra;
        Self {
            offsets,
            channels,
            static_stride: stride,
            dynamic_stride: stride,
        }
    }

    pub fn streams(&self) -> StreamSet {
        self.offsets.streams()
    }

    /// Stride of the dynamic block, the only stride of an interleaved layout.
    pub fn stride(&self) -> usize {
        self.dynamic_stride
    }

    #[cfg(test)]
    pub fn strides(&self) -> (usize, usize) {
        (self.static_stride, self.dynamic_stride)
    }

    /// Fail unless the last vertex of every present stream lies inside the buffer.
    pub fn check_extent(&self, blob: &Blob<'_>, piece: usize, vertex_count: usize) -> Result<()> {
        let Some(last) = vertex_count.checked_sub(1) else {
            return Ok(());
        };
        // Every present stream advances by one of the strides per vertex.
        let widest = self.static_stride.max(self.dynamic_stride);
        if widest == 0 {
            return Err(invalid(
                format!("piece {piece} has {vertex_count} vertices but no streams"),
                0,
            ));
        }
        if last > blob.len() / widest {
            return Err(invalid(
                format!("piece {piece} vertex count {vertex_count}"),
                blob.len() as i64,
            ));
        }

        let o = &self.offsets;
        let streams = [
            ("position", o.position, self.static_stride, POSITION_SIZE),
            ("normal", o.normal, self.static_stride, NORMAL_SIZE),
            ("tangent", o.tangent, self.static_stride, TANGENT_SIZE),
            ("texcoord", o.texcoord, self.dynamic_stride, TEXCOORD_SIZE * self.channels),
            ("color", o.color, self.dynamic_stride, COLOR_SIZE),
            ("color2", o.color2, self.dynamic_stride, COLOR_SIZE),
        ];
        for (name, offset, stride, size) in streams {
            if let Some(base) = offset {
                check_stream(blob, &format!("piece {piece} {name} stream"), base, stride, last, size)?;
            }
        }
        Ok(())
    }

    /// Decode every present stream into `vertices`.
    pub fn read(&self, blob: &Blob<'_>, vertices: &mut [Vertex]) -> Result<()> {
        let o = &self.offsets;
        for (j, vertex) in vertices.iter_mut().enumerate() {
            if let Some(base) = o.position {
                let at = element("position stream", base, self.static_stride, j, 0)?;
                vertex.position = blob.f32s("position stream", at)?;
            }
            if let Some(base) = o.normal {
                let at = element("normal stream", base, self.static_stride, j, 0)?;
                vertex.normal = blob.f32s("normal stream", at)?;
            }
            if let Some(base) = o.tangent {
                let at = element("tangent stream", base, self.static_stride, j, 0)?;
                let tangent: TangentRecord = blob.record("tangent stream", at)?;
                vertex.tangent = [tangent.w, tangent.x, tangent.y, tangent.z];
            }
            if let Some(base) = o.texcoord {
                for (k, texcoord) in vertex.texcoords.iter_mut().take(self.channels).enumerate() {
                    let at = element("texcoord stream", base, self.dynamic_stride, j, TEXCOORD_SIZE * k)?;
                    *texcoord = blob.f32s("texcoord stream", at)?;
                }
            }
            if let Some(base) = o.color {
                let at = element("color stream", base, self.dynamic_stride, j, 0)?;
                vertex.color = decode_color(blob.record::<ColorRecord>("color stream", at)?);
            }
            if let Some(base) = o.color2 {
                let at = element("color2 stream", base, self.dynamic_stride, j, 0)?;
                vertex.color2 = decode_color(blob.record::<ColorRecord>("color2 stream", at)?);
            }
        }
        Ok(())
    }
}

/// Fail unless element `last` of a strided stream lies inside the buffer.
pub(crate) fn check_stream(
    blob: &Blob<'_>,
    what: &str,
    base: usize,
    stride: usize,
    last: usize,
    size: usize,
) -> Result<()> {
    let start = element(what, base, stride, last, 0)?;
    blob.check_span(what, start, size)
}

/// Reject pieces with more texcoord channels than a vertex holds.
pub(crate) fn check_channels(piece: usize, channels: usize) -> Result<()> {
    if channels > MAX_TEXCOORDS {
        return Err(invalid(
            format!("piece {piece} texcoord channel count {channels} (max {MAX_TEXCOORDS})"),
            channels as i64,
        ));
    }
    Ok(())
}

/// Warn about pieces declaring more influences than a vertex holds.
pub(crate) fn check_influences(piece: usize, bone_count: usize, warnings: &mut Vec<Warning>) {
    if bone_count > MAX_INFLUENCES {
        warnings.push(Warning::UnsupportedInfluenceCount {
            piece,
            count: bone_count as u32,
            max: MAX_INFLUENCES,
        });
    }
}

/// Version-independent description of one piece.
pub(crate) struct PieceLayout {
    pub index: usize,
    pub material: i32,
    pub bone_count: u32,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub texcoord_count: u32,
    pub texcoord_mask: u32,
    pub vertices: VertexLayout,
    pub triangle_offset: i32,
}

impl PieceLayout {
    /// Check extents, allocate the piece and decode its vertex streams and triangles.
    pub fn decode(&self, blob: &Blob<'_>) -> Result<Piece> {
        self.vertices.check_extent(blob, self.index, self.vertex_count)?;

        let what = format!("piece {} triangles", self.index);
        let triangle_base = if self.triangle_count > 0 {
            let base = required_offset(&what, self.triangle_offset)?;
            blob.check_table::<TriangleRecord>(&what, base, self.triangle_count)?;
            base
        } else {
            0
        };

        let mut piece = Piece::new(
            self.index,
            self.material,
            self.bone_count,
            self.vertices.streams(),
            self.texcoord_count,
            self.texcoord_mask,
            self.vertex_count,
            self.triangle_count,
        );
        self.vertices.read(blob, piece.vertices_mut())?;

        for (i, triangle) in piece.triangles_mut().iter_mut().enumerate() {
            let record: TriangleRecord = blob.table(&what, triangle_base, i)?;
            triangle.indices = record.a;
        }
        Ok(piece)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testutil::Buffer;

    #[test]
    fn test_unknown_version() {
        let err = decode(b"\x15gmP\0\0\0\0").unwrap_err();
        match err {
            Error::UnsupportedVersion { container, expected, actual } => {
                assert_eq!(container, Container::Geometry);
                assert_eq!(expected, "0x13 or 0x14 \"gmP\"");
                assert_eq!(actual, "0x15 \"gmP\"");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_signature() {
        let err = decode(b"\x13abc\0\0\0\0").unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_truncated_signature() {
        assert!(matches!(
            decode(b"\x13g").unwrap_err(),
            Error::CorruptGeometry { needed: 4, available: 2, .. }
        ));
    }

    #[test]
    fn test_decoder_lookup() {
        assert_eq!(decoder_for(0x13).map(|d| d.version()), Some(0x13));
        assert_eq!(decoder_for(0x14).map(|d| d.version()), Some(0x14));
        assert!(decoder_for(0x12).is_none());
    }

    #[test]
    fn test_hookup_residual_length() {
        let mut buffer = Buffer::default();
        buffer.push(&[0xEE; 4]);
        let origin = buffer.push(b"door\0light\0");
        let blob = Blob::new(&buffer.bytes);
        let pool = StringPool::new(origin, 11);

        let hookup = pool.hookup(&blob, 5).unwrap();
        assert_eq!(hookup.len(), 6);
        assert_eq!(hookup, "light\0");

        assert_eq!(pool.hookup(&blob, ABSENT).unwrap(), "");
        assert_eq!(pool.hookup(&blob, 11).unwrap(), "");
        assert!(matches!(
            pool.hookup(&blob, 12),
            Err(Error::CorruptGeometry { offset: 12, .. })
        ));
        assert!(pool.hookup(&blob, -2).is_err());
    }

    #[test]
    fn test_hookup_pool_past_buffer() {
        let buffer = [0u8; 8];
        let blob = Blob::new(&buffer);
        let pool = StringPool::new(4, 16);

        assert!(matches!(
            pool.hookup(&blob, 0),
            Err(Error::CorruptGeometry { needed: 16, available: 4, .. })
        ));
    }

    #[test]
    fn test_split_strides_collapse_for_rigid_pieces() {
        let offsets = StreamOffsets {
            position: Some(0),
            normal: Some(12),
            texcoord: Some(100),
            color: Some(116),
            ..StreamOffsets::default()
        };

        let skinned = VertexLayout::split(offsets, 2, true);
        assert_eq!(skinned.strides(), (24, 20));

        let rigid = VertexLayout::split(offsets, 2, false);
        assert_eq!(rigid.strides(), (44, 44));
    }

    #[test]
    fn test_interleaved_stride() {
        let offsets = StreamOffsets {
            position: Some(0),
            tangent: Some(12),
            color2: Some(28),
            ..StreamOffsets::default()
        };
        assert_eq!(VertexLayout::interleaved(offsets, 0, 8).strides(), (40, 40));
    }

    #[test]
    fn test_stream_extent_checked() {
        let buffer = vec![0u8; 30];
        let blob = Blob::new(&buffer);
        let offsets = StreamOffsets {
            position: Some(0),
            ..StreamOffsets::default()
        };
        let layout = VertexLayout::interleaved(offsets, 0, 0);

        assert!(layout.check_extent(&blob, 0, 2).is_ok());
        let err = layout.check_extent(&blob, 0, 3).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptGeometry { offset: 24, needed: 12, available: 6, .. }
        ));
    }

    #[test]
    fn test_vertex_count_capped_by_stride() {
        let buffer = vec![0u8; 64];
        let blob = Blob::new(&buffer);

        let streamless = VertexLayout::interleaved(StreamOffsets::default(), 0, 0);
        assert!(streamless.check_extent(&blob, 0, 0).is_ok());
        let err = streamless.check_extent(&blob, 0, 64).unwrap_err();
        assert!(matches!(
            &err,
            Error::CorruptGeometry { what, .. } if what == "piece 0 has 64 vertices but no streams"
        ));

        let words_only = VertexLayout::interleaved(StreamOffsets::default(), 0, 8);
        let err = words_only.check_extent(&blob, 1, 64).unwrap_err();
        assert!(matches!(
            &err,
            Error::CorruptGeometry { what, offset: 64, .. } if what == "piece 1 vertex count 64"
        ));
    }

    #[test]
    fn test_negative_values_rejected() {
        assert!(matches!(
            count("piece count", -3),
            Err(Error::CorruptGeometry { offset: -3, .. })
        ));
        assert_eq!(optional_offset("normal", ABSENT).unwrap(), None);
        assert_eq!(optional_offset("normal", 8).unwrap(), Some(8));
        assert!(optional_offset("normal", -7).is_err());
        assert!(check_channels(0, MAX_TEXCOORDS).is_ok());
        assert!(check_channels(0, MAX_TEXCOORDS + 1).is_err());
    }

    #[test]
    fn test_element_overflow() {
        assert_eq!(element("x", 4, 12, 2, 8).unwrap(), 36);
        assert!(element("x", usize::MAX, 1, 1, 0).is_err());
    }
}
