//! Pieces: vertex streams and triangles of one sub-mesh.

use prism_common::{Float2, Float3};

use crate::layout::ColorRecord;

/// Maximum number of bone influences stored per vertex.
pub const MAX_INFLUENCES: usize = 8;

/// Maximum number of texture coordinate channels per vertex.
pub const MAX_TEXCOORDS: usize = 8;

/// Number of texcoord alias nibbles packed into a piece's texcoord mask.
const TEXCOORD_MASK_SLOTS: u32 = 8;

/// Decode a packed color into four floats.
///
/// Each channel maps to `2 * byte / 255`, so the range is `[0, 2]` rather than
/// `[0, 1]`. Downstream tools expect this range.
#[inline]
pub fn decode_color(color: ColorRecord) -> [f32; 4] {
    let ColorRecord { r, g, b, a } = color;
    [r, g, b, a].map(|channel| 2.0 * channel as f32 / 255.0)
}

/// A single decoded vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Float3,
    pub normal: Float3,
    /// Tangent as `w x y z`.
    pub tangent: [f32; 4],
    pub color: [f32; 4],
    pub color2: [f32; 4],
    pub texcoords: [Float2; MAX_TEXCOORDS],
    /// Bone index per influence slot, -1 when unused.
    pub bone_index: [i8; MAX_INFLUENCES],
    /// Raw weight byte per influence slot, 0 when unused.
    pub bone_weight: [u8; MAX_INFLUENCES],
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            normal: [0.0; 3],
            tangent: [0.0; 4],
            color: [0.0; 4],
            color2: [0.0; 4],
            texcoords: [[0.0; 2]; MAX_TEXCOORDS],
            bone_index: [-1; MAX_INFLUENCES],
            bone_weight: [0; MAX_INFLUENCES],
        }
    }
}

impl Vertex {
    /// Mark influence slots `first..` as unused.
    #[inline]
    pub fn clear_influences_from(&mut self, first: usize) {
        for slot in first.min(MAX_INFLUENCES)..MAX_INFLUENCES {
            self.bone_index[slot] = -1;
            self.bone_weight[slot] = 0;
        }
    }

    /// Iterate `(bone index, weight byte)` pairs with a non-zero weight among the first `slots`.
    pub fn weighted_influences(&self, slots: usize) -> impl Iterator<Item = (i8, u8)> + '_ {
        self.bone_index
            .iter()
            .zip(self.bone_weight.iter())
            .take(slots)
            .filter(|(_, weight)| **weight != 0)
            .map(|(index, weight)| (*index, *weight))
    }
}

/// Three vertex indices local to the owning piece.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Triangle {
    pub indices: [u16; 3],
}

/// Which vertex streams a piece carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSet {
    pub position: bool,
    pub normal: bool,
    pub tangent: bool,
    pub texcoord: bool,
    pub color: bool,
    pub color2: bool,
}

impl StreamSet {
    /// Logical stream count: one per scalar stream, one per texcoord channel.
    pub fn stream_count(&self, texcoord_channels: u32) -> u32 {
        let scalar = [self.position, self.normal, self.tangent, self.color, self.color2]
            .into_iter()
            .filter(|present| *present)
            .count() as u32;
        scalar + if self.texcoord { texcoord_channels } else { 0 }
    }
}

/// A sub-mesh sharing one material and one vertex layout.
///
/// The vertex and triangle counts are fixed when the piece is created.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub index: usize,
    pub material: i32,
    /// Bone influences per vertex as declared by the file, 0 for rigid pieces.
    pub bone_count: u32,
    pub streams: StreamSet,
    pub texcoord_count: u32,
    /// Eight nibbles; nibble `i` names the channel used by texcoord `i`.
    pub texcoord_mask: u32,
    pub stream_count: u32,
    vertices: Box<[Vertex]>,
    triangles: Box<[Triangle]>,
}

impl Piece {
    /// Create a piece with default vertices and empty triangles.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        index: usize,
        material: i32,
        bone_count: u32,
        streams: StreamSet,
        texcoord_count: u32,
        texcoord_mask: u32,
        vertex_count: usize,
        triangle_count: usize,
    ) -> Self {
        Self {
            index,
            material,
            bone_count,
            streams,
            texcoord_count,
            texcoord_mask,
            stream_count: streams.stream_count(texcoord_count),
            vertices: vec![Vertex::default(); vertex_count].into_boxed_slice(),
            triangles: vec![Triangle::default(); triangle_count].into_boxed_slice(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangles_mut(&mut self) -> &mut [Triangle] {
        &mut self.triangles
    }

    /// Whether the piece carries skin weights.
    #[inline]
    pub fn is_skinned(&self) -> bool {
        self.bone_count > 0
    }

    /// Number of influence slots actually populated per vertex.
    #[inline]
    pub fn influence_slots(&self) -> usize {
        (self.bone_count as usize).min(MAX_INFLUENCES)
    }

    /// Texcoord indices that map onto the given UV channel.
    pub fn texcoord_aliases(&self, channel: u32) -> Vec<u32> {
        (0..TEXCOORD_MASK_SLOTS)
            .filter(|slot| (self.texcoord_mask >> (slot * 4)) & 0xF == channel)
            .collect()
    }
}
