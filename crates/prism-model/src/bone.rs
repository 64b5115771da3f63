//! Skeleton bones.

use prism_common::{Float3, Mat4, Quat};

use crate::layout::BoneRecord;

/// A skeleton bone. Its position in the skeleton doubles as its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub index: usize,
    pub name: String,
    /// Parent bone index, -1 for the root.
    pub parent: i32,
    /// Rest pose, column-major.
    pub transformation: Mat4,
    pub transformation_reversed: Mat4,
    pub stretch: Quat,
    pub rotation: Quat,
    pub translation: Float3,
    pub scale: Float3,
    pub sign_of_determinant: f32,
}

impl Bone {
    pub(crate) fn from_record(index: usize, record: &BoneRecord) -> Self {
        Self {
            index,
            name: record.name.to_string_lossy(),
            parent: i32::from(record.parent),
            transformation: record.transformation,
            transformation_reversed: record.transformation_reversed,
            stretch: record.stretch,
            rotation: record.rotation,
            translation: record.translation,
            scale: record.scale,
            sign_of_determinant: record.sign_of_determinant,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent < 0
    }
}
