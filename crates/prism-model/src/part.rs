//! Parts and locators.

use std::ops::Range;

use prism_common::{Float3, Quat};

use crate::layout::{LocatorRecord, PartRecord};

/// A named grouping of consecutive pieces and locators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub piece_start: usize,
    pub piece_count: usize,
    pub locator_start: usize,
    pub locator_count: usize,
}

impl Part {
    /// Piece indices owned by this part.
    pub fn pieces(&self) -> Range<usize> {
        self.piece_start..self.piece_start + self.piece_count
    }

    /// Locator indices owned by this part.
    pub fn locators(&self) -> Range<usize> {
        self.locator_start..self.locator_start + self.locator_count
    }

    /// Convert a record whose ranges were already checked to be non-negative.
    pub(crate) fn from_record(record: &PartRecord) -> Option<Self> {
        Some(Self {
            name: record.name.to_string_lossy(),
            piece_start: usize::try_from(record.piece_start).ok()?,
            piece_count: usize::try_from(record.piece_count).ok()?,
            locator_start: usize::try_from(record.locator_start).ok()?,
            locator_count: usize::try_from(record.locator_count).ok()?,
        })
    }
}

/// A named attachment point.
#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    pub index: usize,
    pub name: String,
    /// Raw hookup bytes: the rest of the string pool from the hookup
    /// offset, terminators included. Empty when the locator has none.
    pub hookup: String,
    pub position: Float3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Locator {
    pub(crate) fn from_record(index: usize, record: &LocatorRecord, hookup: String) -> Self {
        Self {
            index,
            name: record.name.to_string_lossy(),
            hookup,
            position: record.position,
            rotation: record.rotation,
            scale: record.scale,
        }
    }

    /// The hookup tag up to its terminator.
    pub fn hookup_name(&self) -> &str {
        self.hookup.split('\0').next().unwrap_or_default()
    }
}
