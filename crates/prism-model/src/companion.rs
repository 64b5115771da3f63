//! Optional companion containers: collision (`.pmc`) and prefab (`.ppd`).
//!
//! Companions are loaded best effort next to a model and saved alongside its
//! text containers. No implementation ships with this crate; callers plug
//! their own loaders into [`LoadContext`](crate::LoadContext).

use std::fmt;
use std::path::Path;

use crate::source::AssetSource;
use crate::Result;

/// A loaded companion that can write its own export.
pub trait Companion: fmt::Debug + Send + Sync {
    /// Write the companion under `export_root`.
    fn save(&self, export_root: &Path) -> Result<()>;
}

/// Loads a companion for the model at `base_path` (without extension).
pub trait CompanionLoader: Sync {
    fn load(&self, source: &dyn AssetSource, base_path: &str) -> Result<Box<dyn Companion>>;
}
