//! Model descriptor and geometry decoding with text container export.
//!
//! A model is stored as two binary files sharing a base path:
//!
//! - `.pmd`, the descriptor: looks (material assignments per slot) and
//!   variants (integer attributes per part).
//! - `.pmg`, the geometry: bones, parts, locators and pieces. Versions `0x13`
//!   and `0x14` are supported; the first byte of the file selects the decoder.
//!
//! A loaded [`Model`] is exported into three text containers: geometry
//! (`.pim`), traits (`.pit`) and skeleton (`.pis`).
//!
//! # Example
//!
//! ```no_run
//! use prism_model::{DirectorySource, LoadContext, MatFileLoader, Model};
//!
//! let source = DirectorySource::new("/data/base");
//! let mut model = Model::new();
//! model.load(&LoadContext::new(&source, &MatFileLoader), "/vehicle/truck/cab")?;
//!
//! println!("{} pieces, {} vertices", model.pieces().len(), model.vertex_count());
//! for warning in model.warnings() {
//!     println!("warning: {warning}");
//! }
//!
//! model.save_geometry("/data/export".as_ref())?;
//! # Ok::<(), prism_model::Error>(())
//! ```

mod bone;
pub mod companion;
pub mod descriptor;
mod error;
pub mod export;
pub mod geometry;
pub mod layout;
mod look;
pub mod material;
mod mesh;
mod model;
mod part;
pub mod source;
mod variant;
mod warning;

#[cfg(test)]
mod testutil;

pub use bone::Bone;
pub use companion::{Companion, CompanionLoader};
pub use error::{Container, Error, Result};
pub use look::Look;
pub use material::{MatFileLoader, Material, MaterialLoader};
pub use mesh::{decode_color, Piece, StreamSet, Triangle, Vertex, MAX_INFLUENCES, MAX_TEXCOORDS};
pub use model::{ExportReport, LoadContext, Model};
pub use part::{Locator, Part};
pub use source::{AssetSource, DirectorySource, MemorySource};
pub use variant::{Attribute, AttributeValue, PartAttributes, Variant};
pub use warning::Warning;
