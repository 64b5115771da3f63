//! Prism - model container conversion library.
//!
//! This crate provides a unified interface to the prism library crates.
//!
//! # Crates
//!
//! - [`prism_common`] - Common utilities (binary reading, packed tokens)
//! - [`prism_model`] - Descriptor and geometry decoding, text container export
//!
//! # Example
//!
//! ```no_run
//! use prism::prelude::*;
//!
//! let source = DirectorySource::new("/data/base");
//! let mut model = Model::new();
//! model.load(&LoadContext::new(&source, &MatFileLoader), "/vehicle/truck/cab")?;
//!
//! let report = model.export("/data/export".as_ref());
//! println!("{}: {report}", model.file_name());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use prism_common as common;
pub use prism_model as model;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use prism_common::{BinaryReader, Token};
    pub use prism_model::{
        AssetSource, Companion, CompanionLoader, DirectorySource, ExportReport, LoadContext,
        MatFileLoader, MaterialLoader, MemorySource, Model, Warning,
    };
}

// Re-export commonly used types at the crate root
pub use prism_model::{Error, Model, Result};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
