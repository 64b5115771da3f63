//! Common utilities for the prism model tools.
//!
//! This crate provides the leaf types shared by every decoder:
//!
//! - [`BinaryReader`] - Bounds-checked binary reading from byte slices
//! - [`Token`] - Fixed-width packed name tokens
//! - [`Float2`], [`Float3`], [`Quat`], [`Mat4`] - Plain math aliases used by on-disk records

mod error;
mod reader;
mod token;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use token::{Token, TOKEN_SIZE};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for NUL scanning
pub use memchr;

/// Two packed `f32` values.
pub type Float2 = [f32; 2];

/// Three packed `f32` values.
pub type Float3 = [f32; 3];

/// Quaternion as stored on disk (`w x y z`).
pub type Quat = [f32; 4];

/// Column-major 4x4 matrix (`m[column][row]`).
pub type Mat4 = [[f32; 4]; 4];
