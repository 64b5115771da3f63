//! Error types for model decoding and export.

use std::fmt;

use thiserror::Error;

/// The binary container a version error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// The `.pmd` descriptor.
    Descriptor,
    /// The `.pmg` geometry.
    Geometry,
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Descriptor => f.write_str("descriptor"),
            Container::Geometry => f.write_str("geometry"),
        }
    }
}

/// Errors that can occur when loading or exporting a model.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] prism_common::Error),

    /// An error raised while processing a specific file.
    #[error("{path}: {source}")]
    File {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// Header tag or version not supported.
    #[error("unsupported {container} version: expected {expected}, got {actual}")]
    UnsupportedVersion {
        container: Container,
        expected: String,
        actual: String,
    },

    /// A computed geometry offset or index falls outside the buffer or its table.
    #[error("corrupt geometry: {what} at offset {offset}{}", span_note(.needed, .available))]
    CorruptGeometry {
        what: String,
        offset: i64,
        needed: usize,
        available: usize,
    },

    /// A computed descriptor offset or index falls outside the buffer or its table.
    #[error("corrupt descriptor: {what} at offset {offset}")]
    CorruptDescriptor { what: String, offset: i64 },

    /// Descriptor and geometry disagree on the number of parts.
    #[error("part count mismatch: descriptor declares {descriptor}, geometry has {geometry}")]
    PartCountMismatch { descriptor: usize, geometry: usize },

    /// A material description could not be loaded.
    #[error("material {path}: {message}")]
    Material { path: String, message: String },

    /// An export was requested from a model that holds no data.
    #[error("model is not loaded")]
    NotLoaded,

    /// A collision or prefab collaborator failed.
    #[error("{0}")]
    Companion(String),
}

impl Error {
    /// Attach the path of the file being processed.
    pub fn in_file(self, path: impl Into<String>) -> Self {
        Error::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping file context wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::File { source, .. } => source.root(),
            other => other,
        }
    }
}

fn span_note(needed: &usize, available: &usize) -> String {
    if *needed == 0 {
        String::new()
    } else {
        format!(" needs {needed} bytes but only {available} available")
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_context_display() {
        let err = Error::UnsupportedVersion {
            container: Container::Descriptor,
            expected: "4".into(),
            actual: "3".into(),
        }
        .in_file("/vehicle/truck/cab.pmd");

        assert_eq!(
            err.to_string(),
            "/vehicle/truck/cab.pmd: unsupported descriptor version: expected 4, got 3"
        );
        assert!(matches!(err.root(), Error::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_corrupt_geometry_display() {
        let err = Error::CorruptGeometry {
            what: "bone table".into(),
            offset: 96,
            needed: 200,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "corrupt geometry: bone table at offset 96 needs 200 bytes but only 4 available"
        );

        let err = Error::CorruptGeometry {
            what: "piece count".into(),
            offset: -3,
            needed: 0,
            available: 0,
        };
        assert_eq!(err.to_string(), "corrupt geometry: piece count at offset -3");
    }
}
