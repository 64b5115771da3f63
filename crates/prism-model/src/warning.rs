//! Recoverable diagnostics collected while loading a model.

use std::fmt;

/// A non-fatal condition encountered during a load.
///
/// Warnings are kept on the [`Model`](crate::Model) so callers can inspect
/// them afterwards, and logged through `tracing` with the path of the file
/// they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An attribute definition uses a type code other than integer; the attribute was dropped.
    UnknownAttributeType {
        variant: String,
        part: usize,
        attribute: String,
        type_code: i32,
    },

    /// A piece declares more bone influences than a vertex can hold; extra influences were ignored.
    UnsupportedInfluenceCount {
        piece: usize,
        count: u32,
        max: usize,
    },

    /// A material description failed to load; an empty material stands in for it.
    MaterialLoad { path: String, message: String },

    /// A collision or prefab companion failed to load and was cleared.
    CompanionLoad { kind: &'static str, message: String },
}

impl Warning {
    /// Log the warning against the file it was raised for.
    pub(crate) fn log(&self, file: &str) {
        tracing::warn!(file, "{self}");
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownAttributeType {
                variant,
                part,
                attribute,
                type_code,
            } => write!(
                f,
                "invalid attribute type <{type_code}> for \"{attribute}\" (variant \"{variant}\", part {part})"
            ),
            Warning::UnsupportedInfluenceCount { piece, count, max } => write!(
                f,
                "bone count in piece {piece}: {count} exceeds maximum bone count ({count}/{max})"
            ),
            Warning::MaterialLoad { path, message } => {
                write!(f, "cannot load material \"{path}\": {message}")
            }
            Warning::CompanionLoad { kind, message } => {
                write!(f, "cannot load {kind}: {message}")
            }
        }
    }
}
