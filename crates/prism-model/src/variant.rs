//! Variants: named sets of per-part attribute overrides.

use std::fmt;

/// Decoded attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue {
    Int(i32),
}

impl AttributeValue {
    /// Text format name.
    pub fn format(&self) -> &'static str {
        match self {
            AttributeValue::Int(_) => "INT",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(value) => write!(f, "{value}"),
        }
    }
}

/// A named, typed attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

/// Attributes one variant assigns to one part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartAttributes {
    /// Index of the part in the model's part list.
    pub part: usize,
    pub attributes: Vec<Attribute>,
}

impl PartAttributes {
    /// Find an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }
}

/// A named configuration of the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    /// One entry per part, in part order.
    pub parts: Vec<PartAttributes>,
}
