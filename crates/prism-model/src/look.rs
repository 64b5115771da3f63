//! Looks: named material assignments.

use crate::material::Material;

/// A named assignment of materials to the model's material slots.
#[derive(Debug, Clone)]
pub struct Look {
    pub name: String,
    /// One material per slot.
    pub materials: Vec<Material>,
}
