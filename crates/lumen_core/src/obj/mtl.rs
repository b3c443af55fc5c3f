//! Optical materials from MTL entries.

use crate::material::{Material, RefractiveIndex};

/// Constant-index material from the optical density (`Ni`) of an MTL
/// entry. `None` when the entry has no `Ni`.
pub fn material_from_mtl(mtl: &tobj::Material) -> Option<Material> {
    mtl.optical_density
        .map(|n| Material::constant(mtl.name.clone(), RefractiveIndex::new(n, 0.0)))
}
