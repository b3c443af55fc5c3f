//! Wavefront OBJ/MTL support, read with `tobj`.
//!
//! OBJ files provide the geometry of polyhedra. MTL libraries referenced
//! with `mtllib` can supply a constant refractive index through `Ni` when
//! no measured dispersion table is given.

mod loader;
mod mtl;

pub use loader::*;
pub use mtl::*;
