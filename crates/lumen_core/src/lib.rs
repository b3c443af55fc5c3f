//! Lumen Core - Scene model for forward ray tracing.
//!
//! This crate provides:
//!
//! - **Geometry**: `Triangle`, `Rectangle`, `Polyhedron`
//! - **Materials**: complex refractive indices with measured dispersion
//! - **Optics**: `LightRay`, `RaySource`, wavelength colours
//! - **Files**: OBJ/MTL loading and JSON scene descriptions
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::description::load_scene;
//!
//! let scene = load_scene("bench/scene.json")?;
//! println!("{}", scene.summary_table());
//! ```

pub mod description;
pub mod material;
pub mod obj;
pub mod polygon;
pub mod polyhedron;
pub mod ray;
pub mod scene;
pub mod source;
pub mod spectrum;

// Re-export commonly used types
pub use description::{load_scene, SceneDescription};
pub use material::{Material, RefractiveIndex};
pub use obj::{load_obj, load_obj_from_str};
pub use polygon::{Polygon, Rectangle, Triangle};
pub use polyhedron::Polyhedron;
pub use ray::LightRay;
pub use scene::{ObjectSummary, Scene, SceneObject};
pub use source::{RaySource, SourceShape};
pub use spectrum::{wavelength_to_rgba, Rgba};
