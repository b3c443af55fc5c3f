//! Lumen Math - geometry primitives shared by the Lumen crates.
//!
//! Vectors come from glam; this crate adds intervals, boxes, rays and the
//! random sampling used by ray sources.

pub use glam::*;

mod aabb;
mod interval;
mod ray;
pub mod sampling;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use vector::{angle_between, magnitude, normalize_or_keep, try_normalize, MathError, MathResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_handed_frame() {
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert_eq!(Vec3::Y.cross(Vec3::Z), Vec3::X);
    }
}
