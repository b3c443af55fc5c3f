//! Random sampling of directions and surface points.

use std::f32::consts::PI;

use rand::Rng;

use crate::Vec3;

/// Generate a random unit vector, uniformly distributed on the unit sphere.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    // Rejection sampling inside the unit ball, then project
    loop {
        let v = Vec3::new(
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Random unit vector within `half_angle` radians of `axis`.
///
/// Directions are uniform over the solid angle of the cone. A zero angle
/// returns the normalized axis itself, and an angle of π or more covers the
/// whole sphere.
pub fn random_in_cone<R: Rng + ?Sized>(axis: Vec3, half_angle: f32, rng: &mut R) -> Vec3 {
    let Some(axis) = axis.try_normalize() else {
        return random_unit_vector(rng);
    };
    if half_angle <= 0.0 {
        return axis;
    }

    let cos_max = half_angle.min(PI).cos();
    let cos_theta = 1.0 - rng.gen::<f32>() * (1.0 - cos_max);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * rng.gen::<f32>();

    let (tangent, bitangent) = axis.any_orthonormal_pair();
    let direction = tangent * (sin_theta * phi.cos())
        + bitangent * (sin_theta * phi.sin())
        + axis * cos_theta;
    direction.normalize()
}

/// Barycentric weights `(r1, r2)` for a uniform point in a triangle.
///
/// Pairs falling in the upper half of the unit square are folded back, so
/// `r1 + r2 <= 1` always holds.
pub fn random_barycentric<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let r1: f32 = rng.gen();
    let r2: f32 = rng.gen();
    if r1 + r2 > 1.0 {
        (1.0 - r1, 1.0 - r2)
    } else {
        (r1, r2)
    }
}
