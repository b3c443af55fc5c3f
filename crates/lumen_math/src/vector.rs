//! Vector helpers that glam leaves to the caller.

use crate::Vec3;
use thiserror::Error;

/// Errors from vector operations that have no answer for a zero vector.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    #[error("cannot normalize a zero vector")]
    ZeroVector,

    #[error("cannot calculate an angle with a zero vector")]
    AngleWithZeroVector,
}

pub type MathResult<T> = Result<T, MathError>;

/// Euclidean length of `v`.
#[inline]
pub fn magnitude(v: Vec3) -> f32 {
    v.length()
}

/// Normalize `v`, or fail on a zero vector.
pub fn try_normalize(v: Vec3) -> MathResult<Vec3> {
    v.try_normalize().ok_or(MathError::ZeroVector)
}

/// Normalize `v`. A zero vector is returned unchanged with a warning.
pub fn normalize_or_keep(v: Vec3) -> Vec3 {
    match v.try_normalize() {
        Some(n) => n,
        None => {
            log::warn!("Cannot normalize a zero vector, leaving it unchanged");
            v
        }
    }
}

/// Angle between `a` and `b` in radians, in `[0, π]`.
pub fn angle_between(a: Vec3, b: Vec3) -> MathResult<f32> {
    let magnitude_product = a.length() * b.length();
    if magnitude_product == 0.0 {
        return Err(MathError::AngleWithZeroVector);
    }
    // Rounding can push the cosine just outside [-1, 1]
    let cos = (a.dot(b) / magnitude_product).clamp(-1.0, 1.0);
    Ok(cos.acos())
}
