//! Light rays: a geometric ray that also carries a wavelength and an intensity.

use std::fmt;

use lumen_math::{Ray, Vec3};

use crate::spectrum::{wavelength_to_rgba, Rgba};

/// A monochromatic ray of light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRay {
    /// Origin and unit direction
    pub ray: Ray,
    /// Wavelength in nanometres
    pub wavelength: f32,
    /// Relative intensity in [0, 1]
    pub intensity: f32,
}

impl LightRay {
    pub fn new(origin: Vec3, direction: Vec3, wavelength: f32, intensity: f32) -> Self {
        Self {
            ray: Ray::new(origin, direction),
            wavelength,
            intensity: intensity.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.ray.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.ray.direction
    }

    /// Point at distance `t` along the ray.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.ray.at(t)
    }

    /// Display colour of this ray; alpha is the intensity.
    pub fn colour(&self) -> Rgba {
        wavelength_to_rgba(self.wavelength, self.intensity)
    }
}

impl fmt::Display for LightRay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.origin();
        let d = self.direction();
        write!(
            f,
            "Ray(Origin: ({}, {}, {}), Direction: ({}, {}, {}), Wavelength: {})",
            o.x, o.y, o.z, d.x, d.y, d.z, self.wavelength
        )
    }
}
