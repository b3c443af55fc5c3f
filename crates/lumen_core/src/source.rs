//! Light sources that emit rays into the scene.
//!
//! A source emits from a single point or from random points on a planar
//! quad. Every ray leaves within a cone around the source normal and
//! carries a wavelength drawn uniformly from the source's band.

use std::fmt;

use lumen_math::sampling::random_in_cone;
use lumen_math::{Interval, Vec3};
use rand::Rng;
use thiserror::Error;

use crate::polygon::Rectangle;
use crate::polyhedron::Polyhedron;
use crate::ray::LightRay;

/// Default emission band, in nanometres.
pub const DEFAULT_WAVELENGTHS: Interval = Interval {
    min: 380.0,
    max: 740.0,
};

/// Errors that can occur while configuring a source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("source normal must not be a zero vector")]
    ZeroNormal,

    #[error("aperture angle must be a non-negative number of degrees, got {0}")]
    InvalidAperture(f32),

    #[error("invalid wavelength range {min}..{max} nm")]
    InvalidWavelengths { min: f32, max: f32 },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Where rays start.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceShape {
    Point(Vec3),
    Rectangle(Rectangle),
}

/// A ray emitter.
#[derive(Debug, Clone, PartialEq)]
pub struct RaySource {
    pub name: String,
    shape: SourceShape,
    /// Unit emission axis
    normal: Vec3,
    /// Half-angle of the emission cone, radians
    aperture: f32,
    wavelengths: Interval,
    intensity: f32,
}

impl RaySource {
    /// Create a source. The aperture is given in degrees.
    pub fn new(
        name: impl Into<String>,
        shape: SourceShape,
        normal: Vec3,
        aperture_degrees: f32,
    ) -> SourceResult<Self> {
        let normal = normal.try_normalize().ok_or(SourceError::ZeroNormal)?;
        if !(aperture_degrees >= 0.0) {
            return Err(SourceError::InvalidAperture(aperture_degrees));
        }

        Ok(Self {
            name: name.into(),
            shape,
            normal,
            aperture: aperture_degrees.to_radians(),
            wavelengths: DEFAULT_WAVELENGTHS,
            intensity: 1.0,
        })
    }

    /// Source emitting from a single point.
    pub fn point(
        name: impl Into<String>,
        origin: Vec3,
        normal: Vec3,
        aperture_degrees: f32,
    ) -> SourceResult<Self> {
        Self::new(name, SourceShape::Point(origin), normal, aperture_degrees)
    }

    /// Source emitting from the surface of a quad.
    pub fn rectangle(
        name: impl Into<String>,
        rectangle: Rectangle,
        normal: Vec3,
        aperture_degrees: f32,
    ) -> SourceResult<Self> {
        Self::new(name, SourceShape::Rectangle(rectangle), normal, aperture_degrees)
    }

    /// Restrict emission to `[min, max]` nanometres.
    pub fn with_wavelengths(mut self, min: f32, max: f32) -> SourceResult<Self> {
        if !(min > 0.0 && min <= max && max.is_finite()) {
            return Err(SourceError::InvalidWavelengths { min, max });
        }
        self.wavelengths = Interval::new(min, max);
        Ok(self)
    }

    /// Set the intensity given to every ray, clamped to [0, 1].
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity.clamp(0.0, 1.0);
        self
    }

    pub fn shape(&self) -> &SourceShape {
        &self.shape
    }

    pub fn mode(&self) -> &'static str {
        match self.shape {
            SourceShape::Point(_) => "point",
            SourceShape::Rectangle(_) => "rectangle",
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Cone half-angle in radians.
    pub fn aperture(&self) -> f32 {
        self.aperture
    }

    pub fn wavelengths(&self) -> Interval {
        self.wavelengths
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Draw the next ray.
    pub fn next_ray<R: Rng + ?Sized>(&self, rng: &mut R) -> LightRay {
        let wavelength = self.wavelengths.lerp(rng.gen::<f32>());
        let direction = if self.aperture == 0.0 {
            self.normal
        } else {
            random_in_cone(self.normal, self.aperture, rng)
        };
        let origin = match &self.shape {
            SourceShape::Point(p) => *p,
            SourceShape::Rectangle(rect) => rect.random_point_inside(rng),
        };
        LightRay::new(origin, direction, wavelength, self.intensity)
    }

    /// The point source position or the quad centroid.
    pub fn reference(&self) -> Vec3 {
        match &self.shape {
            SourceShape::Point(p) => *p,
            SourceShape::Rectangle(rect) => rect.centroid(),
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        match &mut self.shape {
            SourceShape::Point(p) => *p += offset,
            SourceShape::Rectangle(rect) => rect.translate(offset),
        }
    }

    /// Move the emitter so its reference lands on `reference`.
    pub fn change_reference_point(&mut self, reference: Vec3) {
        self.translate(reference - self.reference());
    }

    /// Geometry standing in for the source when displayed or counted.
    pub fn associated_polyhedron(&self) -> Polyhedron {
        match &self.shape {
            SourceShape::Point(p) => {
                let mut polyhedron = Polyhedron::new(self.name.clone());
                polyhedron.change_reference_point(*p);
                polyhedron
            }
            SourceShape::Rectangle(rect) => {
                Polyhedron::from_polygons(self.name.clone(), [rect.clone().into()])
            }
        }
    }
}

impl fmt::Display for RaySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.reference();
        let n = self.normal;
        write!(
            f,
            "RaySource(Origin: ({}, {}, {}), Normal: ({}, {}, {}), Mode: {}, \
             Aperture Angle: {} radians, Wavelength Range: {}-{} nm)",
            o.x,
            o.y,
            o.z,
            n.x,
            n.y,
            n.z,
            self.mode(),
            self.aperture,
            self.wavelengths.min,
            self.wavelengths.max
        )
    }
}
