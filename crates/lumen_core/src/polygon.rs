//! Planar faces: triangles and four-sided quads.

use lumen_math::sampling::random_barycentric;
use lumen_math::{Aabb, Vec3};
use rand::Rng;
use thiserror::Error;

/// Errors that can occur while building faces.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("expected {expected} vertices, found {found}")]
    VertexCount { expected: usize, found: usize },
}

pub type GeometryResult<T> = Result<T, GeometryError>;

/// True if no two points share all three coordinates.
pub(crate) fn all_distinct(points: &[Vec3]) -> bool {
    points
        .iter()
        .enumerate()
        .all(|(i, a)| points[i + 1..].iter().all(|b| a != b))
}

/// A triangle with a precomputed unit normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    vertices: [Vec3; 3],
    normal: Vec3,
}

impl Triangle {
    /// Create a triangle. The normal follows counter-clockwise winding.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let normal = (v1 - v0).cross(v2 - v0);
        let normal = match normal.try_normalize() {
            Some(n) => n,
            None => {
                log::warn!("Degenerate triangle {v0} {v1} {v2} has no normal");
                Vec3::ZERO
            }
        };
        Self {
            vertices: [v0, v1, v2],
            normal,
        }
    }

    /// Create a triangle from a slice holding exactly three points.
    pub fn from_slice(points: &[Vec3]) -> GeometryResult<Self> {
        match points {
            [a, b, c] => Ok(Self::new(*a, *b, *c)),
            _ => Err(GeometryError::VertexCount {
                expected: 3,
                found: points.len(),
            }),
        }
    }

    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertices
    }

    /// Unit normal, or zero for a degenerate triangle.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    pub fn area(&self) -> f32 {
        let [v0, v1, v2] = self.vertices;
        0.5 * (v1 - v0).cross(v2 - v0).length()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_point_cloud(&self.vertices)
    }

    pub fn has_distinct_vertices(&self) -> bool {
        all_distinct(&self.vertices)
    }

    /// Uniformly distributed point on the triangle's surface.
    pub fn random_point_inside<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let (r1, r2) = random_barycentric(rng);
        let [p0, p1, p2] = self.vertices;
        (1.0 - r1 - r2) * p0 + r1 * p1 + r2 * p2
    }

    pub(crate) fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }
}

/// A planar quad, stored with its split into two triangles.
///
/// `triangle1` is `(v0, v1, v2)` and `triangle2` is `(v2, v3, v0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    vertices: [Vec3; 4],
    triangle1: Triangle,
    triangle2: Triangle,
}

impl Rectangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, v3: Vec3) -> Self {
        Self {
            vertices: [v0, v1, v2, v3],
            triangle1: Triangle::new(v0, v1, v2),
            triangle2: Triangle::new(v2, v3, v0),
        }
    }

    /// Create a quad from a slice holding exactly four points.
    pub fn from_slice(points: &[Vec3]) -> GeometryResult<Self> {
        match points {
            [a, b, c, d] => Ok(Self::new(*a, *b, *c, *d)),
            _ => Err(GeometryError::VertexCount {
                expected: 4,
                found: points.len(),
            }),
        }
    }

    pub fn vertices(&self) -> &[Vec3; 4] {
        &self.vertices
    }

    pub fn triangle1(&self) -> &Triangle {
        &self.triangle1
    }

    pub fn triangle2(&self) -> &Triangle {
        &self.triangle2
    }

    /// Normal of the quad's plane, taken from the first triangle.
    pub fn normal(&self) -> Vec3 {
        self.triangle1.normal()
    }

    /// Mean of the four corners.
    pub fn centroid(&self) -> Vec3 {
        self.vertices.iter().copied().sum::<Vec3>() / 4.0
    }

    pub fn area(&self) -> f32 {
        self.triangle1.area() + self.triangle2.area()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_point_cloud(&self.vertices)
    }

    pub fn has_distinct_vertices(&self) -> bool {
        all_distinct(&self.vertices)
    }

    /// Uniformly distributed point on the quad.
    ///
    /// The half is picked in proportion to its area, so non-rectangular
    /// quads are sampled evenly too.
    pub fn random_point_inside<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let area1 = self.triangle1.area();
        let total = area1 + self.triangle2.area();
        let pick_first = if total > 0.0 {
            rng.gen::<f32>() * total < area1
        } else {
            rng.gen::<bool>()
        };

        if pick_first {
            self.triangle1.random_point_inside(rng)
        } else {
            self.triangle2.random_point_inside(rng)
        }
    }

    pub(crate) fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
        self.triangle1.translate(offset);
        self.triangle2.translate(offset);
    }
}

/// Any face a polyhedron can be built from.
#[derive(Debug, Clone, PartialEq)]
pub enum Polygon {
    Triangle(Triangle),
    Rectangle(Rectangle),
}

impl Polygon {
    pub fn has_distinct_vertices(&self) -> bool {
        match self {
            Polygon::Triangle(t) => t.has_distinct_vertices(),
            Polygon::Rectangle(r) => r.has_distinct_vertices(),
        }
    }

    /// The triangles this face contributes to a mesh.
    pub fn triangles(&self) -> Vec<Triangle> {
        match self {
            Polygon::Triangle(t) => vec![t.clone()],
            Polygon::Rectangle(r) => vec![r.triangle1.clone(), r.triangle2.clone()],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Polygon::Triangle(_) => "Triangle",
            Polygon::Rectangle(_) => "Rectangle",
        }
    }
}

impl From<Triangle> for Polygon {
    fn from(t: Triangle) -> Self {
        Polygon::Triangle(t)
    }
}

impl From<Rectangle> for Polygon {
    fn from(r: Rectangle) -> Self {
        Polygon::Rectangle(r)
    }
}
