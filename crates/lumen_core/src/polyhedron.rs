//! Triangle meshes with an optical material and a reference point.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lumen_math::{Aabb, Vec3};

use crate::material::Material;
use crate::polygon::{all_distinct, Polygon, Triangle};

/// A closed or open surface made of triangles.
///
/// Faces are stored twice: as resolved [`Triangle`]s for geometric queries
/// and as index triplets into `vertices` for export. Both lists always have
/// the same length and order.
#[derive(Clone, Debug)]
pub struct Polyhedron {
    /// Display name (object name from the file, or user supplied)
    pub name: String,

    vertices: Vec<Vec3>,
    face_indices: Vec<[u32; 3]>,
    faces: Vec<Triangle>,
    material: Arc<Material>,

    /// Anchor used for positioning and display markers
    reference: Vec3,

    /// Exact-coordinate lookup so shared corners map to one vertex
    vertex_lookup: HashMap<[u32; 3], u32>,
}

impl Polyhedron {
    /// Create an empty polyhedron made of vacuum, anchored at the origin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            face_indices: Vec::new(),
            faces: Vec::new(),
            material: Arc::new(Material::vacuum()),
            reference: Vec3::ZERO,
            vertex_lookup: HashMap::new(),
        }
    }

    /// Build from polygons. Faces with repeated points are dropped.
    ///
    /// The reference point is placed at the centre of the bounds.
    pub fn from_polygons<I>(name: impl Into<String>, polygons: I) -> Self
    where
        I: IntoIterator<Item = Polygon>,
    {
        let mut polyhedron = Self::new(name);
        for polygon in polygons {
            polyhedron.add_face(polygon);
        }
        polyhedron.reset_reference();
        polyhedron
    }

    /// Build from a shared vertex list and index triplets.
    ///
    /// Triangles that index outside `vertices` or repeat a point are
    /// skipped with a warning.
    pub fn from_indexed(
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        triangles: &[[u32; 3]],
    ) -> Self {
        let mut polyhedron = Self::new(name);
        for (i, v) in vertices.iter().enumerate() {
            polyhedron.vertex_lookup.entry(key(*v)).or_insert(i as u32);
        }
        polyhedron.vertices = vertices;

        for tri in triangles {
            polyhedron.add_indexed_triangle(*tri);
        }
        polyhedron.reset_reference();
        polyhedron
    }

    /// Add a face if all of its points are distinct.
    ///
    /// Quads enter as their two triangles. Returns false (and logs a
    /// warning) when the face was rejected.
    pub fn add_face(&mut self, polygon: impl Into<Polygon>) -> bool {
        let polygon = polygon.into();
        if !polygon.has_distinct_vertices() {
            log::warn!(
                "Attempted to add a {} face with non-distinct points to '{}'",
                polygon.kind().to_lowercase(),
                self.name
            );
            return false;
        }

        for triangle in polygon.triangles() {
            let [a, b, c] = *triangle.vertices();
            let indices = [self.intern(a), self.intern(b), self.intern(c)];
            self.face_indices.push(indices);
            self.faces.push(triangle);
        }
        true
    }

    /// Add a triangle over existing vertices.
    pub fn add_indexed_triangle(&mut self, indices: [u32; 3]) -> bool {
        let count = self.vertices.len();
        if indices.iter().any(|&i| i as usize >= count) {
            log::warn!(
                "Invalid triangle indices {:?} in '{}', vertex count: {}",
                indices,
                self.name,
                count
            );
            return false;
        }

        let points = indices.map(|i| self.vertices[i as usize]);
        if !all_distinct(&points) {
            log::warn!(
                "Attempted to add a triangular face with non-distinct points to '{}'",
                self.name
            );
            return false;
        }

        self.faces.push(Triangle::new(points[0], points[1], points[2]));
        self.face_indices.push(indices);
        true
    }

    fn intern(&mut self, v: Vec3) -> u32 {
        if let Some(&index) = self.vertex_lookup.get(&key(v)) {
            return index;
        }
        let index = self.vertices.len() as u32;
        self.vertices.push(v);
        self.vertex_lookup.insert(key(v), index);
        index
    }

    /// Move the whole polyhedron, reference point included.
    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
        for face in &mut self.faces {
            face.translate(offset);
        }
        self.reference += offset;
        self.vertex_lookup = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (key(*v), i as u32))
            .collect();
    }

    /// Move the reference point without moving any geometry.
    pub fn change_reference_point(&mut self, reference: Vec3) {
        self.reference = reference;
    }

    /// Move the geometry so that the reference point lands on `position`.
    pub fn move_to(&mut self, position: Vec3) {
        self.translate(position - self.reference);
    }

    /// Place the reference at the centre of the bounds (origin when empty).
    pub fn reset_reference(&mut self) {
        self.reference = if self.vertices.is_empty() {
            Vec3::ZERO
        } else {
            self.bounds().centroid()
        };
    }

    pub fn reference(&self) -> Vec3 {
        self.reference
    }

    /// World position of the object, which is its reference point.
    pub fn position(&self) -> Vec3 {
        self.reference
    }

    pub fn set_material(&mut self, material: Arc<Material>) {
        self.material = material;
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Triangle] {
        &self.faces
    }

    pub fn face_indices(&self) -> &[[u32; 3]] {
        &self.face_indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_point_cloud(&self.vertices)
    }
}

fn key(v: Vec3) -> [u32; 3] {
    // +0.0 and -0.0 are the same point
    [v.x + 0.0, v.y + 0.0, v.z + 0.0].map(f32::to_bits)
}

impl fmt::Display for Polyhedron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polyhedron(Faces: ")?;
        for (i, face) in self.faces.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            let [a, b, c] = face.vertices();
            write!(
                f,
                "Triangle(({}, {}, {}), ({}, {}, {}), ({}, {}, {}))",
                a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z
            )?;
        }
        write!(f, ")")
    }
}
