//! Scene container for forward ray tracing.
//!
//! A scene is an ordered list of objects: optical polyhedra and the ray
//! sources that illuminate them. Loose polygons are wrapped in their own
//! polyhedron on insertion.

use std::fmt;

use lumen_math::Aabb;

use crate::polygon::Polygon;
use crate::polyhedron::Polyhedron;
use crate::source::RaySource;

/// Anything that can live in a scene.
#[derive(Debug, Clone)]
pub enum SceneObject {
    Polyhedron(Polyhedron),
    Source(RaySource),
}

impl SceneObject {
    /// Type label shown in summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            SceneObject::Polyhedron(_) => "Polyhedron",
            SceneObject::Source(_) => "RaySource",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SceneObject::Polyhedron(p) => &p.name,
            SceneObject::Source(s) => &s.name,
        }
    }

    /// Bounds of the object's geometry; a point source is a padded point.
    pub fn bounds(&self) -> Aabb {
        match self {
            SceneObject::Polyhedron(p) => p.bounds(),
            SceneObject::Source(s) => {
                let poly = s.associated_polyhedron();
                if poly.is_empty() {
                    Aabb::from_points(s.reference(), s.reference())
                } else {
                    poly.bounds()
                }
            }
        }
    }

    pub fn summary(&self) -> ObjectSummary {
        let (points, faces) = match self {
            SceneObject::Polyhedron(p) => (p.vertex_count(), p.face_count()),
            SceneObject::Source(s) => {
                let poly = s.associated_polyhedron();
                (poly.vertex_count(), poly.face_count())
            }
        };
        ObjectSummary {
            kind: self.kind(),
            name: self.name().to_string(),
            points,
            faces,
        }
    }
}

impl From<Polyhedron> for SceneObject {
    fn from(p: Polyhedron) -> Self {
        SceneObject::Polyhedron(p)
    }
}

impl From<RaySource> for SceneObject {
    fn from(s: RaySource) -> Self {
        SceneObject::Source(s)
    }
}

/// One row of the object table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub kind: &'static str,
    pub name: String,
    pub points: usize,
    pub faces: usize,
}

/// An ordered collection of scene objects.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: String,
    objects: Vec<SceneObject>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
        }
    }

    /// Add an object and return its index.
    pub fn add_object(&mut self, object: impl Into<SceneObject>) -> usize {
        let object = object.into();
        log::debug!("Adding {} '{}' to scene '{}'", object.kind(), object.name(), self.name);
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Wrap a loose polygon in its own polyhedron and add it.
    pub fn add_polygon(&mut self, name: impl Into<String>, polygon: impl Into<Polygon>) -> usize {
        let polyhedron = Polyhedron::from_polygons(name, [polygon.into()]);
        self.add_object(polyhedron)
    }

    /// Remove the object at `index`. Out-of-range indices are ignored.
    pub fn remove_object(&mut self, index: usize) -> Option<SceneObject> {
        if index < self.objects.len() {
            Some(self.objects.remove(index))
        } else {
            log::debug!("Ignoring removal of object {index}, scene has {}", self.objects.len());
            None
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn get(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn polyhedra(&self) -> impl Iterator<Item = &Polyhedron> {
        self.objects.iter().filter_map(|o| match o {
            SceneObject::Polyhedron(p) => Some(p),
            SceneObject::Source(_) => None,
        })
    }

    pub fn sources(&self) -> impl Iterator<Item = &RaySource> {
        self.objects.iter().filter_map(|o| match o {
            SceneObject::Source(s) => Some(s),
            SceneObject::Polyhedron(_) => None,
        })
    }

    /// Total triangle count across all polyhedra.
    pub fn total_face_count(&self) -> usize {
        self.polyhedra().map(Polyhedron::face_count).sum()
    }

    /// World-space bounds of every object.
    pub fn bounds(&self) -> Aabb {
        self.objects
            .iter()
            .map(SceneObject::bounds)
            .fold(Aabb::EMPTY, |acc, b| Aabb::surrounding(&acc, &b))
    }

    /// Rows of the object table, in insertion order.
    pub fn summary(&self) -> Vec<ObjectSummary> {
        self.objects.iter().map(SceneObject::summary).collect()
    }

    /// The object table as aligned plain text.
    pub fn summary_table(&self) -> String {
        let headers = ["Type", "Name", "Points", "Faces"];
        let rows: Vec<[String; 4]> = self
            .summary()
            .into_iter()
            .map(|s| {
                [
                    s.kind.to_string(),
                    s.name,
                    s.points.to_string(),
                    s.faces.to_string(),
                ]
            })
            .collect();

        let mut widths = headers.map(str::len);
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }

        let mut out = String::new();
        let mut push_row = |cells: [&str; 4]| {
            let line = cells
                .iter()
                .zip(widths)
                .map(|(cell, w)| format!("{cell:<w$}"))
                .collect::<Vec<_>>()
                .join("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        };

        push_row(headers);
        for row in &rows {
            push_row([&row[0], &row[1], &row[2], &row[3]]);
        }
        out
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptions: Vec<String> = self
            .objects
            .iter()
            .map(|object| match object {
                SceneObject::Polyhedron(p) => {
                    format!("Polyhedron '{}' with {} faces", p.name, p.face_count())
                }
                SceneObject::Source(s) => {
                    let o = s.reference();
                    format!(
                        "RaySource '{}' at ({}, {}, {}) with aperture angle {} rad",
                        s.name,
                        o.x,
                        o.y,
                        o.z,
                        s.aperture()
                    )
                }
            })
            .collect();
        write!(f, "Scene(Objects: {})", descriptions.join("; "))
    }
}
