//! JSON scene descriptions.
//!
//! A description lists meshes, loose polygons and ray sources:
//!
//! ```json
//! {
//!   "name": "prism",
//!   "objects": [
//!     { "type": "mesh", "path": "prism.obj", "material": "bk7.csv" },
//!     { "type": "source", "point": [0, 20, 0], "normal": [0, -1, 1],
//!       "aperture_degrees": 5, "wavelength_nm": [400, 700] }
//!   ]
//! }
//! ```
//!
//! Relative paths resolve against the directory handed to [`SceneDescription::build`],
//! normally the directory holding the description file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::material::{Material, MaterialError};
use crate::obj::{load_obj, LoadError};
use crate::polygon::{Polygon, Rectangle, Triangle};
use crate::polyhedron::Polyhedron;
use crate::scene::Scene;
use crate::source::{RaySource, SourceError, DEFAULT_WAVELENGTHS};

/// Errors that can occur while reading or building a scene description.
#[derive(Error, Debug)]
pub enum DescriptionError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Material error in {path}: {source}")]
    Material {
        path: String,
        source: MaterialError,
    },

    #[error("Invalid source '{name}': {source}")]
    Source { name: String, source: SourceError },

    #[error("Source '{0}' needs exactly one of 'point' or 'rectangle'")]
    SourceShape(String),
}

pub type DescriptionResult<T> = Result<T, DescriptionError>;

/// Top-level scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default = "default_scene_name")]
    pub name: String,
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
}

fn default_scene_name() -> String {
    "scene".to_string()
}

/// One entry of `objects`, tagged by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectDescription {
    Mesh {
        path: PathBuf,
        /// Dispersion table; overrides any MTL `Ni`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        translate: Option<[f32; 3]>,
    },
    Triangle {
        vertices: [[f32; 3]; 3],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Rectangle {
        vertices: [[f32; 3]; 4],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Source(SourceDescription),
}

/// Ray source entry. Exactly one of `point` and `rectangle` must be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rectangle: Option<[[f32; 3]; 4]>,
    pub normal: [f32; 3],
    #[serde(default)]
    pub aperture_degrees: f32,
    #[serde(default = "default_wavelengths")]
    pub wavelength_nm: [f32; 2],
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

fn default_wavelengths() -> [f32; 2] {
    [DEFAULT_WAVELENGTHS.min, DEFAULT_WAVELENGTHS.max]
}

fn default_intensity() -> f32 {
    1.0
}

impl SceneDescription {
    pub fn from_json_str(text: &str) -> DescriptionResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self) -> DescriptionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a description file.
    pub fn load<P: AsRef<Path>>(path: P) -> DescriptionResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DescriptionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Instantiate every object. Relative paths are joined onto `base_dir`.
    pub fn build(&self, base_dir: &Path) -> DescriptionResult<Scene> {
        let mut scene = Scene::new(self.name.clone());

        for (index, object) in self.objects.iter().enumerate() {
            match object {
                ObjectDescription::Mesh {
                    path,
                    material,
                    name,
                    translate,
                } => {
                    let material = material.as_ref().map(|m| base_dir.join(m));
                    let mut polyhedron = load_obj(base_dir.join(path), material.as_deref())?;
                    if let Some(name) = name {
                        polyhedron.name = name.clone();
                    }
                    if let Some(offset) = translate {
                        polyhedron.translate(Vec3::from_array(*offset));
                    }
                    scene.add_object(polyhedron);
                }
                ObjectDescription::Triangle {
                    vertices,
                    material,
                    name,
                } => {
                    let [a, b, c] = vertices.map(Vec3::from_array);
                    let name = object_name(name, "triangle", index);
                    let polyhedron =
                        polygon_object(name, Triangle::new(a, b, c).into(), material, base_dir)?;
                    scene.add_object(polyhedron);
                }
                ObjectDescription::Rectangle {
                    vertices,
                    material,
                    name,
                } => {
                    let [a, b, c, d] = vertices.map(Vec3::from_array);
                    let name = object_name(name, "rectangle", index);
                    let polyhedron = polygon_object(
                        name,
                        Rectangle::new(a, b, c, d).into(),
                        material,
                        base_dir,
                    )?;
                    scene.add_object(polyhedron);
                }
                ObjectDescription::Source(source) => {
                    scene.add_object(source.build(index)?);
                }
            }
        }

        log::info!(
            "Built scene '{}': {} objects, {} faces",
            scene.name,
            scene.len(),
            scene.total_face_count()
        );
        Ok(scene)
    }
}

impl SourceDescription {
    fn build(&self, index: usize) -> DescriptionResult<RaySource> {
        let name = object_name(&self.name, "source", index);
        let normal = Vec3::from_array(self.normal);

        let source = match (self.point, self.rectangle) {
            (Some(point), None) => {
                RaySource::point(name.clone(), Vec3::from_array(point), normal, self.aperture_degrees)
            }
            (None, Some(corners)) => {
                let [a, b, c, d] = corners.map(Vec3::from_array);
                RaySource::rectangle(
                    name.clone(),
                    Rectangle::new(a, b, c, d),
                    normal,
                    self.aperture_degrees,
                )
            }
            _ => return Err(DescriptionError::SourceShape(name)),
        };

        let [min, max] = self.wavelength_nm;
        source
            .and_then(|s| s.with_wavelengths(min, max))
            .map(|s| s.with_intensity(self.intensity))
            .map_err(|source| DescriptionError::Source { name, source })
    }
}

fn object_name(name: &Option<String>, kind: &str, index: usize) -> String {
    name.clone().unwrap_or_else(|| format!("{kind} {index}"))
}

fn polygon_object(
    name: String,
    polygon: Polygon,
    material: &Option<PathBuf>,
    base_dir: &Path,
) -> DescriptionResult<Polyhedron> {
    let mut polyhedron = Polyhedron::from_polygons(name, [polygon]);
    if let Some(path) = material {
        let path = base_dir.join(path);
        let material = Material::load(&path).map_err(|source| DescriptionError::Material {
            path: path.display().to_string(),
            source,
        })?;
        polyhedron.set_material(Arc::new(material));
    }
    Ok(polyhedron)
}

/// Load a description file and build it relative to the file's directory.
pub fn load_scene<P: AsRef<Path>>(path: P) -> DescriptionResult<Scene> {
    let path = path.as_ref();
    let description = SceneDescription::load(path)?;
    description.build(path.parent().unwrap_or(Path::new(".")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneObject;
    use std::fs;

    const PRISM_OBJ: &str = "\
o prism
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
f 1 2 3
f 1 2 4
f 1 3 4
f 2 3 4
";

    #[test]
    fn test_parse_defaults() {
        let description = SceneDescription::from_json_str(
            r#"{ "objects": [ { "type": "source", "point": [0, 0, 0], "normal": [0, 0, 1] } ] }"#,
        )
        .unwrap();

        assert_eq!(description.name, "scene");
        let ObjectDescription::Source(source) = &description.objects[0] else {
            panic!("expected a source");
        };
        assert_eq!(source.aperture_degrees, 0.0);
        assert_eq!(source.wavelength_nm, [380.0, 740.0]);
        assert_eq!(source.intensity, 1.0);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result = SceneDescription::from_json_str(r#"{ "objects": [ { "type": "sphere" } ] }"#);
        assert!(matches!(result, Err(DescriptionError::Json(_))));
    }

    #[test]
    fn test_build_polygons_and_sources() {
        let description = SceneDescription::from_json_str(
            r#"{
                "name": "bench",
                "objects": [
                    { "type": "triangle", "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]] },
                    { "type": "rectangle", "name": "screen",
                      "vertices": [[0, 0, 5], [1, 0, 5], [1, 1, 5], [0, 1, 5]] },
                    { "type": "source", "name": "laser", "point": [0, 0, -5],
                      "normal": [0, 0, 2], "wavelength_nm": [632.8, 632.8], "intensity": 0.5 }
                ]
            }"#,
        )
        .unwrap();
        let scene = description.build(Path::new(".")).unwrap();

        assert_eq!(scene.name, "bench");
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.get(0).unwrap().name(), "triangle 0");
        assert_eq!(scene.get(1).unwrap().name(), "screen");
        assert_eq!(scene.total_face_count(), 3);

        let laser = scene.sources().next().unwrap();
        assert_eq!(laser.normal(), Vec3::Z);
        assert_eq!(laser.wavelengths().min, 632.8);
        assert_eq!(laser.intensity(), 0.5);
    }

    #[test]
    fn test_source_shape_required() {
        let description = SceneDescription::from_json_str(
            r#"{ "objects": [ { "type": "source", "normal": [0, 0, 1] } ] }"#,
        )
        .unwrap();
        let err = description.build(Path::new(".")).unwrap_err();
        assert!(matches!(err, DescriptionError::SourceShape(name) if name == "source 0"));
    }

    #[test]
    fn test_invalid_source_reports_name() {
        let description = SceneDescription::from_json_str(
            r#"{ "objects": [ { "type": "source", "name": "dark", "point": [0, 0, 0],
                                "normal": [0, 0, 0] } ] }"#,
        )
        .unwrap();
        let err = description.build(Path::new(".")).unwrap_err();
        assert!(matches!(
            err,
            DescriptionError::Source { name, source: SourceError::ZeroNormal } if name == "dark"
        ));
    }

    #[test]
    fn test_load_scene_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("prism.obj"), PRISM_OBJ).unwrap();
        fs::write(dir.path().join("glass.csv"), "# um n k\n0.4 1.5 0\n0.7 1.4 0\n").unwrap();
        fs::write(
            dir.path().join("scene.json"),
            r#"{
                "name": "optics",
                "objects": [
                    { "type": "mesh", "path": "prism.obj", "material": "glass.csv",
                      "translate": [10, 0, 0] }
                ]
            }"#,
        )
        .unwrap();

        let scene = load_scene(dir.path().join("scene.json")).unwrap();
        let SceneObject::Polyhedron(prism) = scene.get(0).unwrap() else {
            panic!("expected a polyhedron");
        };

        assert_eq!(prism.name, "prism");
        assert_eq!(prism.face_count(), 4);
        assert_eq!(prism.material().name, "glass");
        assert!((prism.material().refractive_index(550.0).n - 1.45).abs() < 1e-5);
        assert!(prism.bounds().contains(Vec3::new(10.5, 0.0, 0.0)));
    }

    #[test]
    fn test_missing_mesh_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let description = SceneDescription::from_json_str(
            r#"{ "objects": [ { "type": "mesh", "path": "nowhere.obj" } ] }"#,
        )
        .unwrap();
        let err = description.build(dir.path()).unwrap_err();
        assert!(matches!(err, DescriptionError::Load(LoadError::Io { .. })));
    }

    #[test]
    fn test_json_round_trip_keeps_fields() {
        let description = SceneDescription {
            name: "one".to_string(),
            objects: vec![ObjectDescription::Mesh {
                path: PathBuf::from("a.obj"),
                material: None,
                name: Some("a".to_string()),
                translate: None,
            }],
        };
        let text = description.to_json_string().unwrap();
        assert!(text.contains(r#""type": "mesh""#));
        assert!(!text.contains("material"));
        assert_eq!(SceneDescription::from_json_str(&text).unwrap(), description);
    }
}
