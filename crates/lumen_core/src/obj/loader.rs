//! Build polyhedra from OBJ files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use lumen_math::Vec3;
use thiserror::Error;

use super::mtl::material_from_mtl;
use crate::material::{Material, MaterialError};
use crate::polyhedron::Polyhedron;

/// Name `tobj` gives models declared without `o` or `g`.
const UNNAMED_MODEL: &str = "unnamed_object";

/// Errors that can occur while loading a mesh and its material.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: String,
        source: tobj::LoadError,
    },

    #[error("Material error in {path}: {source}")]
    Material {
        path: String,
        source: MaterialError,
    },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Faces are kept as written so quads can be split in a fixed order.
fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: false,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Merge loaded models into one polyhedron.
///
/// The name comes from the first model, falling back to `fallback_name`
/// when the file declares none. Triangles are kept as is; quads
/// `a b c d` become `(a, b, c)` and `(c, d, a)`. Faces of any other size
/// are skipped with a warning.
pub fn polyhedron_from_models(models: &[tobj::Model], fallback_name: &str) -> Polyhedron {
    let name = models
        .first()
        .map(|m| m.name.as_str())
        .filter(|n| !n.is_empty() && *n != UNNAMED_MODEL)
        .unwrap_or(fallback_name)
        .to_string();

    let mut vertices: Vec<Vec3> = Vec::new();
    let mut triangles = Vec::new();
    for model in models {
        let mesh = &model.mesh;
        let base = vertices.len() as u32;
        vertices.extend(mesh.positions.chunks_exact(3).map(Vec3::from_slice));

        // An empty arity list means every face is a triangle
        let arities = if mesh.face_arities.is_empty() {
            vec![3; mesh.indices.len() / 3]
        } else {
            mesh.face_arities.clone()
        };

        let mut start = 0;
        for arity in arities {
            let end = start + arity as usize;
            let Some(face) = mesh.indices.get(start..end) else {
                break;
            };
            start = end;

            match face {
                [a, b, c] => triangles.push([base + a, base + b, base + c]),
                [a, b, c, d] => {
                    triangles.push([base + a, base + b, base + c]);
                    triangles.push([base + c, base + d, base + a]);
                }
                other => log::warn!(
                    "Skipping face with {} vertices in '{}'",
                    other.len(),
                    model.name
                ),
            }
        }
    }

    Polyhedron::from_indexed(name, vertices, &triangles)
}

/// Parse OBJ text into a vacuum polyhedron. `mtllib` statements are not
/// followed.
pub fn load_obj_from_str(text: &str, fallback_name: &str) -> Result<Polyhedron, tobj::LoadError> {
    let (models, _) = tobj::load_obj_buf(&mut text.as_bytes(), &load_options(), |_: &Path| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;
    Ok(polyhedron_from_models(&models, fallback_name))
}

/// Load an OBJ file and pick its material.
///
/// Material resolution order:
/// 1. the dispersion table at `material_path`, when given;
/// 2. the `Ni` of the first `usemtl` material found in the file's `mtllib`;
/// 3. vacuum.
pub fn load_obj<P: AsRef<Path>>(path: P, material_path: Option<&Path>) -> LoadResult<Polyhedron> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");
    let base_dir = path.parent().unwrap_or(Path::new("."));

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;
    let (models, materials) = tobj::load_obj_buf(
        &mut BufReader::new(file),
        &load_options(),
        |library: &Path| tobj::load_mtl(base_dir.join(library)),
    )
    .map_err(|source| LoadError::Parse {
        path: display.clone(),
        source,
    })?;
    let mut polyhedron = polyhedron_from_models(&models, stem);

    let material = match material_path {
        Some(table) => Some(Material::load(table).map_err(|source| LoadError::Material {
            path: table.display().to_string(),
            source,
        })?),
        None => material_from_libraries(&models, materials),
    };
    if let Some(material) = material {
        polyhedron.set_material(Arc::new(material));
    }

    log::info!(
        "Loaded '{}' from {}: {} vertices, {} faces, material '{}'",
        polyhedron.name,
        display,
        polyhedron.vertex_count(),
        polyhedron.face_count(),
        polyhedron.material().name
    );
    Ok(polyhedron)
}

fn material_from_libraries(
    models: &[tobj::Model],
    materials: Result<Vec<tobj::Material>, tobj::LoadError>,
) -> Option<Material> {
    let wanted = models.iter().find_map(|m| m.mesh.material_id)?;

    match materials {
        Ok(materials) => materials.get(wanted).and_then(material_from_mtl),
        Err(err) => {
            log::warn!("Could not read material library: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_quad_split_order() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let p = load_obj_from_str(text, "plane").unwrap();

        assert_eq!(p.name, "plane");
        assert_eq!(p.face_indices(), &[[0, 1, 2], [2, 3, 0]]);
        assert!(p.faces().iter().all(|f| f.normal() == Vec3::Z));
        assert!(p.material().is_vacuum());
    }

    #[test]
    fn test_other_arities_are_skipped() {
        let text = "\
o Pentagon
v 0 0 0
v 1 0 0
v 2 1 0
v 1 2 0
v 0 1 0
f 1 2 3 4 5
f 1 2 3
";
        let p = load_obj_from_str(text, "fallback").unwrap();

        assert_eq!(p.name, "Pentagon");
        assert_eq!(p.face_count(), 1);
        assert_eq!(p.vertex_count(), 5);
    }

    #[test]
    fn test_negative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf -4 -3 -1\n";
        let p = load_obj_from_str(text, "tail").unwrap();

        assert_eq!(p.face_count(), 1);
        let face = &p.faces()[0];
        assert_eq!(face.normal(), Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_groups_are_merged() {
        let text = "\
o Cup
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
g handle
v 0 0 2
v 1 0 2
v 0 1 2
f 4 5 6
";
        let p = load_obj_from_str(text, "fallback").unwrap();

        assert_eq!(p.name, "Cup");
        assert_eq!(p.face_count(), 2);
        assert_eq!(p.vertex_count(), 6);
    }

    #[test]
    fn test_degenerate_faces_are_dropped() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 0 0\nf 1 2 3\n";
        let p = load_obj_from_str(text, "dup").unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn test_reference_is_bounds_centre() {
        let text = "v 0 0 0\nv 4 0 0\nv 0 2 0\nf 1 2 3\n";
        let p = load_obj_from_str(text, "t").unwrap();
        assert_eq!(p.position(), Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_index_out_of_range() {
        assert!(load_obj_from_str("v 0 0 0\nv 1 0 0\nf 1 2 3\n", "bad").is_err());
    }

    #[test]
    fn test_mtllib_optical_density() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("cup.obj"),
            "mtllib cup.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl glass\nf 1 2 3\n",
        )
        .unwrap();
        fs::write(dir.path().join("cup.mtl"), "newmtl glass\nNi 1.33\n").unwrap();

        let p = load_obj(dir.path().join("cup.obj"), None).unwrap();
        assert_eq!(p.name, "cup");
        assert_eq!(p.material().name, "glass");
        assert!((p.material().refractive_index(500.0).n - 1.33).abs() < 1e-6);
    }

    #[test]
    fn test_missing_mtllib_falls_back_to_vacuum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lens.obj");
        fs::write(
            &path,
            "mtllib gone.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl glass\nf 1 2 3\n",
        )
        .unwrap();

        let p = load_obj(&path, None).unwrap();
        assert_eq!(p.face_count(), 1);
        assert!(p.material().is_vacuum());
    }

    #[test]
    fn test_missing_file() {
        let err = load_obj("/definitely/not/here.obj", None).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
