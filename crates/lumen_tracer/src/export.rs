//! Ray trajectory export.
//!
//! Emitted rays are written as coloured line segments next to the scene
//! geometry, so any OBJ viewer can show where the light goes. JSON and CSV
//! writers dump the raw ray records for further processing.

use std::borrow::Cow;
use std::io::Write;

use lumen_core::{LightRay, Polyhedron, Rgba, Scene};
use lumen_math::Vec3;
use serde::Serialize;
use thiserror::Error;

use crate::emission::SourceBatch;

/// Errors that can occur while writing exports.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

pub type ExportResult<T> = Result<T, ExportError>;

/// A ray drawn as a polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub points: Vec<Vec3>,
    pub colour: Rgba,
}

impl Trajectory {
    /// Straight segment from the ray origin to `length` along its direction.
    pub fn from_ray(ray: &LightRay, length: f32) -> Self {
        Self {
            points: vec![ray.origin(), ray.point_at(length.max(0.0))],
            colour: ray.colour(),
        }
    }

    /// Sum of segment lengths.
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// OBJ export settings.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Length of each ray segment, in scene units
    pub ray_length: f32,
    /// Draw coordinate axes of this length
    pub axes: Option<f32>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            ray_length: 10.0,
            axes: None,
        }
    }
}

/// Tracks global 1-based OBJ vertex indices across objects.
struct ObjWriter<'a, W: Write> {
    out: &'a mut W,
    next_index: usize,
}

impl<'a, W: Write> ObjWriter<'a, W> {
    fn object(&mut self, name: &str) -> std::io::Result<()> {
        writeln!(self.out, "o {}", object_name(name))
    }

    fn vertex(&mut self, v: Vec3) -> std::io::Result<usize> {
        writeln!(self.out, "v {} {} {}", v.x, v.y, v.z)?;
        self.next_index += 1;
        Ok(self.next_index - 1)
    }

    fn coloured_vertex(&mut self, v: Vec3, colour: [f32; 3]) -> std::io::Result<usize> {
        writeln!(
            self.out,
            "v {} {} {} {} {} {}",
            v.x, v.y, v.z, colour[0], colour[1], colour[2]
        )?;
        self.next_index += 1;
        Ok(self.next_index - 1)
    }

    fn polyhedron(&mut self, polyhedron: &Polyhedron) -> std::io::Result<()> {
        self.object(&polyhedron.name)?;
        let base = self.next_index;
        for v in polyhedron.vertices() {
            self.vertex(*v)?;
        }
        for [a, b, c] in polyhedron.face_indices() {
            writeln!(
                self.out,
                "f {} {} {}",
                base + *a as usize,
                base + *b as usize,
                base + *c as usize
            )?;
        }
        Ok(())
    }

    fn polyline(&mut self, points: &[Vec3], colour: [f32; 3]) -> std::io::Result<()> {
        let mut indices = Vec::with_capacity(points.len());
        for p in points {
            indices.push(self.coloured_vertex(*p, colour)?.to_string());
        }
        writeln!(self.out, "l {}", indices.join(" "))
    }
}

/// OBJ object names end at whitespace and `#` starts a comment.
fn object_name(name: &str) -> String {
    name.replace(|c: char| c.is_whitespace() || c == '#', "_")
}

/// Write scene geometry, ray segments and optional axes as one OBJ file.
///
/// Rectangular sources are written as geometry too. Ray vertices carry
/// their wavelength colour as trailing `r g b` floats.
pub fn export_obj<W: Write>(
    out: &mut W,
    scene: &Scene,
    batches: &[SourceBatch],
    options: &ExportOptions,
) -> ExportResult<()> {
    let mut obj = ObjWriter {
        out,
        next_index: 1,
    };
    writeln!(obj.out, "# Scene '{}'", scene.name)?;

    for polyhedron in scene.polyhedra() {
        obj.polyhedron(polyhedron)?;
    }
    for source in scene.sources() {
        let geometry = source.associated_polyhedron();
        if !geometry.is_empty() {
            obj.polyhedron(&geometry)?;
        }
    }

    let mut segments = 0;
    for batch in batches {
        if batch.rays.is_empty() {
            continue;
        }
        obj.object(&format!("rays_{}", batch.source_name))?;
        for ray in &batch.rays {
            let trajectory = Trajectory::from_ray(ray, options.ray_length);
            let [r, g, b, _] = trajectory.colour.to_unit();
            obj.polyline(&trajectory.points, [r, g, b])?;
            segments += 1;
        }
    }

    if let Some(length) = options.axes {
        obj.object("axes")?;
        let axes = [
            (Vec3::X, [1.0, 0.0, 0.0]),
            (Vec3::Y, [0.0, 1.0, 0.0]),
            (Vec3::Z, [0.0, 0.0, 1.0]),
        ];
        for (axis, colour) in axes {
            obj.polyline(&[Vec3::ZERO, axis * length], colour)?;
        }
    }

    log::debug!(
        "Wrote {} vertices and {} ray segments",
        obj.next_index - 1,
        segments
    );
    Ok(())
}

/// One emitted ray, flattened for serialisation.
#[derive(Debug, Clone, Serialize)]
pub struct RayRecord<'a> {
    pub source: &'a str,
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub wavelength: f32,
    pub intensity: f32,
    pub rgba: [f32; 4],
}

impl<'a> RayRecord<'a> {
    pub fn new(source: &'a str, ray: &LightRay) -> Self {
        Self {
            source,
            origin: ray.origin().to_array(),
            direction: ray.direction().to_array(),
            wavelength: ray.wavelength,
            intensity: ray.intensity,
            rgba: ray.colour().to_unit(),
        }
    }
}

fn records(batches: &[SourceBatch]) -> impl Iterator<Item = RayRecord<'_>> {
    batches
        .iter()
        .flat_map(|b| b.rays.iter().map(|r| RayRecord::new(&b.source_name, r)))
}

/// Write every ray as a JSON array of records.
pub fn export_json<W: Write>(out: &mut W, batches: &[SourceBatch]) -> ExportResult<()> {
    let records: Vec<RayRecord> = records(batches).collect();
    serde_json::to_writer_pretty(&mut *out, &records)?;
    writeln!(out)?;
    Ok(())
}

/// Quote a CSV field when it holds a separator, quote or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Write every ray as a CSV row with a header line.
pub fn export_csv<W: Write>(out: &mut W, batches: &[SourceBatch]) -> ExportResult<()> {
    writeln!(out, "source,ox,oy,oz,dx,dy,dz,wavelength,intensity,r,g,b")?;
    for record in records(batches) {
        let [ox, oy, oz] = record.origin;
        let [dx, dy, dz] = record.direction;
        let [r, g, b, _] = record.rgba;
        writeln!(
            out,
            "{},{ox},{oy},{oz},{dx},{dy},{dz},{},{},{r},{g},{b}",
            csv_field(record.source),
            record.wavelength,
            record.intensity
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{RaySource, Triangle};

    fn scene_and_batch() -> (Scene, Vec<SourceBatch>) {
        let mut scene = Scene::new("bench");
        scene.add_polygon("glass", Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y));
        scene.add_object(RaySource::point("laser", Vec3::ZERO, Vec3::Z, 0.0).unwrap());

        let batch = SourceBatch {
            source_name: "laser".to_string(),
            rays: vec![
                LightRay::new(Vec3::ZERO, Vec3::Z, 645.0, 1.0),
                LightRay::new(Vec3::X, Vec3::Z, 510.0, 0.5),
            ],
        };
        (scene, vec![batch])
    }

    #[test]
    fn test_trajectory_from_ray() {
        let ray = LightRay::new(Vec3::ONE, Vec3::Y, 440.0, 1.0);
        let trajectory = Trajectory::from_ray(&ray, 5.0);

        assert_eq!(trajectory.points, vec![Vec3::ONE, Vec3::new(1.0, 6.0, 1.0)]);
        assert_eq!(trajectory.colour.rgb(), [0, 0, 255]);
        assert_eq!(trajectory.length(), 5.0);
    }

    #[test]
    fn test_export_obj() {
        let (scene, batches) = scene_and_batch();
        let options = ExportOptions {
            ray_length: 2.0,
            axes: Some(1.0),
        };
        let mut buffer = Vec::new();
        export_obj(&mut buffer, &scene, &batches, &options).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# Scene 'bench'");
        assert_eq!(lines[1], "o glass");
        assert_eq!(lines[5], "f 1 2 3");
        assert_eq!(lines[6], "o rays_laser");
        assert_eq!(lines[7], "v 0 0 0 1 0 0");
        assert_eq!(lines[8], "v 0 0 2 1 0 0");
        assert_eq!(lines[9], "l 4 5");
        assert_eq!(lines[12], "l 6 7");
        assert_eq!(lines[13], "o axes");
        assert_eq!(text.lines().filter(|l| l.starts_with("l ")).count(), 5);
        assert_eq!(lines.last(), Some(&"l 12 13"));
    }

    #[test]
    fn test_export_obj_without_rays() {
        let (scene, _) = scene_and_batch();
        let mut buffer = Vec::new();
        export_obj(&mut buffer, &scene, &[], &ExportOptions::default()).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(!text.contains("rays_"));
        assert!(!text.contains("axes"));
    }

    #[test]
    fn test_export_json() {
        let (_, batches) = scene_and_batch();
        let mut buffer = Vec::new();
        export_json(&mut buffer, &batches).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["source"], "laser");
        assert_eq!(records[1]["wavelength"], 510.0);
        assert_eq!(records[1]["intensity"], 0.5);
        assert_eq!(records[1]["rgba"][1], 1.0);
    }

    #[test]
    fn test_export_csv() {
        let (_, batches) = scene_and_batch();
        let mut buffer = Vec::new();
        export_csv(&mut buffer, &batches).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "laser,0,0,0,0,0,1,645,1,1,0,0");
        assert_eq!(lines[2], "laser,1,0,0,0,0,1,510,0.5,0,1,0");
    }

    #[test]
    fn test_export_csv_quotes_source_names() {
        let batches = vec![
            SourceBatch {
                source_name: "lamp, left".to_string(),
                rays: vec![LightRay::new(Vec3::ZERO, Vec3::Z, 645.0, 1.0)],
            },
            SourceBatch {
                source_name: "the \"big\" lamp".to_string(),
                rays: vec![LightRay::new(Vec3::ZERO, Vec3::Z, 645.0, 1.0)],
            },
        ];
        let mut buffer = Vec::new();
        export_csv(&mut buffer, &batches).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[1], "\"lamp, left\",0,0,0,0,0,1,645,1,1,0,0");
        assert_eq!(lines[2], "\"the \"\"big\"\" lamp\",0,0,0,0,0,1,645,1,1,0,0");
    }

    #[test]
    fn test_object_names_are_sanitised() {
        assert_eq!(object_name("lamp#2 left"), "lamp_2_left");

        let mut scene = Scene::new("bench");
        scene.add_polygon("prism #1", Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y));
        let mut buffer = Vec::new();
        export_obj(&mut buffer, &scene, &[], &ExportOptions::default()).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(text.lines().nth(1), Some("o prism__1"));
    }
}
