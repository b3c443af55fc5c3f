//! Optical materials described by a complex refractive index.
//!
//! A material either behaves like vacuum, has a constant index, or carries
//! a measured dispersion table. Tables are plain text with one sample per
//! line: wavelength in micrometres, real part `n`, extinction `k`.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur while reading a dispersion table.
#[derive(Error, Debug)]
pub enum MaterialError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("a dispersion table needs at least two samples, found {0}")]
    TooFewSamples(usize),
}

pub type MaterialResult<T> = Result<T, MaterialError>;

/// Complex refractive index `n + ik`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefractiveIndex {
    /// Real part (phase velocity ratio)
    pub n: f32,
    /// Imaginary part (extinction coefficient)
    pub k: f32,
}

impl RefractiveIndex {
    pub const VACUUM: RefractiveIndex = RefractiveIndex { n: 1.0, k: 0.0 };

    pub fn new(n: f32, k: f32) -> Self {
        Self { n, k }
    }
}

impl fmt::Display for RefractiveIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.k < 0.0 {
            write!(f, "{}-{}i", self.n, -self.k)
        } else {
            write!(f, "{}+{}i", self.n, self.k)
        }
    }
}

/// One row of a dispersion table, wavelength in nanometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionSample {
    pub wavelength: f32,
    pub index: RefractiveIndex,
}

/// Measured samples, sorted by wavelength, at least two of them.
#[derive(Debug, Clone, PartialEq)]
pub struct DispersionTable {
    samples: Vec<DispersionSample>,
}

impl DispersionTable {
    /// Sort `samples` by wavelength. Fewer than two samples is an error.
    pub fn new(mut samples: Vec<DispersionSample>) -> MaterialResult<Self> {
        if samples.len() < 2 {
            return Err(MaterialError::TooFewSamples(samples.len()));
        }
        samples.sort_by(|a, b| a.wavelength.total_cmp(&b.wavelength));
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[DispersionSample] {
        &self.samples
    }

    /// Linear interpolation between samples, linear extrapolation from the
    /// end segments.
    pub fn interpolate(&self, wavelength: f32) -> RefractiveIndex {
        let samples = &self.samples;
        // Index of the segment's upper end, kept inside [1, len - 1]
        let upper = samples
            .partition_point(|s| s.wavelength < wavelength)
            .clamp(1, samples.len() - 1);
        let a = samples[upper - 1];
        let b = samples[upper];

        let span = b.wavelength - a.wavelength;
        if span == 0.0 {
            return a.index;
        }
        let t = (wavelength - a.wavelength) / span;

        RefractiveIndex {
            n: a.index.n + (b.index.n - a.index.n) * t,
            k: a.index.k + (b.index.k - a.index.k) * t,
        }
    }
}

/// How the refractive index varies with wavelength.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispersion {
    Vacuum,
    Constant(RefractiveIndex),
    Tabulated(DispersionTable),
}

/// An optical material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub dispersion: Dispersion,
}

impl Default for Material {
    fn default() -> Self {
        Self::vacuum()
    }
}

impl Material {
    /// Refractive index 1 at every wavelength.
    pub fn vacuum() -> Self {
        Self {
            name: "vacuum".to_string(),
            dispersion: Dispersion::Vacuum,
        }
    }

    /// Wavelength-independent index.
    pub fn constant(name: impl Into<String>, index: RefractiveIndex) -> Self {
        Self {
            name: name.into(),
            dispersion: Dispersion::Constant(index),
        }
    }

    /// Build a tabulated material from samples in any order.
    pub fn tabulated(
        name: impl Into<String>,
        samples: Vec<DispersionSample>,
    ) -> MaterialResult<Self> {
        Ok(Self {
            name: name.into(),
            dispersion: Dispersion::Tabulated(DispersionTable::new(samples)?),
        })
    }

    /// Load a dispersion table from disk. The material is named after the file stem.
    pub fn load<P: AsRef<Path>>(path: P) -> MaterialResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed");
        let text = std::fs::read_to_string(path)?;
        let material = Self::from_table_str(name, &text)?;
        log::debug!("Loaded material '{}' from {}", material.name, path.display());
        Ok(material)
    }

    /// Parse a dispersion table: `wavelength_um n k` per line.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn from_table_str(name: &str, text: &str) -> MaterialResult<Self> {
        let mut samples = Vec::new();

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            let [wl, n, k] = fields.as_slice() else {
                return Err(MaterialError::Parse {
                    line: line_no,
                    message: format!("expected 3 fields, found {}", fields.len()),
                });
            };

            let parse = |s: &str| {
                s.parse::<f32>().map_err(|_| MaterialError::Parse {
                    line: line_no,
                    message: format!("invalid number '{s}'"),
                })
            };

            samples.push(DispersionSample {
                // micrometres to nanometres
                wavelength: parse(*wl)? * 1000.0,
                index: RefractiveIndex::new(parse(*n)?, parse(*k)?),
            });
        }

        Self::tabulated(name, samples)
    }

    /// Complex refractive index at `wavelength` nanometres.
    ///
    /// Tabulated materials interpolate linearly between samples and
    /// extrapolate linearly from the end segments.
    pub fn refractive_index(&self, wavelength: f32) -> RefractiveIndex {
        match &self.dispersion {
            Dispersion::Vacuum => RefractiveIndex::VACUUM,
            Dispersion::Constant(index) => *index,
            Dispersion::Tabulated(table) => table.interpolate(wavelength),
        }
    }

    pub fn is_vacuum(&self) -> bool {
        matches!(self.dispersion, Dispersion::Vacuum)
    }
}
