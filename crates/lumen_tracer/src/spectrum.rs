//! Spectrum strip images.

use std::path::Path;

use image::{Rgb, RgbImage};
use lumen_core::wavelength_to_rgba;
use lumen_math::Interval;

use crate::export::{ExportError, ExportResult};

/// Horizontal colour strip across `range` nanometres.
///
/// The first column shows `range.min` and the last shows `range.max`.
pub fn spectrum_image(width: u32, height: u32, range: Interval) -> ExportResult<RgbImage> {
    if width == 0 || height == 0 {
        return Err(ExportError::InvalidSize { width, height });
    }

    let columns: Vec<Rgb<u8>> = (0..width)
        .map(|x| {
            let t = if width > 1 {
                x as f32 / (width - 1) as f32
            } else {
                0.0
            };
            Rgb(wavelength_to_rgba(range.lerp(t), 1.0).rgb())
        })
        .collect();

    Ok(RgbImage::from_fn(width, height, |x, _| columns[x as usize]))
}

/// Render a spectrum strip and save it; the format follows the file extension.
pub fn save_spectrum<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
    range: Interval,
) -> ExportResult<()> {
    let path = path.as_ref();
    let image = spectrum_image(width, height, range)?;
    image.save(path)?;
    log::info!(
        "Saved {}x{} spectrum ({}-{} nm) to {}",
        width,
        height,
        range.min,
        range.max,
        path.display()
    );
    Ok(())
}
