//! Visible-spectrum colour approximation.
//!
//! Maps a wavelength in nanometres to an sRGB-ish colour using the usual
//! piecewise-linear fit of the CIE 1931 colour matching functions, with the
//! intensity rolled off towards both ends of the visible range.

use lumen_math::Interval;

/// Visible range covered by the colour ramp, in nanometres.
pub const VISIBLE_RANGE: Interval = Interval {
    min: 380.0,
    max: 750.0,
};

const GAMMA: f32 = 0.8;
const INTENSITY_MAX: f32 = 255.0;

/// An 8-bit colour plus a linear alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Ray intensity in [0, 1]
    pub a: f32,
}

impl Rgba {
    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Channels scaled to [0, 1].
    pub fn to_unit(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a,
        ]
    }
}

/// Colour of light at `wavelength` nanometres, with `alpha` passed through.
///
/// Wavelengths outside [380, 750] nm are black.
pub fn wavelength_to_rgba(wavelength: f32, alpha: f32) -> Rgba {
    let w = wavelength;

    let (r, g, b) = if (380.0..440.0).contains(&w) {
        (-(w - 440.0) / (440.0 - 380.0), 0.0, 1.0)
    } else if (440.0..490.0).contains(&w) {
        (0.0, (w - 440.0) / (490.0 - 440.0), 1.0)
    } else if (490.0..510.0).contains(&w) {
        (0.0, 1.0, -(w - 510.0) / (510.0 - 490.0))
    } else if (510.0..580.0).contains(&w) {
        ((w - 510.0) / (580.0 - 510.0), 1.0, 0.0)
    } else if (580.0..645.0).contains(&w) {
        (1.0, -(w - 645.0) / (645.0 - 580.0), 0.0)
    } else if (645.0..=750.0).contains(&w) {
        (1.0, 0.0, 0.0)
    } else {
        (0.0, 0.0, 0.0)
    };

    // Let the intensity fall off near the vision limits
    let factor = if (380.0..420.0).contains(&w) {
        0.3 + 0.7 * (w - 380.0) / (420.0 - 380.0)
    } else if (420.0..645.0).contains(&w) {
        1.0
    } else if (645.0..=750.0).contains(&w) {
        0.3 + 0.7 * (750.0 - w) / (750.0 - 645.0)
    } else {
        0.0
    };

    Rgba {
        r: channel(r, factor),
        g: channel(g, factor),
        b: channel(b, factor),
        a: alpha,
    }
}

fn channel(value: f32, factor: f32) -> u8 {
    // Truncation, not rounding
    (INTENSITY_MAX * (value * factor).powf(GAMMA)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_points() {
        assert_eq!(wavelength_to_rgba(440.0, 1.0).rgb(), [0, 0, 255]);
        assert_eq!(wavelength_to_rgba(510.0, 1.0).rgb(), [0, 255, 0]);
        assert_eq!(wavelength_to_rgba(580.0, 1.0).rgb(), [255, 255, 0]);
        assert_eq!(wavelength_to_rgba(645.0, 1.0).rgb(), [255, 0, 0]);
    }

    #[test]
    fn test_outside_visible_is_black() {
        assert_eq!(wavelength_to_rgba(379.9, 1.0).rgb(), [0, 0, 0]);
        assert_eq!(wavelength_to_rgba(750.1, 1.0).rgb(), [0, 0, 0]);
        assert_eq!(wavelength_to_rgba(1000.0, 0.5).rgb(), [0, 0, 0]);
    }

    #[test]
    fn test_edge_roll_off() {
        // factor at 700 nm = 0.3 + 0.7 * 50 / 105
        let factor: f32 = 0.3 + 0.7 * 50.0 / 105.0;
        let expected = (255.0 * factor.powf(0.8)) as u8;
        assert_eq!(wavelength_to_rgba(700.0, 1.0).rgb(), [expected, 0, 0]);

        // Violet end is dimmer than the middle of the band
        let violet = wavelength_to_rgba(390.0, 1.0);
        assert!(violet.b < 255);
        assert!(violet.r > 0);
    }

    #[test]
    fn test_alpha_passthrough() {
        let c = wavelength_to_rgba(550.0, 0.25);
        assert_eq!(c.a, 0.25);
        assert_eq!(c.to_unit()[3], 0.25);
        assert_eq!(c.to_unit()[1], 1.0);
    }
}
