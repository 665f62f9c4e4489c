use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Used to keep each pollutant's yearly line recognisable across redraws.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            to_color32(hsl.into_color())
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Diverging scale: correlation coefficient → cell colour
// ---------------------------------------------------------------------------

/// Maps values in [-1, 1] onto a cold / neutral / warm gradient for the
/// correlation heatmap.
#[derive(Debug, Clone)]
pub struct DivergingScale {
    negative: Srgb,
    midpoint: Srgb,
    positive: Srgb,
}

impl DivergingScale {
    /// The scale used by the correlation heatmap: blue for -1, off-white
    /// around 0, warm red for +1.
    pub fn correlation() -> Self {
        DivergingScale {
            negative: Hsl::new(225.0, 0.65, 0.40).into_color(),
            midpoint: Hsl::new(40.0, 0.25, 0.92).into_color(),
            positive: Hsl::new(10.0, 0.75, 0.45).into_color(),
        }
    }

    /// Colour for a coefficient; the input is clamped to [-1, 1].
    pub fn color_for(&self, value: f64) -> Color32 {
        let v = value.clamp(-1.0, 1.0) as f32;
        let rgb = if v < 0.0 {
            lerp(self.midpoint, self.negative, -v)
        } else {
            lerp(self.midpoint, self.positive, v)
        };
        to_color32(rgb)
    }
}

fn lerp(a: Srgb, b: Srgb, t: f32) -> Srgb {
    Srgb::new(
        a.red + (b.red - a.red) * t,
        a.green + (b.green - a.green) * t,
        a.blue + (b.blue - a.blue) * t,
    )
}

/// Black or white, whichever is readable on `background`.
pub fn contrast_text(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::from_rgb(30, 30, 30)
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(9).len(), 9);
    }

    #[test]
    fn scale_endpoints_differ_from_midpoint() {
        let scale = DivergingScale::correlation();
        let lo = scale.color_for(-1.0);
        let mid = scale.color_for(0.0);
        let hi = scale.color_for(1.0);
        assert_ne!(lo, mid);
        assert_ne!(hi, mid);
        assert_ne!(lo, hi);
        // Out-of-range input clamps instead of extrapolating.
        assert_eq!(scale.color_for(-5.0), lo);
        assert_eq!(scale.color_for(5.0), hi);
    }
}
