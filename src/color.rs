use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: series name → Color32
// ---------------------------------------------------------------------------

/// Maps plotted series (one per temperature column) to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct SeriesColors {
    mapping: BTreeMap<String, Color32>,
}

impl SeriesColors {
    /// Build a colour map for the given series names.
    pub fn new(series: &[String]) -> Self {
        let palette = generate_palette(series.len());
        let mapping: BTreeMap<String, Color32> = series
            .iter()
            .cloned()
            .zip(palette.into_iter())
            .collect();
        SeriesColors { mapping }
    }

    /// Look up the colour for a series.
    pub fn color_for(&self, series: &str) -> Color32 {
        self.mapping.get(series).copied().unwrap_or(Color32::GRAY)
    }
}
