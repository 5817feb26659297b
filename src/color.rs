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
            let hsl = Hsl::new(hue, 0.65, 0.5);
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
// Station colours
// ---------------------------------------------------------------------------

/// Stable station → colour assignment shared by all three charts, so a
/// station keeps its colour when the selection changes.
#[derive(Debug, Clone, Default)]
pub struct StationColors {
    mapping: BTreeMap<String, Color32>,
}

impl StationColors {
    /// Assign a colour to every station, in the given order.
    pub fn new<'a>(stations: impl IntoIterator<Item = &'a str>) -> Self {
        let names: Vec<&str> = stations.into_iter().collect();
        let palette = generate_palette(names.len());
        let mapping = names
            .into_iter()
            .zip(palette)
            .map(|(name, c)| (name.to_string(), c))
            .collect();
        StationColors { mapping }
    }

    pub fn color_for(&self, station: &str) -> Color32 {
        self.mapping
            .get(station)
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}
