use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Plot series colours
// ---------------------------------------------------------------------------

/// `n` visually distinct colours with evenly spaced hues, starting at cyan.
pub fn series_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = 190.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue % 360.0, 0.8, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Fixed colours of the training and feature plots.
#[derive(Debug, Clone, Copy)]
pub struct PlotColors {
    pub loss: Color32,
    pub accuracy: Color32,
    pub feature: Color32,
}

impl Default for PlotColors {
    fn default() -> Self {
        let palette = series_palette(3);
        Self {
            loss: palette[0],
            accuracy: palette[1],
            feature: palette[2].gamma_multiply(0.6),
        }
    }
}
