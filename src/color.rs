use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Scatter and fit colour of the oxidation calibration plot.
pub const OXIDATION_COLOR: Color32 = Color32::from_rgb(220, 50, 47);
/// Scatter and fit colour of the reduction calibration plot.
pub const REDUCTION_COLOR: Color32 = Color32::from_rgb(38, 110, 210);

// ---------------------------------------------------------------------------
// Trace palette
// ---------------------------------------------------------------------------

/// `n` distinct trace colours on evenly spaced hues, starting at blue so a
/// single trace does not clash with the oxidation red.
pub fn trace_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.7, 0.5).into_color();
            let (r, g, b) = rgb.into_format::<u8>().into_components();
            Color32::from_rgb(r, g, b)
        })
        .collect()
}
