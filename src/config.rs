//! Analysis settings, saved and loaded as JSON from the File menu:
//!
//! ```json
//! {
//!   "oxidation_window": { "low": 0.37, "high": 0.47 },
//!   "reduction_window": { "low": 0.0, "high": 0.1 },
//!   "auto_concentration": true,
//!   "calibration_enabled": false
//! }
//! ```

use std::cmp::Ordering;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::peaks::VoltageWindow;

/// Stock window pairs used by the lab's two electrode setups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowPreset {
    /// ox (0.37, 0.47) V, red (0.0, 0.1) V
    #[default]
    Narrow,
    /// ox (0.3, 0.6) V, red (-0.1, 0.2) V
    Wide,
}

impl WindowPreset {
    pub const ALL: [WindowPreset; 2] = [WindowPreset::Narrow, WindowPreset::Wide];

    pub fn windows(self) -> (VoltageWindow, VoltageWindow) {
        match self {
            WindowPreset::Narrow => (VoltageWindow::new(0.37, 0.47), VoltageWindow::new(0.0, 0.1)),
            WindowPreset::Wide => (VoltageWindow::new(0.3, 0.6), VoltageWindow::new(-0.1, 0.2)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WindowPreset::Narrow => "Narrow",
            WindowPreset::Wide => "Wide",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} window {window} is empty (low must be below high)")]
    EmptyWindow {
        name: &'static str,
        window: VoltageWindow,
    },

    #[error("oxidation window {oxidation} overlaps reduction window {reduction}")]
    Overlap {
        oxidation: VoltageWindow,
        reduction: VoltageWindow,
    },
}

/// Everything that shapes an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub oxidation_window: VoltageWindow,
    pub reduction_window: VoltageWindow,
    /// Seed concentrations from `<n>mm` in file names.
    pub auto_concentration: bool,
    /// Build calibration curves from labelled traces.
    pub calibration_enabled: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::from_preset(WindowPreset::default())
    }
}

impl AnalysisConfig {
    pub fn from_preset(preset: WindowPreset) -> Self {
        let (oxidation_window, reduction_window) = preset.windows();
        AnalysisConfig {
            oxidation_window,
            reduction_window,
            auto_concentration: true,
            calibration_enabled: false,
        }
    }

    /// Replace both windows with a preset's, leaving the toggles alone.
    pub fn apply_preset(&mut self, preset: WindowPreset) {
        (self.oxidation_window, self.reduction_window) = preset.windows();
    }

    /// The preset whose windows match exactly, if any.
    pub fn preset(&self) -> Option<WindowPreset> {
        WindowPreset::ALL
            .into_iter()
            .find(|p| p.windows() == (self.oxidation_window, self.reduction_window))
    }

    /// Windows must be non-empty and must not overlap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, window) in [
            ("oxidation", self.oxidation_window),
            ("reduction", self.reduction_window),
        ] {
            if window.low.partial_cmp(&window.high) != Some(Ordering::Less) {
                return Err(ConfigError::EmptyWindow { name, window });
            }
        }
        if self.oxidation_window.overlaps(&self.reduction_window) {
            return Err(ConfigError::Overlap {
                oxidation: self.oxidation_window,
                reduction: self.reduction_window,
            });
        }
        Ok(())
    }

    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: AnalysisConfig =
            serde_json::from_str(content).context("Failed to parse settings JSON")?;
        config.validate().context("Invalid settings")?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for preset in WindowPreset::ALL {
            let config = AnalysisConfig::from_preset(preset);
            assert!(config.validate().is_ok(), "{preset:?}");
            assert_eq!(config.preset(), Some(preset));
        }
    }

    #[test]
    fn default_is_narrow_without_calibration() {
        let config = AnalysisConfig::default();
        assert_eq!(config.oxidation_window, VoltageWindow::new(0.37, 0.47));
        assert_eq!(config.reduction_window, VoltageWindow::new(0.0, 0.1));
        assert!(config.auto_concentration);
        assert!(!config.calibration_enabled);
    }

    #[test]
    fn rejects_inverted_and_overlapping_windows() {
        let mut config = AnalysisConfig::default();
        config.oxidation_window = VoltageWindow::new(0.5, 0.4);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyWindow { name: "oxidation", .. })
        ));

        config.oxidation_window = VoltageWindow::new(0.05, 0.3);
        assert!(matches!(config.validate(), Err(ConfigError::Overlap { .. })));

        config.oxidation_window = VoltageWindow::new(f64::NAN, 0.3);
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = AnalysisConfig::from_json(
            r#"{ "oxidation_window": { "low": 0.3, "high": 0.6 }, "calibration_enabled": true }"#,
        )
        .unwrap();
        assert_eq!(config.oxidation_window, VoltageWindow::new(0.3, 0.6));
        assert_eq!(config.reduction_window, VoltageWindow::new(0.0, 0.1));
        assert!(config.calibration_enabled);
        assert_eq!(config.preset(), None);
    }

    #[test]
    fn json_with_overlap_is_rejected() {
        let json = r#"{ "reduction_window": { "low": 0.4, "high": 0.5 } }"#;
        assert!(AnalysisConfig::from_json(json).is_err());
    }
}
