use std::collections::BTreeMap;
use std::path::PathBuf;

use eframe::egui::Color32;

use cv_calibrator::analysis::calibration::{
    CalibrationError, CalibrationReport, UnknownEstimate, calibrate, estimate_unknowns,
};
use cv_calibrator::config::{AnalysisConfig, WindowPreset};
use cv_calibrator::data::concentration::{
    ConcentrationMap, InputError, auto_concentrations, format_concentration, resolve_manual,
};
use cv_calibrator::data::loader;
use cv_calibrator::data::model::{Trace, TraceSet};
use cv_calibrator::data::overlay::{OverlayTable, merge_overlay};

use crate::color::trace_palette;

// ---------------------------------------------------------------------------
// Manual concentration input
// ---------------------------------------------------------------------------

/// Text box contents for one trace's concentration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConcentrationEntry {
    pub text: String,
    /// Set once the user typed into the box; untouched boxes follow the
    /// auto-extract toggle.
    pub edited: bool,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded traces in file order.
    pub traces: TraceSet,

    pub config: AnalysisConfig,

    /// Manual concentration inputs keyed by label.
    pub inputs: BTreeMap<String, ConcentrationEntry>,

    /// Concentrations read from file names.
    pub auto_concentrations: ConcentrationMap,

    /// Concentrations that feed the calibration (parsed manual inputs).
    pub concentrations: ConcentrationMap,

    /// Manual inputs that are not numbers.
    pub input_errors: Vec<InputError>,

    /// `None` while calibration is switched off.
    pub calibration: Option<Result<CalibrationReport, CalibrationError>>,

    /// Concentration estimates for unlabelled traces.
    pub unknowns: Vec<UnknownEstimate>,

    /// One colour per trace, parallel to `traces`.
    pub colors: Vec<Color32>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            traces: TraceSet::new(),
            config: AnalysisConfig::default(),
            inputs: BTreeMap::new(),
            auto_concentrations: ConcentrationMap::new(),
            concentrations: ConcentrationMap::new(),
            input_errors: Vec::new(),
            calibration: None,
            unknowns: Vec::new(),
            colors: Vec::new(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Load files, keeping every file that parses. Failures end up in
    /// `status_message`.
    pub fn load_paths(&mut self, paths: &[PathBuf]) {
        let mut failures = Vec::new();
        let mut loaded = Vec::new();

        for path in paths {
            match loader::load_file(path) {
                Ok(trace) => {
                    log::info!("Loaded '{}' with {} samples", trace.label, trace.len());
                    loaded.push(trace);
                }
                Err(e) => {
                    log::error!("Failed to load file: {e:#}");
                    failures.push(format!("{e:#}"));
                }
            }
        }

        self.add_traces(loaded);
        self.status_message = (!failures.is_empty()).then(|| format!("Error: {}", failures.join("; ")));
    }

    /// Ingest traces, seed their concentration inputs and recompute.
    pub fn add_traces(&mut self, traces: Vec<Trace>) {
        for trace in traces {
            self.traces.insert(trace);
        }
        self.auto_concentrations = auto_concentrations(self.traces.labels());

        let seeded: Vec<(String, String)> = self
            .traces
            .labels()
            .map(|label| (label.to_string(), self.seed_text(label)))
            .collect();
        for (label, text) in seeded {
            self.inputs
                .entry(label)
                .or_insert(ConcentrationEntry { text, edited: false });
        }
        self.recompute();
    }

    /// Drop every trace and input.
    pub fn clear(&mut self) {
        self.traces.clear();
        self.inputs.clear();
        self.auto_concentrations.clear();
        self.status_message = None;
        self.recompute();
    }

    fn seed_text(&self, label: &str) -> String {
        if !self.config.auto_concentration {
            return String::new();
        }
        self.auto_concentrations
            .get(label)
            .map(|&c| format_concentration(c))
            .unwrap_or_default()
    }

    /// Toggle auto-extraction; untouched inputs are re-seeded.
    pub fn set_auto_concentration(&mut self, enabled: bool) {
        self.config.auto_concentration = enabled;
        let labels: Vec<String> = self.traces.labels().map(str::to_string).collect();
        for label in labels {
            let text = self.seed_text(&label);
            let entry = self.inputs.entry(label).or_default();
            if !entry.edited {
                entry.text = text;
            }
        }
        self.recompute();
    }

    /// Store what the user typed for `label`.
    pub fn set_concentration_text(&mut self, label: &str, text: String) {
        let entry = self.inputs.entry(label.to_string()).or_default();
        entry.text = text;
        entry.edited = true;
        self.recompute();
    }

    pub fn set_calibration_enabled(&mut self, enabled: bool) {
        self.config.calibration_enabled = enabled;
        self.recompute();
    }

    pub fn apply_preset(&mut self, preset: WindowPreset) {
        self.config.apply_preset(preset);
        self.recompute();
    }

    /// Replace the settings, keeping loaded traces and typed inputs.
    pub fn set_config(&mut self, config: AnalysisConfig) {
        let auto = config.auto_concentration;
        self.config = config;
        self.set_auto_concentration(auto);
    }

    /// Re-derive concentrations, calibration and colours from the inputs.
    pub fn recompute(&mut self) {
        let inputs = self
            .traces
            .labels()
            .filter_map(|label| self.inputs.get(label).map(|e| (label, e.text.as_str())));
        let (concentrations, errors) = resolve_manual(inputs);
        self.concentrations = concentrations;
        self.input_errors = errors;
        self.colors = trace_palette(self.traces.len());

        self.calibration = None;
        self.unknowns.clear();
        if !self.config.calibration_enabled || self.traces.is_empty() {
            return;
        }

        let result = calibrate(&self.traces, &self.concentrations, &self.config);
        match &result {
            Ok(report) => {
                self.unknowns =
                    estimate_unknowns(report, &self.traces, &self.concentrations, &self.config);
            }
            Err(CalibrationError::TooFewConcentrations { found }) => {
                log::warn!("Skipping calibration: only {found} file(s) with a concentration");
            }
            Err(e) => log::warn!("Calibration failed: {e}"),
        }
        self.calibration = Some(result);
    }

    pub fn report(&self) -> Option<&CalibrationReport> {
        self.calibration.as_ref()?.as_ref().ok()
    }

    pub fn overlay(&self) -> OverlayTable {
        merge_overlay(&self.traces)
    }

    pub fn color_for(&self, index: usize) -> Color32 {
        self.colors.get(index).copied().unwrap_or(Color32::LIGHT_BLUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(label: &str, ox: f64) -> Trace {
        Trace::from_points(label, &[(0.05, -ox), (0.42, ox)])
    }

    #[test]
    fn inputs_are_seeded_from_file_names() {
        let mut state = AppState::default();
        state.add_traces(vec![trace("a_1mm", 3.0), trace("blank", 9.0)]);

        assert_eq!(state.inputs["a_1mm"].text, "1.0");
        assert_eq!(state.inputs["blank"].text, "");
        assert_eq!(state.concentrations.len(), 1);
        assert!(state.calibration.is_none());
    }

    #[test]
    fn calibration_needs_two_concentrations() {
        let mut state = AppState::default();
        state.add_traces(vec![trace("a_1mm", 3.0), trace("blank", 9.0)]);
        state.set_calibration_enabled(true);
        assert!(matches!(
            state.calibration,
            Some(Err(CalibrationError::TooFewConcentrations { found: 1 }))
        ));

        state.set_concentration_text("blank", "2".into());
        let report = state.report().expect("calibrated");
        assert_eq!(report.points.len(), 2);
        assert!((report.oxidation.slope - 6.0).abs() < 1e-12);
    }

    #[test]
    fn bad_input_is_reported_and_excluded() {
        let mut state = AppState::default();
        state.add_traces(vec![trace("a_1mm", 3.0), trace("b_2mm", 5.0), trace("c", 7.0)]);
        state.set_concentration_text("c", "lots".into());
        state.set_calibration_enabled(true);

        assert_eq!(state.input_errors.len(), 1);
        assert_eq!(state.report().map(|r| r.points.len()), Some(2));
        assert_eq!(state.unknowns.len(), 1);
    }

    #[test]
    fn auto_toggle_leaves_edited_inputs_alone() {
        let mut state = AppState::default();
        state.add_traces(vec![trace("a_1mm", 3.0), trace("b_2mm", 5.0)]);
        state.set_concentration_text("b_2mm", "2.5".into());

        state.set_auto_concentration(false);
        assert_eq!(state.inputs["a_1mm"].text, "");
        assert_eq!(state.inputs["b_2mm"].text, "2.5");

        state.set_auto_concentration(true);
        assert_eq!(state.inputs["a_1mm"].text, "1.0");
    }
}
