use std::path::PathBuf;

use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, TextEdit, Ui};

use cv_calibrator::analysis::peaks::VoltageWindow;
use cv_calibrator::config::{AnalysisConfig, WindowPreset};
use cv_calibrator::export;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – options and concentrations
// ---------------------------------------------------------------------------

/// Render the left options panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Options");
    ui.separator();

    let mut auto = state.config.auto_concentration;
    if ui
        .checkbox(&mut auto, "Extract concentration from file name (xx mm)")
        .changed()
    {
        state.set_auto_concentration(auto);
    }

    let mut calibrate = state.config.calibration_enabled;
    if ui
        .checkbox(&mut calibrate, "Build calibration curve")
        .changed()
    {
        state.set_calibration_enabled(calibrate);
    }

    ui.separator();
    windows_editor(ui, state);

    if !state.config.calibration_enabled || state.traces.is_empty() {
        return;
    }

    ui.separator();
    ui.strong("Concentration (mM)");
    ui.label(RichText::new("Leave blank to exclude a file").small());

    let labels: Vec<String> = state.traces.labels().map(str::to_string).collect();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (idx, label) in labels.iter().enumerate() {
                let mut text = state
                    .inputs
                    .get(label)
                    .map(|e| e.text.clone())
                    .unwrap_or_default();

                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new(label).color(state.color_for(idx)));
                    let hint = state
                        .auto_concentrations
                        .get(label)
                        .map(|c| format!("auto: {c}"))
                        .unwrap_or_default();
                    let edit = TextEdit::singleline(&mut text)
                        .hint_text(hint)
                        .desired_width(70.0);
                    if ui.add(edit).changed() {
                        state.set_concentration_text(label, text.clone());
                    }
                });

                if let Some(err) = state.input_errors.iter().find(|e| &e.label == label) {
                    ui.label(RichText::new(err.to_string()).color(Color32::RED).small());
                }
            }
        });
}

fn windows_editor(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Peak windows");

    let current = state.config.preset();
    let selected_text = current.map_or("Custom", WindowPreset::name);
    egui::ComboBox::from_id_salt("window_preset")
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            for preset in WindowPreset::ALL {
                if ui
                    .selectable_label(current == Some(preset), preset.name())
                    .clicked()
                {
                    state.apply_preset(preset);
                }
            }
        });

    let mut changed = false;
    changed |= window_row(ui, "Oxidation", &mut state.config.oxidation_window);
    changed |= window_row(ui, "Reduction", &mut state.config.reduction_window);
    if changed {
        state.recompute();
    }

    if let Err(e) = state.config.validate() {
        ui.label(RichText::new(e.to_string()).color(Color32::RED).small());
    }
}

fn window_row(ui: &mut Ui, name: &str, window: &mut VoltageWindow) -> bool {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(name);
        let low = ui.add(DragValue::new(&mut window.low).speed(0.005).max_decimals(3));
        ui.label("–");
        let high = ui.add(DragValue::new(&mut window.high).speed(0.005).max_decimals(3));
        ui.label("V");
        low.changed() || high.changed()
    })
    .inner
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open traces…").clicked() {
                open_traces_dialog(state);
                ui.close_menu();
            }
            if ui.button("Clear traces").clicked() {
                state.clear();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Load settings…").clicked() {
                load_settings_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save settings…").clicked() {
                save_settings_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let can_export_calibration = state.report().is_some();
            if ui
                .add_enabled(can_export_calibration, egui::Button::new("Export calibration…"))
                .clicked()
            {
                export_calibration_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.traces.is_empty(), egui::Button::new("Export overlay…"))
                .clicked()
            {
                export_overlay_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.traces.is_empty() {
            ui.label(format!(
                "{} traces loaded, {} with concentration",
                state.traces.len(),
                state.concentrations.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_traces_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open CV files")
        .add_filter("CV text files", &["txt", "csv", "dat"])
        .pick_files();

    if let Some(paths) = files {
        state.load_paths(&paths);
    }
}

fn table_save_dialog(title: &str, file_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(file_name)
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .add_filter("Parquet", &["parquet", "pq"])
        .save_file()
}

fn export_calibration_dialog(state: &mut AppState) {
    let Some(report) = state.report() else {
        return;
    };
    let Some(path) = table_save_dialog("Export calibration", "calibration.xlsx") else {
        return;
    };
    let result = export::export_calibration(&path, report);
    report_outcome(state, result, "export calibration");
}

fn export_overlay_dialog(state: &mut AppState) {
    let Some(path) = table_save_dialog("Export overlay", "overlay.csv") else {
        return;
    };
    let result = export::export_overlay(&path, &state.overlay());
    report_outcome(state, result, "export overlay");
}

fn load_settings_dialog(state: &mut AppState) {
    let Some(path) = settings_dialog().pick_file() else {
        return;
    };
    match AnalysisConfig::load(&path) {
        Ok(config) => {
            log::info!("Loaded settings from {}", path.display());
            state.set_config(config);
            state.status_message = None;
        }
        Err(e) => report_outcome(state, Err(e), "load settings"),
    }
}

fn save_settings_dialog(state: &mut AppState) {
    let Some(path) = settings_dialog().set_file_name("cv-settings.json").save_file() else {
        return;
    };
    let result = state.config.save(&path);
    report_outcome(state, result, "save settings");
}

fn settings_dialog() -> rfd::FileDialog {
    rfd::FileDialog::new()
        .set_title("Analysis settings")
        .add_filter("JSON", &["json"])
}

fn report_outcome(state: &mut AppState, result: anyhow::Result<()>, action: &str) {
    match result {
        Ok(()) => state.status_message = None,
        Err(e) => {
            log::error!("Failed to {action}: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
