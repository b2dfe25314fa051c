use eframe::egui::{self, Color32, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints, Points};

use cv_calibrator::analysis::calibration::{CalibrationError, CalibrationReport, PeakKind};

use crate::color::{OXIDATION_COLOR, REDUCTION_COLOR};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the overlay and, when available, the calibration results.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    if state.traces.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open CV files to begin  (File → Open traces…)");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Overlay CV");
            overlay_plot(ui, state);

            match &state.calibration {
                None => {}
                Some(Ok(report)) => {
                    ui.separator();
                    calibration_section(ui, state, report);
                }
                Some(Err(CalibrationError::TooFewConcentrations { .. })) => {
                    ui.separator();
                    ui.colored_label(
                        Color32::from_rgb(230, 160, 0),
                        "At least 2 files with a concentration are needed for a calibration curve.",
                    );
                }
                Some(Err(e)) => {
                    ui.separator();
                    ui.colored_label(Color32::RED, format!("Calibration failed: {e}"));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Overlay plot
// ---------------------------------------------------------------------------

fn overlay_plot(ui: &mut Ui, state: &AppState) {
    Plot::new("overlay_plot")
        .legend(Legend::default())
        .height(360.0)
        .x_axis_label("E (V)")
        .y_axis_label("I (µA)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (idx, trace) in state.traces.iter().enumerate() {
                let points: PlotPoints = trace.points().map(|(e, i)| [e, i]).collect();
                plot_ui.line(
                    Line::new(points)
                        .name(&trace.label)
                        .color(state.color_for(idx))
                        .width(1.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------

fn calibration_section(ui: &mut Ui, state: &AppState, report: &CalibrationReport) {
    ui.columns(2, |cols| {
        calibration_plot(&mut cols[0], report, PeakKind::Oxidation);
        calibration_plot(&mut cols[1], report, PeakKind::Reduction);
    });

    ui.add_space(8.0);
    ui.strong("Calibration points");
    points_table(ui, report);

    if !state.unknowns.is_empty() {
        ui.add_space(8.0);
        ui.strong("Estimated concentrations (oxidation curve)");
        for unknown in &state.unknowns {
            let estimate = unknown
                .concentration
                .map(|c| format!("{c:.3} mM"))
                .unwrap_or_else(|| "n/a".to_string());
            ui.label(format!(
                "{}: peak {:.3} µA → {estimate}",
                unknown.label, unknown.oxidation_peak
            ));
        }
    }
}

fn calibration_plot(ui: &mut Ui, report: &CalibrationReport, kind: PeakKind) {
    let (title, color) = match kind {
        PeakKind::Oxidation => ("Oxidation calibration", OXIDATION_COLOR),
        PeakKind::Reduction => ("Reduction calibration", REDUCTION_COLOR),
    };
    let fit = report.fit(kind);
    let concs = report.concentrations();
    let peaks = report.peaks(kind);

    ui.strong(title);
    ui.label(fit.to_string());

    let measured: PlotPoints = concs.iter().zip(&peaks).map(|(&c, &p)| [c, p]).collect();
    let fitted: PlotPoints = concs.iter().map(|&c| [c, fit.predict(c)]).collect();

    Plot::new(format!("calibration_{kind}"))
        .height(260.0)
        .x_axis_label("Concentration (mM)")
        .y_axis_label("Peak I (µA)")
        .show(ui, |plot_ui| {
            plot_ui.points(Points::new(measured).radius(4.0).color(color).name("peaks"));
            plot_ui.line(
                Line::new(fitted)
                    .color(color)
                    .style(LineStyle::dashed_dense())
                    .name(fit.equation()),
            );
        });
}

fn points_table(ui: &mut Ui, report: &CalibrationReport) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(120.0))
        .columns(Column::auto().at_least(110.0), 3)
        .header(20.0, |mut header| {
            for title in ["File", "Concentration (mM)", "Ox Peak (µA)", "Red Peak (µA)"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for point in &report.points {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&point.label);
                    });
                    for value in [point.concentration, point.oxidation_peak, point.reduction_peak] {
                        row.col(|ui| {
                            ui.label(format!("{value:.4}"));
                        });
                    }
                });
            }
        });
}
