use crate::config::{AnalysisConfig, ConfigError};
use crate::data::concentration::ConcentrationMap;
use crate::data::model::TraceSet;

use super::fit::{FitError, LinearFit, fit_line};
use super::peaks::{oxidation_peak, reduction_peak};

/// Minimum number of labelled traces a calibration curve needs.
pub const MIN_CALIBRATION_POINTS: usize = 2;

/// Peak currents of one labelled trace.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationPoint {
    pub label: String,
    /// Concentration in mM.
    pub concentration: f64,
    pub oxidation_peak: f64,
    pub reduction_peak: f64,
}

/// Which branch of the voltammogram a fit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakKind {
    Oxidation,
    Reduction,
}

impl std::fmt::Display for PeakKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeakKind::Oxidation => write!(f, "oxidation"),
            PeakKind::Reduction => write!(f, "reduction"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("need at least 2 files with a concentration, found {found}")]
    TooFewConcentrations { found: usize },

    #[error("{kind} fit failed: {source}")]
    Fit {
        kind: PeakKind,
        #[source]
        source: FitError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Points sorted by concentration plus both calibration lines.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    pub points: Vec<CalibrationPoint>,
    pub oxidation: LinearFit,
    pub reduction: LinearFit,
}

impl CalibrationReport {
    pub fn concentrations(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.concentration).collect()
    }

    pub fn oxidation_peaks(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.oxidation_peak).collect()
    }

    pub fn reduction_peaks(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.reduction_peak).collect()
    }

    pub fn fit(&self, kind: PeakKind) -> &LinearFit {
        match kind {
            PeakKind::Oxidation => &self.oxidation,
            PeakKind::Reduction => &self.reduction,
        }
    }

    pub fn peaks(&self, kind: PeakKind) -> Vec<f64> {
        match kind {
            PeakKind::Oxidation => self.oxidation_peaks(),
            PeakKind::Reduction => self.reduction_peaks(),
        }
    }
}

/// Extract peak currents for every trace with a known concentration.
/// Points come back in trace order.
pub fn calibration_points(
    traces: &TraceSet,
    concentrations: &ConcentrationMap,
    config: &AnalysisConfig,
) -> Vec<CalibrationPoint> {
    traces
        .iter()
        .filter_map(|trace| {
            let concentration = *concentrations.get(&trace.label)?;
            Some(CalibrationPoint {
                label: trace.label.clone(),
                concentration,
                oxidation_peak: oxidation_peak(trace, &config.oxidation_window),
                reduction_peak: reduction_peak(trace, &config.reduction_window),
            })
        })
        .collect()
}

/// Build oxidation and reduction calibration curves.
pub fn calibrate(
    traces: &TraceSet,
    concentrations: &ConcentrationMap,
    config: &AnalysisConfig,
) -> Result<CalibrationReport, CalibrationError> {
    config.validate()?;

    let mut points = calibration_points(traces, concentrations, config);
    if points.len() < MIN_CALIBRATION_POINTS {
        return Err(CalibrationError::TooFewConcentrations { found: points.len() });
    }
    points.sort_by(|a, b| a.concentration.total_cmp(&b.concentration));

    let concs: Vec<f64> = points.iter().map(|p| p.concentration).collect();
    let fit = |kind: PeakKind, peaks: Vec<f64>| {
        fit_line(&concs, &peaks).map_err(|source| CalibrationError::Fit { kind, source })
    };
    let oxidation = fit(
        PeakKind::Oxidation,
        points.iter().map(|p| p.oxidation_peak).collect(),
    )?;
    let reduction = fit(
        PeakKind::Reduction,
        points.iter().map(|p| p.reduction_peak).collect(),
    )?;

    log::info!(
        "Calibrated {} points: oxidation {oxidation}; reduction {reduction}",
        points.len()
    );

    Ok(CalibrationReport {
        points,
        oxidation,
        reduction,
    })
}

/// Concentration estimate for a trace that was not part of the calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownEstimate {
    pub label: String,
    pub oxidation_peak: f64,
    /// `None` when the oxidation line is flat or the peak is undefined.
    pub concentration: Option<f64>,
}

/// Read the concentration of every unlabelled trace off the oxidation line.
pub fn estimate_unknowns(
    report: &CalibrationReport,
    traces: &TraceSet,
    concentrations: &ConcentrationMap,
    config: &AnalysisConfig,
) -> Vec<UnknownEstimate> {
    traces
        .iter()
        .filter(|t| !concentrations.contains_key(&t.label))
        .map(|trace| {
            let peak = oxidation_peak(trace, &config.oxidation_window);
            UnknownEstimate {
                label: trace.label.clone(),
                oxidation_peak: peak,
                concentration: report.oxidation.invert(peak).filter(|c| c.is_finite()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Trace;

    /// Oxidation peak at 0.42 V equal to `ox`, reduction trough at 0.05 V equal to `red`.
    fn trace(label: &str, ox: f64, red: f64) -> Trace {
        Trace::from_points(label, &[(-0.2, 0.0), (0.05, red), (0.2, 0.0), (0.42, ox), (0.6, 0.0)])
    }

    fn concs(entries: &[(&str, f64)]) -> ConcentrationMap {
        entries.iter().map(|(l, c)| (l.to_string(), *c)).collect()
    }

    #[test]
    fn single_concentration_is_skipped() {
        let traces = TraceSet::from_traces([trace("a", 1.0, -1.0), trace("b", 2.0, -2.0)]);
        let result = calibrate(&traces, &concs(&[("a", 1.0)]), &AnalysisConfig::default());
        assert_eq!(result, Err(CalibrationError::TooFewConcentrations { found: 1 }));
    }

    #[test]
    fn fits_sorted_points() {
        let traces = TraceSet::from_traces([
            trace("c3", 7.0, -4.0),
            trace("c1", 3.0, -2.0),
            trace("blank", 100.0, -100.0),
            trace("c2", 5.0, -3.0),
        ]);
        let map = concs(&[("c3", 3.0), ("c1", 1.0), ("c2", 2.0)]);
        let report = calibrate(&traces, &map, &AnalysisConfig::default()).unwrap();

        assert_eq!(report.concentrations(), vec![1.0, 2.0, 3.0]);
        assert_eq!(report.oxidation_peaks(), vec![3.0, 5.0, 7.0]);
        assert!((report.oxidation.slope - 2.0).abs() < 1e-12);
        assert!((report.oxidation.intercept - 1.0).abs() < 1e-12);
        assert!((report.reduction.slope + 1.0).abs() < 1e-12);
        assert!((report.reduction.r_squared - 1.0).abs() < 1e-12);

        let unknowns = estimate_unknowns(&report, &traces, &map, &AnalysisConfig::default());
        assert_eq!(unknowns.len(), 1);
        assert_eq!(unknowns[0].label, "blank");
        assert!((unknowns[0].concentration.unwrap() - 49.5).abs() < 1e-9);
    }

    #[test]
    fn identical_concentrations_fail() {
        let traces = TraceSet::from_traces([trace("a", 1.0, -1.0), trace("b", 2.0, -2.0)]);
        let err = calibrate(&traces, &concs(&[("a", 1.0), ("b", 1.0)]), &AnalysisConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            CalibrationError::Fit {
                kind: PeakKind::Oxidation,
                source: FitError::ZeroVariance
            }
        );
    }

    #[test]
    fn empty_window_propagates_nan() {
        let traces = TraceSet::from_traces([
            Trace::from_points("a", &[(0.42, 1.0)]),
            trace("b", 2.0, -2.0),
        ]);
        let report =
            calibrate(&traces, &concs(&[("a", 1.0), ("b", 2.0)]), &AnalysisConfig::default())
                .unwrap();
        assert!(report.points[0].reduction_peak.is_nan());
        assert!(report.reduction.slope.is_nan());
        assert!(!report.oxidation.slope.is_nan());
    }

    #[test]
    fn concentrations_for_missing_traces_are_ignored() {
        let traces = TraceSet::from_traces([trace("a", 1.0, -1.0)]);
        let result = calibrate(
            &traces,
            &concs(&[("a", 1.0), ("ghost", 2.0)]),
            &AnalysisConfig::default(),
        );
        assert_eq!(result, Err(CalibrationError::TooFewConcentrations { found: 1 }));
    }
}
