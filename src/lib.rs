//! Cyclic voltammetry calibration: load CV traces, label them with a
//! concentration, read oxidation/reduction peak currents inside fixed
//! potential windows, fit peak current against concentration and export the
//! tables.

pub mod analysis;
pub mod config;
pub mod data;
pub mod export;

pub use analysis::calibration::{CalibrationError, CalibrationReport, calibrate};
pub use config::AnalysisConfig;
pub use data::model::{Trace, TraceSet};
