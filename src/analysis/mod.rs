//! Peak extraction and linear calibration.
//!
//! `peaks` reads the oxidation maximum and reduction minimum inside fixed
//! potential windows, `fit` does the first-degree least-squares line and
//! `calibration` ties the two together over a labelled [`TraceSet`].
//!
//! [`TraceSet`]: crate::data::model::TraceSet

pub mod calibration;
pub mod fit;
pub mod peaks;
