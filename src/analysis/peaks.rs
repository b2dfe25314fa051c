use serde::{Deserialize, Serialize};

use crate::data::model::Trace;

/// Open potential interval `(low, high)` in volts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageWindow {
    pub low: f64,
    pub high: f64,
}

impl VoltageWindow {
    pub const fn new(low: f64, high: f64) -> Self {
        VoltageWindow { low, high }
    }

    /// Strict containment: the bounds themselves are outside.
    pub fn contains(&self, e: f64) -> bool {
        e > self.low && e < self.high
    }

    pub fn overlaps(&self, other: &VoltageWindow) -> bool {
        self.low < other.high && other.low < self.high
    }
}

impl std::fmt::Display for VoltageWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) V", self.low, self.high)
    }
}

fn currents_in<'a>(trace: &'a Trace, window: &'a VoltageWindow) -> impl Iterator<Item = f64> + 'a {
    trace
        .points()
        .filter(move |(e, _)| window.contains(*e))
        .map(|(_, i)| i)
        .filter(|i| !i.is_nan())
}

/// Largest current inside `window`, NaN when no sample falls inside.
pub fn oxidation_peak(trace: &Trace, window: &VoltageWindow) -> f64 {
    currents_in(trace, window).reduce(f64::max).unwrap_or(f64::NAN)
}

/// Smallest current inside `window`, NaN when no sample falls inside.
pub fn reduction_peak(trace: &Trace, window: &VoltageWindow) -> f64 {
    currents_in(trace, window).reduce(f64::min).unwrap_or(f64::NAN)
}
