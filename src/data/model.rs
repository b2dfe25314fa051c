use std::path::Path;

// ---------------------------------------------------------------------------
// Trace – one voltammogram (one input file)
// ---------------------------------------------------------------------------

/// A single cyclic voltammogram: potential/current samples in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Display label, derived from the file name.
    pub label: String,
    /// Potential axis E in volts.
    pub potential: Vec<f64>,
    /// Current axis I in microamps – same length as `potential`.
    pub current: Vec<f64>,
}

impl Trace {
    pub fn new(label: impl Into<String>, potential: Vec<f64>, current: Vec<f64>) -> Self {
        debug_assert_eq!(potential.len(), current.len());
        Trace {
            label: label.into(),
            potential,
            current,
        }
    }

    /// Build a trace from `(E, I)` pairs.
    pub fn from_points(label: impl Into<String>, points: &[(f64, f64)]) -> Self {
        let (potential, current) = points.iter().copied().unzip();
        Trace::new(label, potential, current)
    }

    /// Label for a file: its name without the last extension.
    pub fn label_from_path(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    /// Iterate `(E, I)` pairs in file order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.potential.iter().copied().zip(self.current.iter().copied())
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.potential.len()
    }

    /// Whether the trace holds no samples.
    pub fn is_empty(&self) -> bool {
        self.potential.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TraceSet – every loaded file, in load order
// ---------------------------------------------------------------------------

/// All loaded traces, ordered by insertion (file order).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceSet {
    traces: Vec<Trace>,
}

impl TraceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect traces through [`TraceSet::insert`], so duplicate labels collapse.
    pub fn from_traces(traces: impl IntoIterator<Item = Trace>) -> Self {
        let mut set = TraceSet::new();
        for trace in traces {
            set.insert(trace);
        }
        set
    }

    /// Add a trace. A trace with an already-present label replaces the
    /// earlier samples but keeps the earlier position. Returns `true` when
    /// something was replaced.
    pub fn insert(&mut self, trace: Trace) -> bool {
        match self.traces.iter_mut().find(|t| t.label == trace.label) {
            Some(existing) => {
                log::warn!("Replacing samples of duplicate label '{}'", trace.label);
                *existing = trace;
                true
            }
            None => {
                self.traces.push(trace);
                false
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.label == label)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trace> {
        self.traces.iter()
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.traces.iter().map(|t| t.label.as_str())
    }

    pub fn clear(&mut self) {
        self.traces.clear();
    }

    /// Number of traces.
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Whether no trace is loaded.
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

impl<'a> IntoIterator for &'a TraceSet {
    type Item = &'a Trace;
    type IntoIter = std::slice::Iter<'a, Trace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_strips_only_last_extension() {
        assert_eq!(Trace::label_from_path(Path::new("dir/a_5mm.txt")), "a_5mm");
        assert_eq!(Trace::label_from_path(Path::new("run.1.txt")), "run.1");
        assert_eq!(Trace::label_from_path(Path::new("noext")), "noext");
    }

    #[test]
    fn duplicate_label_replaces_in_place() {
        let mut set = TraceSet::new();
        set.insert(Trace::from_points("a", &[(0.0, 1.0)]));
        set.insert(Trace::from_points("b", &[(0.0, 2.0)]));
        let replaced = set.insert(Trace::from_points("a", &[(0.0, 3.0), (0.1, 4.0)]));

        assert!(replaced);
        assert_eq!(set.labels().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(set.get("a").map(Trace::len), Some(2));
    }
}
