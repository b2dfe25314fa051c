use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::model::TraceSet;

// ---------------------------------------------------------------------------
// PotentialKey – totally ordered join key
// ---------------------------------------------------------------------------

/// E value usable as a map key. `-0.0` and `0.0` compare equal.
#[derive(Debug, Clone, Copy)]
struct PotentialKey(f64);

impl PotentialKey {
    fn new(e: f64) -> Self {
        // -0.0 + 0.0 == +0.0
        PotentialKey(e + 0.0)
    }
}

impl PartialEq for PotentialKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PotentialKey {}

impl PartialOrd for PotentialKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PotentialKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// ---------------------------------------------------------------------------
// OverlayTable – wide E / I_label table
// ---------------------------------------------------------------------------

/// One row of the merged table.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRow {
    pub potential: f64,
    /// One cell per trace, in [`OverlayTable::labels`] order.
    pub currents: Vec<Option<f64>>,
}

/// All traces outer-joined on E, sorted by E ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayTable {
    pub labels: Vec<String>,
    pub rows: Vec<OverlayRow>,
}

impl OverlayTable {
    /// Column headers: `E`, then `I_<label>` per trace.
    pub fn headers(&self) -> Vec<String> {
        std::iter::once("E".to_string())
            .chain(self.labels.iter().map(|l| format!("I_{l}")))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outer-join every trace on its E values.
///
/// A potential repeated within one trace (forward and reverse sweep) is
/// matched by occurrence: the k-th sample at E in one trace shares a row with
/// the k-th sample at E in every other trace.
pub fn merge_overlay(traces: &TraceSet) -> OverlayTable {
    let labels: Vec<String> = traces.labels().map(str::to_string).collect();
    let width = labels.len();
    let mut rows: BTreeMap<(PotentialKey, usize), Vec<Option<f64>>> = BTreeMap::new();

    for (col, trace) in traces.iter().enumerate() {
        let mut occurrences: BTreeMap<PotentialKey, usize> = BTreeMap::new();
        for (e, i) in trace.points() {
            let key = PotentialKey::new(e);
            let seen = occurrences.entry(key).or_insert(0);
            let cells = rows
                .entry((key, *seen))
                .or_insert_with(|| vec![None; width]);
            cells[col] = Some(i);
            *seen += 1;
        }
    }

    let rows = rows
        .into_iter()
        .map(|((key, _), currents)| OverlayRow {
            potential: key.0,
            currents,
        })
        .collect();

    OverlayTable { labels, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Trace;

    #[test]
    fn disjoint_potentials_fill_one_column_per_row() {
        let set = TraceSet::from_traces([
            Trace::from_points("a", &[(0.2, 1.0), (0.0, 2.0)]),
            Trace::from_points("b", &[(0.1, 3.0), (0.3, 4.0)]),
        ]);
        let table = merge_overlay(&set);

        assert_eq!(table.headers(), vec!["E", "I_a", "I_b"]);
        let es: Vec<f64> = table.rows.iter().map(|r| r.potential).collect();
        assert_eq!(es, vec![0.0, 0.1, 0.2, 0.3]);
        for row in &table.rows {
            assert_eq!(row.currents.iter().filter(|c| c.is_some()).count(), 1);
        }
        assert_eq!(table.rows[1].currents, vec![None, Some(3.0)]);
    }

    #[test]
    fn shared_potentials_share_a_row() {
        let set = TraceSet::from_traces([
            Trace::from_points("a", &[(0.1, 1.0)]),
            Trace::from_points("b", &[(0.1, 2.0)]),
        ]);
        let table = merge_overlay(&set);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].currents, vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn repeated_potentials_align_by_occurrence() {
        let set = TraceSet::from_traces([
            Trace::from_points("a", &[(0.1, 1.0), (0.2, 2.0), (0.1, 3.0)]),
            Trace::from_points("b", &[(0.1, 5.0)]),
        ]);
        let table = merge_overlay(&set);

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0].currents, vec![Some(1.0), Some(5.0)]);
        assert_eq!(table.rows[1].currents, vec![Some(3.0), None]);
        assert_eq!(table.rows[2].potential, 0.2);
    }

    #[test]
    fn negative_zero_joins_positive_zero() {
        let set = TraceSet::from_traces([
            Trace::from_points("a", &[(-0.0, 1.0)]),
            Trace::from_points("b", &[(0.0, 2.0)]),
        ]);
        assert_eq!(merge_overlay(&set).len(), 1);
    }
}
