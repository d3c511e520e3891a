//! Sort controller: stable multi-key ordering over an immutable row set
//!
//! Sorting never mutates the canonical record store; it produces an index
//! permutation that downstream components (the virtualizer, the scroll
//! resolution in the coordinator) operate on. Absent and NaN values sort
//! last regardless of direction. String comparison is ordinal, not
//! locale-aware.

use std::cmp::Ordering;

/// One sort criterion. Criteria are ordered: later keys break ties left by
/// earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<C> {
    pub column: C,
    pub descending: bool,
}

/// A comparable cell value extracted from a row.
///
/// `Number(NaN)` is treated exactly like `Absent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
    Absent,
}

impl<'a> SortValue<'a> {
    fn is_absent(&self) -> bool {
        match self {
            SortValue::Absent => true,
            SortValue::Number(n) => n.is_nan(),
            SortValue::Text(_) => false,
        }
    }

    /// Compare two present values. Numbers order before text if a column
    /// ever mixes the two.
    fn cmp_present(&self, other: &SortValue<'a>) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
            (SortValue::Absent, _) | (_, SortValue::Absent) => Ordering::Equal,
        }
    }
}

/// Compare under one key. Absent values sort last in both directions; the
/// direction flip only applies between two present values.
fn compare_values(a: &SortValue<'_>, b: &SortValue<'_>, descending: bool) -> Ordering {
    match (a.is_absent(), b.is_absent()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.cmp_present(b);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

/// Holds the active sort criteria and produces sorted index permutations.
///
/// The UI toggle cycle on one column is ascending, then descending, then
/// unsorted (original row order). A `revision` counter lets callers memoize
/// derived orderings.
#[derive(Debug, Clone)]
pub struct SortController<C> {
    keys: Vec<SortKey<C>>,
    revision: u64,
}

impl<C: Copy + PartialEq> SortController<C> {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            revision: 0,
        }
    }

    /// Cycle the sort state of `column` and return the new primary key, or
    /// `None` when the cycle lands back on "unsorted".
    pub fn toggle(&mut self, column: C) -> Option<SortKey<C>> {
        self.revision += 1;
        match self.keys.first().copied() {
            Some(key) if key.column == column && !key.descending => {
                self.keys = vec![SortKey {
                    column,
                    descending: true,
                }];
            }
            Some(key) if key.column == column => {
                self.keys.clear();
            }
            _ => {
                self.keys = vec![SortKey {
                    column,
                    descending: false,
                }];
            }
        }
        self.keys.first().copied()
    }

    /// Replace the full criteria list (multi-column tie-breaking).
    pub fn set_keys(&mut self, keys: Vec<SortKey<C>>) {
        self.revision += 1;
        self.keys = keys;
    }

    pub fn keys(&self) -> &[SortKey<C>] {
        &self.keys
    }

    /// State of `column` in the current criteria: `None` when not sorted by
    /// it, otherwise the descending flag.
    pub fn direction_of(&self, column: C) -> Option<bool> {
        self.keys
            .iter()
            .find(|k| k.column == column)
            .map(|k| k.descending)
    }

    pub fn is_unsorted(&self) -> bool {
        self.keys.is_empty()
    }

    /// Bumped on every criteria change; memoization key for derived orders.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Produce the sorted index permutation of `rows`.
    ///
    /// The sort is stable: rows with equal keys keep their original relative
    /// order. With no criteria this is the identity permutation.
    pub fn order<R>(&self, rows: &[R], value: impl Fn(&R, C) -> SortValue<'_>) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        if self.keys.is_empty() {
            return indices;
        }

        indices.sort_by(|&a, &b| {
            for key in &self.keys {
                let va = value(&rows[a], key.column);
                let vb = value(&rows[b], key.column);
                let ord = compare_values(&va, &vb, key.descending);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        indices
    }
}

impl<C: Copy + PartialEq> Default for SortController<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Col {
        Mag,
        Place,
        Gap,
    }

    struct Row {
        mag: f64,
        place: &'static str,
        gap: Option<f64>,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                mag: 3.0,
                place: "alaska",
                gap: Some(10.0),
            },
            Row {
                mag: 1.0,
                place: "chile",
                gap: None,
            },
            Row {
                mag: 3.0,
                place: "baja",
                gap: Some(5.0),
            },
            Row {
                mag: 2.0,
                place: "alaska",
                gap: Some(f64::NAN),
            },
        ]
    }

    fn value(row: &Row, col: Col) -> SortValue<'_> {
        match col {
            Col::Mag => SortValue::Number(row.mag),
            Col::Place => SortValue::Text(row.place),
            Col::Gap => row.gap.map(SortValue::Number).unwrap_or(SortValue::Absent),
        }
    }

    #[test]
    fn sort_is_stable_across_equal_keys() {
        let rows = rows();
        let mut controller = SortController::new();
        controller.toggle(Col::Mag);

        // Rows 0 and 2 tie on magnitude 3.0 and must keep original order.
        assert_eq!(controller.order(&rows, value), vec![1, 3, 0, 2]);
    }

    #[test]
    fn toggle_cycles_ascending_descending_unsorted() {
        let rows = rows();
        let mut controller = SortController::new();

        let key = controller.toggle(Col::Mag).unwrap();
        assert!(!key.descending);

        let key = controller.toggle(Col::Mag).unwrap();
        assert!(key.descending);
        assert_eq!(controller.order(&rows, value), vec![0, 2, 3, 1]);

        assert!(controller.toggle(Col::Mag).is_none());
        assert!(controller.is_unsorted());
        // Back to original order.
        assert_eq!(controller.order(&rows, value), vec![0, 1, 2, 3]);
    }

    #[test]
    fn absent_and_nan_sort_last_in_both_directions() {
        let rows = rows();
        let mut controller = SortController::new();

        controller.toggle(Col::Gap);
        assert_eq!(controller.order(&rows, value), vec![2, 0, 1, 3]);

        controller.toggle(Col::Gap); // descending
        assert_eq!(controller.order(&rows, value), vec![0, 2, 1, 3]);
    }

    #[test]
    fn multi_key_breaks_ties() {
        let rows = rows();
        let mut controller = SortController::new();
        controller.set_keys(vec![
            SortKey {
                column: Col::Place,
                descending: false,
            },
            SortKey {
                column: Col::Mag,
                descending: true,
            },
        ]);

        // alaska rows tie on place; magnitude descending puts row 0 first.
        assert_eq!(controller.order(&rows, value), vec![0, 3, 2, 1]);
    }

    #[test]
    fn text_comparison_is_ordinal() {
        let rows = rows();
        let mut controller = SortController::new();
        controller.toggle(Col::Place);
        assert_eq!(controller.order(&rows, value), vec![0, 3, 2, 1]);
    }

    #[test]
    fn revision_tracks_every_change() {
        let mut controller: SortController<Col> = SortController::new();
        let r0 = controller.revision();
        controller.toggle(Col::Mag);
        controller.toggle(Col::Mag);
        assert_eq!(controller.revision(), r0 + 2);
    }
}
