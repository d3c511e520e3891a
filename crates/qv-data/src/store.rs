//! The canonical in-memory record store

use crate::record::EarthquakeRecord;
use ahash::AHashMap;

/// Flat, already-validated array of records plus an id lookup index.
///
/// Derived collections (chart points, clusters, sorted orders) key their
/// memoization on `version`, which changes whenever the contents are
/// replaced. The store itself is never mutated in place.
pub struct RecordStore {
    records: Vec<EarthquakeRecord>,
    id_index: AHashMap<String, usize>,
    version: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            id_index: AHashMap::new(),
            version: 0,
        }
    }

    pub fn with_records(records: Vec<EarthquakeRecord>) -> Self {
        let mut store = Self::new();
        store.replace(records);
        store
    }

    /// Swap in a new record set, rebuilding the id index and bumping the
    /// version so every downstream cache invalidates.
    pub fn replace(&mut self, records: Vec<EarthquakeRecord>) {
        self.id_index = records
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.id.clone(), idx))
            .collect();
        self.records = records;
        self.version += 1;
    }

    pub fn records(&self) -> &[EarthquakeRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&EarthquakeRecord> {
        self.records.get(index)
    }

    /// Canonical (unsorted) index of a record id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str) -> EarthquakeRecord {
        EarthquakeRecord {
            id: id.into(),
            time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            latitude: 0.0,
            longitude: 0.0,
            depth: 10.0,
            magnitude: 2.0,
            place: String::new(),
            horizontal_error: None,
            depth_error: None,
            mag_error: None,
        }
    }

    #[test]
    fn replace_rebuilds_index_and_bumps_version() {
        let mut store = RecordStore::new();
        let v0 = store.version();

        store.replace(vec![record("a"), record("b")]);
        assert_eq!(store.version(), v0 + 1);
        assert_eq!(store.index_of("b"), Some(1));

        store.replace(vec![record("c")]);
        assert_eq!(store.version(), v0 + 2);
        assert_eq!(store.index_of("b"), None);
        assert_eq!(store.index_of("c"), Some(0));
    }
}
