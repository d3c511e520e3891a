//! USGS-style CSV catalog loading

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::record::EarthquakeRecord;
use crate::DataError;

/// Counts reported after a catalog load.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadSummary {
    pub loaded: usize,
    /// Rows dropped for missing/unparseable mandatory fields or non-finite
    /// coordinates.
    pub skipped: usize,
}

/// Raw CSV row in USGS catalog column naming. Unknown columns are ignored;
/// every field is optional so a sparse row deserializes instead of erroring.
#[derive(Debug, Deserialize)]
struct RawRow {
    time: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    depth: Option<f64>,
    mag: Option<f64>,
    id: Option<String>,
    place: Option<String>,
    #[serde(rename = "horizontalError")]
    horizontal_error: Option<f64>,
    #[serde(rename = "depthError")]
    depth_error: Option<f64>,
    #[serde(rename = "magError")]
    mag_error: Option<f64>,
}

impl RawRow {
    fn validate(self) -> Option<EarthquakeRecord> {
        let time = parse_time(self.time.as_deref()?)?;
        let record = EarthquakeRecord {
            id: self.id?,
            time,
            latitude: self.latitude?,
            longitude: self.longitude?,
            depth: self.depth?,
            magnitude: self.mag?,
            place: self.place.unwrap_or_default(),
            horizontal_error: self.horizontal_error.filter(|e| e.is_finite()),
            depth_error: self.depth_error.filter(|e| e.is_finite()),
            mag_error: self.mag_error.filter(|e| e.is_finite()),
        };
        record.is_plottable().then_some(record)
    }
}

fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Load a catalog from a CSV file on disk.
pub fn load_catalog(path: &Path) -> Result<(Vec<EarthquakeRecord>, LoadSummary), DataError> {
    let file = File::open(path)?;
    let (records, summary) = read_catalog(BufReader::new(file))?;
    info!(
        path = %path.display(),
        loaded = summary.loaded,
        skipped = summary.skipped,
        "loaded earthquake catalog"
    );
    Ok((records, summary))
}

/// Read a catalog from any reader. Rows that fail to deserialize or fail
/// validation are skipped and counted, never fatal; an entirely empty
/// result is an error.
pub fn read_catalog<R: Read>(reader: R) -> Result<(Vec<EarthquakeRecord>, LoadSummary), DataError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut summary = LoadSummary::default();

    for (row_idx, result) in csv_reader.deserialize::<RawRow>().enumerate() {
        match result {
            Ok(raw) => match raw.validate() {
                Some(record) => {
                    records.push(record);
                    summary.loaded += 1;
                }
                None => {
                    debug!(row = row_idx, "skipping row with missing or non-finite fields");
                    summary.skipped += 1;
                }
            },
            Err(err) => {
                debug!(row = row_idx, error = %err, "skipping malformed row");
                summary.skipped += 1;
            }
        }
    }

    if summary.skipped > 0 {
        warn!(
            skipped = summary.skipped,
            loaded = summary.loaded,
            "catalog contained unusable rows"
        );
    }
    if records.is_empty() {
        return Err(DataError::EmptyCatalog);
    }
    Ok((records, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "time,latitude,longitude,depth,mag,magType,nst,gap,dmin,rms,net,id,updated,place,type,horizontalError,depthError,magError,magNst,status,locationSource,magSource\n";

    #[test]
    fn valid_rows_load_with_uncertainties() {
        let csv = format!(
            "{HEADER}2024-03-01T12:00:00.000Z,61.2,-150.1,35.0,4.6,ml,,,,,ak,ak024abc,,\"Southern Alaska\",earthquake,0.3,0.5,0.1,,,ak,ak\n"
        );
        let (records, summary) = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.skipped, 0);

        let r = &records[0];
        assert_eq!(r.id, "ak024abc");
        assert_eq!(r.place, "Southern Alaska");
        assert_eq!(r.magnitude, 4.6);
        assert_eq!(r.horizontal_error, Some(0.3));
        assert_eq!(r.depth_error, Some(0.5));
    }

    #[test]
    fn rows_missing_mandatory_fields_are_skipped() {
        let csv = format!(
            "{HEADER}2024-03-01T12:00:00.000Z,61.2,-150.1,35.0,4.6,ml,,,,,ak,ak1,,Alaska,earthquake,,,,,,ak,ak\n\
             2024-03-01T13:00:00.000Z,,-150.1,35.0,4.6,ml,,,,,ak,ak2,,Alaska,earthquake,,,,,,ak,ak\n\
             not-a-time,61.2,-150.1,35.0,4.6,ml,,,,,ak,ak3,,Alaska,earthquake,,,,,,ak,ak\n"
        );
        let (records, summary) = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn optional_uncertainties_default_to_absent() {
        let csv = format!(
            "{HEADER}2024-03-01T12:00:00.000Z,61.2,-150.1,35.0,4.6,ml,,,,,ak,ak1,,Alaska,earthquake,,,,,,ak,ak\n"
        );
        let (records, _) = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(records[0].horizontal_error, None);
        assert_eq!(records[0].mag_error, None);
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let result = read_catalog(HEADER.as_bytes());
        assert!(matches!(result, Err(DataError::EmptyCatalog)));
    }
}
