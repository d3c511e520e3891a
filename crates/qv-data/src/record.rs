//! The earthquake record type and the field enumerations built on it

use chrono::{DateTime, Utc};
use qv_core::SortValue;
use serde::{Deserialize, Serialize};

/// A single validated earthquake event.
///
/// All plottable fields (`latitude`, `longitude`, `depth`, `magnitude`) are
/// guaranteed finite by the catalog loader; the core never re-validates
/// them. The `*_error` fields are measurement uncertainties and may be
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarthquakeRecord {
    pub id: String,
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Hypocenter depth in kilometers.
    pub depth: f64,
    pub magnitude: f64,
    pub place: String,
    pub horizontal_error: Option<f64>,
    pub depth_error: Option<f64>,
    pub mag_error: Option<f64>,
}

impl EarthquakeRecord {
    /// True when every field usable as a chart axis is finite.
    pub fn is_plottable(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.depth.is_finite()
            && self.magnitude.is_finite()
    }
}

/// A numeric field selectable as a chart axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisField {
    Longitude,
    Latitude,
    Depth,
    Magnitude,
    Time,
}

impl AxisField {
    pub const ALL: [AxisField; 5] = [
        AxisField::Longitude,
        AxisField::Latitude,
        AxisField::Depth,
        AxisField::Magnitude,
        AxisField::Time,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AxisField::Longitude => "Longitude",
            AxisField::Latitude => "Latitude",
            AxisField::Depth => "Depth (km)",
            AxisField::Magnitude => "Magnitude",
            AxisField::Time => "Time",
        }
    }

    /// Extract this axis value from a record. Always finite for records
    /// admitted by the loader.
    pub fn value(&self, record: &EarthquakeRecord) -> f64 {
        match self {
            AxisField::Longitude => record.longitude,
            AxisField::Latitude => record.latitude,
            AxisField::Depth => record.depth,
            AxisField::Magnitude => record.magnitude,
            AxisField::Time => record.time.timestamp_millis() as f64,
        }
    }
}

/// The active X/Y axis assignment. Changing either axis redefines the
/// chart's coordinate space and invalidates any zoom rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisPair {
    pub x: AxisField,
    pub y: AxisField,
}

impl Default for AxisPair {
    fn default() -> Self {
        Self {
            x: AxisField::Longitude,
            y: AxisField::Latitude,
        }
    }
}

/// A sortable/displayable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableColumn {
    Time,
    Place,
    Latitude,
    Longitude,
    Depth,
    Magnitude,
}

impl TableColumn {
    pub const ALL: [TableColumn; 6] = [
        TableColumn::Time,
        TableColumn::Place,
        TableColumn::Latitude,
        TableColumn::Longitude,
        TableColumn::Depth,
        TableColumn::Magnitude,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TableColumn::Time => "Time",
            TableColumn::Place => "Place",
            TableColumn::Latitude => "Latitude",
            TableColumn::Longitude => "Longitude",
            TableColumn::Depth => "Depth",
            TableColumn::Magnitude => "Mag",
        }
    }

    /// Comparable cell value for the sort controller.
    pub fn sort_value<'a>(&self, record: &'a EarthquakeRecord) -> SortValue<'a> {
        match self {
            TableColumn::Time => SortValue::Number(record.time.timestamp_millis() as f64),
            TableColumn::Place => SortValue::Text(&record.place),
            TableColumn::Latitude => SortValue::Number(record.latitude),
            TableColumn::Longitude => SortValue::Number(record.longitude),
            TableColumn::Depth => SortValue::Number(record.depth),
            TableColumn::Magnitude => SortValue::Number(record.magnitude),
        }
    }

    /// Display text for a table cell.
    pub fn display_value(&self, record: &EarthquakeRecord) -> String {
        match self {
            TableColumn::Time => record.time.format("%Y-%m-%d %H:%M:%S").to_string(),
            TableColumn::Place => record.place.clone(),
            TableColumn::Latitude => format!("{:.4}", record.latitude),
            TableColumn::Longitude => format!("{:.4}", record.longitude),
            TableColumn::Depth => format!("{:.1}", record.depth),
            TableColumn::Magnitude => format!("{:.1}", record.magnitude),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> EarthquakeRecord {
        EarthquakeRecord {
            id: "eq1".into(),
            time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            latitude: 61.2,
            longitude: -150.1,
            depth: 35.0,
            magnitude: 4.6,
            place: "Southern Alaska".into(),
            horizontal_error: Some(0.3),
            depth_error: None,
            mag_error: Some(0.1),
        }
    }

    #[test]
    fn axis_values_come_from_the_right_fields() {
        let r = record();
        assert_eq!(AxisField::Latitude.value(&r), 61.2);
        assert_eq!(AxisField::Longitude.value(&r), -150.1);
        assert_eq!(AxisField::Depth.value(&r), 35.0);
        assert_eq!(AxisField::Magnitude.value(&r), 4.6);
        assert_eq!(AxisField::Time.value(&r), r.time.timestamp_millis() as f64);
    }

    #[test]
    fn non_finite_coordinate_makes_record_unplottable() {
        let mut r = record();
        assert!(r.is_plottable());
        r.depth = f64::NAN;
        assert!(!r.is_plottable());
    }

    #[test]
    fn place_sorts_as_text_and_magnitude_as_number() {
        let r = record();
        assert!(matches!(
            TableColumn::Place.sort_value(&r),
            SortValue::Text("Southern Alaska")
        ));
        assert!(matches!(
            TableColumn::Magnitude.sort_value(&r),
            SortValue::Number(m) if m == 4.6
        ));
    }
}
