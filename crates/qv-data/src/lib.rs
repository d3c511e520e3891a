//! Earthquake catalog data handling
//!
//! Loads USGS-style CSV catalogs into the flat, validated record store that
//! everything downstream consumes. Records whose plottable fields are
//! missing or non-finite are filtered here, upstream of the core.

pub mod catalog;
pub mod record;
pub mod store;

use thiserror::Error;

// Re-exports
pub use catalog::{load_catalog, read_catalog, LoadSummary};
pub use record::{AxisField, AxisPair, EarthquakeRecord, TableColumn};
pub use store::RecordStore;

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("catalog contains no plottable records")]
    EmptyCatalog,
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => {
                DataError::Io(std::io::Error::new(io_err.kind(), error.to_string()))
            }
            _ => DataError::Csv(error.to_string()),
        }
    }
}
