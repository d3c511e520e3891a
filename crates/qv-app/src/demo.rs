//! Demo mode: synthetic earthquake catalog
//!
//! Generates a deterministic catalog clustered around a handful of fault
//! zones so the downsampler, zoom and table have realistic structure to
//! work with when no CSV is supplied.

use chrono::{Duration, TimeZone, Utc};
use qv_data::EarthquakeRecord;

struct FaultZone {
    name: &'static str,
    latitude: f64,
    longitude: f64,
    /// Scatter radius in degrees.
    spread: f64,
    max_depth: f64,
}

const ZONES: [FaultZone; 6] = [
    FaultZone {
        name: "Southern Alaska",
        latitude: 61.0,
        longitude: -150.0,
        spread: 4.0,
        max_depth: 200.0,
    },
    FaultZone {
        name: "Central California",
        latitude: 36.5,
        longitude: -118.5,
        spread: 2.0,
        max_depth: 25.0,
    },
    FaultZone {
        name: "Honshu, Japan",
        latitude: 38.0,
        longitude: 142.5,
        spread: 3.5,
        max_depth: 500.0,
    },
    FaultZone {
        name: "Central Chile",
        latitude: -31.5,
        longitude: -71.5,
        spread: 3.0,
        max_depth: 120.0,
    },
    FaultZone {
        name: "Tonga Trench",
        latitude: -20.0,
        longitude: -174.0,
        spread: 2.5,
        max_depth: 650.0,
    },
    FaultZone {
        name: "Aegean Sea",
        latitude: 38.5,
        longitude: 25.5,
        spread: 2.0,
        max_depth: 40.0,
    },
];

/// Deterministic pseudo-noise in `[0, 1)`.
fn noise(i: usize, salt: f64) -> f64 {
    let v = ((i as f64 + 1.0) * 12.9898 + salt * 78.233).sin() * 43758.5453;
    v - v.floor()
}

/// Generate `count` synthetic events. Same count, same catalog.
pub fn generate_catalog(count: usize) -> Vec<EarthquakeRecord> {
    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid demo epoch");

    (0..count)
        .map(|i| {
            let zone = &ZONES[(noise(i, 1.0) * ZONES.len() as f64) as usize % ZONES.len()];

            let latitude = zone.latitude + (noise(i, 2.0) - 0.5) * zone.spread * 2.0;
            let longitude = zone.longitude + (noise(i, 3.0) - 0.5) * zone.spread * 2.0;
            let depth = noise(i, 4.0).powi(2) * zone.max_depth;
            // Small events vastly outnumber large ones.
            let magnitude = 0.5 + noise(i, 5.0).powi(3) * 7.0;
            let time = start + Duration::seconds((noise(i, 6.0) * 31_536_000.0) as i64);

            EarthquakeRecord {
                id: format!("demo{i:06}"),
                time,
                latitude,
                longitude,
                depth,
                magnitude: (magnitude * 10.0).round() / 10.0,
                place: zone.name.to_string(),
                horizontal_error: (noise(i, 7.0) > 0.3).then(|| noise(i, 8.0) * 2.0),
                depth_error: (noise(i, 9.0) > 0.3).then(|| noise(i, 10.0) * 5.0),
                mag_error: (noise(i, 11.0) > 0.3).then(|| noise(i, 12.0) * 0.3),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_deterministic_and_plottable() {
        let a = generate_catalog(500);
        let b = generate_catalog(500);
        assert_eq!(a.len(), 500);
        assert!(a.iter().all(|r| r.is_plottable()));
        assert!(a
            .iter()
            .zip(&b)
            .all(|(x, y)| x.id == y.id && x.latitude == y.latitude));
    }

    #[test]
    fn ids_are_unique() {
        let catalog = generate_catalog(1000);
        let unique: std::collections::HashSet<_> = catalog.iter().map(|r| &r.id).collect();
        assert_eq!(unique.len(), catalog.len());
    }
}
