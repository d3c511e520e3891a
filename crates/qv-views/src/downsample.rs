//! Spatial downsampling: bounded-size representative sets via grid clustering
//!
//! Reduces an arbitrarily large point set to at most `max_points` drawable
//! entries. Points landing alone in a grid cell pass through unchanged;
//! cells with more than one member collapse into a cluster positioned at
//! the member mean with the member maximum magnitude, so a cluster never
//! under-represents hazard. The whole pass is deterministic: cells are
//! emitted in sorted key order and mean/max are order-independent.

use ahash::AHashMap;
use qv_core::ViewportRect;
use qv_data::{AxisPair, EarthquakeRecord};
use tracing::warn;

/// Fallback cell edge when the data spans zero area in both axes.
const MIN_CELL_EDGE: f64 = 1e-9;

/// Edge-doubling passes attempted before collapsing everything into one
/// cluster. Each pass quarters the occupied cell count in the dense case.
const MAX_COARSEN_STEPS: u32 = 8;

/// One plottable record projected onto the active axis pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub magnitude: f64,
    pub place: String,
}

/// A synthetic aggregate of records sharing a grid cell.
///
/// Position is the member mean, magnitude the member maximum. Member ids
/// keep the input order of the pass, so identical inputs produce identical
/// clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Synthetic id derived from the grid cell, stable per pass.
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub magnitude: f64,
    pub member_ids: Vec<String>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.member_ids.len()
    }
}

/// A drawable entry handed to the chart layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotEntry {
    Single(ChartPoint),
    Cluster(Cluster),
}

impl PlotEntry {
    pub fn x(&self) -> f64 {
        match self {
            PlotEntry::Single(p) => p.x,
            PlotEntry::Cluster(c) => c.x,
        }
    }

    pub fn y(&self) -> f64 {
        match self {
            PlotEntry::Single(p) => p.y,
            PlotEntry::Cluster(c) => c.y,
        }
    }
}

/// Project records onto the active axis pair.
///
/// Ephemeral: rebuilt whenever the axis pair or the store version changes.
pub fn chart_points(records: &[EarthquakeRecord], axes: AxisPair) -> Vec<ChartPoint> {
    records
        .iter()
        .map(|r| ChartPoint {
            id: r.id.clone(),
            x: axes.x.value(r),
            y: axes.y.value(r),
            magnitude: r.magnitude,
            place: r.place.clone(),
        })
        .collect()
}

/// Reduce `points` to at most `max(max_points, 1)` drawable entries,
/// optionally restricted to a zoom viewport first.
///
/// Never fails: degenerate geometry falls back to a minimum cell edge, and
/// a set that refuses to thin out (all points coincident) comes back as a
/// single cluster. Non-finite coordinates are a contract violation by the
/// upstream collaborator; they are dropped defensively with a warning
/// rather than poisoning the grid arithmetic.
pub fn downsample(
    points: &[ChartPoint],
    max_points: usize,
    viewport: Option<&ViewportRect>,
) -> Vec<PlotEntry> {
    let mut scoped: Vec<&ChartPoint> = points
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    if scoped.len() != points.len() {
        warn!(
            dropped = points.len() - scoped.len(),
            "dropping points with non-finite coordinates"
        );
    }

    if let Some(rect) = viewport {
        scoped.retain(|p| rect.contains(p.x, p.y));
    }

    // Zooming in always trades density for fidelity: once the scoped set
    // fits the budget, render it verbatim.
    if scoped.len() <= max_points {
        return scoped
            .into_iter()
            .map(|p| PlotEntry::Single(p.clone()))
            .collect();
    }

    let budget = max_points.max(1);
    let (x_min, x_max, y_min, y_max) = extent(&scoped);
    let mut edge = initial_edge(x_max - x_min, y_max - y_min, budget);

    for _ in 0..=MAX_COARSEN_STEPS {
        let entries = grid_pass(&scoped, edge);
        if entries.len() <= budget {
            return entries;
        }
        edge *= 2.0;
    }

    vec![cluster_all(&scoped)]
}

fn extent(points: &[&ChartPoint]) -> (f64, f64, f64, f64) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for p in points {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }
    (x_min, x_max, y_min, y_max)
}

/// Cell edge targeting roughly `budget` occupied cells. A zero-span axis
/// degrades to a 1-D strip; a fully coincident set gets the minimum edge
/// (everything then shares one cell).
fn initial_edge(x_range: f64, y_range: f64, budget: usize) -> f64 {
    let area = x_range * y_range;
    if area > 0.0 {
        (area / budget as f64).sqrt()
    } else if x_range > 0.0 {
        x_range / budget as f64
    } else if y_range > 0.0 {
        y_range / budget as f64
    } else {
        MIN_CELL_EDGE
    }
}

fn grid_pass(points: &[&ChartPoint], edge: f64) -> Vec<PlotEntry> {
    let mut cells: AHashMap<(i64, i64), Vec<&ChartPoint>> = AHashMap::new();
    for p in points {
        let key = (
            (p.x / edge).floor() as i64,
            (p.y / edge).floor() as i64,
        );
        cells.entry(key).or_insert_with(Vec::new).push(p);
    }

    // Hash map iteration order is not stable; sorted keys keep the output
    // deterministic for identical inputs.
    let mut keys: Vec<(i64, i64)> = cells.keys().copied().collect();
    keys.sort();

    keys.into_iter()
        .map(|key| {
            let members = &cells[&key];
            if members.len() == 1 {
                PlotEntry::Single(members[0].clone())
            } else {
                PlotEntry::Cluster(cluster_from(
                    format!("cluster:{}:{}", key.0, key.1),
                    members,
                ))
            }
        })
        .collect()
}

fn cluster_all(points: &[&ChartPoint]) -> PlotEntry {
    PlotEntry::Cluster(cluster_from("cluster:all".to_string(), points))
}

fn cluster_from(id: String, members: &[&ChartPoint]) -> Cluster {
    let n = members.len() as f64;
    let x = members.iter().map(|p| p.x).sum::<f64>() / n;
    let y = members.iter().map(|p| p.y).sum::<f64>() / n;
    let magnitude = members
        .iter()
        .map(|p| p.magnitude)
        .fold(f64::NEG_INFINITY, f64::max);
    Cluster {
        id,
        x,
        y,
        magnitude,
        member_ids: members.iter().map(|p| p.id.clone()).collect(),
    }
}

/// Magnitude severity band driving individual point color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MagnitudeBand {
    /// < 2
    Minor,
    /// 2 – 3
    Light,
    /// 3 – 4
    Moderate,
    /// 4 – 5
    Strong,
    /// >= 5
    Major,
}

impl MagnitudeBand {
    pub fn for_magnitude(magnitude: f64) -> Self {
        if magnitude < 2.0 {
            MagnitudeBand::Minor
        } else if magnitude < 3.0 {
            MagnitudeBand::Light
        } else if magnitude < 4.0 {
            MagnitudeBand::Moderate
        } else if magnitude < 5.0 {
            MagnitudeBand::Strong
        } else {
            MagnitudeBand::Major
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MagnitudeBand::Minor => "M < 2",
            MagnitudeBand::Light => "M 2–3",
            MagnitudeBand::Moderate => "M 3–4",
            MagnitudeBand::Strong => "M 4–5",
            MagnitudeBand::Major => "M 5+",
        }
    }

    pub const ALL: [MagnitudeBand; 5] = [
        MagnitudeBand::Minor,
        MagnitudeBand::Light,
        MagnitudeBand::Moderate,
        MagnitudeBand::Strong,
        MagnitudeBand::Major,
    ];
}

/// Member-count band driving cluster marker size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClusterSizeBand {
    /// 2 – 4 members
    Small,
    /// 5 – 9 members
    Medium,
    /// 10 – 19 members
    Large,
    /// >= 20 members
    Huge,
}

impl ClusterSizeBand {
    pub fn for_size(size: usize) -> Self {
        if size < 5 {
            ClusterSizeBand::Small
        } else if size < 10 {
            ClusterSizeBand::Medium
        } else if size < 20 {
            ClusterSizeBand::Large
        } else {
            ClusterSizeBand::Huge
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClusterSizeBand::Small => "2–4 events",
            ClusterSizeBand::Medium => "5–9 events",
            ClusterSizeBand::Large => "10–19 events",
            ClusterSizeBand::Huge => "20+ events",
        }
    }
}
