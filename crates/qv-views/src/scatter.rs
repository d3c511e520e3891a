//! Scatter chart view
//!
//! Renders the downsampled entry set with egui_plot. Individual points are
//! colored by magnitude band; clusters are sized and colored by member
//! count band. Clicking a point routes to the selection coordinator,
//! clicking a cluster routes to the zoom controller; clusters are never
//! selectable or hoverable themselves.

use ahash::AHashMap;
use egui::{Align2, Color32, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotBounds, PlotPoint, Points, Text};
use serde_json::{json, Value};

use qv_core::events::{ClusterActivated, PointActivated, PointHovered, ZoomReset};
use qv_core::ViewportRect;
use qv_data::AxisPair;

use crate::downsample::{
    chart_points, downsample, ChartPoint, ClusterSizeBand, MagnitudeBand, PlotEntry,
};
use crate::{View, ViewId, ViewerContext};

/// Configuration for the scatter view
#[derive(Debug, Clone)]
pub struct ScatterConfig {
    pub title: String,
    /// Downsampling budget: at most this many drawable entries per frame.
    pub max_points: usize,
    pub point_radius: f32,
    pub show_grid: bool,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            title: "Seismicity".to_string(),
            max_points: 800,
            point_radius: 2.5,
            show_grid: true,
        }
    }
}

#[derive(Clone, PartialEq)]
struct PointsKey {
    store_version: u64,
    axes: AxisPair,
}

#[derive(Clone, PartialEq)]
struct EntriesKey {
    points: PointsKey,
    zoom: Option<ViewportRect>,
    max_points: usize,
}

/// Derived chart points for the active axis pair, with an id lookup.
struct PointsCache {
    key: PointsKey,
    points: Vec<ChartPoint>,
    index: AHashMap<String, usize>,
}

struct EntriesCache {
    key: EntriesKey,
    entries: Vec<PlotEntry>,
}

pub struct ScatterView {
    id: ViewId,
    pub config: ScatterConfig,
    points_cache: Option<PointsCache>,
    entries_cache: Option<EntriesCache>,
    /// Id last reported as hovered by this surface.
    hovering: Option<String>,
}

impl ScatterView {
    pub fn new(id: ViewId, title: String) -> Self {
        Self {
            id,
            config: ScatterConfig {
                title,
                ..Default::default()
            },
            points_cache: None,
            entries_cache: None,
            hovering: None,
        }
    }

    /// Rebuild the derived collections when their inputs changed. Both are
    /// pure functions of upstream state, memoized on input versions.
    fn refresh_caches(&mut self, ctx: &ViewerContext) {
        let axes = *ctx.axes.read();
        let store = ctx.store.read();
        let points_key = PointsKey {
            store_version: store.version(),
            axes,
        };

        let points_stale = !matches!(&self.points_cache, Some(c) if c.key == points_key);
        if points_stale {
            let points = chart_points(store.records(), axes);
            let index = points
                .iter()
                .enumerate()
                .map(|(idx, p)| (p.id.clone(), idx))
                .collect();
            self.points_cache = Some(PointsCache {
                key: points_key.clone(),
                points,
                index,
            });
            self.entries_cache = None;
        }
        drop(store);

        let entries_key = EntriesKey {
            points: points_key,
            zoom: ctx.zoom.current(),
            max_points: self.config.max_points,
        };
        let entries_stale = !matches!(&self.entries_cache, Some(c) if c.key == entries_key);
        if entries_stale {
            let points_cache = self
                .points_cache
                .as_ref()
                .expect("points cache refreshed above");
            let entries = downsample(
                &points_cache.points,
                entries_key.max_points,
                entries_key.zoom.as_ref(),
            );
            self.entries_cache = Some(EntriesCache {
                key: entries_key,
                entries,
            });
        }
    }

    /// Bounding box of a cluster's members in the current axis space.
    fn member_bounds(&self, member_ids: &[String]) -> Option<(f64, f64, f64, f64)> {
        let cache = self.points_cache.as_ref()?;
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for id in member_ids {
            let point = cache.index.get(id).map(|&idx| &cache.points[idx])?;
            bounds = Some(match bounds {
                None => (point.x, point.x, point.y, point.y),
                Some((x_min, x_max, y_min, y_max)) => (
                    x_min.min(point.x),
                    x_max.max(point.x),
                    y_min.min(point.y),
                    y_max.max(point.y),
                ),
            });
        }
        bounds
    }

    /// Push a hover change to the coordinator, once per actual change.
    ///
    /// Clearing only goes through while the coordinator still holds the id
    /// this surface reported; otherwise the pointer moved to the other
    /// surface within the same frame and its hover must stand.
    fn report_hover(&mut self, ctx: &ViewerContext, new_hover: Option<String>) {
        if new_hover == self.hovering {
            return;
        }
        let released = std::mem::replace(&mut self.hovering, new_hover.clone());
        if new_hover.is_none() && ctx.selection.hovered_id() != released {
            return;
        }
        if ctx.selection.hover(new_hover.clone()) {
            ctx.events.publish(PointHovered { id: new_hover });
        }
    }

    fn plot_bounds(&self, zoom: Option<ViewportRect>) -> Option<PlotBounds> {
        if let Some(rect) = zoom {
            return Some(PlotBounds::from_min_max(
                [rect.x_min, rect.y_min],
                [rect.x_max, rect.y_max],
            ));
        }

        let cache = self.points_cache.as_ref()?;
        if cache.points.is_empty() {
            return None;
        }
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for p in &cache.points {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
        let x_pad = ((x_max - x_min) * 0.1).max(1e-6);
        let y_pad = ((y_max - y_min) * 0.1).max(1e-6);
        Some(PlotBounds::from_min_max(
            [x_min - x_pad, y_min - y_pad],
            [x_max + x_pad, y_max + y_pad],
        ))
    }
}

fn magnitude_color(band: MagnitudeBand) -> Color32 {
    match band {
        MagnitudeBand::Minor => Color32::from_rgb(127, 127, 127),
        MagnitudeBand::Light => Color32::from_rgb(44, 160, 44),
        MagnitudeBand::Moderate => Color32::from_rgb(255, 221, 64),
        MagnitudeBand::Strong => Color32::from_rgb(255, 127, 14),
        MagnitudeBand::Major => Color32::from_rgb(214, 39, 40),
    }
}

fn cluster_color(band: ClusterSizeBand) -> Color32 {
    match band {
        ClusterSizeBand::Small => Color32::from_rgb(116, 169, 207),
        ClusterSizeBand::Medium => Color32::from_rgb(54, 144, 192),
        ClusterSizeBand::Large => Color32::from_rgb(5, 112, 176),
        ClusterSizeBand::Huge => Color32::from_rgb(3, 78, 123),
    }
}

fn cluster_radius(band: ClusterSizeBand) -> f32 {
    match band {
        ClusterSizeBand::Small => 6.0,
        ClusterSizeBand::Medium => 8.0,
        ClusterSizeBand::Large => 10.0,
        ClusterSizeBand::Huge => 13.0,
    }
}

impl View for ScatterView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.config.title
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.refresh_caches(ctx);

        let zoom = ctx.zoom.current();
        let axes = *ctx.axes.read();
        let total = self
            .points_cache
            .as_ref()
            .map(|c| c.points.len())
            .unwrap_or(0);
        let entries: Vec<PlotEntry> = self
            .entries_cache
            .as_ref()
            .map(|c| c.entries.clone())
            .unwrap_or_default();

        ui.horizontal(|ui| {
            ui.label(format!("X: {}", axes.x.label()));
            ui.separator();
            ui.label(format!("Y: {}", axes.y.label()));
            ui.separator();
            ui.label(format!("Rendered: {} of {}", entries.len(), total));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(zoom.is_some(), egui::Button::new("Reset zoom"))
                    .clicked()
                {
                    ctx.zoom.reset();
                    ctx.events.publish(ZoomReset);
                }
            });
        });
        ui.separator();

        if entries.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("No data to display");
            });
            return;
        }

        let snapshot = ctx.selection.snapshot();
        let bounds = self.plot_bounds(zoom);
        let point_radius = self.config.point_radius;

        let plot = Plot::new(format!("{:?}", self.id))
            .legend(Legend::default())
            .show_grid(self.config.show_grid)
            .auto_bounds(egui::Vec2b::new(false, false))
            .allow_scroll(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_boxed_zoom(false)
            .x_axis_label(axes.x.label())
            .y_axis_label(axes.y.label());

        let mut clicked: Option<usize> = None;
        let mut hovered: Option<usize> = None;

        let response = plot.show(ui, |plot_ui| {
            if let Some(bounds) = bounds {
                plot_ui.set_plot_bounds(bounds);
            }

            // Singles grouped by magnitude band so the legend shows bands.
            for band in MagnitudeBand::ALL {
                let series: Vec<[f64; 2]> = entries
                    .iter()
                    .filter_map(|e| match e {
                        PlotEntry::Single(p)
                            if MagnitudeBand::for_magnitude(p.magnitude) == band =>
                        {
                            Some([p.x, p.y])
                        }
                        _ => None,
                    })
                    .collect();
                if series.is_empty() {
                    continue;
                }
                plot_ui.points(
                    Points::new(series)
                        .color(magnitude_color(band))
                        .radius(point_radius)
                        .shape(MarkerShape::Circle)
                        .name(band.label()),
                );
            }

            // Clusters, sized and colored by member count.
            for entry in &entries {
                if let PlotEntry::Cluster(cluster) = entry {
                    let band = ClusterSizeBand::for_size(cluster.size());
                    plot_ui.points(
                        Points::new(vec![[cluster.x, cluster.y]])
                            .color(cluster_color(band))
                            .radius(cluster_radius(band))
                            .shape(MarkerShape::Diamond)
                            .name(band.label()),
                    );
                }
            }

            // Selection ring dominates; hover highlight only on unselected.
            for entry in &entries {
                if let PlotEntry::Single(p) = entry {
                    let selected = snapshot.selected_id.as_deref() == Some(p.id.as_str());
                    let hovered_here = !selected
                        && snapshot.hovered_id.as_deref() == Some(p.id.as_str());
                    if selected || hovered_here {
                        let color = magnitude_color(MagnitudeBand::for_magnitude(p.magnitude));
                        let radius = if selected {
                            point_radius * 2.5
                        } else {
                            point_radius * 1.8
                        };
                        plot_ui.points(
                            Points::new(vec![[p.x, p.y]])
                                .color(color.gamma_multiply(1.5))
                                .radius(radius)
                                .shape(MarkerShape::Circle),
                        );
                        if selected {
                            plot_ui.text(
                                Text::new(
                                    PlotPoint::new(p.x, p.y),
                                    egui::RichText::new(format!(
                                        "{} (M{:.1})",
                                        p.place, p.magnitude
                                    ))
                                    .color(Color32::WHITE)
                                    .text_style(egui::TextStyle::Small),
                                )
                                .anchor(Align2::LEFT_BOTTOM),
                            );
                        }
                    }
                }
            }

            // Nearest-entry hit testing for hover and click.
            if let Some(pointer) = plot_ui.pointer_coordinate() {
                let mut best_dist = f64::INFINITY;
                let mut best_idx = None;
                for (idx, entry) in entries.iter().enumerate() {
                    let dx = entry.x() - pointer.x;
                    let dy = entry.y() - pointer.y;
                    let dist = (dx * dx + dy * dy).sqrt();
                    if dist < best_dist {
                        best_dist = dist;
                        best_idx = Some(idx);
                    }
                }

                let plot_bounds = plot_ui.plot_bounds();
                let threshold = 0.02 * plot_bounds.width().max(plot_bounds.height());
                if best_dist < threshold {
                    hovered = best_idx;
                    if plot_ui.response().clicked() {
                        clicked = best_idx;
                    }
                }
            }
        });

        // Hover bookkeeping: only singles are hoverable, and we only push a
        // coordinator update when this surface's hover actually changed.
        let hover_id = hovered.and_then(|idx| match &entries[idx] {
            PlotEntry::Single(p) => Some(p.id.clone()),
            PlotEntry::Cluster(_) => None,
        });
        let pointer_on_plot = response.response.hovered();
        let new_hover = if pointer_on_plot { hover_id } else { None };
        self.report_hover(ctx, new_hover);

        if let Some(idx) = clicked {
            match &entries[idx] {
                PlotEntry::Single(p) => {
                    if ctx.selection.select(Some(p.id.clone())) {
                        ctx.events.publish(PointActivated { id: p.id.clone() });
                    }
                }
                PlotEntry::Cluster(cluster) => {
                    if let Some((x_min, x_max, y_min, y_max)) =
                        self.member_bounds(&cluster.member_ids)
                    {
                        ctx.zoom.zoom_to_bounds(x_min, x_max, y_min, y_max);
                        ctx.events.publish(ClusterActivated {
                            member_ids: cluster.member_ids.clone(),
                        });
                    }
                }
            }
        }
    }

    fn save_config(&self) -> Value {
        json!({
            "title": self.config.title,
            "max_points": self.config.max_points,
            "point_radius": self.config.point_radius,
            "show_grid": self.config.show_grid,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(title) = config.get("title").and_then(|v| v.as_str()) {
            self.config.title = title.to_string();
        }
        if let Some(max_points) = config.get("max_points").and_then(|v| v.as_u64()) {
            self.config.max_points = max_points as usize;
        }
        if let Some(radius) = config.get("point_radius").and_then(|v| v.as_f64()) {
            self.config.point_radius = radius as f32;
        }
        if let Some(show_grid) = config.get("show_grid").and_then(|v| v.as_bool()) {
            self.config.show_grid = show_grid;
        }
    }
}
