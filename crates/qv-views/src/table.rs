//! Virtualized table view
//!
//! Renders the sorted row set through the row virtualizer: only the rows in
//! the current window are materialized, each painted at its absolute pixel
//! offset inside a scroll area sized to the full extent. Header clicks
//! cycle the sort; selection scroll requests from the coordinator resolve
//! against the sorted order here.

use ahash::AHashMap;
use egui::{Align, Color32, Layout, Rect, ScrollArea, Sense, Ui};
use egui_extras::{Size, StripBuilder};
use serde_json::{json, Value};
use tracing::debug;

use qv_core::events::{PointActivated, PointHovered, SortChanged};
use qv_data::{EarthquakeRecord, TableColumn};

use crate::virtual_scroll::{RowVirtualizer, ScrollBehavior};
use crate::{View, ViewId, ViewerContext};

/// Configuration for the table view
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub title: String,
    pub row_height: f32,
    pub striped_rows: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            title: "Events".to_string(),
            row_height: 24.0,
            striped_rows: true,
        }
    }
}

/// Sorted view over the record store, memoized on store version and sort
/// revision.
struct OrderCache {
    store_version: u64,
    sort_revision: u64,
    /// Sorted position -> canonical store index.
    order: Vec<usize>,
    /// Canonical store index -> sorted position.
    position: AHashMap<usize, usize>,
}

pub struct TableView {
    id: ViewId,
    pub config: TableConfig,
    virtualizer: RowVirtualizer,
    order_cache: Option<OrderCache>,
    /// Last scroll offset observed from the scroll container.
    last_offset: f32,
    /// In-flight smooth scroll target.
    smooth_target: Option<f32>,
    /// Id last reported as hovered by this surface.
    hovering: Option<String>,
}

impl TableView {
    pub fn new(id: ViewId, title: String) -> Self {
        let config = TableConfig {
            title,
            ..Default::default()
        };
        let virtualizer = RowVirtualizer::new(config.row_height);
        Self {
            id,
            config,
            virtualizer,
            order_cache: None,
            last_offset: 0.0,
            smooth_target: None,
            hovering: None,
        }
    }

    fn refresh_order(&mut self, ctx: &ViewerContext) {
        let store = ctx.store.read();
        let sort = ctx.sort.read();
        let fresh = matches!(
            &self.order_cache,
            Some(c) if c.store_version == store.version() && c.sort_revision == sort.revision()
        );
        if fresh {
            return;
        }

        let order = sort.order(store.records(), |record: &EarthquakeRecord, column| {
            column.sort_value(record)
        });
        let position = order
            .iter()
            .enumerate()
            .map(|(pos, &idx)| (idx, pos))
            .collect();
        self.order_cache = Some(OrderCache {
            store_version: store.version(),
            sort_revision: sort.revision(),
            order,
            position,
        });
        let row_count = store.len();
        drop(sort);
        drop(store);
        self.virtualizer.set_row_count(row_count);
    }

    /// Resolve a queued selection scroll request against the sorted order.
    /// Ids not present in the current row set are silent no-ops.
    fn handle_scroll_request(&mut self, ctx: &ViewerContext) {
        let Some(request) = ctx.selection.take_scroll_request() else {
            return;
        };
        let sorted_pos = {
            let store = ctx.store.read();
            store.index_of(&request.id).and_then(|idx| {
                self.order_cache
                    .as_ref()
                    .and_then(|c| c.position.get(&idx).copied())
            })
        };
        match sorted_pos {
            Some(pos) => {
                let behavior = if request.smooth {
                    ScrollBehavior::Smooth
                } else {
                    ScrollBehavior::Instant
                };
                self.virtualizer.scroll_to_index(pos, request.align, behavior);
            }
            None => {
                debug!(id = %request.id, "scroll target not in current row set");
            }
        }
    }

    /// Merge the virtualizer's pending scroll with any in-flight smooth
    /// animation into the offset to force on the scroll container this
    /// frame.
    fn next_scroll_offset(&mut self, ui: &Ui) -> Option<f32> {
        if let Some(pending) = self.virtualizer.take_pending_scroll() {
            match pending.behavior {
                ScrollBehavior::Instant => {
                    self.smooth_target = None;
                    return Some(pending.offset);
                }
                ScrollBehavior::Smooth => self.smooth_target = Some(pending.offset),
            }
        }

        let target = self.smooth_target?;
        let current = self.last_offset;
        let next = current + (target - current) * 0.3;
        if (target - next).abs() < 0.5 {
            self.smooth_target = None;
            Some(target)
        } else {
            ui.ctx().request_repaint();
            Some(next)
        }
    }

    fn header(&mut self, ctx: &ViewerContext, ui: &mut Ui, widths: &[f32]) {
        let mut builder = StripBuilder::new(ui);
        for width in widths {
            builder = builder.size(Size::exact(*width));
        }
        builder.horizontal(|mut strip| {
            for column in TableColumn::ALL {
                strip.cell(|ui| {
                    let direction = ctx.sort.read().direction_of(column);
                    let glyph = match direction {
                        Some(false) => " ^",
                        Some(true) => " v",
                        None => "",
                    };
                    let text =
                        egui::RichText::new(format!("{}{}", column.label(), glyph)).strong();
                    if ui.add(egui::Button::new(text).frame(false)).clicked() {
                        let key = ctx.sort.write().toggle(column);
                        ctx.events.publish(SortChanged {
                            column: column.label().to_string(),
                            descending: key.map(|k| k.descending),
                        });
                    }
                });
            }
        });
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

    fn column_widths(total: f32) -> [f32; 6] {
        let time = 150.0;
        let lat = 80.0;
        let lon = 85.0;
        let depth = 60.0;
        let mag = 50.0;
        let fixed = time + lat + lon + depth + mag;
        let place = (total - fixed - 24.0).max(120.0);
        [time, place, lat, lon, depth, mag]
    }
}

impl View for TableView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.config.title
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.refresh_order(ctx);
        self.handle_scroll_request(ctx);

        let widths = Self::column_widths(ui.available_width());
        self.header(ctx, ui, &widths);
        ui.separator();

        let forced_offset = self.next_scroll_offset(ui);
        let row_height = self.config.row_height;
        let striped = self.config.striped_rows;
        let total_extent = self.virtualizer.total_extent();

        let faint_bg = ui.style().visuals.faint_bg_color;
        let selection_bg = ui.style().visuals.selection.bg_fill;
        let hover_bg = ui.style().visuals.widgets.hovered.bg_fill;
        let selection_text = ui.style().visuals.selection.stroke.color;

        let mut new_hover: Option<String> = None;
        let mut clicked_id: Option<String> = None;

        let mut scroll = ScrollArea::vertical()
            .id_source(format!("table_{:?}", self.id))
            .auto_shrink([false, false]);
        if let Some(offset) = forced_offset {
            scroll = scroll.vertical_scroll_offset(offset);
        }

        scroll.show_viewport(ui, |ui, viewport| {
            ui.set_height(total_extent.max(viewport.height()));
            self.last_offset = viewport.min.y;

            let window = self
                .virtualizer
                .window(viewport.min.y, viewport.height())
                .clone();
            let store = ctx.store.read();
            let order = match &self.order_cache {
                Some(cache) => &cache.order,
                None => return,
            };
            let origin = ui.min_rect().min;
            let width = ui.available_width();

            for row in &window.rows {
                let Some(record) = order.get(row.index).and_then(|&idx| store.get(idx)) else {
                    continue;
                };
                let rect = Rect::from_min_size(
                    egui::pos2(origin.x, origin.y + row.offset),
                    egui::vec2(width, row.height),
                );

                let response = ui.interact(
                    rect,
                    ui.id().with(("row", row.index)),
                    Sense::click(),
                );
                if response.hovered() {
                    new_hover = Some(record.id.clone());
                }
                if response.clicked() {
                    clicked_id = Some(record.id.clone());
                }

                let (is_selected, is_hovered) = ctx.selection.visual_state(&record.id);
                let bg = if is_selected {
                    Some(selection_bg)
                } else if is_hovered || response.hovered() {
                    Some(hover_bg)
                } else if striped && row.index % 2 == 1 {
                    Some(faint_bg)
                } else {
                    None
                };
                if let Some(color) = bg {
                    ui.painter().rect_filled(rect, 0.0, color);
                }

                let mut x = rect.min.x;
                for (column, col_width) in TableColumn::ALL.iter().zip(&widths) {
                    let cell_rect = Rect::from_min_size(
                        egui::pos2(x, rect.min.y),
                        egui::vec2(*col_width, row_height),
                    );
                    let text = column.display_value(record);
                    let rich = if is_selected {
                        egui::RichText::new(text).color(selection_text)
                    } else {
                        egui::RichText::new(text)
                    };
                    let mut cell_ui =
                        ui.child_ui(cell_rect, Layout::left_to_right(Align::Center));
                    cell_ui.set_clip_rect(cell_rect.intersect(ui.clip_rect()));
                    cell_ui.add(egui::Label::new(rich).wrap(false));
                    x += col_width;
                }
            }
        });

        self.report_hover(ctx, new_hover);

        if let Some(id) = clicked_id {
            if ctx.selection.select(Some(id.clone())) {
                ctx.events.publish(PointActivated { id });
            }
        }

        ui.separator();
        let count = self.virtualizer.row_count();
        let sort_label = {
            let sort = ctx.sort.read();
            if sort.is_unsorted() {
                "catalog order".to_string()
            } else {
                let key = sort.keys()[0];
                format!(
                    "{} {}",
                    key.column.label(),
                    if key.descending { "desc" } else { "asc" }
                )
            }
        };
        ui.horizontal(|ui| {
            ui.label(format!("{count} events"));
            ui.separator();
            ui.label(format!("sorted by {sort_label}"));
            if let Some(id) = ctx.selection.selected_id() {
                ui.separator();
                ui.label(
                    egui::RichText::new(format!("selected: {id}")).color(Color32::LIGHT_BLUE),
                );
            }
        });
    }

    fn save_config(&self) -> Value {
        json!({
            "title": self.config.title,
            "row_height": self.config.row_height,
            "striped_rows": self.config.striped_rows,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(title) = config.get("title").and_then(|v| v.as_str()) {
            self.config.title = title.to_string();
        }
        if let Some(row_height) = config.get("row_height").and_then(|v| v.as_f64()) {
            self.config.row_height = row_height as f32;
        }
        if let Some(striped) = config.get("striped_rows").and_then(|v| v.as_bool()) {
            self.config.striped_rows = striped;
        }
    }
}
