//! Main application entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use eframe::egui::{self, Context};
use tracing::{debug, info};

use qv_core::events::{ClusterActivated, PointActivated, SortChanged, ZoomReset};
use qv_core::{SelectionSnapshot, SelectionSubscriber, ViewportRect, ZoomSubscriber};
use qv_data::{catalog, AxisField, LoadSummary, RecordStore};
use qv_views::{ScatterView, TableView, View, ViewerContext};

mod demo;

/// Number of synthetic events generated when no catalog file is supplied.
const DEMO_EVENT_COUNT: usize = 20_000;

/// Requests an egui repaint whenever selection or zoom state changes, so a
/// subscriber-driven update never waits for the next input event.
struct RepaintHook {
    egui_ctx: egui::Context,
}

impl SelectionSubscriber for RepaintHook {
    fn on_selection_change(&self, _snapshot: &SelectionSnapshot) {
        self.egui_ctx.request_repaint();
    }
}

impl ZoomSubscriber for RepaintHook {
    fn on_zoom_change(&self, _rect: Option<&ViewportRect>) {
        self.egui_ctx.request_repaint();
    }
}

/// Main application state
struct QuakeViewApp {
    /// Viewer context shared between both views
    viewer_context: ViewerContext,

    scatter: ScatterView,
    table: TableView,

    load_summary: LoadSummary,

    /// Kept alive so the weak subscriber registrations stay valid
    _repaint_hook: Arc<RepaintHook>,
}

impl QuakeViewApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        records: Vec<qv_data::EarthquakeRecord>,
        load_summary: LoadSummary,
    ) -> Self {
        let viewer_context = ViewerContext::new(RecordStore::with_records(records));

        let repaint_hook = Arc::new(RepaintHook {
            egui_ctx: cc.egui_ctx.clone(),
        });
        viewer_context
            .selection
            .add_subscriber(repaint_hook.clone());
        viewer_context.zoom.add_subscriber(repaint_hook.clone());

        // Trace the interaction events both surfaces publish.
        viewer_context.events.subscribe(|e: &PointActivated| {
            debug!(id = %e.id, "point activated");
        });
        viewer_context.events.subscribe(|e: &ClusterActivated| {
            debug!(members = e.member_ids.len(), "cluster activated");
        });
        viewer_context.events.subscribe(|_: &ZoomReset| {
            debug!("zoom reset");
        });
        viewer_context.events.subscribe(|e: &SortChanged| {
            debug!(column = %e.column, descending = ?e.descending, "sort changed");
        });

        Self {
            viewer_context,
            scatter: ScatterView::new(uuid::Uuid::new_v4(), "Seismicity".to_string()),
            table: TableView::new(uuid::Uuid::new_v4(), "Events".to_string()),
            load_summary,
            _repaint_hook: repaint_hook,
        }
    }

    fn axis_selector(&mut self, ui: &mut egui::Ui) {
        let current = *self.viewer_context.axes.read();
        let mut axes = current;

        egui::ComboBox::from_label("X axis")
            .selected_text(axes.x.label())
            .show_ui(ui, |ui| {
                for field in AxisField::ALL {
                    ui.selectable_value(&mut axes.x, field, field.label());
                }
            });
        egui::ComboBox::from_label("Y axis")
            .selected_text(axes.y.label())
            .show_ui(ui, |ui| {
                for field in AxisField::ALL {
                    ui.selectable_value(&mut axes.y, field, field.label());
                }
            });

        if axes != current {
            // Axis reassignment redefines the coordinate space and clears
            // any zoom rectangle.
            self.viewer_context.set_axes(axes);
        }
    }
}

impl eframe::App for QuakeViewApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Escape) {
                self.viewer_context.selection.select(None);
            }
        });

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("QuakeView");
                ui.separator();
                self.axis_selector(ui);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let total = self.viewer_context.store.read().len();
                    let mut status = format!("{total} events");
                    if self.load_summary.skipped > 0 {
                        status.push_str(&format!(" ({} rows skipped)", self.load_summary.skipped));
                    }
                    ui.label(status);
                });
            });
        });

        egui::SidePanel::left("scatter_panel")
            .resizable(true)
            .default_width(ctx.screen_rect().width() * 0.55)
            .show(ctx, |ui| {
                self.scatter.ui(&self.viewer_context, ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.table.ui(&self.viewer_context, ui);
        });
    }
}

fn load_records(path: Option<PathBuf>) -> Result<(Vec<qv_data::EarthquakeRecord>, LoadSummary)> {
    match path {
        Some(path) => {
            let (records, summary) = catalog::load_catalog(&path)?;
            Ok((records, summary))
        }
        None => {
            info!(count = DEMO_EVENT_COUNT, "no catalog given, generating demo data");
            let records = demo::generate_catalog(DEMO_EVENT_COUNT);
            let summary = LoadSummary {
                loaded: records.len(),
                skipped: 0,
            };
            Ok((records, summary))
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let (records, load_summary) = load_records(path)?;
    info!(events = records.len(), "starting QuakeView");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        default_theme: eframe::Theme::Dark,
        ..Default::default()
    };

    eframe::run_native(
        "QuakeView",
        options,
        Box::new(move |cc| Box::new(QuakeViewApp::new(cc, records, load_summary))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
