//! View layer for the earthquake viewer
//!
//! Contains the two rendering surfaces (scatter chart, virtualized table)
//! and the scale-management algorithms they are built on: the spatial
//! downsampler and the row virtualizer.

pub mod downsample;
mod scatter;
mod table;
pub mod virtual_scroll;

pub use downsample::{
    chart_points, downsample, ChartPoint, Cluster, ClusterSizeBand, MagnitudeBand, PlotEntry,
};
pub use scatter::{ScatterConfig, ScatterView};
pub use table::{TableConfig, TableView};
pub use virtual_scroll::{PendingScroll, RowVirtualizer, RowWindow, ScrollBehavior, VirtualRow};

use std::sync::Arc;

use egui::Ui;
use parking_lot::RwLock;
use qv_core::{EventBus, SelectionEngine, SortController, ZoomController};
use qv_data::{AxisPair, RecordStore, TableColumn};
use uuid::Uuid;

/// Unique identifier for a view
pub type ViewId = Uuid;

/// Context passed to views during rendering
///
/// One shared instance per dashboard; every piece of cross-view state has
/// exactly one writer path and is read by both surfaces. Nothing here is a
/// hidden singleton, so multiple dashboards can coexist.
#[derive(Clone)]
pub struct ViewerContext {
    /// The canonical record store
    pub store: Arc<RwLock<RecordStore>>,

    /// Selection/hover coordinator
    pub selection: Arc<SelectionEngine>,

    /// Zoom state machine
    pub zoom: Arc<ZoomController>,

    /// Table sort criteria
    pub sort: Arc<RwLock<SortController<TableColumn>>>,

    /// Active X/Y axis assignment
    pub axes: Arc<RwLock<AxisPair>>,

    /// Interaction event bus
    pub events: Arc<EventBus>,
}

impl ViewerContext {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            selection: Arc::new(SelectionEngine::new()),
            zoom: Arc::new(ZoomController::new()),
            sort: Arc::new(RwLock::new(SortController::new())),
            axes: Arc::new(RwLock::new(AxisPair::default())),
            events: Arc::new(EventBus::new()),
        }
    }

    /// Reassign the chart axes. Axis changes redefine the coordinate space,
    /// so any zoom rectangle is cleared.
    pub fn set_axes(&self, axes: AxisPair) {
        let mut current = self.axes.write();
        if *current == axes {
            return;
        }
        *current = axes;
        drop(current);
        self.zoom.reset();
    }
}

/// Base trait for viewer panels
pub trait View: Send + Sync {
    /// Get the unique ID of this view
    fn id(&self) -> ViewId;

    /// Get the display name
    fn display_name(&self) -> &str;

    /// Draw the UI
    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui);

    /// Save configuration
    fn save_config(&self) -> serde_json::Value;

    /// Load configuration
    fn load_config(&mut self, config: serde_json::Value);
}
