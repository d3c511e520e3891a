//! Core state management for the earthquake viewer
//!
//! This crate holds the shared, view-independent state machinery: the
//! selection/hover coordinator, the zoom controller, the sort controller
//! and the event bus connecting the chart and table surfaces.

pub mod events;
pub mod selection;
pub mod sort;
pub mod zoom;

// Re-export commonly used types
pub use events::{Event, EventBus, EventHandler};
pub use selection::{
    ScrollAlign, ScrollRequest, SelectionEngine, SelectionSnapshot, SelectionSubscriber,
};
pub use sort::{SortController, SortKey, SortValue};
pub use zoom::{ViewportRect, ZoomController, ZoomSubscriber};
