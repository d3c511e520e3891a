use serde::{Deserialize, Serialize};

mod engine;
mod subscriber;

pub use engine::SelectionEngine;
pub use subscriber::SelectionSubscriber;

/// Alignment of the target row inside the viewport after an auto-scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollAlign {
    Start,
    Center,
    End,
}

/// A request to bring a record into view in the table.
///
/// The engine only knows record ids; the table resolves the id against the
/// current sorted order. An id that is not present in that order makes the
/// request a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub id: String,
    pub align: ScrollAlign,
    pub smooth: bool,
}

/// Snapshot of selection state handed to subscribers and read accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub selected_id: Option<String>,
    pub hovered_id: Option<String>,
}
