//! Selection subscriber trait

use super::SelectionSnapshot;

/// Trait for components that need to respond to selection/hover changes
pub trait SelectionSubscriber: Send + Sync {
    /// Called when the selected or hovered id changes
    fn on_selection_change(&self, snapshot: &SelectionSnapshot);
}
