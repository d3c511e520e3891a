//! Zoom controller: the `Full` / `Zoomed(rect)` state machine
//!
//! The viewport rectangle is mutated by exactly three things: activating a
//! cluster (zoom in to its members), an explicit reset, and an axis
//! reassignment (which redefines the coordinate space and so clears it).
//! Transitions are pure synchronous state replacement.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};

/// Fractional margin added around a cluster's member bounding box.
const ZOOM_MARGIN: f64 = 0.10;

/// Nominal span given to a zero-span axis so the rectangle stays usable.
const MIN_AXIS_SPAN: f64 = 1e-6;

/// The coordinate-space rectangle currently zoomed into.
///
/// Absent (`None` at the controller level) means "full data extent".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ViewportRect {
    /// Inclusive containment test used for viewport restriction.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Build a zoom rectangle from a member bounding box, expanded by the
    /// standard margin. A degenerate axis (all members share a coordinate)
    /// is widened to a nominal minimum span around its center.
    pub fn from_bounds_with_margin(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        let (x_min, x_max) = expand_axis(x_min, x_max);
        let (y_min, y_max) = expand_axis(y_min, y_max);
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

fn expand_axis(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span <= 0.0 {
        let center = (min + max) * 0.5;
        return (center - MIN_AXIS_SPAN * 0.5, center + MIN_AXIS_SPAN * 0.5);
    }
    let margin = span * ZOOM_MARGIN;
    (min - margin, max + margin)
}

/// Trait for components that need to respond to zoom changes
pub trait ZoomSubscriber: Send + Sync {
    fn on_zoom_change(&self, rect: Option<&ViewportRect>);
}

/// Holds the current viewport rectangle and its transitions.
pub struct ZoomController {
    rect: RwLock<Option<ViewportRect>>,
    subscribers: RwLock<Vec<Weak<dyn ZoomSubscriber>>>,
}

impl ZoomController {
    pub fn new() -> Self {
        Self {
            rect: RwLock::new(None),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Zoom to a member bounding box. Replaces any current rectangle, so
    /// activating a cluster while already zoomed nests naturally.
    pub fn zoom_to_bounds(&self, x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
        let rect = ViewportRect::from_bounds_with_margin(x_min, x_max, y_min, y_max);
        *self.rect.write() = Some(rect);
        self.notify_subscribers();
    }

    /// Return to the full data extent. Returns `true` if a rectangle was
    /// actually cleared.
    pub fn reset(&self) -> bool {
        let was_zoomed = self.rect.write().take().is_some();
        if was_zoomed {
            self.notify_subscribers();
        }
        was_zoomed
    }

    pub fn current(&self) -> Option<ViewportRect> {
        *self.rect.read()
    }

    pub fn is_zoomed(&self) -> bool {
        self.rect.read().is_some()
    }

    /// Add a subscriber
    pub fn add_subscriber(&self, subscriber: Arc<dyn ZoomSubscriber>) {
        let mut subscribers = self.subscribers.write();
        subscribers.push(Arc::downgrade(&subscriber));
    }

    fn notify_subscribers(&self) {
        let rect = self.current();
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|weak| weak.strong_count() > 0);
        for weak in subscribers.iter() {
            if let Some(subscriber) = weak.upgrade() {
                subscriber.on_zoom_change(rect.as_ref());
            }
        }
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_is_applied_on_each_axis() {
        let rect = ViewportRect::from_bounds_with_margin(0.0, 10.0, 0.0, 20.0);
        assert_eq!(rect.x_min, -1.0);
        assert_eq!(rect.x_max, 11.0);
        assert_eq!(rect.y_min, -2.0);
        assert_eq!(rect.y_max, 22.0);
    }

    #[test]
    fn zero_span_axis_gets_nominal_span() {
        let rect = ViewportRect::from_bounds_with_margin(5.0, 5.0, 0.0, 10.0);
        assert!(rect.width() > 0.0);
        assert!(rect.contains(5.0, 5.0));
    }

    #[test]
    fn reset_returns_to_full_after_nested_zooms() {
        let controller = ZoomController::new();
        controller.zoom_to_bounds(0.0, 100.0, 0.0, 100.0);
        controller.zoom_to_bounds(10.0, 20.0, 10.0, 20.0);
        assert!(controller.is_zoomed());

        assert!(controller.reset());
        assert_eq!(controller.current(), None);

        // Resetting while already at full extent is a no-op.
        assert!(!controller.reset());
    }

    #[test]
    fn nested_zoom_replaces_rectangle() {
        let controller = ZoomController::new();
        controller.zoom_to_bounds(0.0, 100.0, 0.0, 100.0);
        let outer = controller.current().unwrap();
        controller.zoom_to_bounds(10.0, 20.0, 10.0, 20.0);
        let inner = controller.current().unwrap();
        assert!(inner.width() < outer.width());
    }

    #[test]
    fn containment_is_inclusive() {
        let rect = ViewportRect {
            x_min: 0.0,
            x_max: 1.0,
            y_min: 0.0,
            y_max: 1.0,
        };
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(1.0, 1.0));
        assert!(!rect.contains(1.0 + f64::EPSILON * 2.0, 0.5));
    }
}
