//! Selection/hover coordinator implementation

use super::{ScrollAlign, ScrollRequest, SelectionSnapshot, SelectionSubscriber};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};

/// The single source of truth for cross-view selection and hover state.
///
/// Both the chart and the table read from and write into the same engine.
/// Selection and hover are independent: setting one never clears the other.
/// Every *change* of selection to a concrete id queues exactly one scroll
/// request for the table to consume; re-selecting the already selected id
/// queues nothing, so duplicate click events cannot cause scroll jank.
pub struct SelectionEngine {
    state: RwLock<SelectionSnapshot>,
    pending_scroll: Mutex<Option<ScrollRequest>>,
    subscribers: RwLock<Vec<Weak<dyn SelectionSubscriber>>>,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SelectionSnapshot::default()),
            pending_scroll: Mutex::new(None),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Set or clear the selected id.
    ///
    /// Returns `true` if the selection actually changed. Selecting a new id
    /// queues a centered auto-scroll request for it.
    pub fn select(&self, id: Option<String>) -> bool {
        {
            let mut state = self.state.write();
            if state.selected_id == id {
                return false;
            }
            state.selected_id = id.clone();
        }

        if let Some(id) = id {
            *self.pending_scroll.lock() = Some(ScrollRequest {
                id,
                align: ScrollAlign::Center,
                smooth: true,
            });
        }

        self.notify_subscribers();
        true
    }

    /// Set or clear the hovered id. Hover is transient and never scrolls.
    pub fn hover(&self, id: Option<String>) -> bool {
        {
            let mut state = self.state.write();
            if state.hovered_id == id {
                return false;
            }
            state.hovered_id = id;
        }

        self.notify_subscribers();
        true
    }

    pub fn selected_id(&self) -> Option<String> {
        self.state.read().selected_id.clone()
    }

    pub fn hovered_id(&self) -> Option<String> {
        self.state.read().hovered_id.clone()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        self.state.read().clone()
    }

    /// Visual flags for one entry: `(is_selected, is_hovered)`.
    ///
    /// Selection visually dominates hover: a selected row never also reports
    /// as hovered.
    pub fn visual_state(&self, id: &str) -> (bool, bool) {
        let state = self.state.read();
        let selected = state.selected_id.as_deref() == Some(id);
        let hovered = !selected && state.hovered_id.as_deref() == Some(id);
        (selected, hovered)
    }

    /// Take the queued auto-scroll request, if any.
    pub fn take_scroll_request(&self) -> Option<ScrollRequest> {
        self.pending_scroll.lock().take()
    }

    /// Add a subscriber
    pub fn add_subscriber(&self, subscriber: Arc<dyn SelectionSubscriber>) {
        let mut subscribers = self.subscribers.write();
        subscribers.push(Arc::downgrade(&subscriber));
    }

    /// Notify all subscribers of a selection change
    fn notify_subscribers(&self) {
        let snapshot = self.snapshot();
        let mut subscribers = self.subscribers.write();

        // Remove any dead weak references
        subscribers.retain(|weak| weak.strong_count() > 0);

        for weak in subscribers.iter() {
            if let Some(subscriber) = weak.upgrade() {
                subscriber.on_selection_change(&snapshot);
            }
        }
    }
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;

    #[test]
    fn selection_is_exclusive() {
        let engine = SelectionEngine::new();
        engine.select(Some("eq1".into()));
        engine.select(Some("eq2".into()));

        assert_eq!(engine.selected_id().as_deref(), Some("eq2"));
        assert_eq!(engine.visual_state("eq1"), (false, false));
        assert_eq!(engine.visual_state("eq2"), (true, false));
    }

    #[test]
    fn reselecting_same_id_does_not_requeue_scroll() {
        let engine = SelectionEngine::new();
        assert!(engine.select(Some("eq1".into())));
        let first = engine.take_scroll_request();
        assert_eq!(first.map(|r| r.id).as_deref(), Some("eq1"));

        assert!(!engine.select(Some("eq1".into())));
        assert!(engine.take_scroll_request().is_none());
    }

    #[test]
    fn clearing_selection_queues_no_scroll() {
        let engine = SelectionEngine::new();
        engine.select(Some("eq1".into()));
        engine.take_scroll_request();

        assert!(engine.select(None));
        assert!(engine.take_scroll_request().is_none());
        assert_eq!(engine.selected_id(), None);
    }

    #[test]
    fn hover_and_selection_are_independent() {
        let engine = SelectionEngine::new();
        engine.select(Some("eq1".into()));
        engine.hover(Some("eq2".into()));

        assert_eq!(engine.selected_id().as_deref(), Some("eq1"));
        assert_eq!(engine.hovered_id().as_deref(), Some("eq2"));

        engine.hover(None);
        assert_eq!(engine.selected_id().as_deref(), Some("eq1"));
        assert_eq!(engine.hovered_id(), None);
    }

    #[test]
    fn selection_dominates_hover_visually() {
        let engine = SelectionEngine::new();
        engine.select(Some("eq1".into()));
        engine.hover(Some("eq1".into()));

        assert_eq!(engine.visual_state("eq1"), (true, false));
    }

    struct Recorder {
        snapshots: PlMutex<Vec<SelectionSnapshot>>,
    }

    impl SelectionSubscriber for Recorder {
        fn on_selection_change(&self, snapshot: &SelectionSnapshot) {
            self.snapshots.lock().push(snapshot.clone());
        }
    }

    #[test]
    fn subscribers_are_notified_only_on_change() {
        let engine = SelectionEngine::new();
        let recorder = Arc::new(Recorder {
            snapshots: PlMutex::new(Vec::new()),
        });
        engine.add_subscriber(recorder.clone());

        engine.select(Some("eq1".into()));
        engine.select(Some("eq1".into())); // duplicate, no notification
        engine.hover(Some("eq2".into()));

        let snapshots = recorder.snapshots.lock();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[1].hovered_id.as_deref(), Some("eq2"));
    }
}
