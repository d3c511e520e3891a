use ahash::AHashMap;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

/// System-wide event bus
///
/// The views publish interaction events (point activated, cluster
/// activated, sort changed, ...) that the embedding application can observe
/// without the views knowing about it.
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

struct FnHandler<E, F> {
    callback: F,
    _marker: PhantomData<fn(&E)>,
}

impl<E: Event, F: FnMut(&E) + Send + Sync> EventHandler for FnHandler<E, F> {
    fn handle(&mut self, event: &dyn Event) {
        if let Some(event) = event.as_any().downcast_ref::<E>() {
            (self.callback)(event);
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Register a handler for one event type.
    pub fn subscribe<E: Event>(&self, callback: impl FnMut(&E) + Send + Sync + 'static) {
        let mut handlers = self.handlers.lock();
        handlers
            .entry(TypeId::of::<E>())
            .or_insert_with(Vec::new)
            .push(Box::new(FnHandler {
                callback,
                _marker: PhantomData,
            }));
    }

    /// Dispatch an event synchronously to all handlers of its type.
    pub fn publish<E: Event>(&self, event: E) {
        let mut handlers = self.handlers.lock();
        if let Some(list) = handlers.get_mut(&TypeId::of::<E>()) {
            for handler in list.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Interaction events surfaced upward by the chart and table surfaces
pub mod events {
    use super::Event;

    /// A single point was activated (clicked) on either surface
    #[derive(Debug, Clone)]
    pub struct PointActivated {
        pub id: String,
    }

    /// Hover moved onto a point, or off all points (`None`)
    #[derive(Debug, Clone)]
    pub struct PointHovered {
        pub id: Option<String>,
    }

    /// A cluster was activated on the chart, zooming into its members
    #[derive(Debug, Clone)]
    pub struct ClusterActivated {
        pub member_ids: Vec<String>,
    }

    /// The zoom rectangle was explicitly reset to the full extent
    #[derive(Debug, Clone)]
    pub struct ZoomReset;

    /// Table sort criteria changed; `descending` is `None` when the cycle
    /// returned to the unsorted order
    #[derive(Debug, Clone)]
    pub struct SortChanged {
        pub column: String,
        pub descending: Option<bool>,
    }

    // Implement Event trait for all event types
    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        PointActivated,
        PointHovered,
        ClusterActivated,
        ZoomReset,
        SortChanged
    );
}

pub use events::*;
