//! # Cart Events
//!
//! Lifecycle notifications fired around every mutation.
//!
//! ## Sequences
//! ```text
//! insert            cart.insert → (write) → cart.inserted
//! batch             cart.batch → [cart.insert → cart.inserted]* → cart.batched
//! update            cart.update → (write) → cart.updated
//! update qty ≤ 0    cart.update → cart.remove → cart.removed → cart.updated
//! remove            cart.remove → (write) → cart.removed
//! destroy           cart.destroy → (forget) → cart.destroyed
//! ```
//!
//! Delivery is synchronous and fire-and-forget: listeners cannot veto or
//! alter an operation.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

use crate::item::NewRow;
use crate::row_id::RowId;

// =============================================================================
// Cart Event
// =============================================================================

/// A lifecycle notification. Serializes with its event name under `event`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all_fields = "camelCase")]
pub enum CartEvent {
    #[serde(rename = "cart.insert")]
    Inserting { instance: String, item: NewRow },

    #[serde(rename = "cart.inserted")]
    Inserted {
        instance: String,
        row_id: RowId,
        item: NewRow,
    },

    #[serde(rename = "cart.update")]
    Updating { instance: String, row_id: RowId },

    #[serde(rename = "cart.updated")]
    Updated { instance: String, row_id: RowId },

    #[serde(rename = "cart.remove")]
    Removing { instance: String, row_id: RowId },

    #[serde(rename = "cart.removed")]
    Removed { instance: String, row_id: RowId },

    #[serde(rename = "cart.destroy")]
    Destroying { instance: String },

    #[serde(rename = "cart.destroyed")]
    Destroyed { instance: String },

    #[serde(rename = "cart.batch")]
    Batching { instance: String, items: Vec<NewRow> },

    #[serde(rename = "cart.batched")]
    Batched {
        instance: String,
        row_ids: Vec<RowId>,
    },
}

impl CartEvent {
    /// The dotted event name (`cart.insert`, `cart.removed`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            CartEvent::Inserting { .. } => "cart.insert",
            CartEvent::Inserted { .. } => "cart.inserted",
            CartEvent::Updating { .. } => "cart.update",
            CartEvent::Updated { .. } => "cart.updated",
            CartEvent::Removing { .. } => "cart.remove",
            CartEvent::Removed { .. } => "cart.removed",
            CartEvent::Destroying { .. } => "cart.destroy",
            CartEvent::Destroyed { .. } => "cart.destroyed",
            CartEvent::Batching { .. } => "cart.batch",
            CartEvent::Batched { .. } => "cart.batched",
        }
    }

    /// Instance the event happened in.
    pub fn instance(&self) -> &str {
        match self {
            CartEvent::Inserting { instance, .. }
            | CartEvent::Inserted { instance, .. }
            | CartEvent::Updating { instance, .. }
            | CartEvent::Updated { instance, .. }
            | CartEvent::Removing { instance, .. }
            | CartEvent::Removed { instance, .. }
            | CartEvent::Destroying { instance }
            | CartEvent::Destroyed { instance }
            | CartEvent::Batching { instance, .. }
            | CartEvent::Batched { instance, .. } => instance,
        }
    }

    /// Row the event concerns, for single-row events.
    pub fn row_id(&self) -> Option<&RowId> {
        match self {
            CartEvent::Inserted { row_id, .. }
            | CartEvent::Updating { row_id, .. }
            | CartEvent::Updated { row_id, .. }
            | CartEvent::Removing { row_id, .. }
            | CartEvent::Removed { row_id, .. } => Some(row_id),
            _ => None,
        }
    }
}

// =============================================================================
// Listeners
// =============================================================================

/// Receives cart events.
///
/// Any `Fn(&CartEvent) + Send` closure is a listener.
pub trait CartListener: Send {
    fn on_event(&self, event: &CartEvent);
}

impl<F> CartListener for F
where
    F: Fn(&CartEvent) + Send,
{
    fn on_event(&self, event: &CartEvent) {
        self(event)
    }
}

/// Fans events out to registered listeners in registration order.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Box<dyn CartListener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen(&mut self, listener: impl CartListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&self, event: &CartEvent) {
        trace!(
            event = event.name(),
            instance = event.instance(),
            listeners = self.listeners.len(),
            "Dispatching cart event"
        );
        for listener in &self.listeners {
            listener.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// =============================================================================
// Event Recorder
// =============================================================================

/// A listener that keeps every event it receives.
///
/// Clones share the same log, so one handle can be registered on a manager
/// while another is used for inspection.
///
/// ## Example
/// ```rust
/// use ilacart_core::{CartManager, EventRecorder, ItemInput, MemorySessionStore};
///
/// let recorder = EventRecorder::new();
/// let mut cart = CartManager::new(MemorySessionStore::new());
/// cart.listen(recorder.clone());
///
/// cart.insert(ItemInput::new("A", "Tee").quantity(1).price(5)).unwrap();
/// assert_eq!(recorder.names(), vec!["cart.insert", "cart.inserted"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<CartEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<CartEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Names of recorded events, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(CartEvent::name)
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl CartListener for EventRecorder {
    fn on_event(&self, event: &CartEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn destroyed() -> CartEvent {
        CartEvent::Destroyed {
            instance: "main".to_string(),
        }
    }

    #[test]
    fn test_event_names() {
        let row_id = RowId::new("abc");
        assert_eq!(destroyed().name(), "cart.destroyed");
        assert_eq!(
            CartEvent::Removing {
                instance: "main".into(),
                row_id: row_id.clone(),
            }
            .name(),
            "cart.remove"
        );
        assert_eq!(
            CartEvent::Batched {
                instance: "main".into(),
                row_ids: vec![row_id],
            }
            .name(),
            "cart.batched"
        );
    }

    #[test]
    fn test_serialized_tag_matches_name() {
        let event = CartEvent::Updated {
            instance: "wishlist".into(),
            row_id: RowId::new("abc"),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], event.name());
        assert_eq!(json["instance"], "wishlist");
        assert_eq!(json["rowId"], "abc");
    }

    #[test]
    fn test_dispatcher_calls_closures_in_order() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut dispatcher = EventDispatcher::new();
        let c = Arc::clone(&counter);
        dispatcher.listen(move |_: &CartEvent| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let s = Arc::clone(&seen);
        dispatcher.listen(move |e: &CartEvent| s.lock().unwrap().push(e.name()));

        dispatcher.emit(&destroyed());

        assert_eq!(dispatcher.len(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["cart.destroyed"]);
    }

    #[test]
    fn test_recorder_clones_share_log() {
        let recorder = EventRecorder::new();
        let mut dispatcher = EventDispatcher::new();
        dispatcher.listen(recorder.clone());

        dispatcher.emit(&destroyed());
        assert_eq!(recorder.names(), vec!["cart.destroyed"]);
        assert_eq!(recorder.events()[0].instance(), "main");

        recorder.clear();
        assert!(recorder.events().is_empty());
    }
}
