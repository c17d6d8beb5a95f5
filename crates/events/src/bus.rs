//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ReviewEvent`]s. It is
//! shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use sceneqa_core::types::ItemId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

pub const IMAGES_IMPORTED: &str = "review.images_imported";
pub const DATASET_LOADED: &str = "review.dataset_loaded";
pub const ITEM_APPROVED: &str = "review.item_approved";
pub const ITEM_REJECTED: &str = "review.item_rejected";
pub const PROMPT_EDITED: &str = "review.prompt_edited";
pub const PROMPT_RESET: &str = "review.prompt_reset";
pub const ITEM_REGENERATED: &str = "review.item_regenerated";
pub const REGENERATION_FAILED: &str = "review.regeneration_failed";
pub const GENERATION_SETTINGS_UPDATED: &str = "settings.generation_updated";

// ---------------------------------------------------------------------------
// ReviewEvent
// ---------------------------------------------------------------------------

/// Something that happened during a review session.
///
/// Constructed via [`ReviewEvent::new`] and enriched with
/// [`for_item`](ReviewEvent::for_item) and
/// [`with_payload`](ReviewEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
    /// Dot-separated event name, e.g. `"review.item_approved"`.
    pub event_type: String,

    /// The review item concerned, if the event is about a single item.
    pub item_id: Option<ItemId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl ReviewEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            item_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn for_item(mut self, item_id: ItemId) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// ```rust
/// use sceneqa_events::bus::{EventBus, ReviewEvent, ITEM_APPROVED};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ReviewEvent::new(ITEM_APPROVED).for_item(1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ReviewEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Dropped silently when
    /// nobody is listening.
    pub fn publish(&self, event: ReviewEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReviewEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
