//! Event Bus implementation.
//!
//! Provides the `SceneEventBus` struct and the `Subscription` guard.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use uuid::Uuid;

use super::events::{EventCategory, SceneEvent};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &SceneEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

/// Type alias for event handler functions
type EventHandler = Arc<dyn Fn(&SceneEvent) + Send + Sync>;

type HandlerMap = HashMap<SubscriptionId, (EventFilter, EventHandler)>;

/// Event bus owned by one live scene
pub struct SceneEventBus {
    /// Registered synchronous handlers
    handlers: Arc<RwLock<HandlerMap>>,
}

impl SceneEventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Publish an event to all matching subscribers
    ///
    /// Handlers run on the publishing thread, after the handler table lock
    /// has been released, so a handler may itself subscribe or unsubscribe.
    /// Returns the number of handlers that received the event.
    pub fn publish(&self, event: SceneEvent) -> usize {
        let matching: Vec<EventHandler> = {
            let handlers = self.handlers.read();
            handlers
                .values()
                .filter(|(filter, _)| filter.matches(&event))
                .map(|(_, handler)| Arc::clone(handler))
                .collect()
        };

        for handler in &matching {
            handler(&event);
        }
        matching.len()
    }

    /// Subscribe to events with a synchronous handler
    ///
    /// The handler will be called on the publishing thread, so it should
    /// return quickly and must not lock the scene that publishes.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&SceneEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Arc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Subscribe and get a guard that unsubscribes on drop
    pub fn subscribe_scoped<F>(&self, filter: EventFilter, handler: F) -> Subscription
    where
        F: Fn(&SceneEvent) + Send + Sync + 'static,
    {
        let id = self.subscribe(filter, handler);
        Subscription {
            id,
            handlers: Arc::downgrade(&self.handlers),
        }
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        remove_handler(&self.handlers, id)
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for SceneEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SceneEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn remove_handler(handlers: &RwLock<HandlerMap>, id: SubscriptionId) -> bool {
    let removed = handlers.write().remove(&id).is_some();
    if removed {
        tracing::debug!("Subscription {} removed", id);
    }
    removed
}

/// Guard for one registered listener
///
/// Dropping the guard removes the listener it was created for. The guard
/// only holds a weak reference, so it never keeps a torn-down bus alive.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: SubscriptionId,
    handlers: Weak<RwLock<HandlerMap>>,
}

impl Subscription {
    /// Id of the guarded listener
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handlers) = self.handlers.upgrade() {
            remove_handler(&handlers, self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
