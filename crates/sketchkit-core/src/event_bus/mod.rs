//! # Event Bus Module
//!
//! Per-scene publish/subscribe channel between the live scene and the
//! components that observe it (the save/load session, selection mirrors).
//!
//! ## Overview
//!
//! - The engine owns one `SceneEventBus` and publishes mutation and
//!   selection events on it
//! - Observers subscribe with a filter and receive matching events
//! - `subscribe_scoped` returns a `Subscription` guard that removes exactly
//!   the listener it registered when dropped
//!
//! There is deliberately no process-wide bus: every subscription belongs to
//! one scene and is released with it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sketchkit_core::event_bus::{EventCategory, EventFilter, SceneEvent, SceneEventBus};
//!
//! let bus = SceneEventBus::new();
//! let guard = bus.subscribe_scoped(
//!     EventFilter::Categories(vec![EventCategory::Mutation]),
//!     |event| tracing::debug!("scene changed: {}", event.description()),
//! );
//!
//! // Listener is removed here
//! drop(guard);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
