//! # SketchKit Core
//!
//! Core types, traits, and utilities for SketchKit.
//! Provides the error taxonomy shared by every layer, the identifiers used
//! at the engine and store boundaries, and the per-scene event bus that
//! carries mutation and selection notifications.

pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{DecodeAnomaly, EngineError, Error, Result, SessionError, StoreError};

pub use event_bus::{
    EventCategory, EventFilter, MutationEvent, SceneEvent, SceneEventBus, SelectionEvent,
    SelectionInfo, Subscription, SubscriptionId,
};

pub use types::{thread_safe, CanvasId, InstanceHandle, ThreadSafe};
