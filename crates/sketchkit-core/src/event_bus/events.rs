//! Event type definitions for the scene event bus.
//!
//! Events are cloneable and serializable so they can be logged or replayed
//! in tests.

use serde::{Deserialize, Serialize};

use crate::types::InstanceHandle;

/// Root event enum for everything a live scene reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// Scene content changed
    Mutation(MutationEvent),
    /// Active selection changed
    Selection(SelectionEvent),
}

impl SceneEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            SceneEvent::Mutation(_) => EventCategory::Mutation,
            SceneEvent::Selection(_) => EventCategory::Selection,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            SceneEvent::Mutation(e) => e.description(),
            SceneEvent::Selection(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Instances added, removed, modified or drawn.
    Mutation,
    /// Selection created, updated or cleared.
    Selection,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Mutation => write!(f, "Mutation"),
            EventCategory::Selection => write!(f, "Selection"),
        }
    }
}

/// Scene content events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationEvent {
    /// An instance was added to the scene.
    Added(InstanceHandle),
    /// An instance was removed from the scene.
    Removed(InstanceHandle),
    /// Properties of an instance changed.
    Modified(InstanceHandle),
    /// A free-hand stroke finished and was added as a path.
    FreehandStrokeCompleted(InstanceHandle),
}

impl MutationEvent {
    /// Handle of the instance the event refers to
    pub fn handle(&self) -> InstanceHandle {
        match self {
            MutationEvent::Added(h)
            | MutationEvent::Removed(h)
            | MutationEvent::Modified(h)
            | MutationEvent::FreehandStrokeCompleted(h) => *h,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            MutationEvent::Added(h) => format!("Instance {} added", h),
            MutationEvent::Removed(h) => format!("Instance {} removed", h),
            MutationEvent::Modified(h) => format!("Instance {} modified", h),
            MutationEvent::FreehandStrokeCompleted(h) => format!("Stroke {} completed", h),
        }
    }
}

/// Snapshot of the selected instance, enough to mirror it in a side panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionInfo {
    /// Selected instance.
    pub handle: InstanceHandle,
    /// Engine-native kind name ("rect", "textbox", ...).
    pub kind: String,
    /// Fill color, when the instance has a plain one.
    pub fill: Option<String>,
    /// Text content, for text instances.
    pub text: Option<String>,
}

/// Selection events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// Something became selected where nothing was.
    Created(SelectionInfo),
    /// The selection moved to another instance.
    Updated(SelectionInfo),
    /// Nothing is selected any more.
    Cleared,
}

impl SelectionEvent {
    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            SelectionEvent::Created(info) => format!("Selected {} ({})", info.handle, info.kind),
            SelectionEvent::Updated(info) => {
                format!("Selection moved to {} ({})", info.handle, info.kind)
            }
            SelectionEvent::Cleared => "Selection cleared".to_string(),
        }
    }

    /// The selection after this event, if any
    pub fn selection(&self) -> Option<&SelectionInfo> {
        match self {
            SelectionEvent::Created(info) | SelectionEvent::Updated(info) => Some(info),
            SelectionEvent::Cleared => None,
        }
    }
}
