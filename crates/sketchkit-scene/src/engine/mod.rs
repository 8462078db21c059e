//! Boundary to the rendering engine that owns the live scene.
//!
//! The engine draws pixels, hit-tests, captures free-hand strokes and keeps
//! the ordered list of live instances. This crate only needs the operations
//! in [`SceneEngine`]; [`MemoryScene`] is a headless implementation used by
//! the CLI and the tests.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use sketchkit_core::{EngineError, InstanceHandle, SceneEventBus};

use crate::codec::ConstructInstruction;
use crate::document::CanvasProperties;
use crate::model::PathCommand;

mod memory;

pub use memory::MemoryScene;

/// Engine-native instance kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LiveKind {
    Rect,
    Circle,
    Ellipse,
    Line,
    Path,
    Textbox,
    /// Any other engine type (images, groups, polygons, ...)
    Other(String),
}

impl LiveKind {
    pub fn as_str(&self) -> &str {
        match self {
            LiveKind::Rect => "rect",
            LiveKind::Circle => "circle",
            LiveKind::Ellipse => "ellipse",
            LiveKind::Line => "line",
            LiveKind::Path => "path",
            LiveKind::Textbox => "textbox",
            LiveKind::Other(kind) => kind,
        }
    }
}

impl From<String> for LiveKind {
    fn from(kind: String) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "rect" => LiveKind::Rect,
            "circle" => LiveKind::Circle,
            "ellipse" => LiveKind::Ellipse,
            "line" => LiveKind::Line,
            "path" => LiveKind::Path,
            "textbox" | "i-text" | "text" => LiveKind::Textbox,
            _ => LiveKind::Other(kind),
        }
    }
}

impl From<LiveKind> for String {
    fn from(kind: LiveKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for LiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property bag of a live instance
///
/// Every field is optional because engines leave values unset until they
/// are changed from their own defaults. Names follow the engine's
/// camelCase keys so legacy dumps parse directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveProps {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub angle: Option<f64>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub rx: Option<f64>,
    pub ry: Option<f64>,
    pub radius: Option<f64>,
    pub x1: Option<f64>,
    pub y1: Option<f64>,
    pub x2: Option<f64>,
    pub y2: Option<f64>,
    pub path: Option<Vec<PathCommand>>,
    /// Set once the path was thinned by an encode
    pub decimated: bool,
    pub text: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    #[serde(deserialize_with = "string_or_number")]
    pub font_weight: Option<String>,
    pub text_align: Option<String>,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Weight {
        Text(String),
        Number(f64),
    }

    Ok(Option::<Weight>::deserialize(deserializer)?.map(|w| match w {
        Weight::Text(s) => s,
        Weight::Number(n) => n.to_string(),
    }))
}

/// One live instance as reported by `list_instances`
#[derive(Debug, Clone, PartialEq)]
pub struct LiveObject {
    pub handle: InstanceHandle,
    pub kind: LiveKind,
    pub props: LiveProps,
}

/// Free-hand brush used while drawing mode is on
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    pub color: String,
    pub width: f64,
}

/// Operations the persistence core needs from a rendering engine.
///
/// Mutating calls publish on the engine's event bus synchronously, while
/// the caller still holds the engine. Subscribers must not lock the engine
/// from their handlers.
pub trait SceneEngine: Send {
    /// Build an instance from a decoded descriptor; not yet in the scene
    fn create_instance(
        &mut self,
        instruction: &ConstructInstruction,
    ) -> Result<InstanceHandle, EngineError>;

    /// Build an instance from engine-native properties; not yet in the scene
    fn create_native(&mut self, kind: LiveKind, props: LiveProps) -> InstanceHandle;

    /// Append a created instance on top of the render order
    fn add_instance(&mut self, handle: InstanceHandle) -> Result<(), EngineError>;

    /// Remove an instance from the scene
    fn remove_instance(&mut self, handle: InstanceHandle) -> bool;

    /// Instances in render order, back to front
    fn list_instances(&self) -> Vec<LiveObject>;

    fn instance(&self, handle: InstanceHandle) -> Option<&LiveObject>;

    /// Edit an instance's properties in place
    fn modify_instance(
        &mut self,
        handle: InstanceHandle,
        edit: &mut dyn FnMut(&mut LiveProps),
    ) -> bool;

    fn canvas_properties(&self) -> CanvasProperties;

    fn set_canvas_properties(&mut self, properties: CanvasProperties);

    /// Turn free-hand drawing on with a brush, or off with `None`
    fn set_drawing_mode(&mut self, brush: Option<Brush>);

    fn brush(&self) -> Option<&Brush>;

    fn active_selection(&self) -> Option<InstanceHandle>;

    fn set_active_selection(&mut self, handle: Option<InstanceHandle>) -> bool;

    /// Bulk-load an engine-native dump, replacing the scene
    ///
    /// The payload format belongs to the engine and is opaque to callers.
    fn load_native(&mut self, payload: &serde_json::Value) -> Result<usize, EngineError>;

    /// Remove every instance
    fn clear(&mut self);

    fn event_bus(&self) -> Arc<SceneEventBus>;
}
