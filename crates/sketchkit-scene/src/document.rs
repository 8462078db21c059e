//! Scene documents: the full persisted snapshot of one drawing.
//!
//! ```text
//! { "formatVersion": 2,
//!   "canvasProperties": { "width": 800, "height": 500, "backgroundColor": "#ffffff" },
//!   "shapes": [ ShapeDescriptor, ... ] }
//! ```
//!
//! Shapes are stored back-to-front (render order). A document is only ever
//! produced by the codec and replaced wholesale on save.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::model::ShapeDescriptor;

/// Current document format version
pub const FORMAT_VERSION: u32 = 2;

fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    500
}
fn default_background() -> Color {
    Color::WHITE
}

/// Canvas-level properties stored with every document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasProperties {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_background")]
    pub background_color: Color,
}

impl CanvasProperties {
    pub fn new(width: u32, height: u32, background_color: Color) -> Self {
        Self {
            width,
            height,
            background_color,
        }
    }
}

impl Default for CanvasProperties {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background_color: default_background(),
        }
    }
}

/// Complete scene document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    pub format_version: u32,
    pub canvas_properties: CanvasProperties,
    pub shapes: Vec<ShapeDescriptor>,
}

impl SceneDocument {
    /// Create an empty document at the current format version
    pub fn new(canvas_properties: CanvasProperties) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            canvas_properties,
            shapes: Vec::new(),
        }
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Serialize to the stored JSON value
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Serialize to compact bytes; equal documents give equal bytes
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new(CanvasProperties::default())
    }
}
