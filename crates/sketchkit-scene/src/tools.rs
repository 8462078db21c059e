//! Drawing tools and the edits they make to the live scene.
//!
//! Shape tools insert one instance with fixed defaults and fall back to
//! select. Pen and eraser switch the engine into free-hand drawing with a
//! brush; every other tool switches it back out.

use std::str::FromStr;

use sketchkit_core::{EngineError, InstanceHandle};
use thiserror::Error;

use crate::color::Color;
use crate::engine::{Brush, LiveKind, LiveProps, SceneEngine};

/// Pen brush width when not configured
pub const DEFAULT_PEN_WIDTH: f64 = 5.0;
/// Eraser brush width when not configured
pub const DEFAULT_ERASER_WIDTH: f64 = 20.0;
/// Placeholder text of a new text box
pub const NEW_TEXT: &str = "Double click to edit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Select,
    Rectangle,
    Ellipse,
    Line,
    Text,
    Pen,
    Eraser,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Select,
        Tool::Rectangle,
        Tool::Ellipse,
        Tool::Line,
        Tool::Text,
        Tool::Pen,
        Tool::Eraser,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Rectangle => "rectangle",
            Tool::Ellipse => "ellipse",
            Tool::Line => "line",
            Tool::Text => "text",
            Tool::Pen => "pen",
            Tool::Eraser => "eraser",
        }
    }

    pub fn is_freehand(&self) -> bool {
        matches!(self, Tool::Pen | Tool::Eraser)
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown tool '{0}'")]
pub struct UnknownTool(pub String);

impl FromStr for Tool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "circle" => Ok(Tool::Ellipse),
            "rect" => Ok(Tool::Rectangle),
            other => Tool::ALL
                .into_iter()
                .find(|tool| tool.name() == other)
                .ok_or_else(|| UnknownTool(s.to_string())),
        }
    }
}

/// Brush widths for the free-hand tools
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushWidths {
    pub pen: f64,
    pub eraser: f64,
}

impl Default for BrushWidths {
    fn default() -> Self {
        Self {
            pen: DEFAULT_PEN_WIDTH,
            eraser: DEFAULT_ERASER_WIDTH,
        }
    }
}

/// What selecting a tool did
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEffect {
    /// A new instance was added
    Inserted(InstanceHandle),
    /// Free-hand drawing is on with this brush
    Drawing(Brush),
    /// Only the mode changed
    ModeChanged,
}

/// Active tool and current color of one editor
#[derive(Debug, Clone)]
pub struct ToolController {
    active: Tool,
    color: Color,
    widths: BrushWidths,
}

impl ToolController {
    pub fn new(color: Color, widths: BrushWidths) -> Self {
        Self {
            active: Tool::Select,
            color,
            widths,
        }
    }

    pub fn active(&self) -> Tool {
        self.active
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Switch tools and apply the tool's effect to the scene
    pub fn select_tool<E: SceneEngine + ?Sized>(
        &mut self,
        tool: Tool,
        engine: &mut E,
    ) -> Result<ToolEffect, EngineError> {
        self.active = tool;

        if tool.is_freehand() {
            let brush = self.brush_for(tool, engine);
            engine.set_drawing_mode(Some(brush.clone()));
            tracing::debug!("{} brush {} width {}", tool, brush.color, brush.width);
            return Ok(ToolEffect::Drawing(brush));
        }
        engine.set_drawing_mode(None);

        let Some((kind, props)) = self.insertion(tool) else {
            return Ok(ToolEffect::ModeChanged);
        };
        // Shape tools are one-shot
        self.active = Tool::Select;
        let handle = engine.create_native(kind, props);
        engine.add_instance(handle)?;
        if tool == Tool::Text {
            engine.set_active_selection(Some(handle));
        }
        tracing::debug!("{} tool inserted {}", tool, handle);
        Ok(ToolEffect::Inserted(handle))
    }

    /// Brush of a free-hand tool; erasing paints in the background color
    fn brush_for<E: SceneEngine + ?Sized>(&self, tool: Tool, engine: &E) -> Brush {
        if tool == Tool::Eraser {
            Brush {
                color: engine.canvas_properties().background_color.to_hex(),
                width: self.widths.eraser,
            }
        } else {
            Brush {
                color: self.color.to_hex(),
                width: self.widths.pen,
            }
        }
    }

    fn insertion(&self, tool: Tool) -> Option<(LiveKind, LiveProps)> {
        let inserted = match tool {
            Tool::Rectangle => (
                LiveKind::Rect,
                LiveProps {
                    left: Some(50.0),
                    top: Some(50.0),
                    width: Some(100.0),
                    height: Some(100.0),
                    fill: Some("red".to_string()),
                    ..LiveProps::default()
                },
            ),
            Tool::Ellipse => (
                LiveKind::Circle,
                LiveProps {
                    left: Some(100.0),
                    top: Some(100.0),
                    width: Some(100.0),
                    height: Some(100.0),
                    radius: Some(50.0),
                    fill: Some("blue".to_string()),
                    ..LiveProps::default()
                },
            ),
            Tool::Line => (
                LiveKind::Line,
                LiveProps {
                    x1: Some(50.0),
                    y1: Some(50.0),
                    x2: Some(200.0),
                    y2: Some(200.0),
                    left: Some(50.0),
                    top: Some(50.0),
                    width: Some(150.0),
                    height: Some(150.0),
                    stroke: Some("green".to_string()),
                    stroke_width: Some(5.0),
                    ..LiveProps::default()
                },
            ),
            Tool::Text => (
                LiveKind::Textbox,
                LiveProps {
                    left: Some(50.0),
                    top: Some(50.0),
                    width: Some(200.0),
                    text: Some(NEW_TEXT.to_string()),
                    font_family: Some("Arial".to_string()),
                    font_size: Some(20.0),
                    fill: Some(self.color.to_hex()),
                    ..LiveProps::default()
                },
            ),
            Tool::Select | Tool::Pen | Tool::Eraser => return None,
        };
        Some(inserted)
    }

    /// Remove the selected instance, if any
    pub fn delete_selection<E: SceneEngine + ?Sized>(&self, engine: &mut E) -> Option<InstanceHandle> {
        let handle = engine.active_selection()?;
        engine.remove_instance(handle).then_some(handle)
    }

    /// Keyboard shortcuts; `key` uses DOM key names
    pub fn handle_key<E: SceneEngine + ?Sized>(
        &self,
        key: &str,
        engine: &mut E,
    ) -> Option<InstanceHandle> {
        match key {
            "Delete" => self.delete_selection(engine),
            _ => None,
        }
    }

    /// Set the current color and recolor the selection.
    ///
    /// Paths take it as stroke, everything else as fill. Returns whether
    /// an instance was recolored.
    pub fn set_color<E: SceneEngine + ?Sized>(&mut self, color: Color, engine: &mut E) -> bool {
        self.color = color;
        if self.active == Tool::Pen {
            let brush = self.brush_for(Tool::Pen, engine);
            engine.set_drawing_mode(Some(brush));
        }

        let Some(handle) = engine.active_selection() else {
            return false;
        };
        let is_path = engine
            .instance(handle)
            .is_some_and(|object| object.kind == LiveKind::Path);
        let hex = color.to_hex();
        engine.modify_instance(handle, &mut |props| {
            if is_path {
                props.stroke = Some(hex.clone());
            } else {
                props.fill = Some(hex.clone());
            }
        })
    }

    /// Replace the text of the selected text box
    pub fn set_selected_text<E: SceneEngine + ?Sized>(&self, text: &str, engine: &mut E) -> bool {
        let Some(handle) = engine.active_selection() else {
            return false;
        };
        if engine.instance(handle).map(|o| &o.kind) != Some(&LiveKind::Textbox) {
            return false;
        }
        engine.modify_instance(handle, &mut |props| props.text = Some(text.to_string()))
    }
}

impl Default for ToolController {
    fn default() -> Self {
        Self::new(Color::rgb(0xff, 0, 0), BrushWidths::default())
    }
}
