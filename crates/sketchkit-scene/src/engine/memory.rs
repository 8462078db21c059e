//! Headless in-memory scene.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sketchkit_core::{
    EngineError, InstanceHandle, MutationEvent, SceneEvent, SceneEventBus, SelectionEvent,
    SelectionInfo,
};

use super::{Brush, LiveKind, LiveObject, LiveProps, SceneEngine};
use crate::codec::ConstructInstruction;
use crate::color::Color;
use crate::document::CanvasProperties;
use crate::model::{PathCommand, Point, ShapeBody, ShapeDescriptor};

/// Scene engine without a display.
///
/// Keeps instances in render order, tracks drawing mode and selection, and
/// publishes every change on its own [`SceneEventBus`]. Free-hand strokes
/// come in through [`MemoryScene::draw_stroke`].
pub struct MemoryScene {
    objects: Vec<LiveObject>,
    /// Created but not yet added
    pending: HashMap<InstanceHandle, LiveObject>,
    next_handle: u64,
    canvas: CanvasProperties,
    brush: Option<Brush>,
    selection: Option<InstanceHandle>,
    bus: Arc<SceneEventBus>,
}

#[derive(Serialize, Deserialize)]
struct NativeObject {
    #[serde(rename = "type")]
    kind: LiveKind,
    #[serde(flatten)]
    props: LiveProps,
}

#[derive(Serialize)]
struct NativeDump<'a> {
    version: &'static str,
    background: String,
    objects: Vec<NativeObjectRef<'a>>,
}

#[derive(Serialize)]
struct NativeObjectRef<'a> {
    #[serde(rename = "type")]
    kind: &'a LiveKind,
    #[serde(flatten)]
    props: &'a LiveProps,
}

impl MemoryScene {
    pub fn new(canvas: CanvasProperties) -> Self {
        Self {
            objects: Vec::new(),
            pending: HashMap::new(),
            next_handle: 1,
            canvas,
            brush: None,
            selection: None,
            bus: Arc::new(SceneEventBus::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn is_drawing_mode(&self) -> bool {
        self.brush.is_some()
    }

    /// Finish a free-hand stroke through `points`.
    ///
    /// Only works in drawing mode. The stroke becomes a path instance in the
    /// brush color and width; publishes `Added` then
    /// `FreehandStrokeCompleted`.
    pub fn draw_stroke(&mut self, points: &[Point]) -> Option<InstanceHandle> {
        let brush = self.brush.clone()?;
        let (first, rest) = points.split_first()?;

        let mut path = Vec::with_capacity(points.len());
        path.push(PathCommand::MoveTo {
            x: first.x,
            y: first.y,
        });
        path.extend(rest.iter().map(|p| PathCommand::LineTo { x: p.x, y: p.y }));

        let (min_x, min_y, max_x, max_y) = points.iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(a, b, c, d), p| (a.min(p.x), b.min(p.y), c.max(p.x), d.max(p.y)),
        );

        let props = LiveProps {
            left: Some(min_x),
            top: Some(min_y),
            width: Some(max_x - min_x),
            height: Some(max_y - min_y),
            stroke: Some(brush.color),
            stroke_width: Some(brush.width),
            path: Some(path),
            ..LiveProps::default()
        };

        let handle = self.create_native(LiveKind::Path, props);
        self.add_instance(handle).ok()?;
        self.publish(MutationEvent::FreehandStrokeCompleted(handle));
        Some(handle)
    }

    /// Engine-native dump accepted by `load_native`
    pub fn export_native(&self) -> serde_json::Value {
        let dump = NativeDump {
            version: "1",
            background: self.canvas.background_color.to_hex(),
            objects: self
                .objects
                .iter()
                .map(|o| NativeObjectRef {
                    kind: &o.kind,
                    props: &o.props,
                })
                .collect(),
        };
        serde_json::to_value(dump).unwrap_or(serde_json::Value::Null)
    }

    fn allocate(&mut self, kind: LiveKind, props: LiveProps) -> InstanceHandle {
        let handle = InstanceHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.insert(
            handle,
            LiveObject {
                handle,
                kind,
                props,
            },
        );
        handle
    }

    fn publish(&self, event: MutationEvent) {
        tracing::trace!("{}", event.description());
        self.bus.publish(SceneEvent::Mutation(event));
    }

    fn selection_info(&self, handle: InstanceHandle) -> Option<SelectionInfo> {
        self.instance(handle).map(|object| SelectionInfo {
            handle,
            kind: object.kind.to_string(),
            fill: object.props.fill.clone(),
            text: object.props.text.clone(),
        })
    }
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new(CanvasProperties::default())
    }
}

/// Map a descriptor onto engine-native kind and properties
fn native_parts(descriptor: &ShapeDescriptor) -> Result<(LiveKind, LiveProps), EngineError> {
    let common = &descriptor.common;
    let mut props = LiveProps {
        left: Some(common.left),
        top: Some(common.top),
        width: Some(common.width),
        height: Some(common.height),
        scale_x: Some(common.scale_x),
        scale_y: Some(common.scale_y),
        angle: Some(common.angle),
        opacity: Some(common.opacity),
        visible: Some(common.visible),
        ..LiveProps::default()
    };

    let kind = match &descriptor.body {
        ShapeBody::Rectangle(rect) => {
            props.fill = Some(rect.fill.to_hex());
            props.stroke = rect.stroke.map(|c| c.to_hex());
            props.stroke_width = Some(rect.stroke_width);
            props.rx = Some(rect.rx);
            props.ry = Some(rect.ry);
            LiveKind::Rect
        }
        ShapeBody::Ellipse(ellipse) => {
            props.fill = Some(ellipse.fill.to_hex());
            props.stroke = ellipse.stroke.map(|c| c.to_hex());
            props.stroke_width = Some(ellipse.stroke_width);
            props.rx = Some(ellipse.rx);
            props.ry = Some(ellipse.ry);
            LiveKind::Ellipse
        }
        ShapeBody::Line(line) => {
            props.stroke = Some(line.stroke.to_hex());
            props.stroke_width = Some(line.stroke_width);
            props.x1 = Some(line.x1);
            props.y1 = Some(line.y1);
            props.x2 = Some(line.x2);
            props.y2 = Some(line.y2);
            LiveKind::Line
        }
        ShapeBody::FreehandPath(path) => {
            props.stroke = Some(path.stroke.to_hex());
            props.stroke_width = Some(path.stroke_width);
            props.path = Some(path.path.clone());
            props.decimated = path.decimated;
            LiveKind::Path
        }
        ShapeBody::TextBox(text) => {
            props.text = Some(text.text.clone());
            props.font_family = Some(text.font_family.clone());
            props.font_size = Some(text.font_size);
            props.font_weight = Some(text.font_weight.clone());
            props.fill = Some(text.fill.to_hex());
            props.text_align = Some(text.text_align.as_str().to_string());
            LiveKind::Textbox
        }
        ShapeBody::Unsupported { kind } => {
            return Err(EngineError::UnsupportedKind { kind: kind.clone() })
        }
    };

    Ok((kind, props))
}

impl SceneEngine for MemoryScene {
    fn create_instance(
        &mut self,
        instruction: &ConstructInstruction,
    ) -> Result<InstanceHandle, EngineError> {
        let (kind, props) = native_parts(&instruction.descriptor)?;
        Ok(self.allocate(kind, props))
    }

    fn create_native(&mut self, kind: LiveKind, props: LiveProps) -> InstanceHandle {
        self.allocate(kind, props)
    }

    fn add_instance(&mut self, handle: InstanceHandle) -> Result<(), EngineError> {
        if self.objects.iter().any(|o| o.handle == handle) {
            return Err(EngineError::AlreadyAdded { handle: handle.0 });
        }
        let object = self
            .pending
            .remove(&handle)
            .ok_or(EngineError::UnknownHandle { handle: handle.0 })?;
        self.objects.push(object);
        self.publish(MutationEvent::Added(handle));
        Ok(())
    }

    fn remove_instance(&mut self, handle: InstanceHandle) -> bool {
        let Some(position) = self.objects.iter().position(|o| o.handle == handle) else {
            return false;
        };
        self.objects.remove(position);
        if self.selection == Some(handle) {
            self.set_active_selection(None);
        }
        self.publish(MutationEvent::Removed(handle));
        true
    }

    fn list_instances(&self) -> Vec<LiveObject> {
        self.objects.clone()
    }

    fn instance(&self, handle: InstanceHandle) -> Option<&LiveObject> {
        self.objects.iter().find(|o| o.handle == handle)
    }

    fn modify_instance(
        &mut self,
        handle: InstanceHandle,
        edit: &mut dyn FnMut(&mut LiveProps),
    ) -> bool {
        let Some(object) = self.objects.iter_mut().find(|o| o.handle == handle) else {
            return false;
        };
        edit(&mut object.props);
        self.publish(MutationEvent::Modified(handle));

        // Keep selection observers in step with the edited values
        if self.selection == Some(handle) {
            if let Some(info) = self.selection_info(handle) {
                self.bus
                    .publish(SceneEvent::Selection(SelectionEvent::Updated(info)));
            }
        }
        true
    }

    fn canvas_properties(&self) -> CanvasProperties {
        self.canvas.clone()
    }

    fn set_canvas_properties(&mut self, properties: CanvasProperties) {
        self.canvas = properties;
    }

    fn set_drawing_mode(&mut self, brush: Option<Brush>) {
        self.brush = brush;
    }

    fn brush(&self) -> Option<&Brush> {
        self.brush.as_ref()
    }

    fn active_selection(&self) -> Option<InstanceHandle> {
        self.selection
    }

    fn set_active_selection(&mut self, handle: Option<InstanceHandle>) -> bool {
        let event = match handle {
            Some(handle) => {
                let Some(info) = self.selection_info(handle) else {
                    return false;
                };
                match self.selection {
                    Some(current) if current == handle => return true,
                    Some(_) => SelectionEvent::Updated(info),
                    None => SelectionEvent::Created(info),
                }
            }
            None => {
                if self.selection.is_none() {
                    return true;
                }
                SelectionEvent::Cleared
            }
        };

        self.selection = handle;
        tracing::trace!("{}", event.description());
        self.bus.publish(SceneEvent::Selection(event));
        true
    }

    fn load_native(&mut self, payload: &serde_json::Value) -> Result<usize, EngineError> {
        let entries = payload
            .get("objects")
            .and_then(|o| o.as_array())
            .ok_or_else(|| EngineError::NativeLoad {
                reason: "payload has no objects array".to_string(),
            })?;

        self.clear();

        if let Some(background) = payload.get("background").and_then(|b| b.as_str()) {
            match Color::parse(background) {
                Ok(color) => self.canvas.background_color = color,
                Err(err) => tracing::warn!("Ignoring native background: {}", err),
            }
        }

        let mut loaded = 0;
        for (index, entry) in entries.iter().enumerate() {
            match NativeObject::deserialize(entry) {
                Ok(object) => {
                    let handle = self.allocate(object.kind, object.props);
                    self.add_instance(handle)?;
                    loaded += 1;
                }
                Err(err) => tracing::warn!("Skipping native object {}: {}", index, err),
            }
        }

        Ok(loaded)
    }

    fn clear(&mut self) {
        self.set_active_selection(None);
        self.objects.clear();
        self.pending.clear();
    }

    fn event_bus(&self) -> Arc<SceneEventBus> {
        Arc::clone(&self.bus)
    }
}
