//! Conversion between live instances and scene documents.
//!
//! `encode` reads what the engine holds and produces a [`SceneDocument`];
//! `decode` turns a document back into construction instructions that
//! `replay` hands to the engine in stored order. Both directions are pure
//! apart from logging.

use sketchkit_core::{DecodeAnomaly, EngineError, InstanceHandle};

use crate::color::Color;
use crate::document::{CanvasProperties, SceneDocument, FORMAT_VERSION};
use crate::engine::{LiveKind, LiveObject, LiveProps, SceneEngine};
use crate::model::{
    decimate, CommonProps, EllipseProps, LineProps, PathProps, RectangleProps, ShapeBody,
    ShapeDescriptor, ShapeKind, TextAlign, TextProps, DEFAULT_DECIMATION_THRESHOLD,
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_FONT_WEIGHT, DEFAULT_STROKE_WIDTH,
};

/// Encoder settings
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    /// Free-hand paths with more commands than this are thinned once
    pub decimation_threshold: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            decimation_threshold: DEFAULT_DECIMATION_THRESHOLD,
        }
    }
}

/// Request to build one live instance from a stored descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructInstruction {
    pub kind: ShapeKind,
    pub descriptor: ShapeDescriptor,
    /// Position of the descriptor in the document's shapes
    pub source_index: usize,
}

/// Outcome of replaying instructions into an engine
#[derive(Debug, Default)]
pub struct ReplayReport {
    /// Handles added, in render order
    pub applied: Vec<InstanceHandle>,
    /// Instructions the engine refused, by source index
    pub rejected: Vec<(usize, EngineError)>,
}

/// Snapshot the engine's live scene
pub fn encode_scene<E: SceneEngine + ?Sized>(engine: &E, options: &EncodeOptions) -> SceneDocument {
    encode(
        &engine.list_instances(),
        &engine.canvas_properties(),
        options,
    )
}

/// Build a document from live instances in render order.
///
/// Never fails: absent properties take their defaults and kinds outside the
/// supported set are kept as `Unsupported` with only common fields.
pub fn encode(
    objects: &[LiveObject],
    canvas: &CanvasProperties,
    options: &EncodeOptions,
) -> SceneDocument {
    SceneDocument {
        format_version: FORMAT_VERSION,
        canvas_properties: canvas.clone(),
        shapes: objects
            .iter()
            .map(|object| encode_object(object, options))
            .collect(),
    }
}

fn common_props(props: &LiveProps) -> CommonProps {
    CommonProps {
        left: props.left.unwrap_or(0.0),
        top: props.top.unwrap_or(0.0),
        width: props.width.unwrap_or(0.0),
        height: props.height.unwrap_or(0.0),
        scale_x: props.scale_x.unwrap_or(1.0),
        scale_y: props.scale_y.unwrap_or(1.0),
        angle: props.angle.unwrap_or(0.0),
        opacity: props.opacity.unwrap_or(1.0),
        // Hidden instances are stored visible
        visible: true,
    }
}

fn optional_color(value: Option<&str>) -> Option<Color> {
    value.and_then(|raw| match Color::parse(raw) {
        Ok(color) => Some(color),
        Err(err) => {
            tracing::warn!("Dropping stroke: {}", err);
            None
        }
    })
}

fn encode_object(object: &LiveObject, options: &EncodeOptions) -> ShapeDescriptor {
    let props = &object.props;
    let common = common_props(props);
    let stroke_width = props.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH);

    let body = match &object.kind {
        LiveKind::Rect => ShapeBody::Rectangle(RectangleProps {
            fill: Color::parse_or(props.fill.as_deref(), Color::BLACK),
            stroke: optional_color(props.stroke.as_deref()),
            stroke_width,
            rx: props.rx.unwrap_or(0.0),
            ry: props.ry.unwrap_or(0.0),
        }),
        LiveKind::Circle => {
            let radius = props.radius.unwrap_or(common.width / 2.0);
            ShapeBody::Ellipse(EllipseProps {
                fill: Color::parse_or(props.fill.as_deref(), Color::BLACK),
                stroke: optional_color(props.stroke.as_deref()),
                stroke_width,
                rx: radius,
                ry: radius,
            })
        }
        LiveKind::Ellipse => ShapeBody::Ellipse(EllipseProps {
            fill: Color::parse_or(props.fill.as_deref(), Color::BLACK),
            stroke: optional_color(props.stroke.as_deref()),
            stroke_width,
            rx: props.rx.unwrap_or(common.width / 2.0),
            ry: props.ry.unwrap_or(common.height / 2.0),
        }),
        LiveKind::Line => ShapeBody::Line(LineProps {
            stroke: Color::parse_or(props.stroke.as_deref(), Color::BLACK),
            stroke_width,
            x1: props.x1.unwrap_or(0.0),
            y1: props.y1.unwrap_or(0.0),
            x2: props.x2.unwrap_or(0.0),
            y2: props.y2.unwrap_or(0.0),
        }),
        LiveKind::Path => {
            let commands = props.path.as_deref().unwrap_or_default();
            let thin = !props.decimated && commands.len() > options.decimation_threshold;
            if thin {
                tracing::debug!(
                    "Decimating path {} ({} commands)",
                    object.handle,
                    commands.len()
                );
            }
            ShapeBody::FreehandPath(PathProps {
                stroke: Color::parse_or(props.stroke.as_deref(), Color::BLACK),
                stroke_width,
                path: if thin {
                    decimate(commands)
                } else {
                    commands.to_vec()
                },
                decimated: props.decimated || thin,
            })
        }
        LiveKind::Textbox => ShapeBody::TextBox(TextProps {
            text: props.text.clone().unwrap_or_default(),
            font_family: props
                .font_family
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
            font_size: props.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            font_weight: props
                .font_weight
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_WEIGHT.to_string()),
            fill: Color::parse_or(props.fill.as_deref(), Color::BLACK),
            text_align: TextAlign::parse_or_default(props.text_align.as_deref()),
        }),
        LiveKind::Other(kind) => {
            tracing::debug!("Instance {} has unsupported kind '{}'", object.handle, kind);
            ShapeBody::Unsupported { kind: kind.clone() }
        }
    };

    ShapeDescriptor::new(common, body)
}

/// Turn a document into construction instructions in stored order.
///
/// Unsupported kinds are skipped with a warning.
pub fn decode(document: &SceneDocument) -> Vec<ConstructInstruction> {
    decode_with_anomalies(document).0
}

/// Like [`decode`], also returning what was skipped
pub fn decode_with_anomalies(
    document: &SceneDocument,
) -> (Vec<ConstructInstruction>, Vec<DecodeAnomaly>) {
    let mut instructions = Vec::with_capacity(document.shapes.len());
    let mut anomalies = Vec::new();

    for (index, descriptor) in document.shapes.iter().enumerate() {
        match descriptor.kind() {
            Some(kind) => instructions.push(ConstructInstruction {
                kind,
                descriptor: descriptor.clone(),
                source_index: index,
            }),
            None => {
                let anomaly = DecodeAnomaly::UnknownKind {
                    index,
                    kind: descriptor.body.tag().to_string(),
                };
                tracing::warn!("{}, skipping", anomaly);
                anomalies.push(anomaly);
            }
        }
    }

    (instructions, anomalies)
}

/// Create and add every instruction in order.
///
/// An instruction the engine refuses is logged and skipped; the rest still
/// apply, so relative order of the survivors is kept.
pub fn replay<E: SceneEngine + ?Sized>(
    engine: &mut E,
    instructions: &[ConstructInstruction],
) -> ReplayReport {
    let mut report = ReplayReport::default();

    for instruction in instructions {
        let added = engine
            .create_instance(instruction)
            .and_then(|handle| engine.add_instance(handle).map(|()| handle));
        match added {
            Ok(handle) => report.applied.push(handle),
            Err(err) => {
                tracing::warn!(
                    "Shape {} ({}) not restored: {}",
                    instruction.source_index,
                    instruction.kind,
                    err
                );
                report.rejected.push((instruction.source_index, err));
            }
        }
    }

    report
}
