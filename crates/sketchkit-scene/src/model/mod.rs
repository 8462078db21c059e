//! Shape descriptors: the persisted, engine-independent record of one drawable.
//!
//! A descriptor is a closed tagged variant. On the wire it is one flat JSON
//! object whose `type` key names the kind:
//!
//! ```text
//! { "type": "rectangle", "left": 50.0, "top": 50.0, "width": 100.0, ...,
//!   "fill": "#ff0000", "strokeWidth": 1.0, "rx": 0.0, "ry": 0.0 }
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

mod path;
mod props;

pub use path::{decimate, PathCommand, DEFAULT_DECIMATION_THRESHOLD};
pub use props::{
    CommonProps, EllipseProps, LineProps, PathProps, RectangleProps, TextAlign, TextProps,
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_FONT_WEIGHT, DEFAULT_STROKE_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Supported shape kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Line,
    FreehandPath,
    TextBox,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Rectangle,
        ShapeKind::Ellipse,
        ShapeKind::Line,
        ShapeKind::FreehandPath,
        ShapeKind::TextBox,
    ];

    /// Wire tag
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
            ShapeKind::FreehandPath => "freehandPath",
            ShapeKind::TextBox => "textBox",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        ShapeKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Kind-specific part of a descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeBody {
    Rectangle(RectangleProps),
    Ellipse(EllipseProps),
    Line(LineProps),
    FreehandPath(PathProps),
    TextBox(TextProps),
    /// A kind this format does not model; only common fields survive
    Unsupported { kind: String },
}

impl ShapeBody {
    pub fn kind(&self) -> Option<ShapeKind> {
        match self {
            ShapeBody::Rectangle(_) => Some(ShapeKind::Rectangle),
            ShapeBody::Ellipse(_) => Some(ShapeKind::Ellipse),
            ShapeBody::Line(_) => Some(ShapeKind::Line),
            ShapeBody::FreehandPath(_) => Some(ShapeKind::FreehandPath),
            ShapeBody::TextBox(_) => Some(ShapeKind::TextBox),
            ShapeBody::Unsupported { .. } => None,
        }
    }

    /// Wire tag, including the raw tag of unsupported kinds
    pub fn tag(&self) -> &str {
        match self {
            ShapeBody::Unsupported { kind } => kind,
            other => other.kind().map(|k| k.tag()).unwrap_or_default(),
        }
    }
}

/// One drawable in document form
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDescriptor {
    pub common: CommonProps,
    pub body: ShapeBody,
}

impl ShapeDescriptor {
    pub fn new(common: CommonProps, body: ShapeBody) -> Self {
        Self { common, body }
    }

    pub fn kind(&self) -> Option<ShapeKind> {
        self.body.kind()
    }

    /// Whether a decode/encode cycle may change this descriptor
    pub fn is_lossy(&self) -> bool {
        matches!(&self.body, ShapeBody::FreehandPath(p) if p.decimated)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum BodyRepr<'a> {
    Rectangle(&'a RectangleProps),
    Ellipse(&'a EllipseProps),
    Line(&'a LineProps),
    FreehandPath(&'a PathProps),
    TextBox(&'a TextProps),
}

#[derive(Serialize)]
struct DescriptorRepr<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(flatten)]
    common: &'a CommonProps,
    #[serde(flatten)]
    body: Option<BodyRepr<'a>>,
}

impl Serialize for ShapeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match &self.body {
            ShapeBody::Rectangle(p) => Some(BodyRepr::Rectangle(p)),
            ShapeBody::Ellipse(p) => Some(BodyRepr::Ellipse(p)),
            ShapeBody::Line(p) => Some(BodyRepr::Line(p)),
            ShapeBody::FreehandPath(p) => Some(BodyRepr::FreehandPath(p)),
            ShapeBody::TextBox(p) => Some(BodyRepr::TextBox(p)),
            ShapeBody::Unsupported { .. } => None,
        };
        DescriptorRepr {
            kind: self.body.tag(),
            common: &self.common,
            body,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ShapeDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = serde_json::Map::deserialize(deserializer)?;
        let kind = match fields.remove("type") {
            Some(serde_json::Value::String(kind)) => kind,
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "shape type must be a string, got {}",
                    other
                )))
            }
            None => return Err(D::Error::missing_field("type")),
        };
        let fields = serde_json::Value::Object(fields);

        let common = CommonProps::deserialize(&fields).map_err(D::Error::custom)?;
        let body = match ShapeKind::from_tag(&kind) {
            Some(ShapeKind::Rectangle) => {
                ShapeBody::Rectangle(RectangleProps::deserialize(&fields).map_err(D::Error::custom)?)
            }
            Some(ShapeKind::Ellipse) => {
                ShapeBody::Ellipse(EllipseProps::deserialize(&fields).map_err(D::Error::custom)?)
            }
            Some(ShapeKind::Line) => {
                ShapeBody::Line(LineProps::deserialize(&fields).map_err(D::Error::custom)?)
            }
            Some(ShapeKind::FreehandPath) => {
                ShapeBody::FreehandPath(PathProps::deserialize(&fields).map_err(D::Error::custom)?)
            }
            Some(ShapeKind::TextBox) => {
                ShapeBody::TextBox(TextProps::deserialize(&fields).map_err(D::Error::custom)?)
            }
            None => ShapeBody::Unsupported { kind },
        };

        Ok(ShapeDescriptor { common, body })
    }
}
