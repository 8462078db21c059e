use serde::{Deserialize, Deserializer, Serialize};

use super::path::PathCommand;
use super::Point;
use crate::color::Color;

/// Font family used when a text instance names none
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
/// Font size used when a text instance has none
pub const DEFAULT_FONT_SIZE: f64 = 20.0;
/// Font weight used when a text instance has none
pub const DEFAULT_FONT_WEIGHT: &str = "normal";
/// Stroke width used when an instance has none
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;

pub(crate) fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}
pub(crate) fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}
pub(crate) fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}
pub(crate) fn default_font_weight() -> String {
    DEFAULT_FONT_WEIGHT.to_string()
}
fn default_one() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}
fn is_false(value: &bool) -> bool {
    !*value
}

// Producers write `null` for unset properties; read it like a missing key.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_one))
}

fn null_as_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_true))
}

fn null_as_stroke_width<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_stroke_width))
}

fn null_as_font_family<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_font_family))
}

fn null_as_font_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_font_size))
}

fn null_as_font_weight<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_font_weight))
}

/// Fields shared by every shape kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonProps {
    #[serde(default, deserialize_with = "null_as_default")]
    pub left: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub width: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub height: f64,
    #[serde(default = "default_one", deserialize_with = "null_as_one")]
    pub scale_x: f64,
    #[serde(default = "default_one", deserialize_with = "null_as_one")]
    pub scale_y: f64,
    /// Rotation in degrees
    #[serde(default, deserialize_with = "null_as_default")]
    pub angle: f64,
    #[serde(default = "default_one", deserialize_with = "null_as_one")]
    pub opacity: f64,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub visible: bool,
}

impl Default for CommonProps {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            opacity: 1.0,
            visible: true,
        }
    }
}

/// Rectangle fields; `rx`/`ry` are corner radii
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleProps {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fill: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(default = "default_stroke_width", deserialize_with = "null_as_stroke_width")]
    pub stroke_width: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rx: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ry: f64,
}

/// Ellipse fields; `rx`/`ry` are the radii, equal for a circle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipseProps {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fill: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(default = "default_stroke_width", deserialize_with = "null_as_stroke_width")]
    pub stroke_width: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rx: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ry: f64,
}

impl EllipseProps {
    pub fn is_circle(&self) -> bool {
        (self.rx - self.ry).abs() < f64::EPSILON
    }
}

/// Line fields
///
/// The endpoint pair is the only stored geometry. A `points` key in a stored
/// document is ignored; `points()` derives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineProps {
    #[serde(default, deserialize_with = "null_as_default")]
    pub stroke: Color,
    #[serde(default = "default_stroke_width", deserialize_with = "null_as_stroke_width")]
    pub stroke_width: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub x1: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub y1: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub x2: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub y2: f64,
}

impl LineProps {
    pub fn points(&self) -> [Point; 2] {
        [Point::new(self.x1, self.y1), Point::new(self.x2, self.y2)]
    }
}

/// Free-hand path fields
///
/// `decimated` records that the command list was already thinned once, so
/// later encodes leave it alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathProps {
    #[serde(default, deserialize_with = "null_as_default")]
    pub stroke: Color,
    #[serde(default = "default_stroke_width", deserialize_with = "null_as_stroke_width")]
    pub stroke_width: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: Vec<PathCommand>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_false"
    )]
    pub decimated: bool,
}

/// Horizontal alignment of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    /// Lenient parse used for live values; unknown values read as `Left`
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("center") => TextAlign::Center,
            Some("right") => TextAlign::Right,
            Some("justify") => TextAlign::Justify,
            _ => TextAlign::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }
}

/// Text box fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default = "default_font_family", deserialize_with = "null_as_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size", deserialize_with = "null_as_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_weight", deserialize_with = "null_as_font_weight")]
    pub font_weight: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fill: Color,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text_align: TextAlign,
}
