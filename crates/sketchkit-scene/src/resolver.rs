//! Classify a stored payload before decoding it.
//!
//! A payload is *versioned* when it carries a truthy `formatVersion` and a
//! `shapes` array. Anything else that is present is *legacy* and goes to the
//! engine's native loader untouched. A missing or null payload is *empty*.

use serde::Deserialize;
use serde_json::Value;
use sketchkit_core::DecodeAnomaly;

use crate::document::{CanvasProperties, SceneDocument, FORMAT_VERSION};
use crate::model::ShapeDescriptor;

/// How a stored payload has to be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentClass {
    Versioned,
    Legacy,
    Empty,
}

/// A versioned payload read into a document
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDocument {
    pub document: SceneDocument,
    /// Entries that could not be read and were left out
    pub anomalies: Vec<DecodeAnomaly>,
}

/// Result of resolving a stored payload
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Versioned(DecodedDocument),
    /// Pre-versioning engine dump, passed through unchanged
    Legacy(Value),
    Empty,
}

impl Resolution {
    pub fn class(&self) -> DocumentClass {
        match self {
            Resolution::Versioned(_) => DocumentClass::Versioned,
            Resolution::Legacy(_) => DocumentClass::Legacy,
            Resolution::Empty => DocumentClass::Empty,
        }
    }
}

/// JavaScript-style truthiness, which stored payloads were written against
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Classify without decoding
pub fn classify(payload: Option<&Value>) -> DocumentClass {
    match payload {
        None | Some(Value::Null) => DocumentClass::Empty,
        Some(value) => {
            let versioned = value.get("formatVersion").is_some_and(is_truthy)
                && value.get("shapes").is_some_and(Value::is_array);
            if versioned {
                DocumentClass::Versioned
            } else {
                DocumentClass::Legacy
            }
        }
    }
}

/// Classify a payload and decode it when versioned.
///
/// Shape entries that fail to parse become [`DecodeAnomaly::Malformed`] and
/// are dropped; the rest of the document still loads.
pub fn resolve(payload: Option<&Value>) -> Resolution {
    match (classify(payload), payload) {
        (DocumentClass::Versioned, Some(value)) => Resolution::Versioned(read_versioned(value)),
        (DocumentClass::Legacy, Some(value)) => {
            tracing::info!("Stored canvas predates versioned documents");
            Resolution::Legacy(value.clone())
        }
        _ => Resolution::Empty,
    }
}

fn read_versioned(value: &Value) -> DecodedDocument {
    let format_version = match value.get("formatVersion").and_then(Value::as_u64) {
        Some(version) => u32::try_from(version).unwrap_or(u32::MAX),
        None => {
            tracing::warn!(
                "Non-numeric formatVersion {:?}, reading as version {}",
                value.get("formatVersion"),
                FORMAT_VERSION
            );
            FORMAT_VERSION
        }
    };
    if format_version > FORMAT_VERSION {
        tracing::warn!(
            "Document format {} is newer than {}, reading best-effort",
            format_version,
            FORMAT_VERSION
        );
    }

    let canvas_properties = match value.get("canvasProperties") {
        Some(props) => CanvasProperties::deserialize(props).unwrap_or_else(|err| {
            tracing::warn!("Unreadable canvasProperties, using defaults: {}", err);
            CanvasProperties::default()
        }),
        None => CanvasProperties::default(),
    };

    let entries = value
        .get("shapes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut shapes = Vec::with_capacity(entries.len());
    let mut anomalies = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match ShapeDescriptor::deserialize(entry) {
            Ok(shape) => shapes.push(shape),
            Err(err) => {
                let anomaly = DecodeAnomaly::Malformed {
                    index,
                    reason: err.to_string(),
                };
                tracing::warn!("{}", anomaly);
                anomalies.push(anomaly);
            }
        }
    }

    DecodedDocument {
        document: SceneDocument {
            format_version,
            canvas_properties,
            shapes,
        },
        anomalies,
    }
}
