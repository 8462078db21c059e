//! # SketchKit Scene
//!
//! Persistence core for a 2D drawing surface.
//!
//! - [`model`]: engine-independent shape descriptors
//! - [`codec`]: live scene to document and back
//! - [`resolver`]: versioned, legacy or empty stored payloads
//! - [`store`]: document store and auto-save cache backends
//! - [`session`]: load, auto-save and save for one canvas
//! - [`tools`]: drawing tools acting on the live scene

pub mod codec;
pub mod color;
pub mod document;
pub mod engine;
pub mod model;
pub mod resolver;
pub mod session;
pub mod store;
pub mod tools;

pub use codec::{
    decode, decode_with_anomalies, encode, encode_scene, replay, ConstructInstruction,
    EncodeOptions, ReplayReport,
};
pub use color::{Color, ColorParseError};
pub use document::{CanvasProperties, SceneDocument, FORMAT_VERSION};
pub use engine::{Brush, LiveKind, LiveObject, LiveProps, MemoryScene, SceneEngine};
pub use model::{PathCommand, Point, ShapeBody, ShapeDescriptor, ShapeKind};
pub use resolver::{classify, resolve, DecodedDocument, DocumentClass, Resolution};
pub use session::{LoadOutcome, SceneSession, SessionOptions, SessionPhase, TeardownHandle};
pub use store::{
    DocumentStore, FileDocumentStore, FileSceneCache, MemoryDocumentStore, MemorySceneCache,
    SaveReceipt, SceneCache, SceneStore, StoredRecord,
};
pub use tools::{BrushWidths, Tool, ToolController, ToolEffect, UnknownTool};
