//! Error handling for SketchKit
//!
//! Provides the error types for every layer of the persistence core:
//! - Decode anomalies (one bad shape inside an otherwise valid document)
//! - Store errors (remote document store and local cache backends)
//! - Engine errors (the live scene rejected an instruction)
//! - Session errors (operation attempted in the wrong phase)
//!
//! None of these is fatal to the process. Each one means that a single
//! operation did not complete while the live scene stays editable.

use thiserror::Error;

/// A recoverable problem with one shape entry of a versioned document.
///
/// Decoding skips the offending entry and keeps going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeAnomaly {
    /// The entry carries a kind tag outside the supported set
    #[error("Shape {index}: unknown kind '{kind}'")]
    UnknownKind {
        /// Position of the entry in the shapes array.
        index: usize,
        /// The unrecognised kind tag.
        kind: String,
    },

    /// The entry could not be parsed as a shape descriptor
    #[error("Shape {index}: malformed entry: {reason}")]
    Malformed {
        /// Position of the entry in the shapes array.
        index: usize,
        /// Parser message.
        reason: String,
    },
}

impl DecodeAnomaly {
    /// Index of the shape entry this anomaly refers to
    pub fn index(&self) -> usize {
        match self {
            DecodeAnomaly::UnknownKind { index, .. } | DecodeAnomaly::Malformed { index, .. } => {
                *index
            }
        }
    }
}

/// Store error type
///
/// Raised by document store and cache backends.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Filesystem or transport failure
    #[error("I/O error: {reason}")]
    Io {
        /// Description of the failure.
        reason: String,
    },

    /// Record could not be encoded or parsed
    #[error("Serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },

    /// Backend-specific failure
    #[error("Store backend error: {message}")]
    Backend {
        /// The error message.
        message: String,
    },
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Engine error type
///
/// Represents the live scene refusing an operation.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// Handle does not name a created instance
    #[error("Unknown instance handle {handle}")]
    UnknownHandle {
        /// The raw handle value.
        handle: u64,
    },

    /// Instance was already added to the scene
    #[error("Instance {handle} is already in the scene")]
    AlreadyAdded {
        /// The raw handle value.
        handle: u64,
    },

    /// Engine cannot build an instance of this kind
    #[error("Unsupported instance kind: {kind}")]
    UnsupportedKind {
        /// The kind that was requested.
        kind: String,
    },

    /// Native bulk loader rejected a legacy payload
    #[error("Native load failed: {reason}")]
    NativeLoad {
        /// The reason given by the loader.
        reason: String,
    },
}

/// Session error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session has not finished loading
    #[error("Session for canvas {canvas_id} is not ready (phase: {phase})")]
    NotReady {
        /// Canvas id of the session.
        canvas_id: String,
        /// Current phase name.
        phase: String,
    },

    /// Session was torn down
    #[error("Session for canvas {canvas_id} is closed")]
    Closed {
        /// Canvas id of the session.
        canvas_id: String,
    },
}

/// Main error type for SketchKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Loading from the remote store failed
    #[error("Failed to load canvas: {0}")]
    StoreRead(StoreError),

    /// Explicit save to the remote store failed
    #[error("Failed to save canvas: {0}")]
    StoreWrite(StoreError),

    /// Auto-save to the local cache failed
    #[error("Failed to write auto-save cache: {0}")]
    CacheWrite(StoreError),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl Error {
    /// Check if this error should be shown to the user
    ///
    /// Only explicit saves and session misuse are surfaced. Load and cache
    /// failures are logged and degrade silently.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::StoreWrite(_) | Error::Session(_))
    }

    /// Check if this is a store error of any direction
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Error::StoreRead(_) | Error::StoreWrite(_) | Error::CacheWrite(_)
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
