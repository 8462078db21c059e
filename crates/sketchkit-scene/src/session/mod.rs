//! Save/load coordination for one editing session of one canvas.
//!
//! A session moves through three phases:
//!
//! ```text
//! Uninitialized --load()--> Loading --(fetch settles)--> Ready
//! ```
//!
//! While `Ready`, scene mutations schedule a debounced auto-save to the
//! local cache and [`SceneSession::save`] commits to the document store.
//! Dropping the session (or closing its [`TeardownHandle`]) stops the
//! auto-save loop, releases the event subscriptions and discards the
//! results of any load or save still in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use sketchkit_core::{
    CanvasId, Error, EventCategory, EventFilter, Result, SceneEvent, SelectionInfo,
    SessionError, Subscription, ThreadSafe,
};
use tokio::sync::watch;

use crate::codec::{self, EncodeOptions};
use crate::document::SceneDocument;
use crate::engine::SceneEngine;
use crate::resolver::Resolution;
use crate::store::{SaveReceipt, SceneCache, SceneStore};

mod autosave;

use autosave::{AutosaveContext, AutosaveWorker};

/// Default quiet period before an auto-save
pub const DEFAULT_AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Loading,
    Ready,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Uninitialized => write!(f, "uninitialized"),
            SessionPhase::Loading => write!(f, "loading"),
            SessionPhase::Ready => write!(f, "ready"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub autosave: bool,
    pub autosave_debounce: Duration,
    pub encode: EncodeOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            autosave: true,
            autosave_debounce: DEFAULT_AUTOSAVE_DEBOUNCE,
            encode: EncodeOptions::default(),
        }
    }
}

/// What `load` did to the live scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored; the scene starts empty
    Empty,
    /// Versioned document replayed
    Restored { shapes: usize, skipped: usize },
    /// Legacy payload handed to the engine's native loader
    Legacy { objects: usize },
    /// Fetch or native load failed; the scene was left empty
    Failed { reason: String },
    /// Session was torn down or already loaded; nothing applied
    Discarded,
}

/// Background work a session owns until it is torn down
#[derive(Default)]
struct SessionResources {
    autosave: Option<AutosaveWorker>,
    selection_subscription: Option<Subscription>,
}

/// Stops the auto-save loop and drops both event subscriptions
fn release(resources: &Mutex<SessionResources>) {
    let (autosave, subscription) = {
        let mut resources = resources.lock();
        (
            resources.autosave.take(),
            resources.selection_subscription.take(),
        )
    };
    drop(autosave);
    drop(subscription);
}

/// Closes a session from outside the task that owns it
#[derive(Clone)]
pub struct TeardownHandle {
    canvas_id: CanvasId,
    alive: Arc<AtomicBool>,
    resources: Arc<Mutex<SessionResources>>,
}

impl std::fmt::Debug for TeardownHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeardownHandle")
            .field("canvas_id", &self.canvas_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl TeardownHandle {
    pub fn close(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            tracing::debug!("Session for canvas {} torn down", self.canvas_id);
        }
        release(&self.resources);
    }

    pub fn is_closed(&self) -> bool {
        !self.alive.load(Ordering::SeqCst)
    }
}

/// Coordinates loading, auto-saving and saving one canvas's live scene
pub struct SceneSession<E: SceneEngine + 'static> {
    canvas_id: CanvasId,
    engine: ThreadSafe<E>,
    store: Arc<SceneStore>,
    cache: Arc<dyn SceneCache>,
    options: SessionOptions,
    phase: Arc<RwLock<SessionPhase>>,
    alive: Arc<AtomicBool>,
    selection: Arc<RwLock<Option<SelectionInfo>>>,
    last_saved: RwLock<Option<SaveReceipt>>,
    autosave_attempts: watch::Sender<u64>,
    resources: Arc<Mutex<SessionResources>>,
}

impl<E: SceneEngine + 'static> SceneSession<E> {
    /// Bind a live scene to a canvas id.
    ///
    /// Starts mirroring the engine's selection right away; nothing is read
    /// from the store until [`SceneSession::load`].
    pub fn new(
        canvas_id: CanvasId,
        engine: ThreadSafe<E>,
        store: Arc<SceneStore>,
        cache: Arc<dyn SceneCache>,
        options: SessionOptions,
    ) -> Self {
        let selection = Arc::new(RwLock::new(None));
        let mirror = Arc::clone(&selection);
        let bus = engine.lock().event_bus();
        let selection_subscription = bus.subscribe_scoped(
            EventFilter::Categories(vec![EventCategory::Selection]),
            move |event| {
                if let SceneEvent::Selection(change) = event {
                    *mirror.write() = change.selection().cloned();
                }
            },
        );

        let (autosave_attempts, _) = watch::channel(0);

        Self {
            canvas_id,
            engine,
            store,
            cache,
            options,
            phase: Arc::new(RwLock::new(SessionPhase::Uninitialized)),
            alive: Arc::new(AtomicBool::new(true)),
            selection,
            last_saved: RwLock::new(None),
            autosave_attempts,
            resources: Arc::new(Mutex::new(SessionResources {
                autosave: None,
                selection_subscription: Some(selection_subscription),
            })),
        }
    }

    pub fn canvas_id(&self) -> &CanvasId {
        &self.canvas_id
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.read()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Shared handle to the live scene
    pub fn engine(&self) -> ThreadSafe<E> {
        Arc::clone(&self.engine)
    }

    /// The currently selected instance as last reported by the engine
    pub fn selection(&self) -> Option<SelectionInfo> {
        self.selection.read().clone()
    }

    pub fn last_saved(&self) -> Option<SaveReceipt> {
        self.last_saved.read().clone()
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        TeardownHandle {
            canvas_id: self.canvas_id.clone(),
            alive: Arc::clone(&self.alive),
            resources: Arc::clone(&self.resources),
        }
    }

    /// Counts finished auto-save attempts, successful or not
    pub fn autosave_attempts(&self) -> watch::Receiver<u64> {
        self.autosave_attempts.subscribe()
    }

    /// Encode the live scene as it is now
    pub fn snapshot(&self) -> SceneDocument {
        let engine = self.engine.lock();
        codec::encode_scene(&*engine, &self.options.encode)
    }

    fn set_phase(&self, phase: SessionPhase) {
        *self.phase.write() = phase;
        tracing::debug!("Canvas {} session {}", self.canvas_id, phase);
    }

    /// Populate the live scene from the store.
    ///
    /// Runs once. Read failures are logged and leave an empty, editable
    /// scene; the session still becomes ready.
    pub async fn load(&mut self) -> LoadOutcome {
        if !self.is_alive() || self.phase() != SessionPhase::Uninitialized {
            tracing::warn!(
                "Ignoring load of canvas {} in phase {}",
                self.canvas_id,
                self.phase()
            );
            return LoadOutcome::Discarded;
        }
        self.set_phase(SessionPhase::Loading);

        if self.options.autosave {
            let bus = self.engine.lock().event_bus();
            let ctx = AutosaveContext {
                canvas_id: self.canvas_id.clone(),
                engine: Arc::clone(&self.engine),
                cache: Arc::clone(&self.cache),
                encode: self.options.encode.clone(),
                debounce: self.options.autosave_debounce,
                phase: Arc::clone(&self.phase),
                alive: Arc::clone(&self.alive),
                attempts: self.autosave_attempts.clone(),
            };
            let worker = autosave::spawn(&bus, ctx);
            self.resources.lock().autosave = Some(worker);
        }

        let fetched = self.store.fetch(&self.canvas_id).await;
        if !self.is_alive() {
            tracing::debug!("Discarding load of closed canvas {}", self.canvas_id);
            release(&self.resources);
            return LoadOutcome::Discarded;
        }

        let outcome = {
            let mut engine = self.engine.lock();
            match fetched {
                Err(err) => {
                    let err = Error::StoreRead(err);
                    tracing::error!("{}", err);
                    engine.clear();
                    LoadOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
                Ok(Resolution::Empty) => LoadOutcome::Empty,
                Ok(Resolution::Legacy(payload)) => match engine.load_native(&payload) {
                    Ok(objects) => LoadOutcome::Legacy { objects },
                    Err(err) => {
                        let err = Error::from(err);
                        tracing::error!("Failed to load legacy canvas {}: {}", self.canvas_id, err);
                        engine.clear();
                        LoadOutcome::Failed {
                            reason: err.to_string(),
                        }
                    }
                },
                Ok(Resolution::Versioned(decoded)) => {
                    engine.set_canvas_properties(decoded.document.canvas_properties.clone());
                    let (instructions, unknown) = codec::decode_with_anomalies(&decoded.document);
                    let report = codec::replay(&mut *engine, &instructions);
                    LoadOutcome::Restored {
                        shapes: report.applied.len(),
                        skipped: decoded.anomalies.len() + unknown.len() + report.rejected.len(),
                    }
                }
            }
        };

        self.set_phase(SessionPhase::Ready);
        tracing::info!("Loaded canvas {}: {:?}", self.canvas_id, outcome);
        outcome
    }

    /// Commit the live scene to the document store.
    ///
    /// Saves of one canvas are serialized; each one snapshots the scene
    /// only after the previous commit has been acknowledged.
    pub async fn save(&self) -> Result<SaveReceipt> {
        self.ensure_ready()?;

        let _guard = self.store.lock_canvas(&self.canvas_id).await;
        if !self.is_alive() {
            return Err(self.closed());
        }
        let document = self.snapshot();

        match self.store.commit(&self.canvas_id, &document).await {
            Ok(receipt) => {
                tracing::info!(
                    "Saved canvas {} ({} shapes)",
                    self.canvas_id,
                    receipt.shape_count
                );
                if self.is_alive() {
                    *self.last_saved.write() = Some(receipt.clone());
                }
                Ok(receipt)
            }
            Err(err) => {
                let err = Error::StoreWrite(err);
                tracing::error!("{}", err);
                Err(err)
            }
        }
    }

    fn closed(&self) -> Error {
        SessionError::Closed {
            canvas_id: self.canvas_id.to_string(),
        }
        .into()
    }

    fn ensure_ready(&self) -> Result<()> {
        if !self.is_alive() {
            return Err(self.closed());
        }
        let phase = self.phase();
        if phase != SessionPhase::Ready {
            return Err(SessionError::NotReady {
                canvas_id: self.canvas_id.to_string(),
                phase: phase.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Tear the session down
    pub fn close(self) {
        tracing::info!("Closing session for canvas {}", self.canvas_id);
        self.alive.store(false, Ordering::SeqCst);
        release(&self.resources);
    }
}

impl<E: SceneEngine + 'static> Drop for SceneSession<E> {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        release(&self.resources);
    }
}
