use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use sketchkit_core::{thread_safe, CanvasId, Error, SessionError, StoreError, ThreadSafe};
use sketchkit_scene::{
    DocumentStore, EncodeOptions, LoadOutcome, MemoryDocumentStore, MemoryScene,
    MemorySceneCache, SceneCache, SceneDocument, SceneEngine, SceneSession, SceneStore,
    SessionOptions, SessionPhase, StoredRecord, Tool, ToolController,
};
use tokio::sync::Notify;

/// Memory store whose reads or writes can be made to fail
#[derive(Default)]
struct FlakyStore {
    inner: MemoryDocumentStore,
    fail_get: bool,
    fail_put: bool,
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, canvas_id: &CanvasId) -> Result<Option<StoredRecord>, StoreError> {
        if self.fail_get {
            return Err(StoreError::Io {
                reason: "connection reset".to_string(),
            });
        }
        self.inner.get(canvas_id).await
    }

    async fn put(&self, canvas_id: &CanvasId, record: StoredRecord) -> Result<(), StoreError> {
        if self.fail_put {
            return Err(StoreError::Backend {
                message: "quota exceeded".to_string(),
            });
        }
        self.inner.put(canvas_id, record).await
    }

    async fn create(&self) -> Result<CanvasId, StoreError> {
        self.inner.create().await
    }
}

/// Store whose reads wait until released
struct GatedStore {
    gate: Arc<Notify>,
    inner: MemoryDocumentStore,
}

#[async_trait]
impl DocumentStore for GatedStore {
    async fn get(&self, canvas_id: &CanvasId) -> Result<Option<StoredRecord>, StoreError> {
        self.gate.notified().await;
        self.inner.get(canvas_id).await
    }

    async fn put(&self, canvas_id: &CanvasId, record: StoredRecord) -> Result<(), StoreError> {
        self.inner.put(canvas_id, record).await
    }

    async fn create(&self) -> Result<CanvasId, StoreError> {
        self.inner.create().await
    }
}

/// Store whose first write parks until released
struct HeldPutStore {
    entered: Arc<Notify>,
    release: Arc<Notify>,
    hold_first: AtomicBool,
    inner: MemoryDocumentStore,
}

#[async_trait]
impl DocumentStore for HeldPutStore {
    async fn get(&self, canvas_id: &CanvasId) -> Result<Option<StoredRecord>, StoreError> {
        self.inner.get(canvas_id).await
    }

    async fn put(&self, canvas_id: &CanvasId, record: StoredRecord) -> Result<(), StoreError> {
        if self.hold_first.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.put(canvas_id, record).await
    }

    async fn create(&self) -> Result<CanvasId, StoreError> {
        self.inner.create().await
    }
}

struct BrokenCache;

#[async_trait]
impl SceneCache for BrokenCache {
    async fn write(&self, _key: &CanvasId, _document: &SceneDocument) -> Result<(), StoreError> {
        Err(StoreError::Io {
            reason: "disk full".to_string(),
        })
    }
}

fn quick_options() -> SessionOptions {
    SessionOptions {
        autosave: true,
        autosave_debounce: Duration::from_millis(20),
        encode: EncodeOptions::default(),
    }
}

fn session_with(
    id: &CanvasId,
    backend: Arc<dyn DocumentStore>,
    cache: Arc<dyn SceneCache>,
) -> (SceneSession<MemoryScene>, ThreadSafe<MemoryScene>) {
    let engine = thread_safe(MemoryScene::default());
    let session = SceneSession::new(
        id.clone(),
        Arc::clone(&engine),
        Arc::new(SceneStore::new(backend)),
        cache,
        quick_options(),
    );
    (session, engine)
}

fn versioned_record() -> StoredRecord {
    StoredRecord {
        data: json!({
            "formatVersion": 2,
            "canvasProperties": { "width": 800, "height": 500, "backgroundColor": "#ffffff" },
            "shapes": [
                { "type": "rectangle", "left": 50, "top": 50, "width": 100, "height": 100, "fill": "#ff0000" },
                { "type": "pentagon" },
                { "type": "textBox", "text": "hello" }
            ]
        }),
        last_modified: None,
        shape_count: 3,
    }
}

async fn wait_for_autosaves(session: &SceneSession<MemoryScene>, count: u64) {
    let mut attempts = session.autosave_attempts();
    tokio::time::timeout(Duration::from_secs(5), attempts.wait_for(|n| *n >= count))
        .await
        .expect("auto-save did not run")
        .unwrap();
}

#[tokio::test]
async fn test_new_canvas_first_save() {
    let backend = Arc::new(MemoryDocumentStore::new());
    let store = SceneStore::new(backend.clone());
    let id = store.create_canvas().await.unwrap();

    let (mut session, engine) = session_with(&id, backend.clone(), Arc::new(MemorySceneCache::new()));
    assert_eq!(session.phase(), SessionPhase::Uninitialized);
    assert_eq!(session.load().await, LoadOutcome::Empty);
    assert_eq!(session.phase(), SessionPhase::Ready);
    assert!(engine.lock().is_empty());

    let mut tools = ToolController::default();
    tools.select_tool(Tool::Rectangle, &mut *engine.lock()).unwrap();

    let receipt = session.save().await.unwrap();
    assert_eq!(receipt.shape_count, 1);
    assert_eq!(session.last_saved(), Some(receipt));

    let record = backend.record(&id).unwrap();
    assert_eq!(record.shape_count, 1);
    assert_eq!(record.data["shapes"][0]["type"], "rectangle");
    assert_eq!(record.data["shapes"][0]["fill"], "#ff0000");
}

#[tokio::test]
async fn test_versioned_load_skips_unknown_shapes() {
    let backend = Arc::new(MemoryDocumentStore::new());
    let id = CanvasId::from("drawing");
    backend.insert(id.clone(), versioned_record());

    let (mut session, engine) = session_with(&id, backend, Arc::new(MemorySceneCache::new()));
    assert_eq!(
        session.load().await,
        LoadOutcome::Restored {
            shapes: 2,
            skipped: 1
        }
    );
    assert_eq!(engine.lock().len(), 2);
}

#[tokio::test]
async fn test_legacy_load_then_save_upgrades() {
    let backend = Arc::new(MemoryDocumentStore::new());
    let id = CanvasId::from("legacy");
    backend.insert(
        id.clone(),
        StoredRecord {
            data: json!({
                "version": "5.3.0",
                "background": "#fff",
                "objects": [
                    { "type": "rect", "left": 50, "top": 50, "width": 100, "height": 100, "fill": "red" },
                    { "type": "circle", "left": 100, "top": 100, "radius": 50, "fill": "blue" }
                ]
            }),
            last_modified: None,
            shape_count: 0,
        },
    );

    let (mut session, engine) =
        session_with(&id, backend.clone(), Arc::new(MemorySceneCache::new()));
    assert_eq!(session.load().await, LoadOutcome::Legacy { objects: 2 });
    assert_eq!(engine.lock().len(), 2);

    session.save().await.unwrap();
    let record = backend.record(&id).unwrap();
    assert_eq!(record.data["formatVersion"], 2);
    assert_eq!(record.shape_count, 2);
    assert_eq!(record.data["shapes"][1]["type"], "ellipse");
    assert_eq!(record.data["shapes"][1]["rx"], 50.0);
}

#[tokio::test]
async fn test_load_failure_leaves_usable_scene() {
    let backend = Arc::new(FlakyStore {
        fail_get: true,
        ..FlakyStore::default()
    });
    let id = CanvasId::from("unreachable");
    let (mut session, engine) = session_with(&id, backend, Arc::new(MemorySceneCache::new()));

    let outcome = session.load().await;
    assert!(matches!(outcome, LoadOutcome::Failed { .. }));
    assert_eq!(session.phase(), SessionPhase::Ready);

    let mut tools = ToolController::default();
    tools.select_tool(Tool::Line, &mut *engine.lock()).unwrap();
    assert_eq!(session.save().await.unwrap().shape_count, 1);
}

#[tokio::test]
async fn test_save_failure_is_reported_and_scene_kept() {
    let backend = Arc::new(FlakyStore {
        fail_put: true,
        ..FlakyStore::default()
    });
    let id = CanvasId::from("readonly");
    let (mut session, engine) = session_with(&id, backend, Arc::new(MemorySceneCache::new()));
    session.load().await;

    let mut tools = ToolController::default();
    tools.select_tool(Tool::Rectangle, &mut *engine.lock()).unwrap();

    let err = session.save().await.unwrap_err();
    assert!(matches!(err, Error::StoreWrite(_)));
    assert!(err.is_user_facing());
    assert!(err.to_string().starts_with("Failed to save canvas"));
    assert_eq!(engine.lock().len(), 1);
    assert_eq!(session.last_saved(), None);
}

#[tokio::test]
async fn test_save_requires_ready() {
    let id = CanvasId::from("early");
    let (session, _engine) = session_with(
        &id,
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(MemorySceneCache::new()),
    );
    match session.save().await {
        Err(Error::Session(SessionError::NotReady { phase, .. })) => {
            assert_eq!(phase, "uninitialized")
        }
        other => panic!("expected NotReady, got {:?}", other),
    }
}

#[tokio::test]
async fn test_second_load_is_ignored() {
    let backend = Arc::new(MemoryDocumentStore::new());
    let id = CanvasId::from("twice");
    backend.insert(id.clone(), versioned_record());
    let (mut session, engine) = session_with(&id, backend, Arc::new(MemorySceneCache::new()));

    session.load().await;
    assert_eq!(session.load().await, LoadOutcome::Discarded);
    assert_eq!(engine.lock().len(), 2);
}

#[tokio::test]
async fn test_autosave_writes_cache_after_mutation() {
    let backend = Arc::new(MemoryDocumentStore::new());
    let cache = Arc::new(MemorySceneCache::new());
    let id = CanvasId::from("autosaved");
    let (mut session, engine) = session_with(&id, backend.clone(), cache.clone());
    session.load().await;

    let mut tools = ToolController::default();
    tools.select_tool(Tool::Ellipse, &mut *engine.lock()).unwrap();
    wait_for_autosaves(&session, 1).await;

    let cached = cache.get(&id).unwrap();
    assert_eq!(cached.shape_count(), 1);
    // Auto-save never touches the document store
    assert!(backend.record(&id).is_none());
}

#[tokio::test]
async fn test_loading_does_not_autosave() {
    let backend = Arc::new(MemoryDocumentStore::new());
    let cache = Arc::new(MemorySceneCache::new());
    let id = CanvasId::from("quiet");
    backend.insert(id.clone(), versioned_record());

    let (mut session, _engine) = session_with(&id, backend, cache.clone());
    session.load().await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(*session.autosave_attempts().borrow(), 0);
    assert!(cache.get(&id).is_none());
}

#[tokio::test]
async fn test_burst_of_edits_is_one_autosave() {
    let cache = Arc::new(MemorySceneCache::new());
    let id = CanvasId::from("burst");
    let (mut session, engine) = session_with(&id, Arc::new(MemoryDocumentStore::new()), cache.clone());
    session.load().await;

    let mut tools = ToolController::default();
    {
        let mut scene = engine.lock();
        for _ in 0..5 {
            tools.select_tool(Tool::Rectangle, &mut *scene).unwrap();
        }
    }
    wait_for_autosaves(&session, 1).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(*session.autosave_attempts().borrow(), 1);
    assert_eq!(cache.get(&id).unwrap().shape_count(), 5);
}

#[tokio::test]
async fn test_cache_failure_is_not_surfaced() {
    let id = CanvasId::from("nocache");
    let (mut session, engine) = session_with(
        &id,
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(BrokenCache),
    );
    session.load().await;

    let mut tools = ToolController::default();
    tools.select_tool(Tool::Text, &mut *engine.lock()).unwrap();
    wait_for_autosaves(&session, 1).await;

    assert!(session.is_alive());
    assert_eq!(session.save().await.unwrap().shape_count, 1);
}

#[tokio::test]
async fn test_teardown_discards_pending_load() {
    let gate = Arc::new(Notify::new());
    let inner = MemoryDocumentStore::new();
    let id = CanvasId::from("closing");
    inner.insert(id.clone(), versioned_record());
    let backend = Arc::new(GatedStore {
        gate: Arc::clone(&gate),
        inner,
    });

    let (mut session, engine) = session_with(&id, backend, Arc::new(MemorySceneCache::new()));
    let teardown = session.teardown_handle();

    let (outcome, ()) = tokio::join!(session.load(), async {
        teardown.close();
        gate.notify_one();
    });

    assert_eq!(outcome, LoadOutcome::Discarded);
    assert!(engine.lock().is_empty());
    assert!(matches!(
        session.save().await,
        Err(Error::Session(SessionError::Closed { .. }))
    ));
}

#[tokio::test]
async fn test_overlapping_saves_commit_in_order() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let backend = Arc::new(HeldPutStore {
        entered: Arc::clone(&entered),
        release: Arc::clone(&release),
        hold_first: AtomicBool::new(true),
        inner: MemoryDocumentStore::new(),
    });
    let id = CanvasId::from("overlap");
    let (mut session, engine) =
        session_with(&id, backend.clone(), Arc::new(MemorySceneCache::new()));
    session.load().await;

    let mut tools = ToolController::default();
    tools.select_tool(Tool::Rectangle, &mut *engine.lock()).unwrap();

    let (first, second) = tokio::join!(session.save(), async {
        // First commit is in flight; edit before saving again
        entered.notified().await;
        tools.select_tool(Tool::Ellipse, &mut *engine.lock()).unwrap();
        release.notify_one();
        session.save().await
    });

    assert_eq!(first.unwrap().shape_count, 1);
    let second = second.unwrap();
    assert_eq!(second.shape_count, 2);
    assert_eq!(session.last_saved(), Some(second));

    let record = backend.inner.record(&id).unwrap();
    assert_eq!(record.shape_count, 2);
    assert_eq!(record.data["shapes"].as_array().unwrap().len(), 2);
    assert_eq!(record.data["shapes"][1]["type"], "ellipse");
}

#[tokio::test]
async fn test_teardown_handle_releases_background_work() {
    let cache = Arc::new(MemorySceneCache::new());
    let id = CanvasId::from("torn");
    let (mut session, engine) =
        session_with(&id, Arc::new(MemoryDocumentStore::new()), cache.clone());
    let bus = engine.lock().event_bus();
    session.load().await;
    assert_eq!(bus.subscriber_count(), 2);

    let teardown = session.teardown_handle();
    teardown.close();
    assert!(teardown.is_closed());
    assert_eq!(bus.subscriber_count(), 0);

    let mut tools = ToolController::default();
    tools.select_tool(Tool::Rectangle, &mut *engine.lock()).unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(*session.autosave_attempts().borrow(), 0);
    assert!(cache.get(&id).is_none());
    assert_eq!(session.selection(), None);
    assert!(matches!(
        session.save().await,
        Err(Error::Session(SessionError::Closed { .. }))
    ));
}

#[tokio::test]
async fn test_drop_releases_subscriptions() {
    let id = CanvasId::from("dropped");
    let (mut session, engine) = session_with(
        &id,
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(MemorySceneCache::new()),
    );
    let bus = engine.lock().event_bus();
    session.load().await;
    assert_eq!(bus.subscriber_count(), 2);

    session.close();
    assert_eq!(bus.subscriber_count(), 0);

    // Editing after teardown is harmless
    let mut tools = ToolController::default();
    tools.select_tool(Tool::Rectangle, &mut *engine.lock()).unwrap();
}

#[tokio::test]
async fn test_selection_is_mirrored() {
    let id = CanvasId::from("mirror");
    let (mut session, engine) = session_with(
        &id,
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(MemorySceneCache::new()),
    );
    session.load().await;
    assert_eq!(session.selection(), None);

    let mut tools = ToolController::default();
    tools.select_tool(Tool::Text, &mut *engine.lock()).unwrap();
    let selected = session.selection().unwrap();
    assert_eq!(selected.kind, "textbox");
    assert_eq!(selected.text.as_deref(), Some("Double click to edit"));

    tools.set_selected_text("Title", &mut *engine.lock());
    assert_eq!(session.selection().unwrap().text.as_deref(), Some("Title"));

    tools.handle_key("Delete", &mut *engine.lock());
    assert_eq!(session.selection(), None);
}

#[tokio::test]
async fn test_rectangle_survives_reload() {
    let backend = Arc::new(MemoryDocumentStore::new());
    let id = CanvasId::from("reload");

    let (mut first, engine) = session_with(&id, backend.clone(), Arc::new(MemorySceneCache::new()));
    first.load().await;
    ToolController::default()
        .select_tool(Tool::Rectangle, &mut *engine.lock())
        .unwrap();
    first.save().await.unwrap();
    first.close();

    let (mut second, engine) = session_with(&id, backend, Arc::new(MemorySceneCache::new()));
    assert_eq!(
        second.load().await,
        LoadOutcome::Restored {
            shapes: 1,
            skipped: 0
        }
    );
    let objects = engine.lock().list_instances();
    assert_eq!(objects.len(), 1);
    let props = &objects[0].props;
    assert_eq!((props.left, props.top), (Some(50.0), Some(50.0)));
    assert_eq!((props.width, props.height), (Some(100.0), Some(100.0)));
    assert_eq!(props.fill.as_deref(), Some("#ff0000"));
}

#[tokio::test]
async fn test_saved_text_comes_back_after_local_delete() {
    let backend = Arc::new(MemoryDocumentStore::new());
    let id = CanvasId::from("hello");
    let (mut session, engine) =
        session_with(&id, backend.clone(), Arc::new(MemorySceneCache::new()));
    session.load().await;

    let mut tools = ToolController::default();
    {
        let mut scene = engine.lock();
        tools.select_tool(Tool::Text, &mut *scene).unwrap();
        assert!(tools.set_selected_text("Hello", &mut *scene));
    }
    session.save().await.unwrap();
    tools.handle_key("Delete", &mut *engine.lock());
    assert!(engine.lock().is_empty());
    session.close();

    let (mut reloaded, engine) = session_with(&id, backend, Arc::new(MemorySceneCache::new()));
    reloaded.load().await;
    let objects = engine.lock().list_instances();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].props.text.as_deref(), Some("Hello"));
}

#[tokio::test]
async fn test_repeated_saves_write_identical_data() {
    let backend = Arc::new(MemoryDocumentStore::new());
    let id = CanvasId::from("stable");
    let (mut session, engine) =
        session_with(&id, backend.clone(), Arc::new(MemorySceneCache::new()));
    session.load().await;

    let mut tools = ToolController::default();
    tools.select_tool(Tool::Line, &mut *engine.lock()).unwrap();
    tools.select_tool(Tool::Text, &mut *engine.lock()).unwrap();

    session.save().await.unwrap();
    let first = serde_json::to_vec(&backend.record(&id).unwrap().data).unwrap();
    session.save().await.unwrap();
    let second = serde_json::to_vec(&backend.record(&id).unwrap().data).unwrap();
    assert_eq!(first, second);
}
