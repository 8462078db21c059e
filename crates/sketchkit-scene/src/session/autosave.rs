//! Debounced background writes of the live scene to the local cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use sketchkit_core::{
    CanvasId, Error, EventCategory, EventFilter, SceneEventBus, Subscription, ThreadSafe,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::SessionPhase;
use crate::codec::{self, EncodeOptions};
use crate::engine::SceneEngine;
use crate::store::SceneCache;

pub(super) struct AutosaveContext<E> {
    pub canvas_id: CanvasId,
    pub engine: ThreadSafe<E>,
    pub cache: Arc<dyn SceneCache>,
    pub encode: EncodeOptions,
    pub debounce: Duration,
    pub phase: Arc<RwLock<SessionPhase>>,
    pub alive: Arc<AtomicBool>,
    pub attempts: watch::Sender<u64>,
}

/// Running auto-save loop; dropping it stops the loop and unsubscribes
pub(super) struct AutosaveWorker {
    _subscription: Subscription,
    task: JoinHandle<()>,
}

impl Drop for AutosaveWorker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Subscribe to scene mutations and start the write loop.
///
/// Events that arrive before the session is ready are ignored, so loading
/// a document does not write it straight back.
pub(super) fn spawn<E>(bus: &SceneEventBus, ctx: AutosaveContext<E>) -> AutosaveWorker
where
    E: SceneEngine + 'static,
{
    let (dirty_tx, dirty_rx) = mpsc::unbounded_channel::<()>();
    let phase = Arc::clone(&ctx.phase);
    let subscription = bus.subscribe_scoped(
        EventFilter::Categories(vec![EventCategory::Mutation]),
        move |_event| {
            if *phase.read() == SessionPhase::Ready {
                let _ = dirty_tx.send(());
            }
        },
    );

    let task = tokio::spawn(run(dirty_rx, ctx));
    AutosaveWorker {
        _subscription: subscription,
        task,
    }
}

async fn run<E>(mut dirty: mpsc::UnboundedReceiver<()>, ctx: AutosaveContext<E>)
where
    E: SceneEngine + 'static,
{
    while dirty.recv().await.is_some() {
        // Quiet period: keep absorbing events until none arrive for `debounce`
        loop {
            match tokio::time::timeout(ctx.debounce, dirty.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        if !ctx.alive.load(Ordering::SeqCst) {
            return;
        }

        let document = {
            let engine = ctx.engine.lock();
            codec::encode_scene(&*engine, &ctx.encode)
        };

        match ctx.cache.write(&ctx.canvas_id, &document).await {
            Ok(()) => tracing::debug!(
                "Auto-saved canvas {} ({} shapes)",
                ctx.canvas_id,
                document.shape_count()
            ),
            Err(err) => tracing::warn!("{}", Error::CacheWrite(err)),
        }
        ctx.attempts.send_modify(|n| *n += 1);
    }
}
