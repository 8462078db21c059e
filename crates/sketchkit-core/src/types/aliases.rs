//! Type aliases for commonly used shared-state types.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sketchkit_core::types::*;
//!
//! // Instead of: Arc<Mutex<MemoryScene>>
//! let scene: ThreadSafe<MemoryScene> = thread_safe(MemoryScene::new(props));
//! scene.lock().clear();
//! ```

use parking_lot::Mutex;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-task sharing.
///
/// The live scene is held this way so the session, its auto-save task and
/// the UI layer can all reach it. Uses `parking_lot::Mutex`; guards must not
/// be held across an `.await`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// Wrap a value in a `ThreadSafe`
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}
