//! Shared access to an editing session
//!
//! A UI may fire the same action twice before the first store call returns.
//! [`SyncSession`] serializes access behind an async mutex and lets callers
//! refuse a second submission with [`EditorError::Busy`] instead of queueing
//! it.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use super::errors::{EditorError, Result};
use crate::sessions::EditorSession;

/// Cloneable handle to a session behind an async mutex
#[derive(Debug)]
pub struct SyncSession<S> {
    inner: Arc<Mutex<EditorSession<S>>>,
}

impl<S> Clone for SyncSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> SyncSession<S> {
    /// Wrap a session
    pub fn new(session: EditorSession<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Take the session if no other operation holds it
    ///
    /// The guard owns its lock, so it can be moved into a spawned task.
    pub fn try_begin(&self) -> Result<OwnedMutexGuard<EditorSession<S>>> {
        Arc::clone(&self.inner)
            .try_lock_owned()
            .map_err(|_| EditorError::Busy)
    }

    /// Wait for the session
    pub async fn lock(&self) -> MutexGuard<'_, EditorSession<S>> {
        self.inner.lock().await
    }

    /// Whether an operation currently holds the session
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}
