// ── Callback registry ──
//
// Completion handlers keyed by a per-load token. Replaces a single fixed
// global callback name so that independent loads never collide.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};
use uuid::Uuid;

use super::LoadError;

pub(crate) type Completion = Box<dyn FnOnce(Result<(), LoadError>) + Send + Sync>;

/// Token-keyed completion handlers. Cheaply cloneable; clones share state.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    handlers: Arc<DashMap<String, Completion>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh token usable as a JavaScript identifier.
    pub(crate) fn new_token() -> String {
        format!("roster_cb_{}", Uuid::new_v4().simple())
    }

    pub(crate) fn register(&self, token: String, completion: Completion) {
        trace!(%token, "callback registered");
        self.handlers.insert(token, completion);
    }

    /// Signal that the script behind `token` is ready.
    /// Returns `false` if the token is unknown or already settled.
    pub fn resolve(&self, token: &str) -> bool {
        self.settle(token, Ok(()))
    }

    /// Signal that the script behind `token` failed to load.
    /// Returns `false` if the token is unknown or already settled.
    pub fn reject(&self, token: &str, error: LoadError) -> bool {
        self.settle(token, Err(error))
    }

    /// Whether a handler is waiting under `token`.
    pub fn is_pending(&self, token: &str) -> bool {
        self.handlers.contains_key(token)
    }

    pub fn pending_count(&self) -> usize {
        self.handlers.len()
    }

    fn settle(&self, token: &str, outcome: Result<(), LoadError>) -> bool {
        // Remove before calling so the handler runs without a shard lock held.
        let Some((_, completion)) = self.handlers.remove(token) else {
            debug!(%token, "callback for unknown or settled token ignored");
            return false;
        };
        completion(outcome);
        true
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("pending", &self.handlers.len())
            .finish()
    }
}
