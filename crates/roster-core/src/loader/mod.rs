// ── One-shot external script loader ──
//
// Guarantees a third-party script is appended at most once per successful
// load, no matter how many callers ask for it or how concurrently. Every
// caller awaits the same shared outcome.
//
//   Unloaded ──init──▶ Loading ──resolve──▶ Loaded (terminal)
//                         │
//                         └──reject / host error──▶ Unloaded (next init retries)

mod host;
mod registry;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture, Shared};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::CredentialPolicy;

pub use host::{ScriptHost, ScriptTag};
pub use registry::CallbackRegistry;

/// Outcome shared by every caller of `ScriptLoader::init`.
pub type LoadFuture = Shared<BoxFuture<'static, Result<bool, LoadError>>>;

/// Why a script load did not succeed. `Clone` so one failure can be
/// handed to every coalesced waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("could not append script element: {0}")]
    Host(String),

    #[error("script failed to load: {0}")]
    Script(String),

    #[error("load was abandoned before the script reported back")]
    Abandoned,

    #[error("script is already {phase} with a different key")]
    CredentialConflict { phase: LoadPhase },

    #[error("script is not loaded")]
    NotLoaded,
}

/// Observable loader phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LoadPhase {
    Unloaded,
    Loading,
    Loaded,
}

// ── Script source ────────────────────────────────────────────────

/// How a script URL is assembled from a key and a callback token:
/// `{base}?{key_param}={key}&{params...}&{callback_param}={token}`.
#[derive(Debug, Clone)]
pub struct ScriptSource {
    base: Url,
    key_param: String,
    params: Vec<(String, String)>,
    callback_param: String,
}

impl ScriptSource {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            key_param: "key".into(),
            params: Vec::new(),
            callback_param: "callback".into(),
        }
    }

    /// Add a fixed query parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn url(&self, key: &str, token: &str) -> Url {
        let mut url = self.base.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(&self.key_param, key);
            for (name, value) in &self.params {
                query.append_pair(name, value);
            }
            query.append_pair(&self.callback_param, token);
        }
        url
    }
}

// ── Loader ───────────────────────────────────────────────────────

enum LoaderState {
    Unloaded,
    Loading {
        key: String,
        token: String,
        pending: LoadFuture,
    },
    Loaded {
        key: String,
    },
}

/// Coalescing, retry-on-failure loader for one external script.
///
/// Cheaply cloneable; clones share state. Meant to be built once (see
/// `Context`) and shared by reference.
pub struct ScriptLoader<H: ScriptHost> {
    inner: Arc<LoaderInner<H>>,
}

struct LoaderInner<H> {
    host: H,
    source: ScriptSource,
    policy: CredentialPolicy,
    callbacks: CallbackRegistry,
    state: Mutex<LoaderState>,
}

impl<H: ScriptHost> Clone for ScriptLoader<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: ScriptHost> ScriptLoader<H> {
    pub fn new(host: H, source: ScriptSource, policy: CredentialPolicy) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                host,
                source,
                policy,
                callbacks: CallbackRegistry::new(),
                state: Mutex::new(LoaderState::Unloaded),
            }),
        }
    }

    /// Start (or join) the load for `key`.
    ///
    /// - Already loaded with `key`: resolves to `Ok(true)` with no host activity.
    /// - Load in flight: returns the in-flight future. Under
    ///   `CredentialPolicy::Join` this happens even for a different key.
    /// - Otherwise: appends one script tag and returns the new shared future.
    ///
    /// The tag is appended before this returns, not on first poll.
    pub fn init(&self, key: &str) -> LoadFuture {
        let mut state = self.inner.lock_state();

        match &*state {
            LoaderState::Loaded { key: loaded } => {
                if loaded != key {
                    if self.inner.policy == CredentialPolicy::Reject {
                        return settled(Err(LoadError::CredentialConflict {
                            phase: LoadPhase::Loaded,
                        }));
                    }
                    warn!("script already loaded with a different key; keeping it");
                }
                return settled(Ok(true));
            }
            LoaderState::Loading {
                key: pending_key,
                pending,
                ..
            } => {
                if pending_key != key {
                    if self.inner.policy == CredentialPolicy::Reject {
                        return settled(Err(LoadError::CredentialConflict {
                            phase: LoadPhase::Loading,
                        }));
                    }
                    warn!("joining an in-flight load started with a different key");
                }
                debug!("joining in-flight script load");
                return pending.clone();
            }
            LoaderState::Unloaded => {}
        }

        let token = CallbackRegistry::new_token();
        let (tx, rx) = oneshot::channel();
        let weak = Arc::downgrade(&self.inner);
        let settle_token = token.clone();
        self.inner.callbacks.register(
            token.clone(),
            Box::new(move |outcome| {
                if let Some(inner) = weak.upgrade() {
                    inner.settle(&settle_token, &outcome);
                }
                let _ = tx.send(outcome);
            }),
        );

        let pending: LoadFuture = async move {
            match rx.await {
                Ok(Ok(())) => Ok(true),
                Ok(Err(err)) => Err(err),
                Err(_) => Err(LoadError::Abandoned),
            }
        }
        .boxed()
        .shared();

        let tag = ScriptTag {
            src: self.inner.source.url(key, &token),
            defer: true,
            callback: token.clone(),
        };
        *state = LoaderState::Loading {
            key: key.to_owned(),
            token: token.clone(),
            pending: pending.clone(),
        };
        // The host may report back synchronously, which re-enters `settle`.
        drop(state);

        debug!(host = tag.src.host_str().unwrap_or_default(), %token, "appending script tag");
        if let Err(err) = self.inner.host.append_script(tag) {
            self.inner.callbacks.reject(&token, err);
        }

        pending
    }

    /// Synchronous state query with no side effects.
    pub fn is_loaded(&self) -> bool {
        self.phase() == LoadPhase::Loaded
    }

    pub fn phase(&self) -> LoadPhase {
        match &*self.inner.lock_state() {
            LoaderState::Unloaded => LoadPhase::Unloaded,
            LoaderState::Loading { .. } => LoadPhase::Loading,
            LoaderState::Loaded { .. } => LoadPhase::Loaded,
        }
    }

    /// Registry the host reports readiness and failures to.
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.inner.callbacks
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }
}

impl<H> LoaderInner<H> {
    fn lock_state(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply the outcome of the load identified by `token`. Outcomes for a
    /// token that is no longer current are ignored.
    fn settle(&self, token: &str, outcome: &Result<(), LoadError>) {
        let mut state = self.lock_state();
        let LoaderState::Loading {
            key, token: current, ..
        } = &*state
        else {
            return;
        };
        if current != token {
            debug!(%token, "ignoring outcome of a superseded load");
            return;
        }

        match outcome {
            Ok(()) => {
                info!("external script loaded");
                let key = key.clone();
                *state = LoaderState::Loaded { key };
            }
            Err(err) => {
                warn!(error = %err, "external script failed to load; next init will retry");
                *state = LoaderState::Unloaded;
            }
        }
    }
}

fn settled(outcome: Result<bool, LoadError>) -> LoadFuture {
    future::ready(outcome).boxed().shared()
}
