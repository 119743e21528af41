// ── Process-wide context ──
//
// Built once at startup and passed by reference (or cheap clone) to every
// consumer. Owns the users store and the places service so neither needs
// a global.

use std::sync::Arc;

use tracing::debug;

use crate::config::AppConfig;
use crate::error::CoreError;
use crate::loader::ScriptHost;
use crate::places::PlacesService;
use crate::store::UserStore;

/// Shared application context.
///
/// Cheaply cloneable via `Arc<ContextInner>`. Nothing is fetched or loaded
/// on construction: call `users().list()` and `places().init(..)` when the
/// UI needs them.
pub struct Context<H: ScriptHost> {
    inner: Arc<ContextInner<H>>,
}

struct ContextInner<H: ScriptHost> {
    config: AppConfig,
    users: UserStore,
    places: PlacesService<H>,
}

impl<H: ScriptHost> Clone for Context<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: ScriptHost> Context<H> {
    /// Build the context. Fails only when the store configuration is
    /// unusable (bad URL, unreadable CA file).
    pub fn new(config: AppConfig, host: H) -> Result<Self, CoreError> {
        let users = UserStore::from_config(&config.store)?;
        let places = PlacesService::new(&config.places, host);
        debug!(users_url = %config.store.url, "context created");

        Ok(Self {
            inner: Arc::new(ContextInner {
                config,
                users,
                places,
            }),
        })
    }

    pub fn users(&self) -> &UserStore {
        &self.inner.users
    }

    pub fn places(&self) -> &PlacesService<H> {
        &self.inner.places
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }
}
