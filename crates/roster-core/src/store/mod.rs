// ── Reactive resource store ──
//
// Local mirror of a remote collection. The server is always asked first;
// the local collection changes only after a successful response.

mod collection;

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use roster_api::{CollectionClient, TransportConfig, User, UsersClient};

use crate::config::{StoreConfig, TlsVerification};
use crate::error::CoreError;
use crate::subscription::StoreSubscription;

use self::collection::OrderedCollection;

/// A record with a server-assigned numeric identifier.
pub trait Resource: Send + Sync + 'static {
    fn id(&self) -> u64;
}

impl Resource for User {
    fn id(&self) -> u64 {
        self.id
    }
}

/// The four network operations a store needs from its backend.
pub trait RemoteCollection: Send + Sync {
    /// Record type returned by the server.
    type Item: Resource;
    /// Payload sent on create and update.
    type Draft: Send + Sync;

    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Self::Item>, CoreError>> + Send;

    fn insert(
        &self,
        draft: &Self::Draft,
    ) -> impl Future<Output = Result<Self::Item, CoreError>> + Send;

    fn replace(
        &self,
        id: u64,
        draft: &Self::Draft,
    ) -> impl Future<Output = Result<Self::Item, CoreError>> + Send;

    fn remove(&self, id: u64) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl<T, F> RemoteCollection for CollectionClient<T, F>
where
    T: Resource + DeserializeOwned,
    F: Serialize + Send + Sync,
{
    type Item = T;
    type Draft = F;

    async fn fetch_all(&self) -> Result<Vec<T>, CoreError> {
        Ok(self.list().await?)
    }

    async fn insert(&self, draft: &F) -> Result<T, CoreError> {
        Ok(self.create(draft).await?)
    }

    async fn replace(&self, id: u64, draft: &F) -> Result<T, CoreError> {
        Ok(self.update(id, draft).await?)
    }

    async fn remove(&self, id: u64) -> Result<(), CoreError> {
        Ok(self.delete(id).await?)
    }
}

/// Loading flag plus the last error message, as shown by a UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Store over the public users collection.
pub type UserStore = ResourceStore<UsersClient>;

/// Local mirror of a remote collection with loading/error bookkeeping.
///
/// Every operation sets `loading = true, error = None` on entry, records
/// the error message on failure, and clears `loading` on every exit path
/// (including when the operation's future is dropped). Operations are not
/// serialized against each other; the last response to arrive wins.
pub struct ResourceStore<R: RemoteCollection> {
    remote: R,
    items: OrderedCollection<R::Item>,
    state: watch::Sender<OperationState>,
    last_synced: watch::Sender<Option<DateTime<Utc>>>,
}

/// Clears `loading` when dropped.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<OperationState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}

impl UserStore {
    /// Build a users store from configuration.
    pub fn from_config(config: &StoreConfig) -> Result<Self, CoreError> {
        let tls = match &config.tls {
            TlsVerification::SystemDefaults => roster_api::TlsMode::System,
            TlsVerification::CustomCa(path) => roster_api::TlsMode::CustomCa(path.clone()),
        };
        let transport = TransportConfig {
            tls,
            timeout: config.timeout,
        };
        let client = UsersClient::new(config.url.as_str(), &transport)?;
        Ok(Self::new(client))
    }
}

impl<R: RemoteCollection> ResourceStore<R> {
    pub fn new(remote: R) -> Self {
        let (state, _) = watch::channel(OperationState::default());
        let (last_synced, _) = watch::channel(None);

        Self {
            remote,
            items: OrderedCollection::new(),
            state,
            last_synced,
        }
    }

    /// The backend this store talks to.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch the full collection and replace the local copy wholesale.
    pub async fn list(&self) -> Result<Arc<Vec<Arc<R::Item>>>, CoreError> {
        self.run("list", async {
            let fetched: Vec<Arc<R::Item>> = self
                .remote
                .fetch_all()
                .await?
                .into_iter()
                .map(Arc::new)
                .collect();
            debug!(count = fetched.len(), "collection fetched");
            self.items.replace_all(fetched);
            self.last_synced.send_replace(Some(Utc::now()));
            Ok(self.items.snapshot())
        })
        .await
    }

    /// Create a record and append the server's copy to the local tail.
    pub async fn create(&self, draft: &R::Draft) -> Result<Arc<R::Item>, CoreError> {
        self.run("create", async {
            let created = Arc::new(self.remote.insert(draft).await?);
            debug!(id = created.id(), "record created");
            self.items.push(Arc::clone(&created));
            Ok(created)
        })
        .await
    }

    /// Replace a record. The local record with the requested `id` is
    /// swapped in place for the server's copy; if no local record has this
    /// id the result is returned but not inserted.
    pub async fn update(&self, id: u64, draft: &R::Draft) -> Result<Arc<R::Item>, CoreError> {
        self.run("update", async {
            let updated = Arc::new(self.remote.replace(id, draft).await?);
            if updated.id() != id {
                warn!(requested = id, returned = updated.id(), "server returned a different id");
            }
            if !self.items.replace(id, Arc::clone(&updated)) {
                debug!(id, "updated record is not cached locally; skipping");
            }
            Ok(updated)
        })
        .await
    }

    /// Delete a record and drop every local copy of it.
    pub async fn delete(&self, id: u64) -> Result<bool, CoreError> {
        self.run("delete", async {
            self.remote.remove(id).await?;
            let removed = self.items.remove(id);
            debug!(id, removed, "record deleted");
            Ok(true)
        })
        .await
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Local lookup; never touches the network.
    pub fn by_id(&self, id: u64) -> Option<Arc<R::Item>> {
        self.items.get(id)
    }

    pub fn snapshot(&self) -> Arc<Vec<Arc<R::Item>>> {
        self.items.snapshot()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn state(&self) -> OperationState {
        self.state.borrow().clone()
    }

    /// Number of effective local mutations so far.
    pub fn version(&self) -> u64 {
        self.items.version()
    }

    /// When the last successful `list()` completed.
    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        *self.last_synced.borrow()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Collection and operation state in one subscription.
    pub fn subscribe(&self) -> StoreSubscription<R::Item> {
        StoreSubscription::new(self.items.subscribe(), self.state.subscribe())
    }

    pub fn subscribe_state(&self) -> watch::Receiver<OperationState> {
        self.state.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn begin(&self) -> LoadingGuard<'_> {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        LoadingGuard { state: &self.state }
    }

    async fn run<O>(
        &self,
        operation: &'static str,
        body: impl Future<Output = Result<O, CoreError>>,
    ) -> Result<O, CoreError> {
        let _guard = self.begin();
        match body.await {
            Ok(value) => Ok(value),
            Err(err) => {
                let message = err.to_string();
                if err.is_remote_failure() {
                    warn!(
                        operation,
                        status = err.status(),
                        error = %message,
                        "remote operation failed"
                    );
                } else {
                    error!(operation, error = %message, "store operation failed");
                }
                self.state.send_modify(|s| s.error = Some(message));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use tokio::sync::Notify;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Note {
        id: u64,
        text: String,
    }

    impl Resource for Note {
        fn id(&self) -> u64 {
            self.id
        }
    }

    /// In-memory backend. Fails every call while `fail_with` is set and
    /// blocks every call until released while `gate` is set.
    #[derive(Default)]
    struct FakeRemote {
        server: Mutex<Vec<Note>>,
        next_id: AtomicU64,
        fail_with: Mutex<Option<u16>>,
        gate: Option<Arc<Notify>>,
        /// Id the server puts on updated records instead of the requested one.
        echo_id: Option<u64>,
    }

    impl FakeRemote {
        fn seeded(notes: &[(u64, &str)]) -> Self {
            let remote = Self::default();
            *remote.server.lock().unwrap() = notes
                .iter()
                .map(|(id, text)| Note {
                    id: *id,
                    text: (*text).into(),
                })
                .collect();
            remote.next_id.store(100, Ordering::SeqCst);
            remote
        }

        async fn enter(&self) -> Result<(), CoreError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match *self.fail_with.lock().unwrap() {
                Some(status) => Err(CoreError::RemoteOperation {
                    status,
                    message: "boom".into(),
                }),
                None => Ok(()),
            }
        }
    }

    impl RemoteCollection for FakeRemote {
        type Item = Note;
        type Draft = String;

        async fn fetch_all(&self) -> Result<Vec<Note>, CoreError> {
            self.enter().await?;
            Ok(self.server.lock().unwrap().clone())
        }

        async fn insert(&self, draft: &String) -> Result<Note, CoreError> {
            self.enter().await?;
            let note = Note {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                text: draft.clone(),
            };
            self.server.lock().unwrap().push(note.clone());
            Ok(note)
        }

        async fn replace(&self, id: u64, draft: &String) -> Result<Note, CoreError> {
            self.enter().await?;
            Ok(Note {
                id: self.echo_id.unwrap_or(id),
                text: draft.clone(),
            })
        }

        async fn remove(&self, id: u64) -> Result<(), CoreError> {
            self.enter().await?;
            self.server.lock().unwrap().retain(|n| n.id != id);
            Ok(())
        }
    }

    fn texts(store: &ResourceStore<FakeRemote>) -> Vec<String> {
        store.snapshot().iter().map(|n| n.text.clone()).collect()
    }

    #[tokio::test]
    async fn list_replaces_local_collection() {
        let store = ResourceStore::new(FakeRemote::seeded(&[(1, "a"), (2, "b")]));

        let listed = store.list().await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(texts(&store), ["a", "b"]);
        assert!(store.last_synced().is_some());
        assert_eq!(store.state(), OperationState::default());
    }

    #[tokio::test]
    async fn create_appends_server_copy() {
        let store = ResourceStore::new(FakeRemote::seeded(&[(1, "a")]));
        store.list().await.unwrap();

        let created = store.create(&"new".to_string()).await.unwrap();

        assert_eq!(created.id, 100);
        assert_eq!(store.len(), 2);
        assert_eq!(store.snapshot().last().unwrap().id, 100);
    }

    #[tokio::test]
    async fn update_replaces_in_place() {
        let store = ResourceStore::new(FakeRemote::seeded(&[(1, "a"), (2, "b"), (3, "c")]));
        store.list().await.unwrap();

        store.update(2, &"B".to_string()).await.unwrap();

        assert_eq!(texts(&store), ["a", "B", "c"]);
    }

    #[tokio::test]
    async fn update_of_uncached_id_leaves_collection_alone() {
        let store = ResourceStore::new(FakeRemote::seeded(&[(1, "a")]));
        store.list().await.unwrap();
        let version = store.version();

        let updated = store.update(42, &"ghost".to_string()).await.unwrap();

        assert_eq!(updated.id, 42);
        assert_eq!(texts(&store), ["a"]);
        assert_eq!(store.version(), version);
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn delete_removes_local_copy() {
        let store = ResourceStore::new(FakeRemote::seeded(&[(1, "a"), (2, "b")]));
        store.list().await.unwrap();

        assert!(store.delete(1).await.unwrap());

        assert!(store.by_id(1).is_none());
        assert_eq!(texts(&store), ["b"]);
    }

    #[tokio::test]
    async fn failure_records_error_and_clears_loading() {
        let remote = FakeRemote::seeded(&[(1, "a")]);
        *remote.fail_with.lock().unwrap() = Some(503);
        let store = ResourceStore::new(remote);

        let err = store.list().await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert!(!store.loading());
        assert_eq!(
            store.error().as_deref(),
            Some("Remote operation failed (HTTP 503): boom")
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn failed_create_does_not_touch_collection() {
        let store = ResourceStore::new(FakeRemote::seeded(&[(1, "a")]));
        store.list().await.unwrap();
        *store.remote().fail_with.lock().unwrap() = Some(400);

        assert!(store.create(&"x".to_string()).await.is_err());

        assert_eq!(texts(&store), ["a"]);
    }

    #[tokio::test]
    async fn next_operation_clears_previous_error() {
        let store = ResourceStore::new(FakeRemote::seeded(&[(1, "a")]));
        *store.remote().fail_with.lock().unwrap() = Some(500);
        store.list().await.unwrap_err();
        assert!(store.error().is_some());

        *store.remote().fail_with.lock().unwrap() = None;
        store.list().await.unwrap();

        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn loading_is_true_while_request_is_pending() {
        let gate = Arc::new(Notify::new());
        let remote = FakeRemote {
            gate: Some(Arc::clone(&gate)),
            ..FakeRemote::seeded(&[(1, "a")])
        };
        let store = ResourceStore::new(remote);
        let mut state = store.subscribe_state();

        let pending = store.list();
        tokio::pin!(pending);

        tokio::select! {
            _ = &mut pending => panic!("list completed before the gate opened"),
            changed = state.changed() => changed.unwrap(),
        }
        assert!(store.loading());

        gate.notify_one();
        pending.await.unwrap();
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn dropping_pending_operation_clears_loading() {
        let gate = Arc::new(Notify::new());
        let remote = FakeRemote {
            gate: Some(Arc::clone(&gate)),
            ..FakeRemote::default()
        };
        let store = ResourceStore::new(remote);

        {
            let pending = store.list();
            tokio::pin!(pending);
            let poll = futures_util::poll!(&mut pending);
            assert!(poll.is_pending());
            assert!(store.loading());
        }

        assert!(!store.loading());
    }

    #[tokio::test]
    async fn subscribers_are_notified_of_mutations() {
        let store = ResourceStore::new(FakeRemote::seeded(&[(1, "a")]));
        let mut sub = store.subscribe();
        assert!(sub.current().is_empty());

        store.list().await.unwrap();

        let view = sub.changed().await.unwrap();
        assert_eq!(view.len(), 1);
        assert!(view.is_settled());
    }

    #[tokio::test]
    async fn subscribers_see_failures() {
        let store = ResourceStore::new(FakeRemote::seeded(&[(1, "a")]));
        let mut sub = store.subscribe();
        *store.remote().fail_with.lock().unwrap() = Some(502);

        store.list().await.unwrap_err();

        let view = sub.changed().await.unwrap();
        assert!(view.is_empty());
        assert!(!view.state.loading);
        assert_eq!(
            view.state.error.as_deref(),
            Some("Remote operation failed (HTTP 502): boom")
        );
    }

    #[tokio::test]
    async fn last_synced_is_stamped_only_by_successful_list() {
        let store = ResourceStore::new(FakeRemote::seeded(&[(1, "a")]));
        assert!(store.last_synced().is_none());

        store.create(&"x".to_string()).await.unwrap();
        assert!(store.last_synced().is_none());

        let before = Utc::now();
        store.list().await.unwrap();

        let stamped = store.last_synced().unwrap();
        assert!(stamped >= before);
    }

    #[tokio::test]
    async fn update_replaces_the_requested_id_when_server_echoes_another() {
        let remote = FakeRemote {
            echo_id: Some(3),
            ..FakeRemote::seeded(&[(1, "a"), (2, "b"), (3, "c")])
        };
        let store = ResourceStore::new(remote);
        store.list().await.unwrap();

        let updated = store.update(2, &"B".to_string()).await.unwrap();

        assert_eq!(updated.id, 3);
        assert_eq!(texts(&store), ["a", "B", "c"]);
        assert_eq!(store.len(), 3);
    }
}
