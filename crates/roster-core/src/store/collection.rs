// ── Ordered reactive collection ──
//
// Keeps records in server order and pushes every change to subscribers
// through `watch` channels.

use std::sync::Arc;

use tokio::sync::watch;

use super::Resource;

/// An ordered, reactive collection for a single record type.
///
/// The snapshot lives inside the `watch` channel itself: mutations edit it
/// in place via `send_if_modified` and every effective change bumps a
/// version counter.
pub(crate) struct OrderedCollection<T: Resource> {
    /// Full ordered snapshot, shared with subscribers.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,

    /// Version counter, bumped on every effective mutation.
    version: watch::Sender<u64>,
}

impl<T: Resource> OrderedCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        let (version, _) = watch::channel(0u64);

        Self { snapshot, version }
    }

    /// Replace the whole collection.
    pub(crate) fn replace_all(&self, items: Vec<Arc<T>>) {
        self.snapshot.send_modify(|snap| *snap = Arc::new(items));
        self.bump_version();
    }

    /// Append a record at the tail.
    pub(crate) fn push(&self, item: Arc<T>) {
        self.snapshot
            .send_modify(|snap| Arc::make_mut(snap).push(item));
        self.bump_version();
    }

    /// Put `item` in the slot of the first record with `id`, keeping its
    /// position. Returns `false` (and leaves the collection untouched) if no
    /// record matches.
    pub(crate) fn replace(&self, id: u64, item: Arc<T>) -> bool {
        let replaced = self.snapshot.send_if_modified(|snap| {
            let Some(index) = snap.iter().position(|existing| existing.id() == id) else {
                return false;
            };
            if let Some(slot) = Arc::make_mut(snap).get_mut(index) {
                *slot = item;
            }
            true
        });
        if replaced {
            self.bump_version();
        }
        replaced
    }

    /// Remove every record with the given id. Returns how many were removed.
    pub(crate) fn remove(&self, id: u64) -> usize {
        let mut removed = 0;
        self.snapshot.send_if_modified(|snap| {
            if !snap.iter().any(|existing| existing.id() == id) {
                return false;
            }
            let items = Arc::make_mut(snap);
            let before = items.len();
            items.retain(|existing| existing.id() != id);
            removed = before - items.len();
            true
        });
        if removed > 0 {
            self.bump_version();
        }
        removed
    }

    /// Linear lookup by id.
    pub(crate) fn get(&self, id: u64) -> Option<Arc<T>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|item| item.id() == id)
            .map(Arc::clone)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}
