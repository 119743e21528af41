// ── Store subscriptions ──
//
// One handle over both watch channels a store publishes: the ordered
// collection and the loading/error state. A UI re-renders from a single
// `StoreView` whenever either side moves.

use std::sync::Arc;

use futures_util::future::{self, Either};
use tokio::sync::watch;

use crate::store::OperationState;

/// Everything a list screen needs to render a store.
#[derive(Debug)]
pub struct StoreView<T> {
    pub items: Arc<Vec<Arc<T>>>,
    pub state: OperationState,
}

impl<T> Clone for StoreView<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            state: self.state.clone(),
        }
    }
}

impl<T> StoreView<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Not loading and no error recorded.
    pub fn is_settled(&self) -> bool {
        !self.state.loading && self.state.error.is_none()
    }
}

/// A subscription to a store's collection and operation state.
pub struct StoreSubscription<T> {
    items: watch::Receiver<Arc<Vec<Arc<T>>>>,
    state: watch::Receiver<OperationState>,
    current: StoreView<T>,
}

impl<T> StoreSubscription<T> {
    pub(crate) fn new(
        mut items: watch::Receiver<Arc<Vec<Arc<T>>>>,
        mut state: watch::Receiver<OperationState>,
    ) -> Self {
        let current = StoreView {
            items: items.borrow_and_update().clone(),
            state: state.borrow_and_update().clone(),
        };
        Self {
            items,
            state,
            current,
        }
    }

    /// The view captured at creation time or at the last `changed()`.
    pub fn current(&self) -> &StoreView<T> {
        &self.current
    }

    /// Wait until the collection or the state changes and return the new
    /// view. Changes that landed since the last call are returned at once,
    /// coalesced into one view. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<StoreView<T>> {
        let alive = {
            let items = self.items.changed();
            let state = self.state.changed();
            tokio::pin!(items, state);
            match future::select(items, state).await {
                Either::Left((res, _)) | Either::Right((res, _)) => res.is_ok(),
            }
        };
        if !alive {
            return None;
        }

        self.current = StoreView {
            items: self.items.borrow_and_update().clone(),
            state: self.state.borrow_and_update().clone(),
        };
        Some(self.current.clone())
    }
}
