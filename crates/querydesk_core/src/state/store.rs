//! Single-writer store with observer notification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::{reduce, Action, ApplicationState};

/// Callback invoked with the new snapshot after every dispatch.
pub type Observer = Arc<dyn Fn(&ApplicationState) + Send + Sync>;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct StoreInner {
    /// Serializes dispatches so each reduce sees the previous result
    writer: Mutex<()>,
    state: RwLock<Arc<ApplicationState>>,
    observers: RwLock<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
}

/// Owner of the [`ApplicationState`] for one client session.
///
/// Cloning yields another handle to the same store. Readers always get a
/// complete snapshot; the state is only ever replaced, never edited in place.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Create a store holding the initial state.
    pub fn new() -> Self {
        Self::with_state(ApplicationState::default())
    }

    /// Create a store holding `state`.
    pub fn with_state(state: ApplicationState) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                writer: Mutex::new(()),
                state: RwLock::new(Arc::new(state)),
                observers: RwLock::new(Vec::new()),
                next_subscription: AtomicU64::new(1),
            }),
        }
    }

    /// Current snapshot.
    pub fn get_state(&self) -> Arc<ApplicationState> {
        self.inner.state.read().clone()
    }

    /// Apply `action` and notify observers.
    ///
    /// Observers run after the new state is published and outside every
    /// lock, so they may read the store or dispatch again.
    pub fn dispatch(&self, action: Action) {
        let snapshot = {
            let _writer = self.inner.writer.lock();
            let current = self.get_state();
            let next = Arc::new(reduce(&current, &action));
            *self.inner.state.write() = next.clone();
            next
        };

        if let Action::Unknown(name) = &action {
            tracing::warn!(action = %name, "Ignoring unrecognized action");
        } else {
            tracing::trace!(action = action.name(), "Action dispatched");
        }

        let observers: Vec<Observer> =
            self.inner.observers.read().iter().map(|(_, o)| o.clone()).collect();
        for observer in observers {
            observer(&snapshot);
        }
    }

    /// Register an observer.
    pub fn subscribe(&self, observer: impl Fn(&ApplicationState) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.inner.observers.write().push((id, Arc::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.inner.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Session id of the current connection.
    pub fn session_id(&self) -> Option<String> {
        self.get_state().session_id().map(String::from)
    }

    /// Whether a session is established.
    pub fn is_connected(&self) -> bool {
        self.get_state().is_connected()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.get_state())
            .field("observers", &self.inner.observers.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConnectionInfo;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn observers_see_every_dispatch() {
        let store = Store::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        store.subscribe(move |state| sink.lock().push(state.connection.loading));

        store.dispatch(Action::SetConnectionLoading(true));
        store.dispatch(Action::SetConnectionLoading(false));

        assert_eq!(*seen.lock(), [true, false]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = Store::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let id = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.dispatch(Action::ClearChat);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(Action::ClearChat);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn observer_may_read_and_dispatch() {
        let store = Store::new();
        let handle = store.clone();
        store.subscribe(move |state| {
            if state.is_connected() && !state.schema.loading && state.schema.tables.is_empty() {
                handle.dispatch(Action::SetSchemaLoading(true));
            }
        });

        store.dispatch(Action::SetConnectionSuccess(ConnectionInfo::new("abc")));

        assert!(store.get_state().schema.loading);
        assert_eq!(store.session_id().as_deref(), Some("abc"));
    }

    #[test]
    fn snapshots_are_not_affected_by_later_dispatches() {
        let store = Store::new();
        let before = store.get_state();
        store.dispatch(Action::SetChatLoading(true));

        assert!(!before.chat.loading);
        assert!(store.get_state().chat.loading);
    }
}
