//! Listener lists that tolerate re-entrant mutation.
//!
//! A [`ListenerList`] is a cheap, cloneable handle. Callbacks may capture a
//! clone of the list they are registered on and add or remove listeners
//! (including themselves) while a notification is in flight.
//!
//! Guarantees for a single `notify` pass:
//! - every listener registered when the pass starts is invoked at most once
//! - a listener removed earlier in the pass is not invoked
//! - a listener added during the pass is not invoked until the next pass

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Handle returned by [`ListenerList::add`], used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Entry<E> {
    id: ListenerId,
    callback: Callback<E>,
}

struct Shared<E> {
    entries: RwLock<Vec<Entry<E>>>,
    next_id: AtomicU64,
}

/// Ordered list of callbacks for events of type `E`.
pub struct ListenerList<E> {
    shared: Arc<Shared<E>>,
}

impl<E> ListenerList<E> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Registers a callback. Listeners are notified in registration order.
    pub fn add<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        self.shared.entries.write().push(Entry {
            id,
            callback: Arc::new(callback),
        });
        id
    }

    /// Removes a callback. Returns false if it was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.shared.entries.write();
        match entries.iter().position(|e| e.id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns true if the callback is still registered.
    #[must_use]
    pub fn contains(&self, id: ListenerId) -> bool {
        self.shared.entries.read().iter().any(|e| e.id == id)
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.entries.read().len()
    }

    /// Returns true if no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.entries.read().is_empty()
    }

    /// Removes every callback.
    pub fn clear(&self) {
        self.shared.entries.write().clear();
    }

    /// Invokes every registered callback with `event`.
    ///
    /// Returns how many callbacks ran.
    pub fn notify(&self, event: &E) -> usize {
        let snapshot: Vec<(ListenerId, Callback<E>)> = {
            let entries = self.shared.entries.read();
            if entries.is_empty() {
                return 0;
            }
            entries
                .iter()
                .map(|e| (e.id, Arc::clone(&e.callback)))
                .collect()
        };

        let mut invoked = 0;
        for (id, callback) in snapshot {
            if !self.contains(id) {
                continue;
            }
            callback(event);
            invoked += 1;
        }
        invoked
    }
}

impl<E> Clone for ListenerList<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E> Default for ListenerList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ListenerList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerList")
            .field("len", &self.len())
            .finish()
    }
}
