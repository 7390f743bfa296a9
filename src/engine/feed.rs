//! Minimal push source implementing the observation contract.
//!
//! An [`EventFeed`] is the producer side handed to classifying sentries and
//! the standard upstream fixture in tests. It carries no current-value
//! semantics: subscribers receive only what is emitted after they attach.
//! Terminal events notify and drop the current observers but do not poison
//! the feed; later subscribers receive later emissions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::errors::SentryError;
use crate::engine::observer::{Observable, Observer};
use crate::engine::subscription::Subscription;

struct FeedState<T> {
    next_id: u64,
    observers: Vec<(u64, Arc<dyn Observer<T>>)>,
}

struct FeedInner<T> {
    fanout: Mutex<()>,
    state: Mutex<FeedState<T>>,
}

/// A hand-driven push source over values of type `T`.
///
/// Cloning yields another handle to the same feed.
pub struct EventFeed<T> {
    inner: Arc<FeedInner<T>>,
}

impl<T> Clone for EventFeed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for EventFeed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventFeed<T> {
    /// Create an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FeedInner {
                fanout: Mutex::new(()),
                state: Mutex::new(FeedState {
                    next_id: 0,
                    observers: Vec::new(),
                }),
            }),
        }
    }

    /// Number of currently attached observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.state.lock().observers.len()
    }

    fn snapshot(&self) -> Vec<Arc<dyn Observer<T>>> {
        self.inner
            .state
            .lock()
            .observers
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }

    fn drain(&self) -> Vec<Arc<dyn Observer<T>>> {
        self.inner
            .state
            .lock()
            .observers
            .drain(..)
            .map(|(_, observer)| observer)
            .collect()
    }

    /// Fail the current subscribers. Terminal for them, not for the feed.
    pub fn fail(&self, error: SentryError) {
        let error = Arc::new(error);
        let _order = self.inner.fanout.lock();
        for observer in self.drain() {
            observer.on_error(Arc::clone(&error));
        }
    }

    /// Complete the current subscribers. Terminal for them, not for the feed.
    pub fn complete(&self) {
        let _order = self.inner.fanout.lock();
        for observer in self.drain() {
            observer.on_completed();
        }
    }
}

impl<T: Clone> EventFeed<T> {
    /// Push a value to every current observer.
    pub fn emit(&self, value: T) {
        let _order = self.inner.fanout.lock();
        for observer in self.snapshot() {
            observer.on_next(value.clone());
        }
    }
}

impl<T: 'static> Observable<T> for EventFeed<T> {
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        let id = {
            let mut st = self.inner.state.lock();
            let id = st.next_id;
            st.next_id += 1;
            st.observers.push((id, observer));
            id
        };
        let inner = Arc::clone(&self.inner);
        Subscription::new(move || {
            inner.state.lock().observers.retain(|(got, _)| *got != id);
        })
    }
}
