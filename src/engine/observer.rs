//! The three-method observation contract shared by sentries and raw
//! push sources.

use std::sync::Arc;

use crate::core::errors::SentryError;
use crate::core::status::Status;
use crate::engine::subscription::Subscription;

/// Caller-supplied sink for pushed values, errors, and completion.
///
/// `on_error` and `on_completed` are terminal for the subscription that
/// delivered them; no further `on_next` follows either one.
pub trait Observer<T>: Send + Sync {
    /// A new value was pushed.
    fn on_next(&self, value: T);

    /// The source failed. Terminal.
    fn on_error(&self, error: Arc<SentryError>) {
        let _ = error;
    }

    /// The source finished cleanly. Terminal.
    fn on_completed(&self) {}
}

/// Anything that can be observed via [`Observer`] registration.
pub trait Observable<T>: Send + Sync {
    /// Register `observer` and return the token that owns the registration.
    ///
    /// Dropping or releasing the token cancels the subscription.
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription;
}

/// A named, observable health-status source.
///
/// Implemented uniformly by leaves, aggregates, and decorators; callers hold
/// `Arc<dyn Sentry>` without caring which kind is behind it.
pub trait Sentry: Observable<Status> {
    /// Immutable display identity. Not used for equality.
    fn name(&self) -> &str;

    /// Last published status. `Status::None` whenever nobody observes.
    fn status(&self) -> Status;
}

struct FnObserver<F> {
    on_next: F,
}

impl<T, F> Observer<T> for FnObserver<F>
where
    F: Fn(T) + Send + Sync,
{
    fn on_next(&self, value: T) {
        (self.on_next)(value);
    }
}

/// Wrap a closure as an observer that ignores terminal events.
pub fn observer_fn<T, F>(on_next: F) -> Arc<dyn Observer<T>>
where
    T: 'static,
    F: Fn(T) + Send + Sync + 'static,
{
    Arc::new(FnObserver { on_next })
}

#[cfg(test)]
mod tests {
    use super::observer_fn;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn observer_fn_forwards_values() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let observer = observer_fn(move |value: u32| sink.lock().push(value));
        observer.on_next(7);
        observer.on_next(9);
        assert_eq!(*seen.lock(), vec![7, 9]);
    }
}
