//! Subscription tokens: idempotent release with RAII backup.

use parking_lot::Mutex;

type ReleaseAction = Box<dyn FnOnce() + Send>;

/// Handle returned by `subscribe`; owns the observer registration.
///
/// `release` is idempotent and is the way to remove the observer. Dropping
/// the token releases it too, so a token must be held for as long as the
/// subscription should stay alive.
pub struct Subscription {
    action: Mutex<Option<ReleaseAction>>,
}

impl Subscription {
    /// Token that runs `action` on its first release (or on drop).
    ///
    /// Custom push sources implementing [`Observable`] mint their tokens
    /// through this.
    ///
    /// [`Observable`]: crate::engine::observer::Observable
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Mutex::new(Some(Box::new(action))),
        }
    }

    /// An inert token owning nothing. Releasing it has no effect.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            action: Mutex::new(None),
        }
    }

    /// Cancel the subscription. Safe to call any number of times, from any
    /// thread, including from inside an observer callback.
    pub fn release(&self) {
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }

    /// Whether the registration has already been released (or never existed).
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.action.lock().is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Subscription;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn release_runs_exactly_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let token = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!token.is_released());
        token.release();
        token.release();
        assert!(token.is_released());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_releases() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        {
            let _token = Subscription::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detached_token_is_inert() {
        let token = Subscription::detached();
        assert!(token.is_released());
        token.release();
    }
}
