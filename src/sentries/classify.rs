//! Classifying sentry: adapts a push stream of domain values into `Status`
//! through an ordered chain of classifier functions.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::core::errors::{Result, SentryError};
use crate::core::status::Status;
use crate::engine::hub::{Node, SentryHub, validated_name};
use crate::engine::observer::{Observable, Observer, Sentry};
use crate::engine::subscription::Subscription;

/// One link in the classification chain. Returning `Status::None` passes the
/// value to the next classifier.
pub type Classifier<T> = Box<dyn Fn(&T) -> Status + Send + Sync>;

/// Box a closure as a [`Classifier`].
pub fn classifier<T>(f: impl Fn(&T) -> Status + Send + Sync + 'static) -> Classifier<T> {
    Box::new(f)
}

/// Leaf sentry that turns upstream values into statuses.
///
/// Classifiers run in order; the first non-`None` answer wins. A value no
/// classifier recognizes publishes `Status::Error` — unclassifiable input is
/// never silently treated as healthy. The upstream subscription is opened on
/// the first observer and released with the last one.
pub struct ClassifyingSentry<T> {
    hub: Arc<SentryHub>,
    upstream: Arc<dyn Observable<T>>,
    classifiers: Vec<Classifier<T>>,
    upstream_sub: Mutex<Option<Subscription>>,
    weak_self: Weak<Self>,
}

impl<T> std::fmt::Debug for ClassifyingSentry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifyingSentry").finish_non_exhaustive()
    }
}

impl<T: 'static> ClassifyingSentry<T> {
    /// Build a classifying sentry over `upstream`.
    ///
    /// An empty classifier list defaults to a single classifier that answers
    /// `Status::Success` for every value.
    pub fn new(
        name: impl Into<String>,
        upstream: Arc<dyn Observable<T>>,
        classifiers: Vec<Classifier<T>>,
    ) -> Result<Arc<Self>> {
        let name = validated_name(name)?;
        let classifiers = if classifiers.is_empty() {
            vec![classifier(|_: &T| Status::Success)]
        } else {
            classifiers
        };
        Ok(Arc::new_cyclic(|weak: &Weak<Self>| {
            let node: Weak<dyn Node> = weak.clone();
            Self {
                hub: SentryHub::new(name, node),
                upstream,
                classifiers,
                upstream_sub: Mutex::new(None),
                weak_self: weak.clone(),
            }
        }))
    }

    #[cfg(test)]
    pub(crate) fn observer_count(&self) -> usize {
        self.hub.observer_count()
    }

    fn classify(&self, value: &T) -> Status {
        for rule in &self.classifiers {
            let status = rule(value);
            if status.is_reported() {
                return status;
            }
        }
        Status::Error
    }
}

struct UpstreamRelay<T> {
    target: Weak<ClassifyingSentry<T>>,
}

impl<T: 'static> Observer<T> for UpstreamRelay<T> {
    fn on_next(&self, value: T) {
        if let Some(sentry) = self.target.upgrade() {
            let status = sentry.classify(&value);
            sentry.hub.publish(status);
        }
    }

    fn on_error(&self, error: Arc<SentryError>) {
        if let Some(sentry) = self.target.upgrade() {
            sentry.hub.fail(error);
        }
    }

    fn on_completed(&self) {
        if let Some(sentry) = self.target.upgrade() {
            sentry.hub.complete();
        }
    }
}

impl<T: 'static> Node for ClassifyingSentry<T> {
    fn on_first_observer(&self) {
        let relay: Arc<dyn Observer<T>> = Arc::new(UpstreamRelay {
            target: self.weak_self.clone(),
        });
        let sub = self.upstream.subscribe(relay);
        *self.upstream_sub.lock() = Some(sub);
    }

    fn on_last_observer(&self) {
        if let Some(sub) = self.upstream_sub.lock().take() {
            sub.release();
        }
    }
}

impl<T: 'static> Observable<Status> for ClassifyingSentry<T> {
    fn subscribe(&self, observer: Arc<dyn Observer<Status>>) -> Subscription {
        self.hub.attach(observer)
    }
}

impl<T: 'static> Sentry for ClassifyingSentry<T> {
    fn name(&self) -> &str {
        self.hub.name()
    }

    fn status(&self) -> Status {
        self.hub.status()
    }
}
