//! Aggregate sentry: combines N child sentries into one derived status
//! through a pluggable combination policy.

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::core::errors::{Result, SentryError};
use crate::core::status::Status;
use crate::engine::hub::{Node, SentryHub, validated_name};
use crate::engine::observer::{Observable, Observer, Sentry};
use crate::engine::subscription::Subscription;
use crate::sentries::policy::{BestOf, CombinePolicy, WorstOf};

#[derive(Default)]
struct ChildMarks {
    /// Children that failed this epoch; they contribute a pinned `Error`
    /// to every later recomputation instead of disappearing silently.
    failed: HashSet<usize>,
    /// Children that completed this epoch; absent from recomputation.
    absent: HashSet<usize>,
}

/// Sentry whose status is derived from its children.
///
/// Child subscriptions are opened lazily with the first external observer
/// and released with the last one; the combination policy always reads the
/// children's live `status()` values, never a cached copy. Child terminal
/// marks are scoped to one subscription epoch and reset on the next 0→1
/// transition.
pub struct AggregateSentry {
    hub: Arc<SentryHub>,
    children: Vec<Arc<dyn Sentry>>,
    policy: Box<dyn CombinePolicy>,
    marks: Mutex<ChildMarks>,
    child_subs: Mutex<Vec<Subscription>>,
    weak_self: Weak<Self>,
}

impl std::fmt::Debug for AggregateSentry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateSentry").finish_non_exhaustive()
    }
}

impl AggregateSentry {
    /// Build an aggregate over `children` with the given policy.
    ///
    /// An empty child list is allowed and combines to `Status::None`.
    pub fn new(
        name: impl Into<String>,
        children: Vec<Arc<dyn Sentry>>,
        policy: impl CombinePolicy + 'static,
    ) -> Result<Arc<Self>> {
        let name = validated_name(name)?;
        Ok(Arc::new_cyclic(|weak: &Weak<Self>| {
            let node: Weak<dyn Node> = weak.clone();
            Self {
                hub: SentryHub::new(name, node),
                children,
                policy: Box::new(policy),
                marks: Mutex::new(ChildMarks::default()),
                child_subs: Mutex::new(Vec::new()),
                weak_self: weak.clone(),
            }
        }))
    }

    /// Pessimistic aggregate: any failing child degrades the group.
    pub fn worst_of(name: impl Into<String>, children: Vec<Arc<dyn Sentry>>) -> Result<Arc<Self>> {
        Self::new(name, children, WorstOf)
    }

    /// Optimistic aggregate for redundant groups: any healthy child carries it.
    pub fn best_of(name: impl Into<String>, children: Vec<Arc<dyn Sentry>>) -> Result<Arc<Self>> {
        Self::new(name, children, BestOf)
    }

    fn recompute(&self) {
        let next = {
            let marks = self.marks.lock();
            let mut statuses =
                self.children
                    .iter()
                    .enumerate()
                    .filter_map(|(index, child)| {
                        if marks.absent.contains(&index) {
                            None
                        } else if marks.failed.contains(&index) {
                            Some(Status::Error)
                        } else {
                            Some(child.status())
                        }
                    });
            self.policy.combine(&mut statuses)
        };
        self.hub.publish(next);
    }
}

struct ChildRelay {
    target: Weak<AggregateSentry>,
    index: usize,
}

impl Observer<Status> for ChildRelay {
    fn on_next(&self, _status: Status) {
        if let Some(aggregate) = self.target.upgrade() {
            aggregate.recompute();
        }
    }

    fn on_error(&self, _error: Arc<SentryError>) {
        if let Some(aggregate) = self.target.upgrade() {
            aggregate.marks.lock().failed.insert(self.index);
            aggregate.recompute();
        }
    }

    fn on_completed(&self) {
        if let Some(aggregate) = self.target.upgrade() {
            aggregate.marks.lock().absent.insert(self.index);
            aggregate.recompute();
        }
    }
}

impl Node for AggregateSentry {
    fn on_first_observer(&self) {
        {
            let mut marks = self.marks.lock();
            marks.failed.clear();
            marks.absent.clear();
        }
        let mut subs = Vec::with_capacity(self.children.len());
        for (index, child) in self.children.iter().enumerate() {
            let relay: Arc<dyn Observer<Status>> = Arc::new(ChildRelay {
                target: self.weak_self.clone(),
                index,
            });
            subs.push(child.subscribe(relay));
        }
        *self.child_subs.lock() = subs;
    }

    fn on_last_observer(&self) {
        let subs = std::mem::take(&mut *self.child_subs.lock());
        for sub in subs {
            sub.release();
        }
    }
}

impl Observable<Status> for AggregateSentry {
    fn subscribe(&self, observer: Arc<dyn Observer<Status>>) -> Subscription {
        self.hub.attach(observer)
    }
}

impl Sentry for AggregateSentry {
    fn name(&self) -> &str {
        self.hub.name()
    }

    fn status(&self) -> Status {
        self.hub.status()
    }
}
