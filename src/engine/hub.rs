//! Shared subscription/lifecycle engine backing every hub-based sentry.
//!
//! Three locks per hub, never nested in reverse order:
//! - `gate` serializes epoch transitions (the 0→1 startup hook, the 1→0
//!   teardown hook) so concurrent first subscribers agree on one winner;
//! - `fanout` serializes deliveries so every observer sees the same value
//!   sequence in the same order;
//! - `state` guards the observer set and current status and is never held
//!   across an observer callback.
//!
//! The `live` flag marks an epoch: it is raised by the attach that wins the
//! startup hook and lowered by teardown or a terminal event. Publishes are
//! dropped while it is down, which keeps a dormant sentry's status pinned at
//! `None`. An attach that loses its epoch between the startup hook and
//! registration simply retries from the top.
//!
//! Observer callbacks may release subscription tokens (their own included)
//! but must not call `subscribe` back into the sentry that is currently
//! notifying them. Cross-sentry calls follow the composition tree, which is
//! acyclic by construction.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::core::errors::{Result, SentryError};
use crate::core::status::Status;
use crate::engine::observer::Observer;
use crate::engine::subscription::Subscription;

/// Lifecycle hooks implemented by each hub-owning sentry kind.
pub(crate) trait Node: Send + Sync {
    /// Observer count went 0→1; runs before the observer is registered and
    /// before it receives the initial value. May publish synchronously.
    fn on_first_observer(&self) {}

    /// Observer count went 1→0; status has already been reset to `None`.
    fn on_last_observer(&self) {}
}

#[derive(Clone)]
enum Terminal {
    Completed,
    Failed(Arc<SentryError>),
}

struct Registration {
    id: u64,
    observer: Arc<dyn Observer<Status>>,
}

struct HubState {
    status: Status,
    /// Epoch marker: raised by the winning first attach, lowered by
    /// teardown and terminal events.
    live: bool,
    /// Set by `fail`/`complete`; cleared by the next fresh attach.
    tombstone: Option<Terminal>,
    next_id: u64,
    observers: Vec<Registration>,
}

/// One per sentry: current status, active observers, hook dispatch.
pub(crate) struct SentryHub {
    name: String,
    node: Weak<dyn Node>,
    gate: Mutex<()>,
    fanout: Mutex<()>,
    state: Mutex<HubState>,
}

enum AttachOutcome {
    Registered(u64),
    Duplicate,
    Terminated(Terminal),
    EpochLost,
}

impl SentryHub {
    pub(crate) fn new(name: String, node: Weak<dyn Node>) -> Arc<Self> {
        Arc::new(Self {
            name,
            node,
            gate: Mutex::new(()),
            fanout: Mutex::new(()),
            state: Mutex::new(HubState {
                status: Status::None,
                live: false,
                tombstone: None,
                next_id: 0,
                observers: Vec::new(),
            }),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn status(&self) -> Status {
        self.state.lock().status
    }

    #[cfg(test)]
    pub(crate) fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    /// Register an observer. Duplicate registrations of the same observer
    /// instance are a no-op returning a detached token.
    pub(crate) fn attach(self: &Arc<Self>, observer: Arc<dyn Observer<Status>>) -> Subscription {
        loop {
            {
                let _gate = self.gate.lock();
                let first = {
                    let mut st = self.state.lock();
                    if st
                        .observers
                        .iter()
                        .any(|r| Arc::ptr_eq(&r.observer, &observer))
                    {
                        return Subscription::detached();
                    }
                    st.tombstone = None;
                    let first = !st.live && st.observers.is_empty();
                    if first {
                        st.live = true;
                    }
                    first
                };
                if first {
                    if let Some(node) = self.node.upgrade() {
                        node.on_first_observer();
                    }
                }
            }

            match self.register(&observer) {
                AttachOutcome::Registered(id) => {
                    let hub = Arc::clone(self);
                    return Subscription::new(move || hub.detach(id));
                }
                AttachOutcome::Duplicate => return Subscription::detached(),
                AttachOutcome::Terminated(terminal) => {
                    match terminal {
                        Terminal::Completed => observer.on_completed(),
                        Terminal::Failed(error) => observer.on_error(error),
                    }
                    return Subscription::detached();
                }
                // A concurrent teardown won the epoch between our startup
                // hook and the registration; start over from scratch.
                AttachOutcome::EpochLost => {}
            }
        }
    }

    fn register(&self, observer: &Arc<dyn Observer<Status>>) -> AttachOutcome {
        let _order = self.fanout.lock();
        let (id, current) = {
            let mut st = self.state.lock();
            if let Some(terminal) = st.tombstone.clone() {
                return AttachOutcome::Terminated(terminal);
            }
            if !st.live {
                return AttachOutcome::EpochLost;
            }
            if st
                .observers
                .iter()
                .any(|r| Arc::ptr_eq(&r.observer, observer))
            {
                return AttachOutcome::Duplicate;
            }
            let id = st.next_id;
            st.next_id += 1;
            st.observers.push(Registration {
                id,
                observer: Arc::clone(observer),
            });
            (id, st.status)
        };
        observer.on_next(current);
        AttachOutcome::Registered(id)
    }

    fn detach(&self, id: u64) {
        let emptied = {
            let mut st = self.state.lock();
            let before = st.observers.len();
            st.observers.retain(|r| r.id != id);
            st.observers.len() != before && st.observers.is_empty()
        };
        if !emptied {
            return;
        }
        // We removed the last observer; tear the epoch down unless a racing
        // attach has already taken it over.
        let _gate = self.gate.lock();
        let torn_down = {
            let mut st = self.state.lock();
            if st.live && st.observers.is_empty() {
                st.live = false;
                st.status = Status::None;
                true
            } else {
                false
            }
        };
        if torn_down {
            if let Some(node) = self.node.upgrade() {
                node.on_last_observer();
            }
        }
    }

    /// Change status and fan out, deduplicating consecutive identical values.
    /// Ignored while the sentry is dormant.
    pub(crate) fn publish(&self, next: Status) {
        let _order = self.fanout.lock();
        let snapshot = {
            let mut st = self.state.lock();
            if !st.live || st.status == next {
                return;
            }
            st.status = next;
            st.observers
                .iter()
                .map(|r| Arc::clone(&r.observer))
                .collect::<Vec<_>>()
        };
        for observer in snapshot {
            observer.on_next(next);
        }
    }

    /// Terminal failure: notify everyone, clear the set, reset to `None`.
    pub(crate) fn fail(&self, error: Arc<SentryError>) {
        self.terminate(Terminal::Failed(error));
    }

    /// Terminal completion, symmetric to [`Self::fail`].
    pub(crate) fn complete(&self) {
        self.terminate(Terminal::Completed);
    }

    fn terminate(&self, terminal: Terminal) {
        let drained = {
            let _order = self.fanout.lock();
            let drained = {
                let mut st = self.state.lock();
                st.tombstone = Some(terminal.clone());
                st.live = false;
                st.status = Status::None;
                std::mem::take(&mut st.observers)
            };
            for registration in &drained {
                match &terminal {
                    Terminal::Completed => registration.observer.on_completed(),
                    Terminal::Failed(error) => registration.observer.on_error(Arc::clone(error)),
                }
            }
            drained
        };
        if drained.is_empty() {
            return;
        }
        // Run the teardown hook unless a fresh attach already restarted the
        // epoch, in which case the old resources were displaced by the new
        // startup hook.
        let _gate = self.gate.lock();
        let still_down = !self.state.lock().live;
        if still_down {
            if let Some(node) = self.node.upgrade() {
                node.on_last_observer();
            }
        }
    }
}

/// Validate a sentry display name: non-empty after trimming.
pub(crate) fn validated_name(name: impl Into<String>) -> Result<String> {
    let name = name.into();
    if name.trim().is_empty() {
        return Err(SentryError::InvalidName {
            details: "name must not be blank".to_string(),
        });
    }
    Ok(name)
}
