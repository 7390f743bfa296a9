//! Gating decorator: mute/unmute a wrapped sentry's propagation without
//! touching the wrapped subscription.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::core::errors::{Result, SentryError};
use crate::core::status::Status;
use crate::engine::hub::{Node, SentryHub, validated_name};
use crate::engine::observer::{Observable, Observer, Sentry};
use crate::engine::subscription::Subscription;

struct GateState {
    enabled: bool,
    /// Latest status seen from the wrapped sentry, tracked at all times.
    last_seen: Status,
    wrapped_sub: Option<Subscription>,
}

/// Decorator that can suppress and restore a wrapped sentry's status.
///
/// The wrapped sentry is subscribed once at construction and stays
/// subscribed for the gate's whole life, whether or not the gate itself has
/// observers and whether or not it is enabled. Disabling publishes a
/// synthetic `None`; re-enabling republishes the last status seen from the
/// wrapped sentry. A wrapped terminal event is forwarded and the internal
/// subscription is dropped for good; later subscribers of such a gate see
/// `None`.
pub struct GateSentry {
    hub: Arc<SentryHub>,
    wrapped: Arc<dyn Sentry>,
    state: Mutex<GateState>,
}

impl std::fmt::Debug for GateSentry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateSentry").finish_non_exhaustive()
    }
}

impl GateSentry {
    /// Wrap `wrapped`, starting in the given enabled state.
    pub fn new(
        name: impl Into<String>,
        wrapped: Arc<dyn Sentry>,
        enabled: bool,
    ) -> Result<Arc<Self>> {
        let name = validated_name(name)?;
        let gate = Arc::new_cyclic(|weak: &Weak<Self>| {
            let node: Weak<dyn Node> = weak.clone();
            Self {
                hub: SentryHub::new(name, node),
                wrapped: Arc::clone(&wrapped),
                state: Mutex::new(GateState {
                    enabled,
                    last_seen: Status::None,
                    wrapped_sub: None,
                }),
            }
        });
        let relay: Arc<dyn Observer<Status>> = Arc::new(WrappedRelay {
            target: Arc::downgrade(&gate),
        });
        let sub = wrapped.subscribe(relay);
        gate.state.lock().wrapped_sub = Some(sub);
        Ok(gate)
    }

    /// The sentry this gate wraps.
    #[must_use]
    pub fn wrapped(&self) -> Arc<dyn Sentry> {
        Arc::clone(&self.wrapped)
    }

    /// Whether status changes currently propagate.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Toggle propagation. Disabling publishes `None`; enabling republishes
    /// the last known wrapped status. No wrapped subscription is created or
    /// released either way.
    pub fn set_enabled(&self, enabled: bool) {
        let publish = {
            let mut st = self.state.lock();
            if st.enabled == enabled {
                None
            } else {
                st.enabled = enabled;
                Some(if enabled { st.last_seen } else { Status::None })
            }
        };
        if let Some(status) = publish {
            self.hub.publish(status);
        }
    }
}

struct WrappedRelay {
    target: Weak<GateSentry>,
}

impl Observer<Status> for WrappedRelay {
    fn on_next(&self, status: Status) {
        if let Some(gate) = self.target.upgrade() {
            let forward = {
                let mut st = gate.state.lock();
                st.last_seen = status;
                st.enabled
            };
            if forward {
                gate.hub.publish(status);
            }
        }
    }

    fn on_error(&self, error: Arc<SentryError>) {
        if let Some(gate) = self.target.upgrade() {
            let sub = {
                let mut st = gate.state.lock();
                st.last_seen = Status::None;
                st.wrapped_sub.take()
            };
            drop(sub);
            gate.hub.fail(error);
        }
    }

    fn on_completed(&self) {
        if let Some(gate) = self.target.upgrade() {
            let sub = {
                let mut st = gate.state.lock();
                st.last_seen = Status::None;
                st.wrapped_sub.take()
            };
            drop(sub);
            gate.hub.complete();
        }
    }
}

impl Node for GateSentry {
    fn on_first_observer(&self) {
        let derived = {
            let st = self.state.lock();
            if st.enabled { st.last_seen } else { Status::None }
        };
        self.hub.publish(derived);
    }
}

impl Observable<Status> for GateSentry {
    fn subscribe(&self, observer: Arc<dyn Observer<Status>>) -> Subscription {
        self.hub.attach(observer)
    }
}

impl Sentry for GateSentry {
    fn name(&self) -> &str {
        self.hub.name()
    }

    fn status(&self) -> Status {
        self.hub.status()
    }
}
