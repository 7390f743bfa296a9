//! Tracing decorator: a transparent pass-through sentry that records
//! lifecycle and status events to a trace sink.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::errors::SentryError;
use crate::core::status::Status;
use crate::engine::observer::{Observable, Observer, Sentry};
use crate::engine::subscription::Subscription;
use crate::tracelog::event::{TraceEvent, TraceKind};
use crate::tracelog::sink::TraceSink;

struct TraceState {
    external: usize,
    tracer_sub: Option<Subscription>,
}

/// Decorator that records every attach, detach, status transition,
/// completion, and error on the wrapped sentry.
///
/// External observers are registered directly on the wrapped sentry; the
/// decorator only keeps its own count of them. The first external observer
/// also attaches one internal tracer observer (recording `subscribed`), and
/// the last release detaches it (recording `unsubscribed`). The tracer sees
/// and records every event independently of what the external observers
/// receive. Name and status are exactly the wrapped sentry's.
pub struct TracingSentry {
    wrapped: Arc<dyn Sentry>,
    sink: Arc<dyn TraceSink>,
    state: Arc<Mutex<TraceState>>,
}

impl TracingSentry {
    /// Wrap `wrapped`, recording its events to `sink`.
    pub fn new(wrapped: Arc<dyn Sentry>, sink: Arc<dyn TraceSink>) -> Arc<Self> {
        Arc::new(Self {
            wrapped,
            sink,
            state: Arc::new(Mutex::new(TraceState {
                external: 0,
                tracer_sub: None,
            })),
        })
    }

    /// Number of external subscriptions currently open through this
    /// decorator (independent of the wrapped sentry's own observer count).
    #[must_use]
    pub fn external_count(&self) -> usize {
        self.state.lock().external
    }
}

struct TraceRelay {
    sentry: String,
    sink: Arc<dyn TraceSink>,
}

impl Observer<Status> for TraceRelay {
    fn on_next(&self, status: Status) {
        self.sink
            .record(&TraceEvent::now(&self.sentry, TraceKind::Status { status }));
    }

    fn on_error(&self, error: Arc<SentryError>) {
        self.sink.record(&TraceEvent::now(
            &self.sentry,
            TraceKind::Error {
                details: error.to_string(),
            },
        ));
    }

    fn on_completed(&self) {
        self.sink
            .record(&TraceEvent::now(&self.sentry, TraceKind::Completed));
    }
}

impl Observable<Status> for TracingSentry {
    fn subscribe(&self, observer: Arc<dyn Observer<Status>>) -> Subscription {
        let inner_token = {
            let mut st = self.state.lock();
            st.external += 1;
            if st.external == 1 {
                self.sink.record(&TraceEvent::now(
                    self.wrapped.name(),
                    TraceKind::Subscribed,
                ));
                let tracer: Arc<dyn Observer<Status>> = Arc::new(TraceRelay {
                    sentry: self.wrapped.name().to_string(),
                    sink: Arc::clone(&self.sink),
                });
                st.tracer_sub = Some(self.wrapped.subscribe(tracer));
            }
            self.wrapped.subscribe(observer)
        };

        let state = Arc::clone(&self.state);
        let sink = Arc::clone(&self.sink);
        let name = self.wrapped.name().to_string();
        Subscription::new(move || {
            inner_token.release();
            let tracer_sub = {
                let mut st = state.lock();
                st.external -= 1;
                if st.external == 0 {
                    st.tracer_sub.take()
                } else {
                    None
                }
            };
            if let Some(sub) = tracer_sub {
                sub.release();
                sink.record(&TraceEvent::now(&name, TraceKind::Unsubscribed));
            }
        })
    }
}

impl Sentry for TracingSentry {
    fn name(&self) -> &str {
        self.wrapped.name()
    }

    fn status(&self) -> Status {
        self.wrapped.status()
    }
}
