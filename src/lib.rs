//! Composable health-status sentries.
//!
//! A sentry is a named, observable source of one of four health statuses
//! (`None < Success < Warning < Error`). Leaves classify pushed domain
//! events into statuses; aggregates combine child sentries through
//! best-of/worst-of policies; decorators gate propagation on and off or
//! trace lifecycle and transition events to a sink. Every kind implements
//! the same [`Sentry`] contract, so trees compose freely.
//!
//! Resource acquisition is lazy and ref-counted: the first observer of a
//! sentry opens its upstream subscriptions, the last release tears them
//! down and resets the status to `None`. Observers never see the same
//! status twice in a row.
//!
//! ```
//! use std::sync::Arc;
//! use status_sentries::{
//!     AggregateSentry, ClassifyingSentry, EventFeed, Observable, Sentry, Status, classifier,
//!     observer_fn,
//! };
//!
//! let feed = EventFeed::new();
//! let disk = ClassifyingSentry::new(
//!     "disk",
//!     Arc::new(feed.clone()),
//!     vec![classifier(|free_pct: &u8| {
//!         if *free_pct < 5 {
//!             Status::Error
//!         } else if *free_pct < 15 {
//!             Status::Warning
//!         } else {
//!             Status::Success
//!         }
//!     })],
//! )
//! .expect("valid name");
//! let root =
//!     AggregateSentry::worst_of("host", vec![disk as Arc<dyn Sentry>]).expect("valid name");
//!
//! let token = root.subscribe(observer_fn(|status| println!("host is {status}")));
//! feed.emit(3); // host is error
//! token.release();
//! ```

pub mod core;
pub mod engine;
pub mod sentries;
pub mod tracelog;


pub use crate::core::errors::{Result, SentryError};
pub use crate::core::status::Status;
pub use crate::engine::feed::EventFeed;
pub use crate::engine::observer::{Observable, Observer, Sentry, observer_fn};
pub use crate::engine::subscription::Subscription;
pub use crate::sentries::aggregate::AggregateSentry;
pub use crate::sentries::classify::{Classifier, ClassifyingSentry, classifier};
pub use crate::sentries::gate::GateSentry;
pub use crate::sentries::patterns::{PatternClassifier, PatternRule, PatternTable};
pub use crate::sentries::policy::{BestOf, CombinePolicy, WorstOf};
pub use crate::sentries::trace::TracingSentry;
pub use crate::tracelog::dual::DualSink;
pub use crate::tracelog::event::{TraceEvent, TraceKind};
pub use crate::tracelog::jsonl::JsonlSink;
pub use crate::tracelog::sink::{ChannelSink, MemorySink, TraceSink};
#[cfg(feature = "sqlite")]
pub use crate::tracelog::sqlite::SqliteSink;
pub use crate::tracelog::stats::{SinkStats, SinkStatsSnapshot};
