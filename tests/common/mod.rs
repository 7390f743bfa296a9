//! Shared fixtures for the integration test suite.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use status_sentries::{
    ClassifyingSentry, EventFeed, Observer, SentryError, Status, classifier,
};

/// Observer that records everything a subscription delivers.
#[derive(Default)]
pub struct Probe {
    statuses: Mutex<Vec<Status>>,
    errors: Mutex<Vec<String>>,
    completions: AtomicUsize,
}

impl Probe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.statuses.lock().clone()
    }

    pub fn last_status(&self) -> Option<Status> {
        self.statuses.lock().last().copied()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

impl Observer<Status> for Probe {
    fn on_next(&self, status: Status) {
        self.statuses.lock().push(status);
    }

    fn on_error(&self, error: Arc<SentryError>) {
        self.errors.lock().push(error.to_string());
    }

    fn on_completed(&self) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }
}

/// Severity mapping used by the driving feeds: 0 → Success, 1 → Warning,
/// 2 → Error.
pub fn status_of(byte: u8) -> Status {
    match byte % 3 {
        0 => Status::Success,
        1 => Status::Warning,
        _ => Status::Error,
    }
}

/// Classifying sentry over a byte feed with the [`status_of`] mapping.
pub fn level_sentry(name: &str, feed: &EventFeed<u8>) -> Arc<ClassifyingSentry<u8>> {
    ClassifyingSentry::new(
        name,
        Arc::new(feed.clone()),
        vec![classifier(|byte: &u8| status_of(*byte))],
    )
    .expect("fixture name is valid")
}
