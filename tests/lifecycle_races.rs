//! Threaded lifecycle tests: racing subscribers, racing releases, and
//! producers publishing while observers churn.

mod common;

use std::sync::{Arc, Barrier};

use common::{Probe, level_sentry};
use rand::Rng as _;
use status_sentries::{EventFeed, Observable, Observer, Sentry, Status, Subscription};

#[test]
fn eight_racing_first_subscribers_open_one_upstream_subscription() {
    let feed = EventFeed::<u8>::new();
    let sentry = level_sentry("raced", &feed);

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let mut handles = Vec::new();
    for _ in 0..threads {
        let sentry = Arc::clone(&sentry);
        let barrier = Arc::clone(&barrier);
        handles.push(std::thread::spawn(move || {
            barrier.wait();
            let probe = Probe::new();
            let token = sentry.subscribe(probe.clone() as Arc<dyn Observer<Status>>);
            (probe, token)
        }));
    }
    let subscriptions: Vec<(Arc<Probe>, Subscription)> = handles
        .into_iter()
        .map(|handle| handle.join().expect("subscriber thread should not panic"))
        .collect();

    assert_eq!(feed.observer_count(), 1, "startup hook must fire once");
    for (probe, _) in &subscriptions {
        // Every subscriber got an initial delivery regardless of race order.
        assert!(!probe.statuses().is_empty());
    }

    drop(subscriptions);
    assert_eq!(feed.observer_count(), 0);
    assert_eq!(sentry.status(), Status::None);
}

#[test]
fn racing_releases_of_one_token_tear_down_once() {
    let feed = EventFeed::<u8>::new();
    let sentry = level_sentry("shared-token", &feed);
    let probe = Probe::new();
    let token = Arc::new(sentry.subscribe(probe as Arc<dyn Observer<Status>>));

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let mut handles = Vec::new();
    for _ in 0..threads {
        let token = Arc::clone(&token);
        let barrier = Arc::clone(&barrier);
        handles.push(std::thread::spawn(move || {
            barrier.wait();
            token.release();
        }));
    }
    for handle in handles {
        handle.join().expect("release thread should not panic");
    }

    assert!(token.is_released());
    assert_eq!(feed.observer_count(), 0);
    assert_eq!(sentry.status(), Status::None);
}

#[test]
fn observer_churn_under_a_live_producer_keeps_invariants() {
    let feed = EventFeed::<u8>::new();
    let sentry = level_sentry("churn", &feed);

    // A long-lived anchor keeps the sentry live for the whole storm so the
    // producer's emissions are never dropped wholesale.
    let anchor = Probe::new();
    let _anchor_token = sentry.subscribe(anchor.clone() as Arc<dyn Observer<Status>>);

    let producer = {
        let feed = feed.clone();
        std::thread::spawn(move || {
            let mut rng = rand::rng();
            for _ in 0..500 {
                feed.emit(rng.random_range(0..3u8));
            }
        })
    };

    let mut churners = Vec::new();
    for _ in 0..4 {
        let sentry = Arc::clone(&sentry);
        churners.push(std::thread::spawn(move || {
            let mut rng = rand::rng();
            for _ in 0..50 {
                let probe = Probe::new();
                let token = sentry.subscribe(probe.clone() as Arc<dyn Observer<Status>>);
                if rng.random_range(0..2) == 0 {
                    std::thread::yield_now();
                }
                token.release();
                let seen = probe.statuses();
                for pair in seen.windows(2) {
                    assert_ne!(pair[0], pair[1], "duplicate consecutive delivery");
                }
            }
        }));
    }

    producer.join().expect("producer should not panic");
    for churner in churners {
        churner.join().expect("churner should not panic");
    }

    // The anchor saw a dedup-clean sequence too.
    let seen = anchor.statuses();
    for pair in seen.windows(2) {
        assert_ne!(pair[0], pair[1], "duplicate consecutive delivery");
    }

    drop(_anchor_token);
    assert_eq!(feed.observer_count(), 0);
    assert_eq!(sentry.status(), Status::None);
}

#[test]
fn producer_variety_reaches_a_stable_terminal_state() {
    let feed = EventFeed::<u8>::new();
    let sentry = level_sentry("stable", &feed);
    let probe = Probe::new();
    let _token = sentry.subscribe(probe.clone() as Arc<dyn Observer<Status>>);

    let emitters: Vec<_> = (0..3u8)
        .map(|lane| {
            let feed = feed.clone();
            std::thread::spawn(move || {
                for step in 0..100u8 {
                    feed.emit(lane.wrapping_add(step));
                }
            })
        })
        .collect();
    for emitter in emitters {
        emitter.join().expect("emitter should not panic");
    }

    // Whatever interleaving happened, the final status is the last classified
    // emission and the probe's tail agrees with the live status read.
    let final_status = sentry.status();
    assert!(matches!(
        final_status,
        Status::Success | Status::Warning | Status::Error
    ));
    assert_eq!(probe.statuses().last().copied(), Some(final_status));
}
