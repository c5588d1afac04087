#![forbid(unsafe_code)]

//! Property-based invariant tests for the Observer lifecycle.
//!
//! These tests verify the structural invariants of the subscription
//! primitive:
//!
//! 1. At most one terminal handler runs, at most once.
//! 2. No handler runs once the Observer has closed.
//! 3. Any number of `unsubscribe` calls runs the teardown exactly once.
//! 4. `from_values` delivers values in order, then one completion.
//! 5. An empty source only completes.
//! 6. Teardown runs exactly once on every path that closes the Observer.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use pushstream_core::{Handlers, Observable, Observer, Subscription, Teardown};

// ── Harness ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Next(u8),
    Error,
    Complete,
    Unsubscribe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seen {
    Next(u8),
    Error,
    Complete,
    Teardown,
}

type Log = Rc<RefCell<Vec<Seen>>>;

fn handlers(log: &Log) -> Handlers<u8, (), ()> {
    let next = Rc::clone(log);
    let error = Rc::clone(log);
    let complete = Rc::clone(log);
    Handlers::new()
        .on_next(move |v| next.borrow_mut().push(Seen::Next(v)))
        .on_error(move |()| error.borrow_mut().push(Seen::Error))
        .on_complete(move || complete.borrow_mut().push(Seen::Complete))
}

/// Subscribe to a producer that hands its Observer back to the test.
fn open(log: &Log) -> (Observer<u8, (), ()>, Subscription<u8, (), ()>) {
    let slot = Rc::new(RefCell::new(None));
    let slot_clone = Rc::clone(&slot);
    let teardown_log = Rc::clone(log);
    let source = Observable::new(move |observer| {
        *slot_clone.borrow_mut() = Some(observer);
        let log = Rc::clone(&teardown_log);
        Teardown::new(move || log.borrow_mut().push(Seen::Teardown))
    });
    let subscription = source.subscribe(handlers(log));
    let observer = slot.borrow_mut().take().expect("observer handed back");
    (observer, subscription)
}

fn apply(observer: &Observer<u8, (), ()>, subscription: &Subscription<u8, (), ()>, signal: Signal) {
    match signal {
        Signal::Next(v) => observer.next(v),
        Signal::Error => observer.error(()),
        Signal::Complete => observer.complete(),
        Signal::Unsubscribe => subscription.unsubscribe(),
    }
}

// ── Strategies ────────────────────────────────────────────────────────────

fn signal_strategy() -> impl Strategy<Value = Signal> {
    prop_oneof![
        6 => any::<u8>().prop_map(Signal::Next),
        1 => Just(Signal::Error),
        1 => Just(Signal::Complete),
        1 => Just(Signal::Unsubscribe),
    ]
}

fn signals_strategy() -> impl Strategy<Value = Vec<Signal>> {
    proptest::collection::vec(signal_strategy(), 0..64)
}

// ═════════════════════════════════════════════════════════════════════════
// Lifecycle invariants over arbitrary signal sequences
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn at_most_one_terminal_handler(signals in signals_strategy()) {
        let log: Log = Rc::default();
        let (observer, subscription) = open(&log);
        for signal in signals {
            apply(&observer, &subscription, signal);
        }
        let terminals = log
            .borrow()
            .iter()
            .filter(|s| matches!(s, Seen::Error | Seen::Complete))
            .count();
        prop_assert!(terminals <= 1);
    }

    #[test]
    fn silent_after_close(signals in signals_strategy()) {
        let log: Log = Rc::default();
        let (observer, subscription) = open(&log);

        let mut expected = Vec::new();
        let mut closed = false;
        for signal in signals {
            if !closed {
                match signal {
                    Signal::Next(v) => expected.push(Seen::Next(v)),
                    Signal::Error => {
                        expected.push(Seen::Error);
                        expected.push(Seen::Teardown);
                        closed = true;
                    }
                    Signal::Complete => {
                        expected.push(Seen::Complete);
                        expected.push(Seen::Teardown);
                        closed = true;
                    }
                    Signal::Unsubscribe => {
                        expected.push(Seen::Teardown);
                        closed = true;
                    }
                }
            }
            apply(&observer, &subscription, signal);
            prop_assert_eq!(observer.is_unsubscribed(), closed);
        }
        prop_assert_eq!(&*log.borrow(), &expected);
    }

    #[test]
    fn unsubscribe_tears_down_once(prefix in signals_strategy(), repeats in 1usize..16) {
        let log: Log = Rc::default();
        let (observer, subscription) = open(&log);
        for signal in prefix {
            apply(&observer, &subscription, signal);
        }
        for _ in 0..repeats {
            subscription.unsubscribe();
        }
        let teardowns = log.borrow().iter().filter(|s| **s == Seen::Teardown).count();
        prop_assert_eq!(teardowns, 1);
        prop_assert!(subscription.is_closed());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// from_values ordering
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn from_values_preserves_order(values in proptest::collection::vec(any::<u8>(), 0..128)) {
        let log: Log = Rc::default();
        let source: Observable<u8, (), ()> = Observable::from_values(values.clone());
        let subscription = source.subscribe(handlers(&log));

        let mut expected: Vec<Seen> = values.iter().copied().map(Seen::Next).collect();
        expected.push(Seen::Complete);
        prop_assert_eq!(&*log.borrow(), &expected);
        prop_assert!(subscription.is_closed());
    }

    #[test]
    fn from_values_cancel_at_any_index(
        values in proptest::collection::vec(any::<u8>(), 1..64),
        cut in any::<prop::sample::Index>(),
    ) {
        let cut = cut.index(values.len());
        let log: Log = Rc::default();
        let source: Observable<u8, (), ()> = Observable::from_values(values.clone());

        let seen = Rc::clone(&log);
        let complete = Rc::clone(&log);
        source.subscribe_with(move |subscription| {
            let mut count = 0usize;
            Handlers::new()
                .on_next(move |v| {
                    seen.borrow_mut().push(Seen::Next(v));
                    if count == cut {
                        subscription.unsubscribe();
                    }
                    count += 1;
                })
                .on_complete(move || complete.borrow_mut().push(Seen::Complete))
        });

        let expected: Vec<Seen> = values[..=cut].iter().copied().map(Seen::Next).collect();
        prop_assert_eq!(&*log.borrow(), &expected);
    }
}

#[test]
fn empty_source_only_completes() {
    let log: Log = Rc::default();
    let source: Observable<u8, (), ()> = Observable::from_values(Vec::new());
    source.subscribe(handlers(&log));
    assert_eq!(*log.borrow(), vec![Seen::Complete]);
}
