#![forbid(unsafe_code)]

//! Push-based stream primitive.
//!
//! An [`Observable`] wraps a subscription function. Subscribing with a
//! [`Handlers`] bundle builds a fresh [`Observer`], runs the subscription
//! function against it, and hands back a [`Subscription`] whose only job is
//! [`unsubscribe`](Subscription::unsubscribe).
//!
//! # Architecture
//!
//! ```text
//!   values ──► Observable::from_values ──► Observable
//!                                              │ subscribe(handlers)
//!                                              ▼
//!                           ┌──────────── Observer ────────────┐
//!                           │ state: Active ──► Unsubscribed   │
//!   producer ── next ─────► │ gate ──► on_next                 │
//!            ── error ────► │ gate ──► on_error ──► teardown   │
//!            ── complete ─► │ gate ──► on_complete ──► teardown│
//!   caller ─── unsubscribe ►│ flip ──► teardown                │
//!                           └──────────────────────────────────┘
//! ```
//!
//! Everything is single-threaded and synchronous: `subscribe` returns only
//! after the subscription function has returned. Core types are `!Send`.
//!
//! # Invariants
//!
//! 1. At most one of `on_error` / `on_complete` is ever invoked per Observer.
//! 2. No handler runs after the Observer becomes unsubscribed, except the
//!    terminal handler whose signal causes the transition.
//! 3. The teardown hook runs exactly once per Observer, on whichever exit
//!    path comes first.
//! 4. `from_values` emits in input order and then completes exactly once.
//!
//! # Example
//!
//! ```
//! use pushstream_core::{Handlers, Observable};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//!
//! let numbers: Observable<u32, String, ()> = Observable::from_values([1, 2, 3]);
//! let subscription = numbers.subscribe(
//!     Handlers::new().on_next(move |n| sink.borrow_mut().push(n)),
//! );
//!
//! assert_eq!(*seen.borrow(), vec![1, 2, 3]);
//! assert!(subscription.is_closed());
//! subscription.unsubscribe(); // no-op after completion
//! ```

pub mod handlers;
pub mod observable;
pub mod observer;
pub mod source;
pub mod subscription;
pub mod teardown;

pub use handlers::Handlers;
pub use observable::Observable;
pub use observer::{Observer, ObserverId, SubscriptionState};
pub use subscription::Subscription;
pub use teardown::{NoopSink, Teardown, TeardownEvent, TeardownSink, TracingSink};
