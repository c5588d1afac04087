#![forbid(unsafe_code)]

//! Consumer-side gatekeeper and its two-state lifecycle.
//!
//! # State machine
//!
//! ```text
//!   Active ──error / complete / unsubscribe──► Unsubscribed (absorbing)
//! ```
//!
//! | Signal        | Active                                   | Unsubscribed |
//! |---------------|------------------------------------------|--------------|
//! | `next`        | `on_next` (if present)                   | no-op        |
//! | `error`       | `on_error` (if present), flip, teardown  | no-op        |
//! | `complete`    | `on_complete` (if present), flip, teardown | no-op      |
//! | `unsubscribe` | flip, teardown                           | no-op        |
//!
//! # Re-entrancy
//!
//! Handlers run with no internal borrow held, so they may signal the same
//! Observer. A nested `next` from inside `on_next` is queued and delivered
//! by the outer call once the handler returns, so values arrive in the order
//! they were signalled and none is lost while the Observer stays active. A
//! nested terminal signal from inside a terminal handler finds no handler
//! and only closes the Observer.
//!
//! # Failure Modes
//!
//! - **Panicking `on_next`**: the panic reaches whoever called `next`. A
//!   drop guard puts the handler back while unwinding, so the Observer stays
//!   active and usable; values queued behind the failing one are discarded.
//! - **Panicking terminal handler**: a drop guard still flips the state and
//!   runs the teardown while unwinding.
//! - **Panicking teardown**: the state is already `Unsubscribed` and the
//!   teardown has been taken from its slot, so nothing can run it again.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::handlers::{Handlers, NextFn};
use crate::teardown::Teardown;

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of an Observer, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    fn next() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

/// Lifecycle state of an [`Observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionState {
    /// Handlers are live.
    #[default]
    Active,
    /// Terminal. Never left once entered.
    Unsubscribed,
}

struct ObserverInner<T, E, R> {
    id: ObserverId,
    state: Cell<SubscriptionState>,
    handlers: RefCell<Handlers<T, E, R>>,
    /// Values signalled while `on_next` is running, in arrival order.
    pending: RefCell<VecDeque<T>>,
    /// Set while an outer `next` owns `on_next` and drains `pending`.
    delivering: Cell<bool>,
    /// Installed by the owning Observable after the subscription function
    /// returns. Taken (never cloned) when it runs.
    teardown: RefCell<Option<Teardown>>,
}

/// Stateful consumer handle handed to a subscription function.
///
/// Cloning shares the same state: every clone gates on the same flag and
/// feeds the same handlers. A producer that emits later keeps a clone.
pub struct Observer<T, E, R> {
    inner: Rc<ObserverInner<T, E, R>>,
}

impl<T, E, R> Clone for Observer<T, E, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, E, R> fmt::Debug for Observer<T, E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("id", &self.inner.id)
            .field("state", &self.inner.state.get())
            .field("handlers", &*self.inner.handlers.borrow())
            .field("pending", &self.inner.pending.borrow().len())
            .field("teardown_installed", &self.inner.teardown.borrow().is_some())
            .finish()
    }
}

/// Completes the transition when a terminal signal leaves scope, including
/// by unwinding out of a panicking handler.
struct FinishOnDrop<'a, T, E, R>(&'a Observer<T, E, R>);

impl<T, E, R> Drop for FinishOnDrop<'_, T, E, R> {
    fn drop(&mut self) {
        self.0.unsubscribe();
    }
}

/// Owns `on_next` while queued values are delivered. Hands it back to the
/// slot on drop, including while unwinding out of a panicking handler,
/// unless the Observer closed in the meantime.
struct Delivery<'a, T, E, R> {
    observer: &'a Observer<T, E, R>,
    on_next: Option<NextFn<T, R>>,
}

impl<'a, T, E, R> Delivery<'a, T, E, R> {
    fn start(observer: &'a Observer<T, E, R>, on_next: NextFn<T, R>) -> Self {
        observer.inner.delivering.set(true);
        Self {
            observer,
            on_next: Some(on_next),
        }
    }

    fn drain(&mut self) {
        while !self.observer.is_unsubscribed() {
            let queued = self.observer.inner.pending.borrow_mut().pop_front();
            let Some(value) = queued else {
                break;
            };
            if let Some(on_next) = self.on_next.as_mut() {
                let _ack = on_next(value);
            }
        }
    }
}

impl<T, E, R> Drop for Delivery<'_, T, E, R> {
    fn drop(&mut self) {
        let inner = &self.observer.inner;
        inner.delivering.set(false);
        let on_next = self.on_next.take();
        if self.observer.is_unsubscribed() || std::thread::panicking() {
            let discarded = std::mem::take(&mut *inner.pending.borrow_mut());
            drop(discarded);
        }
        if self.observer.is_unsubscribed() {
            drop(on_next);
            return;
        }
        let mut handlers = inner.handlers.borrow_mut();
        if handlers.next.is_none() {
            handlers.next = on_next;
        }
    }
}

impl<T, E, R> Observer<T, E, R> {
    pub(crate) fn new(handlers: Handlers<T, E, R>) -> Self {
        Self {
            inner: Rc::new(ObserverInner {
                id: ObserverId::next(),
                state: Cell::new(SubscriptionState::Active),
                handlers: RefCell::new(handlers),
                pending: RefCell::new(VecDeque::new()),
                delivering: Cell::new(false),
                teardown: RefCell::new(None),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> ObserverId {
        self.inner.id
    }

    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        self.inner.state.get()
    }

    /// Whether the Observer has left the active state. Long-running
    /// producers poll this to stop early.
    #[must_use]
    pub fn is_unsubscribed(&self) -> bool {
        self.state() == SubscriptionState::Unsubscribed
    }

    /// Deliver a value. Dropped silently when unsubscribed or when no
    /// `on_next` is present. The handler's acknowledgement is discarded.
    ///
    /// Called from inside `on_next`, the value is queued and delivered by the
    /// outer call after the running handler returns.
    pub fn next(&self, value: T) {
        if self.is_unsubscribed() {
            tracing::trace!(observer_id = self.inner.id.raw(), "observer.next.gated");
            return;
        }
        if self.inner.delivering.get() {
            tracing::trace!(observer_id = self.inner.id.raw(), "observer.next.queued");
            self.inner.pending.borrow_mut().push_back(value);
            return;
        }
        let taken = self.inner.handlers.borrow_mut().next.take();
        let Some(on_next) = taken else {
            return;
        };
        self.inner.pending.borrow_mut().push_back(value);
        Delivery::start(self, on_next).drain();
    }

    /// Deliver the terminal error. Runs `on_error` (if present) and then
    /// closes the Observer. No-op when already unsubscribed.
    pub fn error(&self, err: E) {
        if self.is_unsubscribed() {
            tracing::trace!(observer_id = self.inner.id.raw(), "observer.error.gated");
            return;
        }
        let _finish = FinishOnDrop(self);
        let (on_error, _on_complete) = self.inner.handlers.borrow_mut().take_terminal();
        tracing::debug!(
            observer_id = self.inner.id.raw(),
            signal = "error",
            observed = on_error.is_some(),
            "observer.terminal"
        );
        if let Some(on_error) = on_error {
            let _ack = on_error(err);
        }
    }

    /// Deliver completion. Runs `on_complete` (if present) and then closes
    /// the Observer. No-op when already unsubscribed.
    pub fn complete(&self) {
        if self.is_unsubscribed() {
            tracing::trace!(observer_id = self.inner.id.raw(), "observer.complete.gated");
            return;
        }
        let _finish = FinishOnDrop(self);
        let (_on_error, on_complete) = self.inner.handlers.borrow_mut().take_terminal();
        tracing::debug!(
            observer_id = self.inner.id.raw(),
            signal = "complete",
            observed = on_complete.is_some(),
            "observer.terminal"
        );
        if let Some(on_complete) = on_complete {
            on_complete();
        }
    }

    /// Close the Observer and run its teardown. Idempotent: only the first
    /// call has any effect.
    ///
    /// The state flips before the teardown runs, so a teardown that signals
    /// this Observer sees it closed.
    pub fn unsubscribe(&self) {
        if self.inner.state.replace(SubscriptionState::Unsubscribed)
            == SubscriptionState::Unsubscribed
        {
            return;
        }
        let released = std::mem::take(&mut *self.inner.handlers.borrow_mut());
        let discarded = std::mem::take(&mut *self.inner.pending.borrow_mut());
        let teardown = self.inner.teardown.borrow_mut().take();
        tracing::debug!(
            observer_id = self.inner.id.raw(),
            teardown = teardown.is_some(),
            "observer.unsubscribed"
        );
        if let Some(teardown) = teardown {
            teardown.run();
        }
        drop(released);
        drop(discarded);
    }

    /// Second construction phase: attach the handlers the subscriber built
    /// once it could see its own Subscription.
    pub(crate) fn set_handlers(&self, handlers: Handlers<T, E, R>) {
        if self.is_unsubscribed() {
            return;
        }
        *self.inner.handlers.borrow_mut() = handlers;
    }

    /// Final construction phase: attach the teardown returned by the
    /// subscription function. An Observer that already closed while the
    /// subscription function ran gets its teardown run right here.
    pub(crate) fn install_teardown(&self, teardown: Teardown) {
        if self.is_unsubscribed() {
            tracing::debug!(
                observer_id = self.inner.id.raw(),
                "observer.teardown.late"
            );
            teardown.run();
            return;
        }
        *self.inner.teardown.borrow_mut() = Some(teardown);
    }
}
