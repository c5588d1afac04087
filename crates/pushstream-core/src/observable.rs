#![forbid(unsafe_code)]

//! Lazy producer wrapping a subscription function.
//!
//! # Design
//!
//! [`Observable`] stores one subscription function behind an `Rc` and does
//! nothing until [`subscribe`](Observable::subscribe). Each subscribe call
//! builds its own [`Observer`], runs the function to completion, and then
//! installs the returned [`Teardown`]:
//!
//! ```text
//! subscribe(handlers)
//!   ├─► Observer::new            (Active, no teardown)
//!   ├─► handlers attached        (subscribe_with: factory sees the Subscription)
//!   ├─► subscribe_fn(observer)   (may emit, may complete, may be cancelled)
//!   ├─► install_teardown         (runs it now if the Observer already closed)
//!   └─► Subscription
//! ```
//!
//! Clones share the subscription function but nothing else; subscriptions of
//! the same Observable never share state.

use std::fmt;
use std::rc::Rc;

use crate::handlers::Handlers;
use crate::observer::Observer;
use crate::subscription::Subscription;
use crate::teardown::Teardown;

type SubscribeFn<T, E, R> = dyn Fn(Observer<T, E, R>) -> Teardown;

/// Lazy, re-subscribable producer.
pub struct Observable<T, E, R> {
    subscribe_fn: Rc<SubscribeFn<T, E, R>>,
}

impl<T, E, R> Clone for Observable<T, E, R> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Rc::clone(&self.subscribe_fn),
        }
    }
}

impl<T, E, R> fmt::Debug for Observable<T, E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

impl<T: 'static, E: 'static, R: 'static> Observable<T, E, R> {
    /// Wrap a subscription function. It is stored as-is and first called on
    /// [`subscribe`](Self::subscribe).
    #[must_use]
    pub fn new(subscribe_fn: impl Fn(Observer<T, E, R>) -> Teardown + 'static) -> Self {
        Self {
            subscribe_fn: Rc::new(subscribe_fn),
        }
    }

    /// Subscribe with a handler bundle.
    ///
    /// The subscription function runs synchronously; for a finite source
    /// every value and the terminal signal have been delivered by the time
    /// this returns.
    pub fn subscribe(&self, handlers: Handlers<T, E, R>) -> Subscription<T, E, R> {
        self.subscribe_with(|_| handlers)
    }

    /// Subscribe with handlers built from the [`Subscription`] itself, so a
    /// handler can cancel while the producer is still emitting.
    ///
    /// ```
    /// use pushstream_core::{Handlers, Observable};
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let seen = Rc::new(Cell::new(0));
    /// let seen_clone = Rc::clone(&seen);
    /// let source: Observable<u8, (), ()> = Observable::from_values([1, 2, 3]);
    ///
    /// source.subscribe_with(|subscription| {
    ///     Handlers::new().on_next(move |_| {
    ///         seen_clone.set(seen_clone.get() + 1);
    ///         subscription.unsubscribe();
    ///     })
    /// });
    ///
    /// assert_eq!(seen.get(), 1);
    /// ```
    pub fn subscribe_with(
        &self,
        make_handlers: impl FnOnce(Subscription<T, E, R>) -> Handlers<T, E, R>,
    ) -> Subscription<T, E, R> {
        let observer = Observer::new(Handlers::new());
        let span = tracing::debug_span!("pushstream.subscribe", observer_id = observer.id().raw());
        let _enter = span.enter();

        let subscription = Subscription::new(observer.clone());
        observer.set_handlers(make_handlers(subscription.clone()));

        let teardown = (self.subscribe_fn)(observer.clone());
        observer.install_teardown(teardown);
        subscription
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn construction_is_lazy() {
        let runs = Rc::new(Cell::new(0u32));
        let runs_clone = Rc::clone(&runs);
        let observable: Observable<u8, (), ()> = Observable::new(move |_| {
            runs_clone.set(runs_clone.get() + 1);
            Teardown::noop()
        });
        assert_eq!(runs.get(), 0);

        let _sub = observable.subscribe(Handlers::new());
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn each_subscribe_gets_a_fresh_observer() {
        let ids = Rc::new(RefCell::new(Vec::new()));
        let ids_clone = Rc::clone(&ids);
        let observable: Observable<u8, (), ()> = Observable::new(move |observer| {
            ids_clone.borrow_mut().push(observer.id());
            Teardown::noop()
        });

        let a = observable.subscribe(Handlers::new());
        let b = observable.clone().subscribe(Handlers::new());
        a.unsubscribe();

        assert_ne!(ids.borrow()[0], ids.borrow()[1]);
        assert!(a.is_closed());
        assert!(!b.is_closed());
    }

    #[test]
    fn teardown_installed_for_open_subscription() {
        let teardowns = Rc::new(Cell::new(0u32));
        let teardowns_clone = Rc::clone(&teardowns);
        let observable: Observable<u8, (), ()> = Observable::new(move |_| {
            let t = Rc::clone(&teardowns_clone);
            Teardown::new(move || t.set(t.get() + 1))
        });

        let subscription = observable.subscribe(Handlers::new());
        assert_eq!(teardowns.get(), 0);
        subscription.unsubscribe();
        subscription.unsubscribe();
        assert_eq!(teardowns.get(), 1);
    }

    #[test]
    fn synchronous_completion_runs_teardown_on_install() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let order_clone = Rc::clone(&order);
        let observable: Observable<u8, (), ()> = Observable::new(move |observer| {
            observer.complete();
            let o = Rc::clone(&order_clone);
            Teardown::new(move || o.borrow_mut().push("teardown"))
        });

        let order_handler = Rc::clone(&order);
        let subscription = observable.subscribe(
            Handlers::new().on_complete(move || order_handler.borrow_mut().push("complete")),
        );
        assert_eq!(*order.borrow(), vec!["complete", "teardown"]);

        subscription.unsubscribe();
        assert_eq!(order.borrow().len(), 2);
    }

    #[test]
    fn factory_receives_live_subscription() {
        let observable: Observable<u8, (), ()> = Observable::new(|_| Teardown::noop());
        let captured = Rc::new(RefCell::new(None));
        let captured_clone = Rc::clone(&captured);
        let subscription = observable.subscribe_with(move |sub| {
            *captured_clone.borrow_mut() = Some(sub.observer_id());
            Handlers::new()
        });
        assert_eq!(*captured.borrow(), Some(subscription.observer_id()));
    }

    #[test]
    fn debug_format() {
        let observable: Observable<u8, (), ()> = Observable::new(|_| Teardown::noop());
        assert!(format!("{observable:?}").contains("Observable"));
    }
}
