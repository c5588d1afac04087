#![forbid(unsafe_code)]

//! Caller-facing cancellation handle.

use std::fmt;

use crate::observer::{Observer, ObserverId};

/// Handle returned by [`Observable::subscribe`](crate::Observable::subscribe),
/// bound to exactly one [`Observer`].
///
/// Dropping a `Subscription` does **not** cancel it: a deferred producer may
/// still hold the Observer and keep emitting. Call [`unsubscribe`] to stop.
///
/// Clones refer to the same Observer, so a handler can hold one and cancel
/// re-entrantly (see [`Observable::subscribe_with`](crate::Observable::subscribe_with)).
///
/// [`unsubscribe`]: Subscription::unsubscribe
pub struct Subscription<T, E, R> {
    observer: Observer<T, E, R>,
}

impl<T, E, R> Clone for Subscription<T, E, R> {
    fn clone(&self) -> Self {
        Self {
            observer: self.observer.clone(),
        }
    }
}

impl<T, E, R> fmt::Debug for Subscription<T, E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("observer_id", &self.observer.id())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T, E, R> Subscription<T, E, R> {
    pub(crate) fn new(observer: Observer<T, E, R>) -> Self {
        Self { observer }
    }

    /// Cancel. Safe to call any number of times, before or after the
    /// producer finished; the teardown runs at most once.
    pub fn unsubscribe(&self) {
        self.observer.unsubscribe();
    }

    /// Whether the underlying Observer has closed, by cancellation or by a
    /// terminal signal.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.observer.is_unsubscribed()
    }

    #[must_use]
    pub fn observer_id(&self) -> ObserverId {
        self.observer.id()
    }
}
