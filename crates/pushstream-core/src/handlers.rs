#![forbid(unsafe_code)]

//! Consumer-side callback bundle.
//!
//! Every capability is optional. A missing `on_next` drops values; a missing
//! `on_error` or `on_complete` still lets the terminal signal close the
//! Observer. Presence is explicit (`Option`), never inferred.

use std::fmt;

pub(crate) type NextFn<T, R> = Box<dyn FnMut(T) -> R>;
pub(crate) type ErrorFn<E, R> = Box<dyn FnOnce(E) -> R>;
pub(crate) type CompleteFn = Box<dyn FnOnce()>;

/// Optional `on_next` / `on_error` / `on_complete` callbacks.
///
/// `R` is an acknowledgement returned by the value and error handlers. The
/// core accepts it and drops it; aggregating acknowledgements is the
/// caller's business.
pub struct Handlers<T, E, R> {
    pub(crate) next: Option<NextFn<T, R>>,
    pub(crate) error: Option<ErrorFn<E, R>>,
    pub(crate) complete: Option<CompleteFn>,
}

impl<T, E, R> Default for Handlers<T, E, R> {
    fn default() -> Self {
        Self {
            next: None,
            error: None,
            complete: None,
        }
    }
}

impl<T, E, R> fmt::Debug for Handlers<T, E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("next", &self.has_next())
            .field("error", &self.has_error())
            .field("complete", &self.has_complete())
            .finish()
    }
}

impl<T, E, R> Handlers<T, E, R> {
    /// An empty bundle: observes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value handler.
    #[must_use]
    pub fn on_next(mut self, f: impl FnMut(T) -> R + 'static) -> Self {
        self.next = Some(Box::new(f));
        self
    }

    /// Set the error handler. Called at most once.
    #[must_use]
    pub fn on_error(mut self, f: impl FnOnce(E) -> R + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    /// Set the completion handler. Called at most once.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    #[must_use]
    pub fn has_complete(&self) -> bool {
        self.complete.is_some()
    }

    /// Remove both terminal handlers. Whichever terminal signal arrives
    /// first takes the pair, so the other one finds nothing to call.
    pub(crate) fn take_terminal(&mut self) -> (Option<ErrorFn<E, R>>, Option<CompleteFn>) {
        (self.error.take(), self.complete.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bundle_has_no_capabilities() {
        let handlers: Handlers<u8, (), ()> = Handlers::new();
        assert!(!handlers.has_next());
        assert!(!handlers.has_error());
        assert!(!handlers.has_complete());
    }

    #[test]
    fn builder_sets_each_capability() {
        let handlers: Handlers<u8, (), u16> = Handlers::new()
            .on_next(u16::from)
            .on_complete(|| {});
        assert!(handlers.has_next());
        assert!(!handlers.has_error());
        assert!(handlers.has_complete());
    }

    #[test]
    fn take_terminal_empties_both_slots() {
        let mut handlers: Handlers<u8, (), ()> =
            Handlers::new().on_error(|_| {}).on_complete(|| {});
        let (error, complete) = handlers.take_terminal();
        assert!(error.is_some());
        assert!(complete.is_some());
        assert!(!handlers.has_error());
        assert!(!handlers.has_complete());
    }

    #[test]
    fn debug_reports_presence_only() {
        let handlers: Handlers<u8, (), ()> = Handlers::new().on_next(|_| {});
        let dbg = format!("{handlers:?}");
        assert!(dbg.contains("next: true"));
        assert!(dbg.contains("error: false"));
    }
}
