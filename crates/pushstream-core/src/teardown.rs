#![forbid(unsafe_code)]

//! Producer cleanup hooks and the injected sink used to report them.
//!
//! A [`Teardown`] is what a subscription function hands back: a one-shot
//! closure the [`Observer`](crate::Observer) runs when it leaves the active
//! state. Producers that have nothing to release but still want to say so
//! (the `from_values` adapter) report through a [`TeardownSink`] passed in
//! by the caller rather than writing to a global output.

use std::fmt;

use crate::observer::ObserverId;

/// One-shot cleanup closure returned by a subscription function.
pub struct Teardown {
    hook: Option<Box<dyn FnOnce()>>,
}

impl Teardown {
    /// Wrap a cleanup closure.
    #[must_use]
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self {
            hook: Some(Box::new(f)),
        }
    }

    /// A teardown that does nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self { hook: None }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.hook.is_none()
    }

    /// Consume and run the hook. Consuming `self` is what makes a second run
    /// impossible.
    pub(crate) fn run(self) {
        if let Some(hook) = self.hook {
            hook();
        }
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown")
            .field("noop", &self.is_noop())
            .finish()
    }
}

/// What a source adapter reports when its teardown runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownEvent {
    /// Observer whose teardown ran.
    pub observer_id: ObserverId,
    /// Short label of the producer (`"from_values"` for the built-in adapter).
    pub source: &'static str,
    /// Number of values the producer pushed at the Observer, gated or not.
    pub values: usize,
}

/// Side-effect capability invoked by adapter teardowns.
pub trait TeardownSink {
    fn record(&self, event: &TeardownEvent);
}

/// Reports teardowns as `tracing` DEBUG events named `pushstream.teardown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TeardownSink for TracingSink {
    fn record(&self, event: &TeardownEvent) {
        tracing::debug!(
            message = "pushstream.teardown",
            observer_id = event.observer_id.raw(),
            source = event.source,
            values = event.values,
        );
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TeardownSink for NoopSink {
    fn record(&self, _event: &TeardownEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn run_invokes_hook_once() {
        let calls = Rc::new(Cell::new(0u32));
        let calls_clone = Rc::clone(&calls);
        let teardown = Teardown::new(move || calls_clone.set(calls_clone.get() + 1));
        assert!(!teardown.is_noop());
        teardown.run();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn noop_and_default_agree() {
        assert!(Teardown::noop().is_noop());
        assert!(Teardown::default().is_noop());
        Teardown::noop().run();
    }

    #[test]
    fn debug_format() {
        let dbg = format!("{:?}", Teardown::new(|| {}));
        assert!(dbg.contains("Teardown"));
        assert!(dbg.contains("noop: false"));
    }

    #[test]
    fn noop_sink_accepts_events() {
        let event = TeardownEvent {
            observer_id: ObserverId::new(7),
            source: "test",
            values: 3,
        };
        NoopSink.record(&event);
        TracingSink.record(&event);
    }
}
