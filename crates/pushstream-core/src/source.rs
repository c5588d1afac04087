#![forbid(unsafe_code)]

//! Adapter from a materialized sequence to an [`Observable`].
//!
//! The subscription function walks the whole sequence, calls `next` for each
//! value in order, then calls `complete` once. It never checks whether the
//! Observer is still subscribed: cancellation from inside a handler only
//! makes the remaining `next` calls no-ops at the Observer gate, while the
//! loop itself still runs to the end.
//!
//! The returned teardown has nothing to release; it reports a
//! [`TeardownEvent`] to the injected [`TeardownSink`].

use std::rc::Rc;

use crate::observable::Observable;
use crate::teardown::{Teardown, TeardownEvent, TeardownSink, TracingSink};

const SOURCE_LABEL: &str = "from_values";

impl<T: Clone + 'static, E: 'static, R: 'static> Observable<T, E, R> {
    /// Emit every value of `values` in order, then complete. Teardowns are
    /// reported through [`TracingSink`].
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        Self::from_values_with_sink(values, TracingSink)
    }

    /// Like [`from_values`](Self::from_values) with an explicit teardown sink.
    ///
    /// The sequence is collected once; every subscription replays a clone of
    /// each value.
    pub fn from_values_with_sink(
        values: impl IntoIterator<Item = T>,
        sink: impl TeardownSink + 'static,
    ) -> Self {
        let values: Rc<[T]> = values.into_iter().collect();
        let sink: Rc<dyn TeardownSink> = Rc::new(sink);
        Self::new(move |observer| {
            for value in values.iter() {
                observer.next(value.clone());
            }
            observer.complete();

            let sink = Rc::clone(&sink);
            let event = TeardownEvent {
                observer_id: observer.id(),
                source: SOURCE_LABEL,
                values: values.len(),
            };
            Teardown::new(move || sink.record(&event))
        })
    }
}

impl<T: Clone + 'static, E: 'static, R: 'static> From<Vec<T>> for Observable<T, E, R> {
    fn from(values: Vec<T>) -> Self {
        Self::from_values(values)
    }
}

impl<T: Clone + 'static, E: 'static, R: 'static> FromIterator<T> for Observable<T, E, R> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}
