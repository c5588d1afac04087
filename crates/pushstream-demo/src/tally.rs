//! Acknowledgement aggregation.
//!
//! The stream core drops whatever a handler returns. Handlers that want the
//! acknowledgements counted record them here themselves.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::model::RequestStatus;

#[derive(Debug, Default)]
pub struct StatusTally {
    counts: RefCell<BTreeMap<RequestStatus, usize>>,
    delivered: Cell<usize>,
    completed: Cell<bool>,
    error: RefCell<Option<String>>,
}

impl StatusTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an acknowledgement for a delivered request.
    pub fn record_delivery(&self, status: RequestStatus) {
        self.delivered.set(self.delivered.get() + 1);
        self.record(status);
    }

    /// Count an acknowledgement for the terminal error.
    pub fn record_error(&self, message: &str, status: RequestStatus) {
        *self.error.borrow_mut() = Some(message.to_string());
        self.record(status);
    }

    pub fn record_complete(&self) {
        self.completed.set(true);
    }

    fn record(&self, status: RequestStatus) {
        *self.counts.borrow_mut().entry(status).or_default() += 1;
    }

    #[must_use]
    pub fn delivered(&self) -> usize {
        self.delivered.get()
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed.get()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    #[must_use]
    pub fn count(&self, status: RequestStatus) -> usize {
        self.counts.borrow().get(&status).copied().unwrap_or(0)
    }

    /// Counts keyed by numeric status code.
    #[must_use]
    pub fn by_code(&self) -> BTreeMap<u16, usize> {
        self.counts
            .borrow()
            .iter()
            .map(|(status, n)| (status.code(), *n))
            .collect()
    }
}
