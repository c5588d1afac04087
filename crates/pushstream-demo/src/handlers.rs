//! Reference handlers for the request pipeline.
//!
//! `handle_request` and `handle_error` stand in for real service calls and
//! return fixed acknowledgements. [`reference_handlers`] wires them into a
//! [`Handlers`] bundle that also feeds a [`StatusTally`].

use std::rc::Rc;

use pushstream_core::{Handlers, Subscription};

use crate::model::{RequestData, RequestError, RequestStatus};
use crate::tally::StatusTally;

pub type RequestHandlers = Handlers<RequestData, RequestError, RequestStatus>;

pub fn handle_request(request: &RequestData) -> RequestStatus {
    tracing::info!(
        message = "request.handled",
        target = %request.target(),
        params = request.params.len(),
        has_body = request.body.is_some(),
    );
    RequestStatus::Ok
}

pub fn handle_error(error: &RequestError) -> RequestStatus {
    tracing::warn!(message = "request.failed", error = %error);
    RequestStatus::InternalServerError
}

pub fn handle_complete() {
    tracing::info!(message = "pipeline.complete");
}

/// Bundle of the three reference handlers, recording every acknowledgement.
#[must_use]
pub fn reference_handlers(tally: &Rc<StatusTally>) -> RequestHandlers {
    let on_next = Rc::clone(tally);
    Handlers::new()
        .on_next(move |request: RequestData| deliver(&on_next, &request))
        .on_error(terminal_error(tally))
        .on_complete(terminal_complete(tally))
}

/// Like [`reference_handlers`], but cancels `subscription` from inside
/// `on_next` once `limit` requests have been delivered.
#[must_use]
pub fn cancelling_handlers(
    tally: &Rc<StatusTally>,
    subscription: Subscription<RequestData, RequestError, RequestStatus>,
    limit: usize,
) -> RequestHandlers {
    let on_next = Rc::clone(tally);
    Handlers::new()
        .on_next(move |request: RequestData| {
            let status = deliver(&on_next, &request);
            if on_next.delivered() >= limit {
                tracing::info!(
                    message = "pipeline.cancel",
                    observer_id = subscription.observer_id().raw(),
                    delivered = on_next.delivered(),
                );
                subscription.unsubscribe();
            }
            status
        })
        .on_error(terminal_error(tally))
        .on_complete(terminal_complete(tally))
}

fn deliver(tally: &StatusTally, request: &RequestData) -> RequestStatus {
    let status = handle_request(request);
    tally.record_delivery(status);
    status
}

fn terminal_error(
    tally: &Rc<StatusTally>,
) -> impl FnOnce(RequestError) -> RequestStatus + 'static {
    let tally = Rc::clone(tally);
    move |error| {
        let status = handle_error(&error);
        tally.record_error(&error.message, status);
        status
    }
}

fn terminal_complete(tally: &Rc<StatusTally>) -> impl FnOnce() + 'static {
    let tally = Rc::clone(tally);
    move || {
        handle_complete();
        tally.record_complete();
    }
}
