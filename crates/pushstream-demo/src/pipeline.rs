//! Request pipeline: resolve the requests, build the stream, subscribe the
//! reference handlers and summarize what they saw.

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use pushstream_core::{Observable, Teardown, TeardownEvent, TeardownSink, TracingSink};
use serde::Serialize;

use crate::config::{DemoConfig, RequestSource};
use crate::error::{DemoError, Result};
use crate::fixtures::mock_requests;
use crate::handlers::{cancelling_handlers, reference_handlers};
use crate::model::{RequestData, RequestError, RequestStatus};
use crate::tally::StatusTally;

pub type RequestStream = Observable<RequestData, RequestError, RequestStatus>;

const FAILING_SOURCE_LABEL: &str = "failing_requests";

/// Summary printed by `pushstream-demo run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub observer_id: u64,
    pub requests: usize,
    pub delivered: usize,
    /// Acknowledgement counts keyed by status code, errors included.
    pub statuses: BTreeMap<u16, usize>,
    pub completed: bool,
    pub error: Option<String>,
    /// Closed by `unsubscribe` rather than by a terminal signal.
    pub cancelled: bool,
}

/// Read a JSON array of requests.
pub fn load_requests(path: &Path) -> Result<Vec<RequestData>> {
    if !path.exists() {
        return Err(DemoError::MissingPath {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str::<Vec<RequestData>>(&content)?)
}

pub fn resolve_requests(source: &RequestSource, now: DateTime<Utc>) -> Result<Vec<RequestData>> {
    match source {
        RequestSource::Fixtures => Ok(mock_requests(now)),
        RequestSource::File(path) => load_requests(path),
    }
}

/// `from_values` over the requests, or a producer that pushes them and then
/// terminates with `fail_with` instead of completing.
#[must_use]
pub fn request_stream(requests: Vec<RequestData>, fail_with: Option<String>) -> RequestStream {
    match fail_with {
        None => Observable::from_values(requests),
        Some(message) => failing_stream(requests, message),
    }
}

fn failing_stream(requests: Vec<RequestData>, message: String) -> RequestStream {
    let requests: Rc<[RequestData]> = requests.into();
    Observable::new(move |observer| {
        let mut pushed = 0;
        for request in requests.iter() {
            if observer.is_unsubscribed() {
                break;
            }
            observer.next(request.clone());
            pushed += 1;
        }
        observer.error(RequestError::new(message.clone()));

        let event = TeardownEvent {
            observer_id: observer.id(),
            source: FAILING_SOURCE_LABEL,
            values: pushed,
        };
        Teardown::new(move || TracingSink.record(&event))
    })
}

pub fn run_pipeline(config: &DemoConfig) -> Result<PipelineReport> {
    config.validate()?;
    let requests = resolve_requests(&config.source, Utc::now())?;
    let total = requests.len();
    let stream = request_stream(requests, config.fail_with.clone());

    let tally = Rc::new(StatusTally::new());
    let subscription = match config.unsubscribe_after {
        None => stream.subscribe(reference_handlers(&tally)),
        Some(0) => stream.subscribe_with(|subscription| {
            subscription.unsubscribe();
            reference_handlers(&tally)
        }),
        Some(limit) => {
            stream.subscribe_with(|subscription| cancelling_handlers(&tally, subscription, limit))
        }
    };

    let completed = tally.completed();
    let error = tally.error();
    let cancelled = subscription.is_closed() && !completed && error.is_none();
    let report = PipelineReport {
        observer_id: subscription.observer_id().raw(),
        requests: total,
        delivered: tally.delivered(),
        statuses: tally.by_code(),
        completed,
        error,
        cancelled,
    };
    tracing::info!(
        message = "pipeline.report",
        observer_id = report.observer_id,
        delivered = report.delivered,
        completed = report.completed,
        cancelled = report.cancelled,
    );
    Ok(report)
}
