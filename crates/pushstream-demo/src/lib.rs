#![forbid(unsafe_code)]

//! Request pipeline built on `pushstream-core`.
//!
//! Request descriptors are wrapped with [`Observable::from_values`] and
//! pushed at three reference handlers that stand in for service calls. The
//! handlers return [`RequestStatus`] acknowledgements, which the stream core
//! ignores and a [`StatusTally`] counts.
//!
//! [`Observable::from_values`]: pushstream_core::Observable::from_values

pub mod cli;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod tally;

pub use cli::{run, run_from_env};
pub use config::{DemoConfig, LogFormat, RequestSource};
pub use error::{DemoError, Result};
pub use model::{HttpMethod, RequestData, RequestError, RequestStatus, UserData};
pub use pipeline::{PipelineReport, load_requests, run_pipeline};
pub use tally::StatusTally;
