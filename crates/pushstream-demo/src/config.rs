//! Run configuration for the request pipeline.
//!
//! Built with consuming `with_*` builders from a [`Default`] baseline; the
//! CLI maps its flags onto these and calls [`DemoConfig::validate`] once.

use std::path::PathBuf;

use crate::error::{DemoError, Result};

/// Where the pipeline gets its requests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestSource {
    /// The two built-in requests from [`crate::fixtures::mock_requests`].
    #[default]
    Fixtures,
    /// A JSON array of requests on disk.
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DemoConfig {
    pub source: RequestSource,
    /// Cancel after this many deliveries. `Some(0)` cancels before the first.
    pub unsubscribe_after: Option<usize>,
    /// Terminate with this error after the requests instead of completing.
    pub fail_with: Option<String>,
    pub log_format: LogFormat,
}

impl DemoConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_source(mut self, source: RequestSource) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_unsubscribe_after(mut self, count: usize) -> Self {
        self.unsubscribe_after = Some(count);
        self
    }

    #[must_use]
    pub fn with_fail_with(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let RequestSource::File(path) = &self.source
            && !path.exists()
        {
            return Err(DemoError::MissingPath { path: path.clone() });
        }
        if self
            .fail_with
            .as_deref()
            .is_some_and(|message| message.trim().is_empty())
        {
            return Err(DemoError::invalid("--fail-with needs a non-empty message"));
        }
        Ok(())
    }
}
