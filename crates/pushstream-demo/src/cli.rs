use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use crate::config::{DemoConfig, LogFormat, RequestSource};
use crate::error::Result;
use crate::logging::init_tracing;
use crate::pipeline::{resolve_requests, run_pipeline};

#[derive(Debug, Parser)]
#[command(
    name = "pushstream-demo",
    about = "Push request descriptors through a pushstream Observable",
    version
)]
pub struct Cli {
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Subscribe the reference handlers and print a JSON summary.
    Run(RunArgs),

    /// Print the requests that `run` would push, as JSON.
    Show(ShowArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// JSON array of requests; the built-in fixtures when omitted.
    #[arg(long)]
    pub requests: Option<PathBuf>,

    /// Unsubscribe from inside the value handler after N deliveries.
    #[arg(long = "unsubscribe-after")]
    pub unsubscribe_after: Option<usize>,

    /// Terminate with this error message instead of completing.
    #[arg(long = "fail-with")]
    pub fail_with: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    #[arg(long)]
    pub requests: Option<PathBuf>,
}

impl RunArgs {
    #[must_use]
    pub fn into_config(self, log_format: LogFormat) -> DemoConfig {
        let mut config = DemoConfig::new()
            .with_source(source_for(self.requests))
            .with_log_format(log_format);
        if let Some(count) = self.unsubscribe_after {
            config = config.with_unsubscribe_after(count);
        }
        if let Some(message) = self.fail_with {
            config = config.with_fail_with(message);
        }
        config
    }
}

fn source_for(requests: Option<PathBuf>) -> RequestSource {
    requests.map_or(RequestSource::Fixtures, RequestSource::File)
}

pub fn run_from_env() -> Result<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => {
            let config = args.into_config(cli.log_format);
            init_tracing(config.log_format);
            let report = run_pipeline(&config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Show(args) => {
            init_tracing(cli.log_format);
            let requests = resolve_requests(&source_for(args.requests), Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&requests)?);
            Ok(())
        }
    }
}
