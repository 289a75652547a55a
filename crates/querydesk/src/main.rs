//! QueryDesk - ask questions of your database in plain language.

mod app;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use querydesk_core::logging::{init_logging, log_dir, LogConfig};
use querydesk_core::{ClientConfig, QueryDeskClient, QueryDeskResult};

#[derive(Parser, Debug)]
#[command(name = "querydesk", version, about = "Ask questions of your database in plain language")]
struct CliArgs {
    /// Backend address
    #[arg(long, value_name = "URL", env = "QUERYDESK_API_URL")]
    api_url: Option<String>,
    /// Per-request HTTP timeout in seconds
    #[arg(long, value_name = "SECS", env = "QUERYDESK_REQUEST_TIMEOUT_SECS")]
    request_timeout: Option<u64>,
    /// Log filter directive (overrides QUERYDESK_LOG and RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,
    /// Database file to open on startup
    #[arg(long, value_name = "PATH")]
    open: Option<PathBuf>,
}

impl CliArgs {
    fn client_config(&self) -> QueryDeskResult<ClientConfig> {
        let mut config = ClientConfig::default();
        if let Some(url) = &self.api_url {
            config = config.with_api_base_url(url)?;
        }
        if let Some(secs) = self.request_timeout {
            config = config.with_request_timeout(Duration::from_secs(secs))?;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let mut log_config = LogConfig::new(log_dir());
    if let Some(filter) = &args.log_filter {
        log_config = log_config.with_filter(filter);
    }
    let _logging_guard = init_logging(log_config);

    tracing::info!("Starting QueryDesk");

    let client = match args.client_config().and_then(QueryDeskClient::new) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize client");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    app::run(client, args.open).await
}
