use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use release_monitor::client::XlrClient;
use release_monitor::config::{Args, MonitorConfig};
use release_monitor::monitor::Monitor;
use release_monitor::poll::run_poll_loop;

/// Initialize tracing with the filter from `RUST_LOG`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "release_monitor=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run(config: MonitorConfig) -> anyhow::Result<()> {
    config.log_summary();

    let client = XlrClient::connect(config.server_url.clone(), config.credentials.clone()).await?;
    let monitor = Monitor::new(client, &config);

    let monitor = &monitor;
    run_poll_loop(config.run_for, config.interval, move || async move {
        monitor.generate_report().await.map(|_| ())
    })
    .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let config = match MonitorConfig::from_env(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
