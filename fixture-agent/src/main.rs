//! Fixture Proxy Binary Entry Point

use clap::Parser;
use fixture_agent::{run_fixture, Args};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fixture_agent=info,fixture_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received, stopping fixture proxy...");
        }
    };

    if let Err(e) = run_fixture(args, shutdown).await {
        tracing::error!("Fixture proxy failed: {}", e);
        return Err(e);
    }

    Ok(())
}
