//! Triangular XEMM bot - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Cross-exchange market maker hedging through two taker legs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via XEMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    xemm_telemetry::init_logging()?;

    info!("Starting XEMM bot v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > XEMM_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("XEMM_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = xemm_bot::AppConfig::from_file(&config_path)?;
    info!(
        maker_pair = %config.strategy.maker_pair,
        taker_pair1 = %config.strategy.taker_pair1,
        taker_pair2 = %config.strategy.taker_pair2,
        tick_interval_ms = config.tick_interval_ms,
        "Configuration loaded"
    );

    let app = xemm_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
