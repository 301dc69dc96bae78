//! TradeOgre trade recorder
//!
//! Records every trade on the configured markets to `data/<SYMBOL>.txt`,
//! renewing each stream connection hourly.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trade_recorder::supervisor::shutdown_on;
use trade_recorder::{Config, Supervisor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first so LOG_FORMAT from .env is honoured
    let config = Config::load()?;

    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    if std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    info!("Starting TradeOgre trade recorder");
    info!(
        pairs = ?config.pairs.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
        discover_all = config.discover_all_pairs,
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    Supervisor::new(config)
        .run(shutdown_on(tokio::signal::ctrl_c()))
        .await?;

    info!("Trade recorder stopped");
    Ok(())
}
