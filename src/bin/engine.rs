//! The matching engine process.
//!
//! Creates the shared regions, runs the submitter and publisher threads,
//! and shuts down cooperatively on Ctrl-C (or after `--duration-secs`).

use clap::Parser;
use hft_orderbook::{EngineConfig, TradingEngine};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hft-engine", about = "Matching engine with shared-memory market data")]
struct Args {
    /// Instrument symbol.
    #[arg(long, default_value = "BTCUSD")]
    symbol: String,

    /// Lower bound of the synthetic price band, in cents.
    #[arg(long, default_value_t = 5_000_000)]
    min_price: i64,

    /// Upper bound of the synthetic price band, in cents.
    #[arg(long, default_value_t = 6_000_000)]
    max_price: i64,

    /// Directory backing the shared regions.
    #[arg(long, default_value = hft_orderbook::shm::DEFAULT_SHM_DIR)]
    shm_dir: PathBuf,

    /// Stop after this many seconds instead of waiting for Ctrl-C.
    #[arg(long)]
    duration_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = EngineConfig {
        symbol: args.symbol,
        min_price: args.min_price,
        max_price: args.max_price,
        shm_dir: args.shm_dir,
        ..EngineConfig::default()
    };

    let engine = TradingEngine::new(config)?;
    let handles = engine.start();

    match args.duration_secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                    info!("configured duration elapsed");
                }
                result = tokio::signal::ctrl_c() => {
                    result?;
                    info!("received Ctrl-C");
                }
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
            info!("received Ctrl-C");
        }
    }

    engine.stop();
    handles.join();

    let metrics = engine.metrics().current_metrics();
    info!(
        "final: {} orders, {} trades ({} dropped), avg latency {} ns",
        metrics.orders_processed,
        metrics.trades_executed,
        metrics.trades_dropped,
        metrics.avg_latency_ns
    );

    Ok(())
}
