//! The market-data broadcaster process.
//!
//! Attaches to the engine's shared regions (retrying while the engine
//! comes up), then serves the WebSocket feed until Ctrl-C.

use clap::Parser;
use hft_orderbook::feed::server;
use hft_orderbook::{BroadcasterConfig, MarketFeed};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hft-broadcaster", about = "WebSocket fan-out for the shared-memory feed")]
struct Args {
    /// TCP port for the WebSocket server.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Directory backing the shared regions.
    #[arg(long, default_value = hft_orderbook::shm::DEFAULT_SHM_DIR)]
    shm_dir: PathBuf,

    /// How many times to retry attaching to the regions at startup.
    #[arg(long, default_value_t = 20)]
    attach_retries: u32,
}

fn attach(config: &BroadcasterConfig, retries: u32) -> Result<MarketFeed, hft_orderbook::TransportError> {
    let mut attempt = 0;
    loop {
        match MarketFeed::open(config.clone()) {
            Ok(feed) => return Ok(feed),
            Err(e) if attempt < retries => {
                attempt += 1;
                warn!("cannot attach to shared regions yet ({e}), retry {attempt}/{retries}");
                std::thread::sleep(Duration::from_millis(500));
            }
            Err(e) => return Err(e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = BroadcasterConfig {
        port: args.port,
        shm_dir: args.shm_dir,
        ..BroadcasterConfig::default()
    };

    let feed = attach(&config, args.attach_retries)?;
    let handles = feed.start();

    let app = server::router(feed.channels());
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("broadcaster listening on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl-C");
        })
        .await?;

    feed.stop();
    handles.join();
    Ok(())
}
