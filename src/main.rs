//! Tether relay tester - Entry Point
//!
//! Loads candidate invite links, races reachability probes against them and
//! reports the relay the client should use, or the direct-connection
//! fallback when none answers.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tether::relay::invite;
use tether::{select_working, Config, TcpProber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tether=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("loading configuration")?;
    info!("Configuration loaded");

    let candidates = invite::load_invite_file(&config.relay.invite_file)
        .await
        .with_context(|| format!("reading {}", config.relay.invite_file))?;
    info!(
        "Loaded {} candidates from {}",
        candidates.len(),
        config.relay.invite_file
    );

    let prober = TcpProber::new();
    match select_working(&prober, candidates, &config.probe_config()).await {
        Some(relay) => {
            info!("Working relay found: {}", relay);
            println!("{}", relay.address());
        }
        None => {
            info!("No working relay; the client should connect directly");
            println!("direct");
        }
    }

    Ok(())
}
