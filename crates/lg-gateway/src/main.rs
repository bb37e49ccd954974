//! # Ledger Gateway
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file named by `LG_CONFIG`, then env overrides)
//! 2. Install logging
//! 3. Validate configuration
//! 4. Wire identity, peers, orderer and the event hub into the coordinator
//! 5. Serve HTTP until Ctrl+C

use std::sync::Arc;

use anyhow::{Context, Result};
use lg_gateway::{build_router, AppState, GatewayConfig};
use lg_tx_coordinator::{
    EndorsingPeer, FileKeyValueStore, HttpEndorsingPeer, HttpOrderer, KeyStoreIdentityProvider,
    TransactionCoordinator,
};
use shared_bus::InMemoryEventHub;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log level")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Build the shared application state from configuration.
fn build_state(config: &GatewayConfig) -> Result<AppState> {
    let hub = Arc::new(InMemoryEventHub::new());

    let store = Arc::new(FileKeyValueStore::new(&config.key_value_store));
    let identity = Arc::new(KeyStoreIdentityProvider::new(
        store,
        config.submitter.name.clone(),
        config.submitter.msp_id.clone(),
        config.submitter.enroll_if_missing,
    ));

    let timeout = config.peer_request_timeout();
    let peers = config
        .peers
        .iter()
        .map(|p| {
            HttpEndorsingPeer::new(&p.peer_url, timeout)
                .map(|peer| Arc::new(peer) as Arc<dyn EndorsingPeer>)
                .with_context(|| format!("building client for peer {}", p.peer_url))
        })
        .collect::<Result<Vec<_>>>()?;
    let orderer = Arc::new(
        HttpOrderer::new(&config.orderer.orderer_url, timeout)
            .context("building ordering service client")?,
    );

    let coordinator = TransactionCoordinator::new(
        config.to_coordinator_config(),
        identity,
        peers,
        orderer,
        Arc::clone(&hub),
    );
    Ok(AppState::new(Arc::new(coordinator), hub))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::from_env().context("loading gateway configuration")?;
    init_logging(&config.log_level)?;
    config.validate().context("validating gateway configuration")?;

    info!(
        chain = %config.chain_name,
        channel = %config.channel_id,
        chaincode = %config.chaincode_id,
        peers = config.peers.len(),
        wait_time_ms = config.wait_time,
        "Starting ledger gateway"
    );
    for source in &config.events {
        info!(event_url = %source.event_url, "Commit events expected from emitter");
    }

    let state = build_state(&config)?;
    let addr = config.http_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, "Ledger gateway listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Ledger gateway stopped");
    Ok(())
}
