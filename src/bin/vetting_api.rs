//! Token Vetter API Server
//!
//! Usage:
//!   cargo run --bin vetting_api
//!
//! Environment:
//!   PORT / VETTER_PORT - Server port (default: 8080)
//!   VETTER_HOST        - Server host (default: 0.0.0.0)
//!   RUST_LOG           - Log filter (default: info)
//!   See `VettingConfig::from_env` for provider settings.

use std::net::SocketAddr;
use std::sync::Arc;
use token_vetter::api::{create_router, start_cleanup_task, AppState};
use token_vetter::models::ServerConfig;
use token_vetter::{VettingConfig, VettingPipeline};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = VettingConfig::from_env();
    let pipeline = VettingPipeline::from_config(config).map_err(|e| eyre::eyre!("{}", e))?;
    info!(
        "📋 Tier table {} loaded ({} tiers, min age {} days)",
        pipeline.tiers().version,
        pipeline.tiers().tiers.len(),
        pipeline.config().min_age_days.max(pipeline.tiers().min_project_age_days)
    );

    let state = Arc::new(AppState::new(pipeline));
    let telemetry = state.telemetry.clone();

    start_cleanup_task(state.rate_limiter.clone());
    info!("🧹 Background cleanup task started");

    let app = create_router(state);

    let server = ServerConfig::default();
    let addr: SocketAddr = format!("{}:{}", server.host, server.port).parse()?;

    info!("🚀 Token Vetter API starting on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /v1/vet/scan   - Vet one contract address");
    info!("  POST /v1/vet/batch  - Vet up to 20 contract addresses");
    info!("  GET  /v1/tiers      - Loaded tier table");
    info!("  GET  /v1/stats      - Vetting counters");
    info!("  GET  /v1/health     - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Shutdown signal received");
    let stats = telemetry.snapshot();
    info!("   Total scans: {}", stats.total_scans);
    info!("   Eligible: {}", stats.eligible);
    info!("   Too young: {}", stats.too_young);
    info!("   Degraded snapshots: {}", stats.degraded_snapshots);
    info!("👋 Token Vetter API shutdown complete");

    Ok(())
}
