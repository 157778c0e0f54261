use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use solace_gateway::config::Args;
use solace_gateway::rate_limit::AdmissionController;
use solace_gateway::sweeper::idle_sweeper;
use solace_gateway::{AppState, GatewayError, build_router, logging};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), GatewayError> {
    // parse cli arguments
    let args = Args::parse();

    if let Err(e) = logging::init_tracing(&args.log_level) {
        eprintln!("{e}");
    }

    let limits = args.limits().inspect_err(|e| error!(error = %e, "Invalid rate limits"))?;
    let admission = Arc::new(AdmissionController::new(limits));

    let chat_backend = args.chat_backend_url();
    let state = Arc::new(AppState::new(
        admission.clone(),
        chat_backend.clone(),
        Duration::from_secs(args.upstream_timeout),
    )?);

    // spawn the idle client sweeper
    let sweep_interval = Duration::from_secs(args.sweep_interval.max(1));
    tokio::spawn(idle_sweeper(admission.clone(), sweep_interval));

    let app = build_router(state);

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "Gateway listening");
    info!(backend = %chat_backend, "Forwarding chat to backend");
    info!(
        per_minute = args.rate_limit_per_minute,
        per_hour = args.rate_limit_per_hour,
        per_day = args.rate_limit_per_day,
        burst = args.rate_limit_burst_size,
        "Rate limits"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
