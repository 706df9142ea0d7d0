use anyhow::Result;
use axum::Router;
use userbench::{api, config, service, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cfg = Config::load()?;

    if cfg.harness.latency_classes.is_empty() {
        anyhow::bail!("harness.latency_classes must not be empty");
    }

    let app_state = service::AppState::new(cfg.clone());

    let app: Router = api::router(app_state.clone(), &cfg);

    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!(
            "Server binding to 0.0.0.0 - the harness triggers are unauthenticated, \
            keep this behind a firewall or bind to 127.0.0.1."
        );
    }

    info!(%addr, "starting userbench");

    if cfg.harness.seed_on_start {
        let state = app_state.clone();
        tokio::spawn(async move {
            if let Err(e) = state.service.seed_users().await {
                warn!(error=%e, "startup seed failed");
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
