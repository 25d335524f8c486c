use anyhow::{Context, Result};
use starlink_pingmon::*;
use std::sync::Arc;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

/// How long shutdown waits for the poller to close its link.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let app_config = config::AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(app_config.log_filter()));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let addr = app_config.listen_addr();
    tracing::info!("Starlink Ping Drop Monitor starting ({})", version::banner());
    tracing::info!("Dish target: {}", app_config.dish_target());
    tracing::info!("HTTP endpoint: http://{}", addr);
    tracing::info!("Poll interval: {}s", app_config.monitoring.poll_interval_secs);
    tracing::info!(
        "Alert threshold: {}%",
        app_config.monitoring.alert_threshold * 100.0
    );

    let collector = Arc::new(collector::Collector::new(
        app_config.monitoring.alert_threshold,
    ));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding HTTP listener on {addr}"))?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let poller_handle = poller::spawn(
        poller::PollerDeps {
            connector: dish::GrpcDishConnector::new(
                app_config.dish_target(),
                app_config.dish_timeout(),
            ),
            collector: collector.clone(),
            shutdown_rx,
        },
        poller::PollerConfig {
            poll_interval: app_config.poll_interval(),
        },
    );

    let app = routes::app(collector, app_config.poll_interval());
    tracing::info!("HTTP server listening on http://{}", addr);
    tracing::info!("  - http://{}/metrics (Prometheus metrics)", addr);
    tracing::info!("  - http://{}/health (Health check)", addr);

    // The poller is stopped on both paths; a serve error is returned afterwards.
    let served: Result<()> = tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = &result {
                tracing::error!(error = %e, "HTTP server failed");
            }
            result.context("serving HTTP")
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
            Ok(())
        }
    };

    let _ = shutdown_tx.send(());
    tracing::info!("Waiting for monitoring loop to finish...");
    if tokio::time::timeout(SHUTDOWN_GRACE, poller_handle)
        .await
        .is_err()
    {
        tracing::warn!("Monitoring loop did not stop within {:?}", SHUTDOWN_GRACE);
    }
    tracing::info!("Shutdown complete");

    served
}
