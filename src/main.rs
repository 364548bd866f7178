use anyhow::Result;
use homelab_status::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

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

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let state = routes::AppState::from_config(&app_config)?;

    if !state.prometheus_repo.is_configured() {
        tracing::info!("PROMETHEUS_URL not configured; /api/metrics serves fallback data");
    }
    if !state.uptime_repo.is_configured() {
        tracing::info!("UPTIMEROBOT_API_KEY not configured; /api/uptime serves fallback data");
    }

    let mut metrics_poller = app_config.polling.enabled.then(|| {
        poller::spawn_metrics_poller(
            state.prometheus_repo.clone(),
            state.history.clone(),
            tokio::time::Duration::from_secs(app_config.polling.interval_secs),
        )
    });

    let app = routes::app(state);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    if let Some(poller) = metrics_poller.as_mut() {
        poller.stop().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
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
