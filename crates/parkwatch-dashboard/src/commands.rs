//! Subcommand handlers.
//!
//! `serve` and `watch` run a full dashboard session; `resolve` and `locate`
//! work offline against the gazetteer.

use std::sync::Arc;

use parkwatch_core::AppConfig;
use parkwatch_dashboard::{
    build_app, load_gazetteer, AppState, Dashboard, GpsOptions, LocationService, Notifier,
    SectionId, StaticGpsProvider,
};

pub(crate) async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let dashboard = Dashboard::from_config(config)?;
    probe_backend(&dashboard).await;

    let report = dashboard.on_load().await;
    tracing::info!(
        env = %config.env,
        rendered = report.succeeded.len(),
        failed = report.failed.len(),
        "initial dashboard load complete"
    );

    let app = build_app(AppState {
        dashboard: dashboard.clone(),
    });
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "dashboard API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    dashboard.on_unload();
    Ok(())
}

pub(crate) async fn watch(config: &AppConfig, cycles: Option<u32>) -> anyhow::Result<()> {
    let dashboard = Dashboard::from_config(config)?;
    probe_backend(&dashboard).await;
    dashboard.on_load().await;

    let mut ticker = tokio::time::interval(config.refresh_interval());
    let mut seen = 0u32;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        log_snapshot(&dashboard);
        seen += 1;
        if cycles.is_some_and(|max| seen >= max) {
            break;
        }
    }

    dashboard.on_unload();
    Ok(())
}

pub(crate) fn resolve(config: &AppConfig, text: &str) -> anyhow::Result<()> {
    let location = LocationService::new(Arc::new(load_gazetteer(config)?), Notifier::default());
    let resolved = location.resolve_text(text)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

pub(crate) async fn locate(config: &AppConfig, latitude: f64, longitude: f64) -> anyhow::Result<()> {
    let location = LocationService::new(Arc::new(load_gazetteer(config)?), Notifier::default());
    let provider = StaticGpsProvider::fix(latitude, longitude);
    let resolution = location
        .locate_gps(&provider, GpsOptions::from_config(config))
        .await?;
    println!("{}", serde_json::to_string_pretty(&resolution)?);
    Ok(())
}

pub(crate) async fn park(config: &AppConfig, destination: &str) -> anyhow::Result<()> {
    let dashboard = Dashboard::from_config(config)?;
    let result = dashboard.park_vehicle(destination).await?;
    match result.lot_id {
        Some(lot) => println!("{} (lot {lot})", result.message),
        None => println!("{}", result.message),
    }
    Ok(())
}

pub(crate) async fn health(config: &AppConfig) -> anyhow::Result<()> {
    let dashboard = Dashboard::from_config(config)?;
    let health = dashboard.backend_health().await?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}

async fn probe_backend(dashboard: &Dashboard) {
    match dashboard.backend_health().await {
        Ok(health) => tracing::info!(
            status = %health.status,
            service = %health.service,
            version = %health.version,
            "backend reachable"
        ),
        Err(e) => tracing::warn!(error = %e, "backend health probe failed; continuing"),
    }
}

fn log_snapshot(dashboard: &Dashboard) {
    let snapshot = dashboard.snapshot();
    let failed: Vec<&str> = SectionId::ALL
        .into_iter()
        .filter(|id| snapshot.view.is_failed(*id))
        .map(SectionId::label)
        .collect();
    let stats = snapshot.view.system_stats.data.as_ref();

    tracing::info!(
        location = %snapshot.location.name,
        available_spots = stats.map(|s| s.available_spots),
        occupancy_rate = stats.map(|s| s.occupancy_rate),
        failed_sections = ?failed,
        last_updated = ?snapshot.view.last_updated,
        "dashboard snapshot"
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
