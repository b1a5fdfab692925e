mod bot;
mod config;
mod controller;
mod data;
mod error;
mod model;
mod router;
mod scheduler;
mod service;
mod startup;
mod state;

use std::sync::Arc;

use songbird::Songbird;
use tokio::net::TcpListener;

use crate::bot::handler::Handler;
use crate::config::Config;
use crate::error::AppError;
use crate::scheduler::log_pruning;
use crate::service::alert::{AlertHandle, AlertService};
use crate::service::voice::audio::AudioResourceBuilder;
use crate::service::voice::songbird::SongbirdTransport;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    startup::init_tracing();

    let config = Config::from_env()?;

    let registry = Arc::new(startup::load_registry(&config).await?);
    let songbird = Songbird::serenity();
    let (alerts, receiver) = AlertHandle::channel();

    // Initialize Discord bot and extract HTTP client
    let handler = Handler::new(registry.clone(), alerts.clone());
    let mut client = bot::start::init_bot(&config, handler, songbird.clone()).await?;

    let alert_log = Arc::new(
        startup::setup_alert_log(&config, client.cache.clone(), client.http.clone()).await,
    );

    // Start the voice alert event loop
    let service = AlertService::new(
        receiver,
        alerts.clone(),
        registry,
        SongbirdTransport::new(songbird),
        AudioResourceBuilder::new(config.volume),
        alert_log.clone(),
        config.leave_grace,
    );
    let alert_loop = tokio::spawn(service.run());

    // Start alert log pruning scheduler
    let scheduler_log = alert_log.clone();
    let retention = chrono::Duration::days(config.log_retention_days);
    tokio::spawn(async move {
        if let Err(e) = log_pruning::start_scheduler(scheduler_log, retention).await {
            tracing::error!("Alert log pruning scheduler error: {}", e);
        }
    });

    // Start liveness server
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    let app = router::router().with_state(AppState::new(alert_log));
    tracing::info!("Liveness server listening on port {}", config.port);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Liveness server error: {}", e);
        }
    });

    let outcome = tokio::select! {
        result = bot::start::start_bot(&mut client) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, shutting down");
            Ok(())
        }
    };

    // Leave voice before the shards go away
    alerts.shutdown();
    if let Err(e) = alert_loop.await {
        tracing::error!("Voice alert event loop failed: {}", e);
    }
    client.shard_manager.shutdown_all().await;

    outcome
}
