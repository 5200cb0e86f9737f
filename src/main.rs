// SPDX-License-Identifier: GPL-3.0-only
mod api;
mod broadcaster;
mod config;
mod error;
mod logging;
mod presenter;
mod remote;
mod store;
mod sync;
#[cfg(test)]
mod test_helpers;

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use api::{ApiHandlers, EventHub, HttpServer};
use broadcaster::UpdateBroadcaster;
use config::Config;
use logging::setup_logging;
use presenter::{AirlineListPresenter, DetailServices};
use remote::{DirectoryClient, HttpDirectoryClient};
use store::{AirlineStore, SqliteAirlineStore};
use sync::DirectorySynchronizer;

const EVENT_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    setup_logging(&config.log_level, config.log_json)?;

    info!("Starting airline-directory v{}", env!("CARGO_PKG_VERSION"));

    // Initialize store
    if let Some(parent) = config.store_db_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let store: Arc<dyn AirlineStore> =
        Arc::new(SqliteAirlineStore::new(&config.store_db_path).await?);
    info!("Airline store initialized at {}", config.store_db_path.display());

    // Initialize directory client
    let client: Arc<dyn DirectoryClient> = Arc::new(HttpDirectoryClient::new(
        config.directory_url.clone(),
        config.request_timeout(),
    )?);
    info!(url = %config.directory_url, "Directory client initialized");

    // Wire the list, the detail screens and API clients together
    let events = EventHub::new(EVENT_CAPACITY);
    let broadcaster = UpdateBroadcaster::new();

    let sync = Arc::new(DirectorySynchronizer::new(
        Arc::clone(&store),
        client,
        Arc::new(events.clone()),
        config.logo_base_url.clone(),
    ));
    let (list_subscription, updates) = broadcaster.subscribe_channel();
    let follow_task = Arc::clone(&sync).follow_updates(updates);
    let relay_subscription = events.relay_updates(&broadcaster);
    info!(subscribers = broadcaster.subscriber_count(), "Update broadcaster ready");

    let details = DetailServices {
        store,
        broadcaster: broadcaster.clone(),
        calls: Arc::new(events.clone()),
        links: Arc::new(events.clone()),
        logo_base_url: config.logo_base_url.clone(),
    };
    let list = Arc::new(AirlineListPresenter::new(sync, details));

    if config.load_on_startup {
        match list.load().await {
            Ok(count) => info!(count, "Initial airline list loaded"),
            Err(e) => warn!(error = %e, "Initial airline load failed; waiting for a load request"),
        }
    }

    // Start HTTP server
    let handlers = Arc::new(ApiHandlers::new(list));
    let http_server = HttpServer::new(handlers, events, config.local_api_bind);
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.serve(shutdown_signal()).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("All services started. Waiting for shutdown signal...");

    if let Err(e) = http_task.await {
        error!(error = %e, "HTTP server task failed");
    }

    broadcaster.unsubscribe(relay_subscription);
    broadcaster.unsubscribe(list_subscription);
    if let Err(e) = follow_task.await {
        error!(error = %e, "Update follower task failed");
    }
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal (Ctrl+C)"),
        Err(err) => error!(error = %err, "Unable to listen for shutdown signal"),
    }
    info!("Initiating graceful shutdown...");
}
