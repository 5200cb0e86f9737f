// SPDX-License-Identifier: GPL-3.0-only
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::events::EventHub;
use crate::api::handlers::{
    ApiHandlers, ApiResponse, ApiResult, CallStarted, FilterRequest, ListSnapshot, OpenedLink,
};
use crate::api::websocket::WebSocketServer;
use crate::presenter::AirlineDetail;
use crate::store::AirlineRow;

pub struct HttpServer {
    handlers: Arc<ApiHandlers>,
    events: EventHub,
    addr: SocketAddr,
}

impl HttpServer {
    pub fn new(handlers: Arc<ApiHandlers>, events: EventHub, addr: SocketAddr) -> Self {
        Self {
            handlers,
            events,
            addr,
        }
    }

    pub fn router(&self) -> Router {
        let websocket = WebSocketServer::new(self.handlers.clone(), self.events.clone());

        Router::new()
            .route("/api/health", get(health_handler))
            .route("/api/airlines", get(list_handler))
            .route("/api/airlines/load", post(load_handler))
            .route("/api/airlines/filter", put(set_filter_handler))
            .route("/api/airlines/:index", get(row_handler))
            .route("/api/airlines/:index/favorite", post(toggle_favorite_handler))
            .route("/api/airlines/:index/detail", get(select_handler))
            .route("/api/details/:code", get(detail_handler))
            .route("/api/details/:code/favorite", post(detail_favorite_handler))
            .route("/api/details/:code/website", post(detail_website_handler))
            .route("/api/details/:code/call", post(detail_call_handler))
            .with_state(self.handlers.clone())
            .merge(websocket.router())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.addr).await?;
        self.serve_listener(listener, shutdown).await
    }

    pub async fn serve_listener<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        info!(addr = %listener.local_addr()?, "Starting HTTP server");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler() -> Json<ApiResponse<&'static str>> {
    ApiHandlers::health().await
}

async fn list_handler(State(handlers): State<Arc<ApiHandlers>>) -> ApiResult<ListSnapshot> {
    handlers.list().await
}

async fn load_handler(State(handlers): State<Arc<ApiHandlers>>) -> ApiResult<ListSnapshot> {
    handlers.load().await
}

async fn set_filter_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Json(request): Json<FilterRequest>,
) -> ApiResult<ListSnapshot> {
    handlers.set_filter(request).await
}

async fn row_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(index): Path<i64>,
) -> ApiResult<AirlineRow> {
    handlers.row(index).await
}

async fn toggle_favorite_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(index): Path<i64>,
) -> ApiResult<AirlineRow> {
    handlers.toggle_favorite(index).await
}

async fn select_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(index): Path<i64>,
) -> ApiResult<AirlineDetail> {
    handlers.select(index).await
}

async fn detail_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(code): Path<String>,
) -> ApiResult<AirlineDetail> {
    handlers.detail(code).await
}

async fn detail_favorite_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(code): Path<String>,
) -> ApiResult<AirlineDetail> {
    handlers.detail_toggle_favorite(code).await
}

async fn detail_website_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(code): Path<String>,
) -> ApiResult<OpenedLink> {
    handlers.detail_open_website(code).await
}

async fn detail_call_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(code): Path<String>,
) -> ApiResult<CallStarted> {
    handlers.detail_call(code).await
}
