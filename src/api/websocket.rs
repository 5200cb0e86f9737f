// SPDX-License-Identifier: GPL-3.0-only
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::api::events::{EventEnvelope, EventHub};
use crate::api::handlers::{ApiHandlers, ApiResult, FilterRequest};
use crate::store::FilterMode;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsMessage {
    Load,
    List,
    SetFilter { mode: FilterMode },
    ToggleFavorite { index: i64 },
    Select { index: i64 },
    DetailToggleFavorite { code: String },
    OpenWebsite { code: String },
    Call { code: String },
}

#[derive(Debug, Serialize)]
struct WsResponse {
    #[serde(rename = "type")]
    kind: &'static str,
    success: bool,
    data: Option<serde_json::Value>,
    error: Option<String>,
}

impl WsResponse {
    fn failure(error: String) -> Self {
        Self {
            kind: "response",
            success: false,
            data: None,
            error: Some(error),
        }
    }

    fn from_result<T: Serialize>(result: ApiResult<T>) -> Self {
        match result {
            Ok(Json(response)) => Self {
                kind: "response",
                success: response.success,
                data: response.data.and_then(|v| serde_json::to_value(v).ok()),
                error: response.error,
            },
            Err(e) => {
                debug!(error = %e.0, "WebSocket command failed");
                Self::failure(e.0.to_string())
            }
        }
    }
}

pub struct WebSocketServer {
    handlers: Arc<ApiHandlers>,
    events: EventHub,
}

impl WebSocketServer {
    pub fn new(handlers: Arc<ApiHandlers>, events: EventHub) -> Self {
        Self { handlers, events }
    }

    pub fn router(&self) -> Router {
        let handlers = self.handlers.clone();
        let events = self.events.clone();
        Router::new().route(
            "/ws",
            get(move |ws: WebSocketUpgrade| async move {
                ws.on_upgrade(move |socket| handle_socket(socket, handlers, events))
            }),
        )
    }
}

async fn handle_socket(socket: WebSocket, handlers: Arc<ApiHandlers>, events: EventHub) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    info!("WebSocket client connected");

    let mut send_task = tokio::spawn(forward_outgoing(sender, rx, events.subscribe()));

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Err(e) = handle_message(text, &handlers, &tx).await {
                        error!(error = %e, "Failed to handle WebSocket message");
                    }
                }
                Message::Close(_) => {
                    info!("WebSocket connection closed");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };
}

/// Interleave command replies with hub events on the socket. Pending events go first.
async fn forward_outgoing<S>(
    mut sender: S,
    mut replies: mpsc::UnboundedReceiver<Message>,
    mut events: broadcast::Receiver<EventEnvelope>,
) where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    loop {
        let msg = tokio::select! {
            biased;
            event = events.recv() => match event {
                Ok(envelope) => match serde_json::to_string(&envelope) {
                    Ok(text) => Message::Text(text),
                    Err(e) => {
                        error!(error = %e, "Failed to encode event");
                        continue;
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "WebSocket client fell behind; events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            reply = replies.recv() => match reply {
                Some(msg) => msg,
                None => break,
            },
        };

        if let Err(e) = sender.send(msg).await {
            error!(error = %e, "Failed to send WebSocket message");
            break;
        }
    }
}

async fn handle_message(
    text: String,
    handlers: &ApiHandlers,
    tx: &mpsc::UnboundedSender<Message>,
) -> anyhow::Result<()> {
    let response = dispatch(&text, handlers).await;
    tx.send(Message::Text(serde_json::to_string(&response)?))?;
    Ok(())
}

async fn dispatch(text: &str, handlers: &ApiHandlers) -> WsResponse {
    let msg: WsMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => return WsResponse::failure(format!("Invalid message format: {}", e)),
    };

    match msg {
        WsMessage::Load => WsResponse::from_result(handlers.load().await),
        WsMessage::List => WsResponse::from_result(handlers.list().await),
        WsMessage::SetFilter { mode } => {
            WsResponse::from_result(handlers.set_filter(FilterRequest { mode }).await)
        }
        WsMessage::ToggleFavorite { index } => {
            WsResponse::from_result(handlers.toggle_favorite(index).await)
        }
        WsMessage::Select { index } => WsResponse::from_result(handlers.select(index).await),
        WsMessage::DetailToggleFavorite { code } => {
            WsResponse::from_result(handlers.detail_toggle_favorite(code).await)
        }
        WsMessage::OpenWebsite { code } => {
            WsResponse::from_result(handlers.detail_open_website(code).await)
        }
        WsMessage::Call { code } => WsResponse::from_result(handlers.detail_call(code).await),
    }
}
