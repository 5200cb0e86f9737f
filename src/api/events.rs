// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::broadcaster::{SubscriptionHandle, UpdateBroadcaster};
use crate::presenter::{CallInitiator, LinkOpener};
use crate::store::Airline;
use crate::sync::ProjectionObserver;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiEvent {
    LoadingStarted,
    LoadingFinished,
    ProjectionReloaded { count: usize },
    RowChanged { index: usize },
    LoadFailed { message: String },
    AirlineUpdated { airline: Airline },
    CallRequested { call_id: Uuid, handle: String },
    OpenUrl { url: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: ApiEvent,
}

/// Fan-out of view events to connected API clients.
///
/// Stands in for the list view (observer), the telephony service and the
/// link opener: the actions are forwarded to clients, which carry them out.
#[derive(Clone)]
pub struct EventHub {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: ApiEvent) {
        let envelope = EventEnvelope { at: Utc::now(), event };
        if self.sender.send(envelope).is_err() {
            debug!("No API clients listening for events");
        }
    }

    /// Relay every broadcast airline change to API clients.
    pub fn relay_updates(&self, broadcaster: &UpdateBroadcaster) -> SubscriptionHandle {
        let hub = self.clone();
        broadcaster.subscribe(move |airline| {
            hub.emit(ApiEvent::AirlineUpdated {
                airline: airline.clone(),
            })
        })
    }
}

impl ProjectionObserver for EventHub {
    fn loading_started(&self) {
        self.emit(ApiEvent::LoadingStarted);
    }

    fn loading_finished(&self) {
        self.emit(ApiEvent::LoadingFinished);
    }

    fn projection_reloaded(&self, count: usize) {
        self.emit(ApiEvent::ProjectionReloaded { count });
    }

    fn row_changed(&self, index: usize) {
        self.emit(ApiEvent::RowChanged { index });
    }

    fn load_failed(&self, message: &str) {
        warn!(message = %message, "Airline list failed to load");
        self.emit(ApiEvent::LoadFailed {
            message: message.to_string(),
        });
    }
}

#[async_trait]
impl CallInitiator for EventHub {
    async fn start_call(&self, handle: &str) -> anyhow::Result<Uuid> {
        let call_id = Uuid::new_v4();
        info!(call_id = %call_id, "Requesting call from API clients");
        self.emit(ApiEvent::CallRequested {
            call_id,
            handle: handle.to_string(),
        });
        Ok(call_id)
    }
}

#[async_trait]
impl LinkOpener for EventHub {
    async fn open(&self, url: &Url) -> anyhow::Result<()> {
        self.emit(ApiEvent::OpenUrl {
            url: url.to_string(),
        });
        Ok(())
    }
}
