// SPDX-License-Identifier: GPL-3.0-only
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, trace};
use crate::store::models::Airline;

type Handler = Arc<dyn Fn(&Airline) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

#[derive(Default)]
struct Subscribers {
    next_id: AtomicU64,
    handlers: RwLock<Vec<(SubscriptionHandle, Handler)>>,
}

/// In-process "airline changed" channel.
///
/// Cloning yields another handle to the same set of subscribers. Events are
/// delivered synchronously, in subscription order, to whoever is subscribed
/// at the time of `publish`; nothing is buffered for later subscribers.
#[derive(Clone, Default)]
pub struct UpdateBroadcaster {
    inner: Arc<Subscribers>,
}

impl UpdateBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionHandle
    where
        F: Fn(&Airline) + Send + Sync + 'static,
    {
        let handle = SubscriptionHandle(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((handle, Arc::new(handler)));
        debug!(subscription = handle.0, "Subscribed to airline updates");
        handle
    }

    /// Subscribe with a channel instead of a callback, for consumers that
    /// process updates on their own task.
    pub fn subscribe_channel(&self) -> (SubscriptionHandle, UnboundedReceiver<Airline>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = self.subscribe(move |airline| {
            if tx.send(airline.clone()).is_err() {
                trace!(code = %airline.code, "Update receiver dropped");
            }
        });
        (handle, rx)
    }

    /// Returns false if the handle was not subscribed.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut handlers = self
            .inner
            .handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != handle);
        let removed = handlers.len() != before;
        if removed {
            debug!(subscription = handle.0, "Unsubscribed from airline updates");
        }
        removed
    }

    pub fn publish(&self, airline: &Airline) {
        // Snapshot so handlers may (un)subscribe without deadlocking.
        let handlers: Vec<Handler> = self
            .inner
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        debug!(code = %airline.code, subscribers = handlers.len(), "Publishing airline update");
        for handler in handlers {
            handler(airline);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
