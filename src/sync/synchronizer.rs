// SPDX-License-Identifier: GPL-3.0-only
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{DirectoryError, Result};
use crate::remote::DirectoryClient;
use crate::store::{Airline, AirlineRow, AirlineStore, FilterMode};
use crate::sync::traits::ProjectionObserver;

#[derive(Debug, Default)]
struct Projection {
    airlines: Vec<Airline>,
    filter: FilterMode,
    /// Token of the reload that produced `airlines`.
    installed: u64,
}

impl Projection {
    /// Replace the list unless a newer reload already installed one.
    fn install(&mut self, token: u64, filter: FilterMode, airlines: Vec<Airline>) -> Option<usize> {
        if token < self.installed {
            debug!(token, installed = self.installed, "Discarding superseded projection");
            return None;
        }
        self.installed = token;
        self.filter = filter;
        self.airlines = airlines;
        Some(self.airlines.len())
    }
}

/// Owns the list currently on display and keeps it consistent with the
/// local store and the remote directory.
///
/// All projection changes, and the store reads and writes they depend on,
/// happen under one async mutex. Only the remote fetch runs unlocked. Each
/// reload takes a generation token and a fetched list is installed only if
/// no newer reload has installed one in the meantime, so the last reload
/// that actually succeeded wins.
pub struct DirectorySynchronizer {
    store: Arc<dyn AirlineStore>,
    client: Arc<dyn DirectoryClient>,
    observer: Arc<dyn ProjectionObserver>,
    logo_base_url: String,
    generation: AtomicU64,
    projection: Mutex<Projection>,
}

impl DirectorySynchronizer {
    pub fn new(
        store: Arc<dyn AirlineStore>,
        client: Arc<dyn DirectoryClient>,
        observer: Arc<dyn ProjectionObserver>,
        logo_base_url: String,
    ) -> Self {
        Self {
            store,
            client,
            observer,
            logo_base_url,
            generation: AtomicU64::new(0),
            projection: Mutex::new(Projection::default()),
        }
    }

    /// Serve the cached directory, or fetch it once if the cache is empty.
    ///
    /// A non-empty store always wins; there is no freshness check. Resets
    /// the filter to `All`.
    pub async fn load(&self) -> Result<()> {
        let result = self.load_inner().await;
        if let Err(ref e) = result {
            self.observer.load_failed(&e.to_string());
        }
        result
    }

    async fn load_inner(&self) -> Result<()> {
        let token = {
            let mut projection = self.projection.lock().await;
            let cached = self.store.get_all().await?;
            let token = self.next_generation();
            if !cached.is_empty() {
                info!(count = cached.len(), "Serving airlines from local store");
                let installed = projection.install(token, FilterMode::All, cached);
                drop(projection);
                self.notify_reloaded(installed);
                return Ok(());
            }

            // Cache miss: the list stays empty unless the fetch succeeds.
            projection.install(token, FilterMode::All, Vec::new());
            token
        };

        self.observer.loading_started();
        let fetched = self.client.fetch_all().await;
        self.observer.loading_finished();
        let fetched = fetched.inspect_err(|e| warn!(error = %e, "Remote airline fetch failed"))?;

        let mut projection = self.projection.lock().await;
        self.store.merge_remote(&fetched).await?;
        if token < projection.installed {
            debug!(token, "Fetched directory persisted; a newer reload is on display");
            return Ok(());
        }

        // Writes that landed during the fetch keep their favorite flag.
        let stored: HashMap<String, bool> = self
            .store
            .get_all()
            .await?
            .into_iter()
            .map(|a| (a.code, a.is_favorite))
            .collect();
        let airlines = fetched
            .into_iter()
            .map(|mut a| {
                if let Some(&is_favorite) = stored.get(&a.code) {
                    a.is_favorite = is_favorite;
                }
                a
            })
            .collect();
        let installed = projection.install(token, FilterMode::All, airlines);
        drop(projection);
        self.notify_reloaded(installed);
        Ok(())
    }

    /// Rebuild the projection from the store under `mode`. Never fetches.
    pub async fn set_filter(&self, mode: FilterMode) -> Result<()> {
        let mut projection = self.projection.lock().await;
        let airlines = match mode {
            FilterMode::All => self.store.get_all().await?,
            FilterMode::Favorites => self.store.get_favorites().await?,
        };
        let token = self.next_generation();
        debug!(?mode, count = airlines.len(), "Applying filter");
        let installed = projection.install(token, mode, airlines);
        drop(projection);
        self.notify_reloaded(installed);
        Ok(())
    }

    pub async fn count(&self) -> usize {
        self.projection.lock().await.airlines.len()
    }

    pub async fn filter_mode(&self) -> FilterMode {
        self.projection.lock().await.filter
    }

    pub async fn record_at(&self, index: usize) -> Result<AirlineRow> {
        let projection = self.projection.lock().await;
        let airline = Self::entry(&projection.airlines, index)?;
        Ok(AirlineRow::from_airline(airline, &self.logo_base_url))
    }

    /// Every row of the projection, in display order.
    pub async fn rows(&self) -> Vec<AirlineRow> {
        let projection = self.projection.lock().await;
        projection
            .airlines
            .iter()
            .map(|a| AirlineRow::from_airline(a, &self.logo_base_url))
            .collect()
    }

    pub async fn select(&self, index: usize) -> Result<Airline> {
        let projection = self.projection.lock().await;
        Self::entry(&projection.airlines, index).cloned()
    }

    /// Flip the stored favorite flag of the airline at `index` and return
    /// its refreshed row.
    ///
    /// The filter is not re-applied: an airline un-favorited while showing
    /// favorites stays listed until the next `set_filter` or `load`.
    pub async fn toggle_favorite(&self, index: usize) -> Result<AirlineRow> {
        let mut projection = self.projection.lock().await;
        let count = projection.airlines.len();
        let entry = projection
            .airlines
            .get_mut(index)
            .ok_or_else(|| DirectoryError::out_of_range(index, count))?;

        let stored = self
            .store
            .get(&entry.code)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(entry.code.clone()))?;
        let is_favorite = !stored.is_favorite;
        self.store.set_favorite(&entry.code, is_favorite).await?;

        entry.is_favorite = is_favorite;
        info!(code = %entry.code, is_favorite, "Toggled favorite");
        let row = AirlineRow::from_airline(entry, &self.logo_base_url);
        drop(projection);

        self.observer.row_changed(index);
        Ok(row)
    }

    /// Persist a record changed elsewhere and refresh its row if it is on
    /// display. Returns the refreshed index, if any.
    pub async fn apply_external_update(&self, airline: Airline) -> Result<Option<usize>> {
        let mut projection = self.projection.lock().await;
        let position = projection.airlines.iter().position(|a| a.code == airline.code);

        self.store.upsert(std::slice::from_ref(&airline)).await?;

        let Some(index) = position else {
            debug!(code = %airline.code, "Stored external update for airline not on display");
            return Ok(None);
        };
        debug!(code = %airline.code, index, "Applied external update");
        projection.airlines[index] = airline;
        drop(projection);

        self.observer.row_changed(index);
        Ok(Some(index))
    }

    /// Apply every update delivered on `updates` until the sender side goes away.
    pub fn follow_updates(
        self: Arc<Self>,
        mut updates: UnboundedReceiver<Airline>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Following airline updates");
            while let Some(airline) = updates.recv().await {
                let code = airline.code.clone();
                if let Err(e) = self.apply_external_update(airline).await {
                    error!(error = %e, code = %code, "Failed to apply airline update");
                }
            }
            info!("Airline update stream closed");
        })
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn notify_reloaded(&self, installed: Option<usize>) {
        if let Some(count) = installed {
            self.observer.projection_reloaded(count);
        }
    }

    fn entry(airlines: &[Airline], index: usize) -> Result<&Airline> {
        airlines
            .get(index)
            .ok_or_else(|| DirectoryError::out_of_range(index, airlines.len()))
    }
}
