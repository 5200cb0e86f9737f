// SPDX-License-Identifier: GPL-3.0-only
use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::presenter::detail::{AirlineDetailPresenter, DetailServices};
use crate::store::{AirlineRow, FilterMode};
use crate::sync::DirectorySynchronizer;

/// List screen adapter over the synchronizer.
pub struct AirlineListPresenter {
    sync: Arc<DirectorySynchronizer>,
    details: DetailServices,
}

impl AirlineListPresenter {
    pub fn new(sync: Arc<DirectorySynchronizer>, details: DetailServices) -> Self {
        Self { sync, details }
    }

    pub async fn load(&self) -> Result<usize> {
        self.sync.load().await?;
        Ok(self.sync.count().await)
    }

    pub async fn count(&self) -> usize {
        self.sync.count().await
    }

    pub async fn filter_mode(&self) -> FilterMode {
        self.sync.filter_mode().await
    }

    pub async fn row(&self, index: usize) -> Result<AirlineRow> {
        self.sync.record_at(index).await
    }

    pub async fn rows(&self) -> Vec<AirlineRow> {
        self.sync.rows().await
    }

    pub async fn set_filter(&self, mode: FilterMode) -> Result<usize> {
        self.sync.set_filter(mode).await?;
        Ok(self.sync.count().await)
    }

    pub async fn toggle_favorite(&self, index: usize) -> Result<AirlineRow> {
        self.sync.toggle_favorite(index).await
    }

    /// Open the detail screen for the row at `index`.
    pub async fn select(&self, index: usize) -> Result<AirlineDetailPresenter> {
        let airline = self.sync.select(index).await?;
        info!(code = %airline.code, index, "Selected airline");
        Ok(self.details.present(airline))
    }

    /// Open the detail screen for a stored airline by code.
    pub async fn detail(&self, code: &str) -> Result<AirlineDetailPresenter> {
        self.details.present_code(code).await
    }
}
