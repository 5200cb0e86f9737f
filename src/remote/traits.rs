// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use crate::error::Result;
use crate::store::models::Airline;

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Fetch the full airline directory in one request
    async fn fetch_all(&self) -> Result<Vec<Airline>>;
}
