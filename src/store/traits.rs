// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use crate::error::Result;
use crate::store::models::Airline;

/// Durable storage for airline records keyed by code.
///
/// Every call is applied atomically: either all records of a batch are
/// written or none are.
#[async_trait]
pub trait AirlineStore: Send + Sync {
    /// All stored airlines in insertion order
    async fn get_all(&self) -> Result<Vec<Airline>>;

    /// Stored airlines marked as favorite, in insertion order
    async fn get_favorites(&self) -> Result<Vec<Airline>>;

    /// Look up a single airline by code
    async fn get(&self, code: &str) -> Result<Option<Airline>>;

    /// Insert each record, or overwrite every field of the stored record with the same code
    async fn upsert(&self, airlines: &[Airline]) -> Result<()>;

    /// Like `upsert`, but keeps the favorite flag of records that already exist
    async fn merge_remote(&self, airlines: &[Airline]) -> Result<()>;

    /// Set the favorite flag of one airline; fails with `NotFound` if the code is unknown
    async fn set_favorite(&self, code: &str, is_favorite: bool) -> Result<()>;
}
