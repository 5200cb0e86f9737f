// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use url::Url;
use uuid::Uuid;

/// Places phone calls on behalf of the detail screen.
#[async_trait]
pub trait CallInitiator: Send + Sync {
    /// Start a call to `handle` (a phone number) and return the call id
    async fn start_call(&self, handle: &str) -> anyhow::Result<Uuid>;
}

/// Opens external links, e.g. an airline's website.
#[async_trait]
pub trait LinkOpener: Send + Sync {
    async fn open(&self, url: &Url) -> anyhow::Result<()>;
}
