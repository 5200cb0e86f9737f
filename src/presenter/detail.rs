// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::broadcaster::UpdateBroadcaster;
use crate::error::{DirectoryError, Result};
use crate::presenter::traits::{CallInitiator, LinkOpener};
use crate::store::{Airline, AirlineStore};

/// Everything a detail screen needs besides the airline itself.
#[derive(Clone)]
pub struct DetailServices {
    pub store: Arc<dyn AirlineStore>,
    pub broadcaster: UpdateBroadcaster,
    pub calls: Arc<dyn CallInitiator>,
    pub links: Arc<dyn LinkOpener>,
    pub logo_base_url: String,
}

impl DetailServices {
    pub fn present(&self, airline: Airline) -> AirlineDetailPresenter {
        AirlineDetailPresenter {
            airline,
            services: self.clone(),
        }
    }

    /// Present the stored airline with `code`.
    pub async fn present_code(&self, code: &str) -> Result<AirlineDetailPresenter> {
        let airline = self
            .store
            .get(code)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(code.to_string()))?;
        Ok(self.present(airline))
    }
}

/// View-ready fields of the detail screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineDetail {
    pub code: String,
    pub name: String,
    pub logo_url: String,
    pub site: Option<String>,
    pub phone: Option<String>,
    pub has_phone: bool,
    pub alliance: Option<String>,
    pub is_favorite: bool,
}

pub struct AirlineDetailPresenter {
    airline: Airline,
    services: DetailServices,
}

impl AirlineDetailPresenter {
    pub fn view(&self) -> AirlineDetail {
        let airline = &self.airline;
        AirlineDetail {
            code: airline.code.clone(),
            name: airline.display_name().to_string(),
            logo_url: airline.logo_url(&self.services.logo_base_url),
            site: airline.site.clone(),
            phone: airline.phone_number().map(str::to_string),
            has_phone: airline.phone_number().is_some(),
            alliance: airline.alliance.clone(),
            is_favorite: airline.is_favorite,
        }
    }

    /// Flip the favorite flag, persist the whole record and announce the
    /// change to subscribers. Returns the new flag.
    pub async fn toggle_favorite(&mut self) -> Result<bool> {
        let mut updated = self.airline.clone();
        updated.is_favorite = !updated.is_favorite;

        self.services.store.upsert(std::slice::from_ref(&updated)).await?;
        self.airline = updated;
        info!(
            code = %self.airline.code,
            is_favorite = self.airline.is_favorite,
            "Toggled favorite from detail"
        );

        self.services.broadcaster.publish(&self.airline);
        Ok(self.airline.is_favorite)
    }

    /// Open the airline's website. Sites listed without a scheme are opened over https.
    pub async fn open_website(&self) -> Result<Url> {
        let site = self
            .airline
            .site
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.missing("website"))?;

        let url = match Url::parse(site) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&format!("https://{}", site))?
            }
            Err(e) => {
                warn!(
                    code = %self.airline.code,
                    site = %site,
                    error = %e,
                    "Airline website is not a valid URL"
                );
                return Err(e.into());
            }
        };

        self.services.links.open(&url).await.map_err(DirectoryError::Action)?;
        info!(code = %self.airline.code, url = %url, "Opened airline website");
        Ok(url)
    }

    /// Call the airline's phone number.
    pub async fn call_airline(&self) -> Result<Uuid> {
        let phone = self
            .airline
            .phone_number()
            .ok_or_else(|| self.missing("phone number"))?;

        let call_id = self
            .services
            .calls
            .start_call(phone)
            .await
            .map_err(DirectoryError::Action)?;
        info!(code = %self.airline.code, call_id = %call_id, "Started call to airline");
        Ok(call_id)
    }

    fn missing(&self, field: &'static str) -> DirectoryError {
        DirectoryError::MissingField {
            code: self.airline.code.clone(),
            field,
        }
    }
}
