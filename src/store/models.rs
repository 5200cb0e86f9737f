// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};

/// One carrier as published by the airline directory.
///
/// Field names on the wire follow the directory payload, so `category` is
/// read from `__clazz` and `logo_path` from `logoURL`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airline {
    /// Airline code, unique across the store
    pub code: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub us_name: Option<String>,

    #[serde(default)]
    pub default_name: Option<String>,

    /// Website URL
    #[serde(default)]
    pub site: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub alliance: Option<String>,

    #[serde(default, rename = "__clazz")]
    pub category: Option<String>,

    /// Logo path relative to the logo base URL
    #[serde(default, rename = "logoURL")]
    pub logo_path: Option<String>,

    #[serde(default)]
    pub is_favorite: bool,
}

impl Airline {
    /// Name shown in lists, empty when the directory omitted it.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Full logo URL: the base URL with the logo path appended verbatim.
    pub fn logo_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.logo_path.as_deref().unwrap_or_default())
    }

    /// Phone number, if the directory has a non-empty one.
    pub fn phone_number(&self) -> Option<&str> {
        self.phone.as_deref().filter(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    #[serde(alias = "favorites_only")]
    Favorites,
}

/// View-ready fields for one list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineRow {
    pub code: String,
    pub name: String,
    pub logo_url: String,
    pub is_favorite: bool,
}

impl AirlineRow {
    pub fn from_airline(airline: &Airline, logo_base_url: &str) -> Self {
        Self {
            code: airline.code.clone(),
            name: airline.display_name().to_string(),
            logo_url: airline.logo_url(logo_base_url),
            is_favorite: airline.is_favorite,
        }
    }
}
