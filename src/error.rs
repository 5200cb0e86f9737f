// SPDX-License-Identifier: GPL-3.0-only

#[derive(thiserror::Error, Debug)]
pub enum DirectoryError {
    #[error("Failed to reach airline directory: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode airline directory: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Airline not found: {0}")]
    NotFound(String),

    #[error("Index {index} out of range for {count} airlines")]
    IndexOutOfRange { index: i64, count: usize },

    #[error("Failed to write airline store: {0}")]
    StoreWrite(String),

    #[error("Failed to read airline store: {0}")]
    StoreRead(String),

    #[error("Airline {code} has no {field}")]
    MissingField { code: String, field: &'static str },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Action failed: {0}")]
    Action(#[source] anyhow::Error),
}

impl DirectoryError {
    pub fn out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            count,
        }
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
