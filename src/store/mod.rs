// SPDX-License-Identifier: GPL-3.0-only
pub mod models;
pub mod traits;
pub mod sqlite;

pub use models::{Airline, AirlineRow, FilterMode};
pub use traits::AirlineStore;
pub use sqlite::SqliteAirlineStore;
