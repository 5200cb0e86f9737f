// SPDX-License-Identifier: GPL-3.0-only
pub mod traits;
pub mod detail;
pub mod list;

pub use traits::{CallInitiator, LinkOpener};
pub use detail::{AirlineDetail, DetailServices};
pub use list::AirlineListPresenter;
