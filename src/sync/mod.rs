// SPDX-License-Identifier: GPL-3.0-only
pub mod traits;
pub mod synchronizer;

pub use traits::ProjectionObserver;
pub use synchronizer::DirectorySynchronizer;
