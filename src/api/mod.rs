// SPDX-License-Identifier: GPL-3.0-only
pub mod events;
pub mod handlers;
pub mod http;
pub mod websocket;

pub use events::EventHub;
pub use handlers::ApiHandlers;
pub use http::HttpServer;
