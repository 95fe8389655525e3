//! API Module
//!
//! HTTP handlers and routing for the bridge REST API.
//!
//! # Endpoints
//! - `GET /health` - Bridge process health
//! - `GET /tools` - Tool catalogue
//! - `POST /tools/:name` - Run a tool with a JSON argument bag
//! - `GET /cache/stats` - Cache counters and entries
//! - `DELETE /cache` - Drop every cached result
//! - `GET /metrics` - Metrics export
//! - `DELETE /metrics` - Reset metrics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
