//! HTTP service around the multimodal routing engine.
//!
//! The listener comes up before the graph is built; until then routing
//! endpoints answer 503 and `/health` reports `initializing`.

pub mod config;
mod dto;
pub mod error;
mod routes;
mod state;

pub use config::{ConfigError, HttpConfig, ServerConfig};
pub use dto::{HealthResponse, RouteQuery};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
