//! HTTP boundary of LoRaHub: uplink ingestion plus push/pull
//! synchronization endpoints, served by axum on top of the sync engine
//! in `lorahub-core`.

pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, NetworkEntry};
