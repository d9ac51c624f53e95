// lorahub-api: Async Rust client for LoRa App Server network-server APIs (v1 + v2)

pub mod client;
pub mod endpoints;
pub mod error;
pub mod transport;
pub mod types;
pub mod version;

pub use client::{AppServerClient, Credentials};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use version::{ApiVersion, V1, V2};
