// lorahub-core: Domain model and sync engine between lorahub-api and
// the HTTP boundary.

pub mod crypto;
pub mod error;
pub mod handler;
pub mod inventory;
pub mod model;
pub mod protocol_data;
pub mod remote;
pub mod reporting;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use handler::{AccountCredentials, LoraHandler, OrganizationSetup};
pub use inventory::{Inventory, MemoryInventory, WriteOrigin};
pub use protocol_data::{MemoryProtocolData, ProtocolDataStore};
pub use remote::{NetworkClient, client_for};
pub use reporting::{HttpForwarder, UplinkForwarder};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Core entities
    Application, Company, CompanyType, Device, DeviceProfile, Network, NetworkType,
    ProtocolVersion,
    // Link entities
    ApplicationNetworkTypeLink, CompanyNetworkTypeLink, DeviceNetworkTypeLink,
    // Typed per-protocol settings
    AbpSession, ApplicationLoraSettings, CompanyLoraSettings, DeviceLoraSettings,
    DeviceProfileLoraSettings, OtaaKeys,
};
