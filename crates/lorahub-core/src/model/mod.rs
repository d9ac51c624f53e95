// ── Domain model ──
//
// Canonical local representations of the entities LoRaHub manages.
// Local identity is always a `Uuid`; remote identifiers assigned by a
// network server are opaque `String`s and live in the protocol data
// store, never on these types.

pub mod application;
pub mod company;
pub mod device;
pub mod network;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use lorahub_core::model::*` gives you everything.

pub use network::{Network, NetworkType, ProtocolVersion};

pub use company::{Company, CompanyLoraSettings, CompanyNetworkTypeLink, CompanyType};

pub use application::{Application, ApplicationLoraSettings, ApplicationNetworkTypeLink};

pub use device::{
    AbpSession, Device, DeviceLoraSettings, DeviceNetworkTypeLink, DeviceProfile,
    DeviceProfileLoraSettings, OtaaKeys,
};
