// ── Companies (tenants) ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanyType {
    /// The operator of this LoRaHub instance.
    Admin,
    /// An ordinary tenant.
    Vendor,
}

/// A tenant owning applications, devices, and device profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub company_type: CompanyType,
}

/// LoRa-specific settings for a company, typed rather than a free-form
/// JSON blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyLoraSettings {
    /// Remote network-server id to anchor the company's default service
    /// profile to. When unset, the remote's first network server is
    /// used.
    pub network_server_id: Option<String>,
    /// Include gateway metadata in uplinks delivered to this company's
    /// applications.
    pub add_gw_metadata: bool,
}

/// Joins a company to a network type it is provisioned on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyNetworkTypeLink {
    pub id: Uuid,
    pub company_id: Uuid,
    pub network_type_id: Uuid,
    pub settings: CompanyLoraSettings,
}
