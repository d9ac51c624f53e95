// ── Local inventory ──
//
// The system of record for companies, applications, device profiles,
// devices, and their network-type links. The sync engine reads and
// writes through the `Inventory` trait so storage stays swappable; the
// in-memory implementation lives in `memory.rs`.

mod memory;

pub use memory::MemoryInventory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{
    Application, ApplicationNetworkTypeLink, Company, CompanyNetworkTypeLink, Device,
    DeviceNetworkTypeLink, DeviceProfile, NetworkType,
};

/// Who initiated a write.
///
/// Records created by a pull are remote-originated: they bypass
/// checks that only make sense for interactive edits (ownership,
/// name policy) and must never echo back to the remote as a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOrigin {
    Local,
    Remote,
}

/// Storage seam for the local inventory.
#[async_trait]
pub trait Inventory: Send + Sync {
    // ── Network types ────────────────────────────────────────────────

    async fn network_type(&self, id: Uuid) -> Result<NetworkType, CoreError>;
    async fn create_network_type(&self, network_type: NetworkType) -> Result<(), CoreError>;

    // ── Companies ────────────────────────────────────────────────────

    async fn company(&self, id: Uuid) -> Result<Company, CoreError>;
    async fn company_by_name(&self, name: &str) -> Result<Option<Company>, CoreError>;
    /// The first registered company.
    ///
    /// Single-remote-tenant convention: every pulled organization is
    /// owned by this company. Deliberately not generalized.
    async fn first_company(&self) -> Result<Option<Company>, CoreError>;
    async fn list_companies(&self) -> Result<Vec<Company>, CoreError>;
    async fn create_company(
        &self,
        company: Company,
        origin: WriteOrigin,
    ) -> Result<Company, CoreError>;
    async fn update_company(&self, company: Company) -> Result<(), CoreError>;
    async fn delete_company(&self, id: Uuid) -> Result<(), CoreError>;

    async fn company_link(
        &self,
        company_id: Uuid,
        network_type_id: Uuid,
    ) -> Result<Option<CompanyNetworkTypeLink>, CoreError>;
    async fn upsert_company_link(
        &self,
        link: CompanyNetworkTypeLink,
        origin: WriteOrigin,
    ) -> Result<CompanyNetworkTypeLink, CoreError>;

    // ── Applications ─────────────────────────────────────────────────

    async fn application(&self, id: Uuid) -> Result<Application, CoreError>;
    async fn application_by_name(&self, name: &str) -> Result<Option<Application>, CoreError>;
    async fn list_applications(
        &self,
        company_id: Option<Uuid>,
    ) -> Result<Vec<Application>, CoreError>;
    async fn create_application(
        &self,
        application: Application,
        origin: WriteOrigin,
    ) -> Result<Application, CoreError>;
    async fn update_application(&self, application: Application) -> Result<(), CoreError>;
    async fn delete_application(&self, id: Uuid) -> Result<(), CoreError>;

    async fn application_link(
        &self,
        application_id: Uuid,
        network_type_id: Uuid,
    ) -> Result<Option<ApplicationNetworkTypeLink>, CoreError>;
    async fn upsert_application_link(
        &self,
        link: ApplicationNetworkTypeLink,
        origin: WriteOrigin,
    ) -> Result<ApplicationNetworkTypeLink, CoreError>;

    // ── Device profiles ──────────────────────────────────────────────

    async fn device_profile(&self, id: Uuid) -> Result<DeviceProfile, CoreError>;
    async fn device_profile_by_name(&self, name: &str)
    -> Result<Option<DeviceProfile>, CoreError>;
    async fn list_device_profiles(
        &self,
        company_id: Option<Uuid>,
    ) -> Result<Vec<DeviceProfile>, CoreError>;
    async fn create_device_profile(
        &self,
        profile: DeviceProfile,
        origin: WriteOrigin,
    ) -> Result<DeviceProfile, CoreError>;
    async fn update_device_profile(&self, profile: DeviceProfile) -> Result<(), CoreError>;
    async fn delete_device_profile(&self, id: Uuid) -> Result<(), CoreError>;

    // ── Devices ──────────────────────────────────────────────────────

    async fn device(&self, id: Uuid) -> Result<Device, CoreError>;
    async fn device_by_name(
        &self,
        application_id: Uuid,
        name: &str,
    ) -> Result<Option<Device>, CoreError>;
    async fn list_devices(&self, application_id: Uuid) -> Result<Vec<Device>, CoreError>;
    async fn create_device(
        &self,
        device: Device,
        origin: WriteOrigin,
    ) -> Result<Device, CoreError>;
    async fn update_device(&self, device: Device) -> Result<(), CoreError>;
    async fn delete_device(&self, id: Uuid) -> Result<(), CoreError>;

    async fn device_link(
        &self,
        device_id: Uuid,
        network_type_id: Uuid,
    ) -> Result<Option<DeviceNetworkTypeLink>, CoreError>;
    async fn upsert_device_link(
        &self,
        link: DeviceNetworkTypeLink,
        origin: WriteOrigin,
    ) -> Result<DeviceNetworkTypeLink, CoreError>;
}
