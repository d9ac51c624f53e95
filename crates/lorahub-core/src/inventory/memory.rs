// In-memory inventory backed by DashMap.
//
// Companies carry an insertion sequence number so `first_company` means
// "first registered" regardless of map iteration order. Deletes cascade
// locally (company -> applications -> devices, plus links); remote
// cascades are the sync engine's job.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::CoreError;
use crate::inventory::{Inventory, WriteOrigin};
use crate::model::{
    Application, ApplicationNetworkTypeLink, Company, CompanyNetworkTypeLink, Device,
    DeviceNetworkTypeLink, DeviceProfile, NetworkType,
};

#[derive(Debug, Clone)]
struct Sequenced<T> {
    seq: u64,
    value: T,
}

/// DashMap-backed `Inventory` implementation.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    seq: AtomicU64,
    network_types: DashMap<Uuid, NetworkType>,
    companies: DashMap<Uuid, Sequenced<Company>>,
    applications: DashMap<Uuid, Application>,
    device_profiles: DashMap<Uuid, DeviceProfile>,
    devices: DashMap<Uuid, Device>,
    company_links: DashMap<(Uuid, Uuid), CompanyNetworkTypeLink>,
    application_links: DashMap<(Uuid, Uuid), ApplicationNetworkTypeLink>,
    device_links: DashMap<(Uuid, Uuid), DeviceNetworkTypeLink>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl Inventory for MemoryInventory {
    // ── Network types ────────────────────────────────────────────────

    async fn network_type(&self, id: Uuid) -> Result<NetworkType, CoreError> {
        self.network_types
            .get(&id)
            .map(|e| e.clone())
            .ok_or_else(|| CoreError::not_found("network type", id))
    }

    async fn create_network_type(&self, network_type: NetworkType) -> Result<(), CoreError> {
        self.network_types.insert(network_type.id, network_type);
        Ok(())
    }

    // ── Companies ────────────────────────────────────────────────────

    async fn company(&self, id: Uuid) -> Result<Company, CoreError> {
        self.companies
            .get(&id)
            .map(|e| e.value.clone())
            .ok_or_else(|| CoreError::not_found("company", id))
    }

    async fn company_by_name(&self, name: &str) -> Result<Option<Company>, CoreError> {
        Ok(self
            .companies
            .iter()
            .find(|e| e.value.name == name)
            .map(|e| e.value.clone()))
    }

    async fn first_company(&self) -> Result<Option<Company>, CoreError> {
        Ok(self
            .companies
            .iter()
            .min_by_key(|e| e.seq)
            .map(|e| e.value.clone()))
    }

    async fn list_companies(&self) -> Result<Vec<Company>, CoreError> {
        let mut entries: Vec<_> = self
            .companies
            .iter()
            .map(|e| (e.seq, e.value.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        Ok(entries.into_iter().map(|(_, c)| c).collect())
    }

    async fn create_company(
        &self,
        company: Company,
        _origin: WriteOrigin,
    ) -> Result<Company, CoreError> {
        self.companies.insert(
            company.id,
            Sequenced {
                seq: self.next_seq(),
                value: company.clone(),
            },
        );
        Ok(company)
    }

    async fn update_company(&self, company: Company) -> Result<(), CoreError> {
        match self.companies.get_mut(&company.id) {
            Some(mut entry) => {
                entry.value = company;
                Ok(())
            }
            None => Err(CoreError::not_found("company", company.id)),
        }
    }

    async fn delete_company(&self, id: Uuid) -> Result<(), CoreError> {
        if self.companies.remove(&id).is_none() {
            return Err(CoreError::not_found("company", id));
        }
        let app_ids: Vec<Uuid> = self
            .applications
            .iter()
            .filter(|e| e.company_id == id)
            .map(|e| e.id)
            .collect();
        for app_id in app_ids {
            self.delete_application(app_id).await?;
        }
        let profile_ids: Vec<Uuid> = self
            .device_profiles
            .iter()
            .filter(|e| e.company_id == id)
            .map(|e| e.id)
            .collect();
        for profile_id in profile_ids {
            self.device_profiles.remove(&profile_id);
        }
        self.company_links.retain(|(cid, _), _| *cid != id);
        Ok(())
    }

    async fn company_link(
        &self,
        company_id: Uuid,
        network_type_id: Uuid,
    ) -> Result<Option<CompanyNetworkTypeLink>, CoreError> {
        Ok(self
            .company_links
            .get(&(company_id, network_type_id))
            .map(|e| e.clone()))
    }

    async fn upsert_company_link(
        &self,
        link: CompanyNetworkTypeLink,
        _origin: WriteOrigin,
    ) -> Result<CompanyNetworkTypeLink, CoreError> {
        self.company_links
            .insert((link.company_id, link.network_type_id), link.clone());
        Ok(link)
    }

    // ── Applications ─────────────────────────────────────────────────

    async fn application(&self, id: Uuid) -> Result<Application, CoreError> {
        self.applications
            .get(&id)
            .map(|e| e.clone())
            .ok_or_else(|| CoreError::not_found("application", id))
    }

    async fn application_by_name(&self, name: &str) -> Result<Option<Application>, CoreError> {
        Ok(self
            .applications
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.clone()))
    }

    async fn list_applications(
        &self,
        company_id: Option<Uuid>,
    ) -> Result<Vec<Application>, CoreError> {
        Ok(self
            .applications
            .iter()
            .filter(|e| company_id.is_none_or(|cid| e.company_id == cid))
            .map(|e| e.clone())
            .collect())
    }

    async fn create_application(
        &self,
        application: Application,
        _origin: WriteOrigin,
    ) -> Result<Application, CoreError> {
        self.applications.insert(application.id, application.clone());
        Ok(application)
    }

    async fn update_application(&self, application: Application) -> Result<(), CoreError> {
        match self.applications.get_mut(&application.id) {
            Some(mut entry) => {
                *entry = application;
                Ok(())
            }
            None => Err(CoreError::not_found("application", application.id)),
        }
    }

    async fn delete_application(&self, id: Uuid) -> Result<(), CoreError> {
        if self.applications.remove(&id).is_none() {
            return Err(CoreError::not_found("application", id));
        }
        let device_ids: Vec<Uuid> = self
            .devices
            .iter()
            .filter(|e| e.application_id == id)
            .map(|e| e.id)
            .collect();
        for device_id in device_ids {
            self.devices.remove(&device_id);
            self.device_links.retain(|(did, _), _| *did != device_id);
        }
        self.application_links.retain(|(aid, _), _| *aid != id);
        Ok(())
    }

    async fn application_link(
        &self,
        application_id: Uuid,
        network_type_id: Uuid,
    ) -> Result<Option<ApplicationNetworkTypeLink>, CoreError> {
        Ok(self
            .application_links
            .get(&(application_id, network_type_id))
            .map(|e| e.clone()))
    }

    async fn upsert_application_link(
        &self,
        link: ApplicationNetworkTypeLink,
        _origin: WriteOrigin,
    ) -> Result<ApplicationNetworkTypeLink, CoreError> {
        self.application_links
            .insert((link.application_id, link.network_type_id), link.clone());
        Ok(link)
    }

    // ── Device profiles ──────────────────────────────────────────────

    async fn device_profile(&self, id: Uuid) -> Result<DeviceProfile, CoreError> {
        self.device_profiles
            .get(&id)
            .map(|e| e.clone())
            .ok_or_else(|| CoreError::not_found("device profile", id))
    }

    async fn device_profile_by_name(
        &self,
        name: &str,
    ) -> Result<Option<DeviceProfile>, CoreError> {
        Ok(self
            .device_profiles
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.clone()))
    }

    async fn list_device_profiles(
        &self,
        company_id: Option<Uuid>,
    ) -> Result<Vec<DeviceProfile>, CoreError> {
        Ok(self
            .device_profiles
            .iter()
            .filter(|e| company_id.is_none_or(|cid| e.company_id == cid))
            .map(|e| e.clone())
            .collect())
    }

    async fn create_device_profile(
        &self,
        profile: DeviceProfile,
        _origin: WriteOrigin,
    ) -> Result<DeviceProfile, CoreError> {
        self.device_profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn update_device_profile(&self, profile: DeviceProfile) -> Result<(), CoreError> {
        match self.device_profiles.get_mut(&profile.id) {
            Some(mut entry) => {
                *entry = profile;
                Ok(())
            }
            None => Err(CoreError::not_found("device profile", profile.id)),
        }
    }

    async fn delete_device_profile(&self, id: Uuid) -> Result<(), CoreError> {
        self.device_profiles
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("device profile", id))
    }

    // ── Devices ──────────────────────────────────────────────────────

    async fn device(&self, id: Uuid) -> Result<Device, CoreError> {
        self.devices
            .get(&id)
            .map(|e| e.clone())
            .ok_or_else(|| CoreError::not_found("device", id))
    }

    async fn device_by_name(
        &self,
        application_id: Uuid,
        name: &str,
    ) -> Result<Option<Device>, CoreError> {
        Ok(self
            .devices
            .iter()
            .find(|e| e.application_id == application_id && e.name == name)
            .map(|e| e.clone()))
    }

    async fn list_devices(&self, application_id: Uuid) -> Result<Vec<Device>, CoreError> {
        Ok(self
            .devices
            .iter()
            .filter(|e| e.application_id == application_id)
            .map(|e| e.clone())
            .collect())
    }

    async fn create_device(
        &self,
        device: Device,
        _origin: WriteOrigin,
    ) -> Result<Device, CoreError> {
        self.devices.insert(device.id, device.clone());
        Ok(device)
    }

    async fn update_device(&self, device: Device) -> Result<(), CoreError> {
        match self.devices.get_mut(&device.id) {
            Some(mut entry) => {
                *entry = device;
                Ok(())
            }
            None => Err(CoreError::not_found("device", device.id)),
        }
    }

    async fn delete_device(&self, id: Uuid) -> Result<(), CoreError> {
        if self.devices.remove(&id).is_none() {
            return Err(CoreError::not_found("device", id));
        }
        self.device_links.retain(|(did, _), _| *did != id);
        Ok(())
    }

    async fn device_link(
        &self,
        device_id: Uuid,
        network_type_id: Uuid,
    ) -> Result<Option<DeviceNetworkTypeLink>, CoreError> {
        Ok(self
            .device_links
            .get(&(device_id, network_type_id))
            .map(|e| e.clone()))
    }

    async fn upsert_device_link(
        &self,
        link: DeviceNetworkTypeLink,
        _origin: WriteOrigin,
    ) -> Result<DeviceNetworkTypeLink, CoreError> {
        self.device_links
            .insert((link.device_id, link.network_type_id), link.clone());
        Ok(link)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::CompanyType;

    fn company(name: &str) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            company_type: CompanyType::Vendor,
        }
    }

    #[tokio::test]
    async fn first_company_is_first_registered() {
        let inv = MemoryInventory::new();
        let a = inv
            .create_company(company("alpha"), WriteOrigin::Local)
            .await
            .unwrap();
        inv.create_company(company("beta"), WriteOrigin::Local)
            .await
            .unwrap();

        assert_eq!(inv.first_company().await.unwrap().unwrap().id, a.id);
    }

    #[tokio::test]
    async fn deleting_a_company_cascades_to_applications_and_devices() {
        let inv = MemoryInventory::new();
        let co = inv
            .create_company(company("acme"), WriteOrigin::Local)
            .await
            .unwrap();
        let app = inv
            .create_application(
                Application {
                    id: Uuid::new_v4(),
                    company_id: co.id,
                    name: "monitoring".into(),
                    description: String::new(),
                    base_url: "http://reports.example/uplinks".into(),
                    running: false,
                },
                WriteOrigin::Local,
            )
            .await
            .unwrap();
        let dev = inv
            .create_device(
                Device {
                    id: Uuid::new_v4(),
                    application_id: app.id,
                    name: "probe-1".into(),
                    description: String::new(),
                },
                WriteOrigin::Local,
            )
            .await
            .unwrap();

        inv.delete_company(co.id).await.unwrap();

        assert!(inv.application(app.id).await.is_err());
        assert!(inv.device(dev.id).await.is_err());
    }

    #[tokio::test]
    async fn name_lookups_are_exact() {
        let inv = MemoryInventory::new();
        inv.create_company(company("acme"), WriteOrigin::Local)
            .await
            .unwrap();

        assert!(inv.company_by_name("acme").await.unwrap().is_some());
        assert!(inv.company_by_name("acm").await.unwrap().is_none());
        assert!(inv.company_by_name("ACME").await.unwrap().is_none());
    }
}
