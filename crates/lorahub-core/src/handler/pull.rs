// Remote -> local reconciliation.
//
// Importing a remote's organization, device profiles, applications,
// and devices into the local inventory. Matching is by exact name;
// matched entities are relinked (their remote id re-cached) rather
// than duplicated.

use futures::future::try_join_all;
use tracing::{info, warn};
use uuid::Uuid;

use lorahub_api::types::ListParams;

use super::{LoraHandler, convert};
use crate::error::CoreError;
use crate::inventory::WriteOrigin;
use crate::model::{
    Application, ApplicationNetworkTypeLink, Company, CompanyLoraSettings, CompanyNetworkTypeLink,
    Device, DeviceNetworkTypeLink, DeviceProfile, Network,
};
use crate::protocol_data::keys;
use crate::remote::NetworkClient;

/// Page size for pull listings. The remote paginates; we want
/// everything.
const PULL_LIMIT: u32 = 9999;

/// Remote anchors established by `setup_organization`, threaded through
/// the rest of the pull.
#[derive(Debug, Clone)]
pub struct OrganizationSetup {
    pub organization_id: String,
    pub service_profile_id: String,
    pub network_server_id: String,
}

/// A device profile present on both sides after a pull.
#[derive(Debug, Clone)]
pub struct PulledDeviceProfile {
    pub local_id: Uuid,
    pub remote_id: String,
}

/// An application present on both sides after a pull.
#[derive(Debug, Clone)]
pub struct PulledApplication {
    pub local_id: Uuid,
    pub remote_id: String,
}

impl LoraHandler {
    /// Import everything from the remote: organization first, then
    /// device profiles and applications concurrently, then each pulled
    /// application's devices.
    pub async fn pull_network(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
    ) -> Result<(), CoreError> {
        let setup = self.setup_organization(network, client).await?;
        let (profiles, applications) = tokio::try_join!(
            self.pull_device_profiles(network, client, &setup),
            self.pull_applications(network, client, &setup),
        )?;
        try_join_all(applications.iter().map(|app| {
            self.pull_devices(network, client, &app.remote_id, app.local_id, &profiles)
        }))
        .await?;
        Ok(())
    }

    /// Tie the first local company to a remote organization.
    ///
    /// An organization matching the company's name is imported:
    /// its existing service profile is adopted and its id cached. No
    /// match means the remote has never seen this operator, so the
    /// company is provisioned from scratch.
    pub async fn setup_organization(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
    ) -> Result<OrganizationSetup, CoreError> {
        let company = self
            .inventory()
            .first_company()
            .await?
            .ok_or_else(|| CoreError::not_found("company", "first"))?;

        let listed = client
            .list_organizations(&ListParams::default().search(&company.name).limit(1))
            .await?;
        let setup = match listed.result.into_iter().next() {
            Some(organization) => {
                info!(company = %company.name, organization = %organization.id,
                    "matching local company to remote organization");
                self.protocol_data()
                    .upsert(network, &keys::company_org(company.id), &organization.id)
                    .await?;
                let (service_profile_id, network_server_id) = self
                    .adopt_service_profile(network, client, &company, &organization.id)
                    .await?;
                OrganizationSetup {
                    organization_id: organization.id,
                    service_profile_id,
                    network_server_id,
                }
            }
            None => {
                warn!(company = %company.name, network = %network.name,
                    "organization not found on remote, provisioning");
                self.add_company(network, client, company.id).await?
            }
        };

        // Both branches land the network server id on the company link.
        self.inventory()
            .upsert_company_link(
                CompanyNetworkTypeLink {
                    id: Uuid::new_v4(),
                    company_id: company.id,
                    network_type_id: network.network_type_id,
                    settings: CompanyLoraSettings {
                        network_server_id: Some(setup.network_server_id.clone()),
                        add_gw_metadata: true,
                    },
                },
                WriteOrigin::Remote,
            )
            .await?;

        Ok(setup)
    }

    /// Adopt the organization's existing service profile, or create the
    /// default one when the organization has none yet.
    async fn adopt_service_profile(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        company: &Company,
        organization_id: &str,
    ) -> Result<(String, String), CoreError> {
        let listed = client
            .list_service_profiles(
                &ListParams::default()
                    .organization(organization_id)
                    .limit(20)
                    .offset(0),
            )
            .await?;
        match listed.result.into_iter().next() {
            Some(profile) => {
                let id = profile.id.unwrap_or_default();
                self.protocol_data()
                    .upsert(network, &keys::company_service_profile(company.id), &id)
                    .await?;
                self.protocol_data()
                    .upsert(
                        network,
                        &keys::company_network_server(company.id),
                        &profile.network_server_id,
                    )
                    .await?;
                Ok((id, profile.network_server_id))
            }
            None => {
                warn!(organization = %organization_id,
                    "organization has no service profile, creating default");
                self.add_default_service_profile(network, client, company, organization_id)
                    .await
            }
        }
    }

    // ── Device profiles ──────────────────────────────────────────────

    pub async fn pull_device_profiles(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        setup: &OrganizationSetup,
    ) -> Result<Vec<PulledDeviceProfile>, CoreError> {
        let listed = client
            .list_device_profiles(
                &ListParams::default()
                    .organization(&setup.organization_id)
                    .limit(PULL_LIMIT)
                    .offset(0),
            )
            .await?;
        try_join_all(listed.result.into_iter().filter_map(|profile| {
            let remote_id = profile.id?;
            Some(self.add_remote_device_profile(network, client, remote_id))
        }))
        .await
    }

    async fn add_remote_device_profile(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        remote_id: String,
    ) -> Result<PulledDeviceProfile, CoreError> {
        let remote = client.get_device_profile(&remote_id).await?;

        if let Some(local) = self.inventory().device_profile_by_name(&remote.name).await? {
            info!(device_profile = %local.name, "device profile already exists, relinking");
            self.protocol_data()
                .upsert(network, &keys::device_profile(local.id), &remote_id)
                .await?;
            return Ok(PulledDeviceProfile {
                local_id: local.id,
                remote_id,
            });
        }

        info!(device_profile = %remote.name, "importing device profile");
        let company = self
            .inventory()
            .first_company()
            .await?
            .ok_or_else(|| CoreError::not_found("company", "first"))?;
        let local = self
            .inventory()
            .create_device_profile(
                DeviceProfile {
                    id: Uuid::new_v4(),
                    company_id: company.id,
                    network_type_id: network.network_type_id,
                    name: remote.name.clone(),
                    settings: convert::profile_settings_from_remote(&remote),
                },
                WriteOrigin::Remote,
            )
            .await?;
        self.protocol_data()
            .upsert(network, &keys::device_profile(local.id), &remote_id)
            .await?;
        Ok(PulledDeviceProfile {
            local_id: local.id,
            remote_id,
        })
    }

    // ── Applications ─────────────────────────────────────────────────

    pub async fn pull_applications(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        setup: &OrganizationSetup,
    ) -> Result<Vec<PulledApplication>, CoreError> {
        let listed = client
            .list_applications(
                &ListParams::default()
                    .organization(&setup.organization_id)
                    .limit(PULL_LIMIT)
                    .offset(0),
            )
            .await?;
        try_join_all(listed.result.into_iter().filter_map(|app| {
            let remote_id = app.id?;
            Some(self.add_remote_application(network, client, remote_id))
        }))
        .await
    }

    async fn add_remote_application(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        remote_id: String,
    ) -> Result<PulledApplication, CoreError> {
        let remote = client.get_application(&remote_id).await?;
        let integration = match client.get_http_integration(&remote_id).await {
            Ok(integration) => Some(integration),
            Err(err) if err.is_not_found() => None,
            Err(err) => return Err(err.into()),
        };

        let local = match self.inventory().application_by_name(&remote.name).await? {
            Some(app) => app,
            None => {
                let company = self
                    .inventory()
                    .first_company()
                    .await?
                    .ok_or_else(|| CoreError::not_found("company", "first"))?;
                let app = self
                    .inventory()
                    .create_application(
                        Application {
                            id: Uuid::new_v4(),
                            company_id: company.id,
                            name: remote.name.clone(),
                            description: remote.description.clone(),
                            base_url: integration
                                .as_ref()
                                .map(|i| i.uplink_data_url.clone())
                                .unwrap_or_default(),
                            running: false,
                        },
                        WriteOrigin::Remote,
                    )
                    .await?;
                info!(application = %app.name, "imported application");
                app
            }
        };
        self.protocol_data()
            .upsert(network, &keys::application(local.id), &remote_id)
            .await?;

        if self
            .inventory()
            .application_link(local.id, network.network_type_id)
            .await?
            .is_none()
        {
            self.inventory()
                .upsert_application_link(
                    ApplicationNetworkTypeLink {
                        id: Uuid::new_v4(),
                        application_id: local.id,
                        network_type_id: network.network_type_id,
                        settings: convert::application_settings_from_remote(&remote),
                    },
                    WriteOrigin::Remote,
                )
                .await?;
        }

        if !local.base_url.is_empty() {
            self.start_application(network, client, local.id).await?;
        }
        Ok(PulledApplication {
            local_id: local.id,
            remote_id,
        })
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn pull_devices(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        remote_application_id: &str,
        local_application_id: Uuid,
        profiles: &[PulledDeviceProfile],
    ) -> Result<(), CoreError> {
        let listed = client
            .list_devices(
                remote_application_id,
                &ListParams::default().limit(PULL_LIMIT).offset(0),
            )
            .await?;
        try_join_all(listed.result.into_iter().map(|device| {
            self.add_remote_device(network, client, device.dev_eui, local_application_id, profiles)
        }))
        .await?;
        Ok(())
    }

    async fn add_remote_device(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        dev_eui: String,
        local_application_id: Uuid,
        profiles: &[PulledDeviceProfile],
    ) -> Result<Uuid, CoreError> {
        let remote = client.get_device(&dev_eui).await?;
        let profile_pair = profiles
            .iter()
            .find(|p| p.remote_id == remote.device_profile_id)
            .ok_or_else(|| {
                CoreError::not_found("device profile", &remote.device_profile_id)
            })?;
        let profile = self
            .inventory()
            .device_profile(profile_pair.local_id)
            .await?;

        // Credentials are best-effort: a device freshly registered on
        // the remote may not have any yet.
        let mut device_keys = None;
        let mut activation = None;
        if profile.settings.supports_join {
            match client.get_device_keys(&dev_eui).await {
                Ok(keys) => device_keys = Some(keys),
                Err(_) => info!(device = %remote.name, "device has no keys"),
            }
        } else {
            match client.get_device_activation(&dev_eui).await {
                Ok(session) => activation = Some(session),
                Err(_) => info!(device = %remote.name, "device has no activation"),
            }
        }

        let local = match self
            .inventory()
            .device_by_name(local_application_id, &remote.name)
            .await?
        {
            Some(device) => {
                info!(device = %device.name, "device already exists, relinking");
                device
            }
            None => {
                let device = self
                    .inventory()
                    .create_device(
                        Device {
                            id: Uuid::new_v4(),
                            application_id: local_application_id,
                            name: remote.name.clone(),
                            description: remote.description.clone(),
                        },
                        WriteOrigin::Remote,
                    )
                    .await?;
                info!(device = %device.name, "imported device");
                device
            }
        };

        if self
            .inventory()
            .device_link(local.id, network.network_type_id)
            .await?
            .is_none()
        {
            self.inventory()
                .upsert_device_link(
                    DeviceNetworkTypeLink {
                        id: Uuid::new_v4(),
                        device_id: local.id,
                        network_type_id: network.network_type_id,
                        device_profile_id: profile_pair.local_id,
                        settings: convert::device_settings_from_remote(
                            &remote,
                            device_keys.as_ref(),
                            activation.as_ref(),
                        ),
                    },
                    WriteOrigin::Remote,
                )
                .await?;
        }
        self.protocol_data()
            .upsert(network, &keys::device(local.id), &dev_eui)
            .await?;
        Ok(local.id)
    }
}
