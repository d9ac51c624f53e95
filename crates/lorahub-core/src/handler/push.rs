// Local -> remote reconciliation.
//
// Entity lifecycle ops (add/update/delete/get against the remote) plus
// the bulk push pass. Push routing is a three-way match on the cached
// remote id: present + update wanted -> update, present -> leave
// alone, absent (or stored empty by an interrupted sync) -> add.

use futures::future::try_join_all;
use tracing::{error, info};
use uuid::Uuid;

use lorahub_api::types as wire;

use super::{LoraHandler, convert};
use crate::error::CoreError;
use crate::model::{Application, Device, DeviceProfile, Network};
use crate::protocol_data::{keys, load_non_empty};
use crate::remote::NetworkClient;

impl LoraHandler {
    // ── Bulk push ────────────────────────────────────────────────────

    /// Push every local entity to the remote. Device profiles and
    /// applications go concurrently; devices only after both finish,
    /// since a device needs its profile's and application's remote ids.
    pub async fn push_network(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
    ) -> Result<(), CoreError> {
        tokio::try_join!(
            self.push_device_profiles(network, client),
            self.push_applications(network, client),
        )?;
        self.push_devices(network, client).await
    }

    async fn push_applications(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
    ) -> Result<(), CoreError> {
        let applications = self.inventory().list_applications(None).await?;
        try_join_all(
            applications
                .iter()
                .map(|app| self.push_application(network, client, app, false)),
        )
        .await?;
        Ok(())
    }

    async fn push_device_profiles(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
    ) -> Result<(), CoreError> {
        let profiles = self.inventory().list_device_profiles(None).await?;
        try_join_all(
            profiles
                .iter()
                .map(|profile| self.push_device_profile(network, client, profile, false)),
        )
        .await?;
        Ok(())
    }

    async fn push_devices(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
    ) -> Result<(), CoreError> {
        let applications = self.inventory().list_applications(None).await?;
        let mut devices = Vec::new();
        for application in &applications {
            devices.extend(self.inventory().list_devices(application.id).await?);
        }
        try_join_all(
            devices
                .iter()
                .map(|device| self.push_device(network, client, device, false)),
        )
        .await?;
        Ok(())
    }

    // ── Applications ─────────────────────────────────────────────────

    /// Sync one application to the remote, returning its remote id.
    pub async fn push_application(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        application: &Application,
        update: bool,
    ) -> Result<String, CoreError> {
        let key = keys::application(application.id);
        match load_non_empty(self.protocol_data(), network, &key).await? {
            Some(remote_id) if update => {
                self.update_application(network, client, application.id)
                    .await?;
                Ok(remote_id)
            }
            Some(remote_id) => {
                info!(application = %application.id, network = %network.name,
                    "application already on network");
                Ok(remote_id)
            }
            None => {
                let remote_id = self
                    .add_application(network, client, application.id)
                    .await?;
                info!(application = %application.id, network = %network.name,
                    "added application to network");
                Ok(remote_id)
            }
        }
    }

    /// Create an application on the remote and cache its id.
    pub async fn add_application(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        application_id: Uuid,
    ) -> Result<String, CoreError> {
        let application = self.inventory().application(application_id).await?;
        let link = self
            .inventory()
            .application_link(application_id, network.network_type_id)
            .await?;
        let organization_id = self
            .protocol_data()
            .load(network, &keys::company_org(application.company_id))
            .await?;
        let service_profile_id = self
            .protocol_data()
            .load(network, &keys::company_service_profile(application.company_id))
            .await?;

        let remote_id = client
            .create_application(&convert::remote_application(
                &application,
                link.as_ref().map(|l| &l.settings),
                &service_profile_id,
                &organization_id,
            ))
            .await?;
        self.protocol_data()
            .upsert(network, &keys::application(application_id), &remote_id)
            .await?;

        if !application.base_url.is_empty() && application.running {
            self.start_application(network, client, application_id)
                .await?;
        }
        Ok(remote_id)
    }

    /// Load the remote application backing a local one.
    pub async fn get_application(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        application_id: Uuid,
    ) -> Result<wire::Application, CoreError> {
        let remote_id = self
            .protocol_data()
            .load(network, &keys::application(application_id))
            .await?;
        Ok(client.get_application(&remote_id).await?)
    }

    /// Push local application changes to the remote.
    pub async fn update_application(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        application_id: Uuid,
    ) -> Result<(), CoreError> {
        let application = self.inventory().application(application_id).await?;
        let link = self
            .inventory()
            .application_link(application_id, network.network_type_id)
            .await?;
        let remote_id = self
            .protocol_data()
            .load(network, &keys::application(application_id))
            .await?;
        let organization_id = self
            .protocol_data()
            .load(network, &keys::company_org(application.company_id))
            .await?;
        let service_profile_id = self
            .protocol_data()
            .load(network, &keys::company_service_profile(application.company_id))
            .await?;

        let mut body = convert::remote_application(
            &application,
            link.as_ref().map(|l| &l.settings),
            &service_profile_id,
            &organization_id,
        );
        body.id = Some(remote_id.clone());
        client.update_application(&remote_id, &body).await?;
        Ok(())
    }

    /// Delete the remote application and forget its id.
    pub async fn delete_application(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        application_id: Uuid,
    ) -> Result<(), CoreError> {
        let remote_id = self
            .protocol_data()
            .load(network, &keys::application(application_id))
            .await?;
        client.delete_application(&remote_id).await?;
        self.protocol_data()
            .remove(network, &keys::application(application_id))
            .await?;
        Ok(())
    }

    // ── Device profiles ──────────────────────────────────────────────

    /// Sync one device profile to the remote, returning its remote id.
    pub async fn push_device_profile(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        profile: &DeviceProfile,
        update: bool,
    ) -> Result<String, CoreError> {
        let key = keys::device_profile(profile.id);
        match load_non_empty(self.protocol_data(), network, &key).await? {
            Some(remote_id) if update => {
                self.update_device_profile(network, client, profile.id)
                    .await?;
                Ok(remote_id)
            }
            Some(remote_id) => {
                info!(device_profile = %profile.id, network = %network.name,
                    "device profile already on network");
                Ok(remote_id)
            }
            None => {
                let remote_id = self
                    .add_device_profile(network, client, profile.id)
                    .await?;
                info!(device_profile = %profile.id, network = %network.name,
                    "added device profile to network");
                Ok(remote_id)
            }
        }
    }

    /// Create a device profile on the remote and cache its id.
    ///
    /// Anchored to the first company's organization and network server
    /// (single-remote-tenant convention).
    pub async fn add_device_profile(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        device_profile_id: Uuid,
    ) -> Result<String, CoreError> {
        let profile = self.inventory().device_profile(device_profile_id).await?;
        let company = self
            .inventory()
            .first_company()
            .await?
            .ok_or_else(|| CoreError::not_found("company", "first"))?;
        let organization_id = self
            .protocol_data()
            .load(network, &keys::company_org(company.id))
            .await?;
        let network_server_id = self
            .protocol_data()
            .load(network, &keys::company_network_server(company.id))
            .await?;

        let remote_id = client
            .create_device_profile(&convert::remote_device_profile(
                &profile,
                &network_server_id,
                &organization_id,
            ))
            .await?;
        self.protocol_data()
            .upsert(network, &keys::device_profile(device_profile_id), &remote_id)
            .await?;
        Ok(remote_id)
    }

    /// Load the remote device profile backing a local one.
    pub async fn get_device_profile(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        device_profile_id: Uuid,
    ) -> Result<wire::DeviceProfile, CoreError> {
        let remote_id = self
            .protocol_data()
            .load(network, &keys::device_profile(device_profile_id))
            .await?;
        Ok(client.get_device_profile(&remote_id).await?)
    }

    /// Push local device-profile changes to the remote.
    pub async fn update_device_profile(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        device_profile_id: Uuid,
    ) -> Result<(), CoreError> {
        let profile = self.inventory().device_profile(device_profile_id).await?;
        let remote_id = self
            .protocol_data()
            .load(network, &keys::device_profile(device_profile_id))
            .await?;
        let organization_id = self
            .protocol_data()
            .load(network, &keys::company_org(profile.company_id))
            .await?;
        let network_server_id = self
            .protocol_data()
            .load(network, &keys::company_network_server(profile.company_id))
            .await?;

        let mut body =
            convert::remote_device_profile(&profile, &network_server_id, &organization_id);
        body.id = Some(remote_id.clone());
        client.update_device_profile(&remote_id, &body).await?;
        Ok(())
    }

    /// Delete the remote device profile and forget its id.
    pub async fn delete_device_profile(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        device_profile_id: Uuid,
    ) -> Result<(), CoreError> {
        let remote_id = self
            .protocol_data()
            .load(network, &keys::device_profile(device_profile_id))
            .await?;
        client.delete_device_profile(&remote_id).await?;
        self.protocol_data()
            .remove(network, &keys::device_profile(device_profile_id))
            .await?;
        Ok(())
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// Sync one device to the remote, returning its devEUI when it is
    /// linked to this network type.
    pub async fn push_device(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        device: &Device,
        update: bool,
    ) -> Result<Option<String>, CoreError> {
        let key = keys::device(device.id);
        match load_non_empty(self.protocol_data(), network, &key).await? {
            Some(dev_eui) if update => {
                self.update_device(network, client, device.id).await?;
                Ok(Some(dev_eui))
            }
            Some(dev_eui) => {
                info!(device = %device.id, network = %network.name,
                    "device already on network");
                Ok(Some(dev_eui))
            }
            None => {
                let dev_eui = self.add_device(network, client, device.id).await?;
                if dev_eui.is_some() {
                    info!(device = %device.id, network = %network.name,
                        "added device to network");
                }
                Ok(dev_eui)
            }
        }
    }

    /// Create a device on the remote, including its OTAA keys or ABP
    /// activation. Devices without a link to this network type are
    /// skipped.
    pub async fn add_device(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        device_id: Uuid,
    ) -> Result<Option<String>, CoreError> {
        let device = self.inventory().device(device_id).await?;
        let Some(link) = self
            .inventory()
            .device_link(device_id, network.network_type_id)
            .await?
        else {
            return Ok(None);
        };
        let Some(dev_eui) = link.settings.dev_eui.clone() else {
            error!(device = %device_id, "device network link has no devEUI");
            return Err(CoreError::bad_request(
                "device network link must carry a devEUI",
            ));
        };
        let profile = self
            .inventory()
            .device_profile(link.device_profile_id)
            .await?;
        let remote_app_id = self
            .protocol_data()
            .load(network, &keys::application(device.application_id))
            .await?;
        let remote_dp_id = self
            .protocol_data()
            .load(network, &keys::device_profile(link.device_profile_id))
            .await?;

        client
            .create_device(&convert::remote_device(
                &device,
                &link,
                &dev_eui,
                &remote_app_id,
                &remote_dp_id,
            ))
            .await?;
        // The devEUI is the device's remote identifier.
        self.protocol_data()
            .upsert(network, &keys::device(device_id), &dev_eui)
            .await?;

        if profile.settings.supports_join {
            if let Some(keys) = &link.settings.otaa_keys {
                client
                    .create_device_keys(&dev_eui, &convert::device_keys(keys))
                    .await?;
                return Ok(Some(dev_eui));
            }
        }
        if let Some(session) = &link.settings.abp_session {
            client
                .activate_device(
                    &dev_eui,
                    &convert::device_activation(session),
                    &profile.settings.mac_version,
                )
                .await?;
        } else if !profile.settings.supports_join {
            error!(device = %device.name, "device has no authentication parameters");
        }
        Ok(Some(dev_eui))
    }

    /// Load the remote device backing a local one.
    pub async fn get_device(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        device_id: Uuid,
    ) -> Result<wire::Device, CoreError> {
        let dev_eui = self
            .protocol_data()
            .load(network, &keys::device(device_id))
            .await?;
        Ok(client.get_device(&dev_eui).await?)
    }

    /// Push local device changes to the remote. ABP devices are
    /// re-activated: the old session is dropped and the stored one
    /// re-applied.
    pub async fn update_device(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        device_id: Uuid,
    ) -> Result<(), CoreError> {
        let device = self.inventory().device(device_id).await?;
        let link = self
            .inventory()
            .device_link(device_id, network.network_type_id)
            .await?
            .ok_or_else(|| CoreError::not_found("device network link", device_id))?;
        let Some(dev_eui) = link.settings.dev_eui.clone() else {
            return Err(CoreError::bad_request(
                "device network link must carry a devEUI",
            ));
        };
        let profile = self
            .inventory()
            .device_profile(link.device_profile_id)
            .await?;
        let remote_dev_id = self
            .protocol_data()
            .load(network, &keys::device(device_id))
            .await?;
        let remote_app_id = self
            .protocol_data()
            .load(network, &keys::application(device.application_id))
            .await?;
        let remote_dp_id = self
            .protocol_data()
            .load(network, &keys::device_profile(link.device_profile_id))
            .await?;

        client
            .update_device(
                &remote_dev_id,
                &convert::remote_device(&device, &link, &dev_eui, &remote_app_id, &remote_dp_id),
            )
            .await?;

        if profile.settings.supports_join {
            if let Some(keys) = &link.settings.otaa_keys {
                client
                    .update_device_keys(&dev_eui, &convert::device_keys(keys))
                    .await?;
                return Ok(());
            }
        }
        if let Some(session) = &link.settings.abp_session {
            match client.deactivate_device(&dev_eui).await {
                Ok(()) => {}
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err.into()),
            }
            client
                .activate_device(
                    &dev_eui,
                    &convert::device_activation(session),
                    &profile.settings.mac_version,
                )
                .await?;
        } else if !profile.settings.supports_join {
            info!(device = %device.name, "device has no authentication parameters");
        }
        Ok(())
    }

    /// Delete the remote device, its keys, and the cached id.
    pub async fn delete_device(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        device_id: Uuid,
    ) -> Result<(), CoreError> {
        let dev_eui = self
            .protocol_data()
            .load(network, &keys::device(device_id))
            .await?;
        client.delete_device(&dev_eui).await?;
        self.protocol_data()
            .remove(network, &keys::device(device_id))
            .await?;
        // Keys may already be gone server-side.
        match client.delete_device_keys(&dev_eui).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {}
            Err(err) => error!(device = %device_id, %err, "failed to delete remote device keys"),
        }
        Ok(())
    }
}
