// ── Remote network-server seam ──
//
// The sync engine talks to network servers through `NetworkClient`
// rather than `AppServerClient` directly, so tests can record calls
// without a live server. Errors stay in the transport taxonomy here;
// the handler converts them at its boundary.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use lorahub_api::types::{
    Application, Device, DeviceActivation, DeviceKeys, DeviceProfile, DownlinkMessage,
    HttpIntegration, ListParams, ListResponse, NetworkServer, NewOrganization, NewUser,
    Organization, ServiceProfile,
};
use lorahub_api::{AppServerClient, Credentials, Error, TransportConfig, V1, V2};

use crate::error::CoreError;
use crate::model::{Network, ProtocolVersion};

/// The remote operations the sync engine needs.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn login(&self) -> Result<(), Error>;

    // Organizations
    async fn list_organizations(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<Organization>, Error>;
    async fn get_organization(&self, id: &str) -> Result<Organization, Error>;
    async fn create_organization(&self, org: &NewOrganization) -> Result<String, Error>;
    async fn update_organization(&self, org: &Organization) -> Result<(), Error>;
    async fn delete_organization(&self, id: &str) -> Result<(), Error>;

    // Users
    async fn create_user(&self, user: &NewUser) -> Result<String, Error>;
    async fn delete_user(&self, id: &str) -> Result<(), Error>;

    // Network servers / service profiles
    async fn default_network_server(&self) -> Result<Option<NetworkServer>, Error>;
    async fn list_service_profiles(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<ServiceProfile>, Error>;
    async fn create_service_profile(&self, profile: &ServiceProfile) -> Result<String, Error>;
    async fn delete_service_profile(&self, id: &str) -> Result<(), Error>;

    // Applications
    async fn list_applications(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<Application>, Error>;
    async fn get_application(&self, id: &str) -> Result<Application, Error>;
    async fn create_application(&self, app: &Application) -> Result<String, Error>;
    async fn update_application(&self, id: &str, app: &Application) -> Result<(), Error>;
    async fn delete_application(&self, id: &str) -> Result<(), Error>;

    // HTTP integration
    async fn get_http_integration(&self, application_id: &str)
    -> Result<HttpIntegration, Error>;
    async fn create_http_integration(
        &self,
        application_id: &str,
        integration: &HttpIntegration,
    ) -> Result<(), Error>;
    async fn update_http_integration(
        &self,
        application_id: &str,
        integration: &HttpIntegration,
    ) -> Result<(), Error>;
    async fn delete_http_integration(&self, application_id: &str) -> Result<(), Error>;

    // Device profiles
    async fn list_device_profiles(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<DeviceProfile>, Error>;
    async fn get_device_profile(&self, id: &str) -> Result<DeviceProfile, Error>;
    async fn create_device_profile(&self, profile: &DeviceProfile) -> Result<String, Error>;
    async fn update_device_profile(&self, id: &str, profile: &DeviceProfile)
    -> Result<(), Error>;
    async fn delete_device_profile(&self, id: &str) -> Result<(), Error>;

    // Devices
    async fn list_devices(
        &self,
        application_id: &str,
        params: &ListParams,
    ) -> Result<ListResponse<Device>, Error>;
    async fn get_device(&self, dev_eui: &str) -> Result<Device, Error>;
    async fn create_device(&self, device: &Device) -> Result<(), Error>;
    async fn update_device(&self, dev_eui: &str, device: &Device) -> Result<(), Error>;
    async fn delete_device(&self, dev_eui: &str) -> Result<(), Error>;

    // Device keys / activation
    async fn get_device_keys(&self, dev_eui: &str) -> Result<DeviceKeys, Error>;
    async fn create_device_keys(&self, dev_eui: &str, keys: &DeviceKeys) -> Result<(), Error>;
    async fn update_device_keys(&self, dev_eui: &str, keys: &DeviceKeys) -> Result<(), Error>;
    async fn delete_device_keys(&self, dev_eui: &str) -> Result<(), Error>;
    async fn get_device_activation(&self, dev_eui: &str) -> Result<DeviceActivation, Error>;
    async fn activate_device(
        &self,
        dev_eui: &str,
        activation: &DeviceActivation,
        mac_version: &str,
    ) -> Result<(), Error>;
    async fn deactivate_device(&self, dev_eui: &str) -> Result<(), Error>;

    // Downlinks
    async fn enqueue_downlink(
        &self,
        dev_eui: &str,
        message: &DownlinkMessage,
    ) -> Result<(), Error>;
}

#[async_trait]
impl NetworkClient for AppServerClient {
    async fn login(&self) -> Result<(), Error> {
        AppServerClient::login(self).await
    }

    async fn list_organizations(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<Organization>, Error> {
        AppServerClient::list_organizations(self, params).await
    }

    async fn get_organization(&self, id: &str) -> Result<Organization, Error> {
        AppServerClient::get_organization(self, id).await
    }

    async fn create_organization(&self, org: &NewOrganization) -> Result<String, Error> {
        AppServerClient::create_organization(self, org).await
    }

    async fn update_organization(&self, org: &Organization) -> Result<(), Error> {
        AppServerClient::update_organization(self, org).await
    }

    async fn delete_organization(&self, id: &str) -> Result<(), Error> {
        AppServerClient::delete_organization(self, id).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<String, Error> {
        AppServerClient::create_user(self, user).await
    }

    async fn delete_user(&self, id: &str) -> Result<(), Error> {
        AppServerClient::delete_user(self, id).await
    }

    async fn default_network_server(&self) -> Result<Option<NetworkServer>, Error> {
        AppServerClient::default_network_server(self).await
    }

    async fn list_service_profiles(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<ServiceProfile>, Error> {
        AppServerClient::list_service_profiles(self, params).await
    }

    async fn create_service_profile(&self, profile: &ServiceProfile) -> Result<String, Error> {
        AppServerClient::create_service_profile(self, profile).await
    }

    async fn delete_service_profile(&self, id: &str) -> Result<(), Error> {
        AppServerClient::delete_service_profile(self, id).await
    }

    async fn list_applications(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<Application>, Error> {
        AppServerClient::list_applications(self, params).await
    }

    async fn get_application(&self, id: &str) -> Result<Application, Error> {
        AppServerClient::get_application(self, id).await
    }

    async fn create_application(&self, app: &Application) -> Result<String, Error> {
        AppServerClient::create_application(self, app).await
    }

    async fn update_application(&self, id: &str, app: &Application) -> Result<(), Error> {
        AppServerClient::update_application(self, id, app).await
    }

    async fn delete_application(&self, id: &str) -> Result<(), Error> {
        AppServerClient::delete_application(self, id).await
    }

    async fn get_http_integration(
        &self,
        application_id: &str,
    ) -> Result<HttpIntegration, Error> {
        AppServerClient::get_http_integration(self, application_id).await
    }

    async fn create_http_integration(
        &self,
        application_id: &str,
        integration: &HttpIntegration,
    ) -> Result<(), Error> {
        AppServerClient::create_http_integration(self, application_id, integration).await
    }

    async fn update_http_integration(
        &self,
        application_id: &str,
        integration: &HttpIntegration,
    ) -> Result<(), Error> {
        AppServerClient::update_http_integration(self, application_id, integration).await
    }

    async fn delete_http_integration(&self, application_id: &str) -> Result<(), Error> {
        AppServerClient::delete_http_integration(self, application_id).await
    }

    async fn list_device_profiles(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<DeviceProfile>, Error> {
        AppServerClient::list_device_profiles(self, params).await
    }

    async fn get_device_profile(&self, id: &str) -> Result<DeviceProfile, Error> {
        AppServerClient::get_device_profile(self, id).await
    }

    async fn create_device_profile(&self, profile: &DeviceProfile) -> Result<String, Error> {
        AppServerClient::create_device_profile(self, profile).await
    }

    async fn update_device_profile(
        &self,
        id: &str,
        profile: &DeviceProfile,
    ) -> Result<(), Error> {
        AppServerClient::update_device_profile(self, id, profile).await
    }

    async fn delete_device_profile(&self, id: &str) -> Result<(), Error> {
        AppServerClient::delete_device_profile(self, id).await
    }

    async fn list_devices(
        &self,
        application_id: &str,
        params: &ListParams,
    ) -> Result<ListResponse<Device>, Error> {
        AppServerClient::list_devices(self, application_id, params).await
    }

    async fn get_device(&self, dev_eui: &str) -> Result<Device, Error> {
        AppServerClient::get_device(self, dev_eui).await
    }

    async fn create_device(&self, device: &Device) -> Result<(), Error> {
        AppServerClient::create_device(self, device).await
    }

    async fn update_device(&self, dev_eui: &str, device: &Device) -> Result<(), Error> {
        AppServerClient::update_device(self, dev_eui, device).await
    }

    async fn delete_device(&self, dev_eui: &str) -> Result<(), Error> {
        AppServerClient::delete_device(self, dev_eui).await
    }

    async fn get_device_keys(&self, dev_eui: &str) -> Result<DeviceKeys, Error> {
        AppServerClient::get_device_keys(self, dev_eui).await
    }

    async fn create_device_keys(&self, dev_eui: &str, keys: &DeviceKeys) -> Result<(), Error> {
        AppServerClient::create_device_keys(self, dev_eui, keys).await
    }

    async fn update_device_keys(&self, dev_eui: &str, keys: &DeviceKeys) -> Result<(), Error> {
        AppServerClient::update_device_keys(self, dev_eui, keys).await
    }

    async fn delete_device_keys(&self, dev_eui: &str) -> Result<(), Error> {
        AppServerClient::delete_device_keys(self, dev_eui).await
    }

    async fn get_device_activation(&self, dev_eui: &str) -> Result<DeviceActivation, Error> {
        AppServerClient::get_device_activation(self, dev_eui).await
    }

    async fn activate_device(
        &self,
        dev_eui: &str,
        activation: &DeviceActivation,
        mac_version: &str,
    ) -> Result<(), Error> {
        AppServerClient::activate_device(self, dev_eui, activation, mac_version).await
    }

    async fn deactivate_device(&self, dev_eui: &str) -> Result<(), Error> {
        AppServerClient::deactivate_device(self, dev_eui).await
    }

    async fn enqueue_downlink(
        &self,
        dev_eui: &str,
        message: &DownlinkMessage,
    ) -> Result<(), Error> {
        AppServerClient::enqueue_downlink(self, dev_eui, message).await
    }
}

/// Build a client for a configured network.
pub fn client_for(
    network: &Network,
    transport: &TransportConfig,
) -> Result<AppServerClient, CoreError> {
    let base_url = Url::parse(&network.base_url).map_err(|e| CoreError::Config {
        message: format!("invalid base URL for network {}: {e}", network.name),
    })?;
    let credentials = Credentials {
        username: network.username.clone(),
        password: network.password.clone(),
    };
    let version: Arc<dyn lorahub_api::ApiVersion> = match network.version {
        ProtocolVersion::V1 => Arc::new(V1),
        ProtocolVersion::V2 => Arc::new(V2),
    };
    Ok(AppServerClient::new(
        base_url,
        credentials,
        version,
        transport,
    )?)
}
