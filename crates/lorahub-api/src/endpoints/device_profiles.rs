// Device-profile endpoints

use crate::client::{AppServerClient, created_id};
use crate::error::Error;
use crate::types::{DeviceProfile, ListParams, ListResponse};

impl AppServerClient {
    /// List device profiles, usually scoped to an organization.
    pub async fn list_device_profiles(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<DeviceProfile>, Error> {
        self.get("device-profiles", &params.to_query()).await
    }

    /// Fetch a single device profile by remote id.
    pub async fn get_device_profile(&self, id: &str) -> Result<DeviceProfile, Error> {
        self.get_resource(&format!("device-profiles/{id}"), "deviceProfile")
            .await
    }

    /// Create a device profile, returning its new remote id.
    pub async fn create_device_profile(&self, profile: &DeviceProfile) -> Result<String, Error> {
        let body = self
            .post_resource("device-profiles", "deviceProfile", profile)
            .await?;
        created_id(body)
    }

    /// Update a device profile in place.
    pub async fn update_device_profile(
        &self,
        id: &str,
        profile: &DeviceProfile,
    ) -> Result<(), Error> {
        self.put_resource(&format!("device-profiles/{id}"), "deviceProfile", profile)
            .await
            .map(|_| ())
    }

    /// Delete a device profile by remote id.
    pub async fn delete_device_profile(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("device-profiles/{id}")).await
    }
}
