// Service-profile endpoints

use crate::client::{AppServerClient, created_id};
use crate::error::Error;
use crate::types::{ListParams, ListResponse, ServiceProfile};

impl AppServerClient {
    /// List service profiles, usually scoped to an organization.
    pub async fn list_service_profiles(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<ServiceProfile>, Error> {
        self.get("service-profiles", &params.to_query()).await
    }

    /// Fetch a single service profile by remote id.
    pub async fn get_service_profile(&self, id: &str) -> Result<ServiceProfile, Error> {
        self.get_resource(&format!("service-profiles/{id}"), "serviceProfile")
            .await
    }

    /// Create a service profile, returning its new remote id.
    pub async fn create_service_profile(&self, profile: &ServiceProfile) -> Result<String, Error> {
        let body = self
            .post_resource("service-profiles", "serviceProfile", profile)
            .await?;
        created_id(body)
    }

    /// Update a service profile in place.
    pub async fn update_service_profile(
        &self,
        id: &str,
        profile: &ServiceProfile,
    ) -> Result<(), Error> {
        self.put_resource(&format!("service-profiles/{id}"), "serviceProfile", profile)
            .await
            .map(|_| ())
    }

    /// Delete a service profile by remote id.
    pub async fn delete_service_profile(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("service-profiles/{id}")).await
    }
}
