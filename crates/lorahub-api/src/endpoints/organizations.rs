// Organization endpoints

use crate::client::{AppServerClient, created_id};
use crate::error::Error;
use crate::types::{ListParams, ListResponse, NewOrganization, Organization};

impl AppServerClient {
    /// List organizations, optionally filtered by name search.
    pub async fn list_organizations(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<Organization>, Error> {
        self.get("organizations", &params.to_query()).await
    }

    /// Fetch a single organization by remote id.
    pub async fn get_organization(&self, id: &str) -> Result<Organization, Error> {
        self.get_resource(&format!("organizations/{id}"), "organization")
            .await
    }

    /// Create an organization, returning its new remote id.
    pub async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<String, Error> {
        let body = self
            .post_resource("organizations", "organization", organization)
            .await?;
        created_id(body)
    }

    /// Update an organization in place.
    pub async fn update_organization(&self, organization: &Organization) -> Result<(), Error> {
        self.put_resource(
            &format!("organizations/{}", organization.id),
            "organization",
            organization,
        )
        .await
        .map(|_| ())
    }

    /// Delete an organization and everything the remote cascades with it.
    pub async fn delete_organization(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("organizations/{id}")).await
    }
}
