// Application endpoints, including the per-application "http"
// integration that drives uplink delivery.

use crate::client::{AppServerClient, created_id};
use crate::error::Error;
use crate::types::{Application, HttpIntegration, ListParams, ListResponse};

impl AppServerClient {
    /// List applications, usually scoped to an organization.
    pub async fn list_applications(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<Application>, Error> {
        self.get("applications", &params.to_query()).await
    }

    /// Fetch a single application by remote id.
    pub async fn get_application(&self, id: &str) -> Result<Application, Error> {
        self.get_resource(&format!("applications/{id}"), "application")
            .await
    }

    /// Create an application, returning its new remote id.
    pub async fn create_application(&self, application: &Application) -> Result<String, Error> {
        let body = self
            .post_resource("applications", "application", application)
            .await?;
        created_id(body)
    }

    /// Update an application in place.
    pub async fn update_application(
        &self,
        id: &str,
        application: &Application,
    ) -> Result<(), Error> {
        self.put_resource(&format!("applications/{id}"), "application", application)
            .await
            .map(|_| ())
    }

    /// Delete an application by remote id.
    pub async fn delete_application(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("applications/{id}")).await
    }

    // ── HTTP integration ─────────────────────────────────────────────

    /// Fetch the application's http integration.
    ///
    /// Returns `Error::is_not_found` when none is configured, which is
    /// the signal to create rather than update.
    pub async fn get_http_integration(&self, application_id: &str) -> Result<HttpIntegration, Error> {
        self.get_resource(
            &format!("applications/{application_id}/integrations/http"),
            "integration",
        )
        .await
    }

    /// Configure an http integration for the application.
    pub async fn create_http_integration(
        &self,
        application_id: &str,
        integration: &HttpIntegration,
    ) -> Result<(), Error> {
        self.post_resource(
            &format!("applications/{application_id}/integrations/http"),
            "integration",
            integration,
        )
        .await
        .map(|_| ())
    }

    /// Replace the application's http integration.
    pub async fn update_http_integration(
        &self,
        application_id: &str,
        integration: &HttpIntegration,
    ) -> Result<(), Error> {
        self.put_resource(
            &format!("applications/{application_id}/integrations/http"),
            "integration",
            integration,
        )
        .await
        .map(|_| ())
    }

    /// Remove the application's http integration, stopping uplink
    /// delivery.
    pub async fn delete_http_integration(&self, application_id: &str) -> Result<(), Error> {
        self.delete(&format!("applications/{application_id}/integrations/http"))
            .await
    }
}
