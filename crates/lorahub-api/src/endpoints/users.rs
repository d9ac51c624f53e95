// User endpoints
//
// Only creation and deletion are needed: each provisioned organization
// gets one admin account so it stays manageable through the remote UI.

use crate::client::{AppServerClient, created_id};
use crate::error::Error;
use crate::types::NewUser;

impl AppServerClient {
    /// Create a user, returning its new remote id.
    pub async fn create_user(&self, user: &NewUser) -> Result<String, Error> {
        let body = self.post_resource("users", "user", user).await?;
        created_id(body)
    }

    /// Delete a user by remote id.
    pub async fn delete_user(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("users/{id}")).await
    }
}
