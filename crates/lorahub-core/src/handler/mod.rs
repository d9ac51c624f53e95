// ── LoRa protocol handler ──
//
// The sync engine for LoRa App Server networks: company provisioning,
// entity push with idempotent create-or-update, remote import (pull),
// integration management for uplink delivery, and downlinks. Split by
// direction: local lifecycle + company machinery here, `push.rs` and
// `pull.rs` for the bulk reconciliation passes.

mod convert;
mod pull;
mod push;

pub use pull::{OrganizationSetup, PulledApplication, PulledDeviceProfile};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use lorahub_api::types::{DownlinkMessage, HttpIntegration, ListParams, Organization};

use crate::crypto;
use crate::error::CoreError;
use crate::inventory::Inventory;
use crate::model::{Application, Company, Network};
use crate::protocol_data::{ProtocolDataStore, keys, load_non_empty};
use crate::remote::NetworkClient;
use crate::reporting::UplinkForwarder;

/// Remote admin credentials generated for a company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountCredentials {
    pub username: String,
    pub password: String,
}

/// The sync engine. One instance serves every LoRa network; per-network
/// state lives in the protocol data store, keyed by the `Network`
/// passed to each call.
pub struct LoraHandler {
    inventory: Arc<dyn Inventory>,
    protocol_data: Arc<dyn ProtocolDataStore>,
    forwarder: Arc<dyn UplinkForwarder>,
    /// Public base URL of this server, used to build ingestion URLs
    /// handed to remote http integrations.
    public_base_url: String,
}

impl LoraHandler {
    pub fn new(
        inventory: Arc<dyn Inventory>,
        protocol_data: Arc<dyn ProtocolDataStore>,
        forwarder: Arc<dyn UplinkForwarder>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            inventory,
            protocol_data,
            forwarder,
            public_base_url: public_base_url.into(),
        }
    }

    pub(crate) fn inventory(&self) -> &dyn Inventory {
        self.inventory.as_ref()
    }

    pub(crate) fn protocol_data(&self) -> &dyn ProtocolDataStore {
        self.protocol_data.as_ref()
    }

    // ── Connectivity ─────────────────────────────────────────────────

    /// Authenticate against the network.
    pub async fn connect(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
    ) -> Result<(), CoreError> {
        client.login().await?;
        info!(network = %network.name, "connected to network server");
        Ok(())
    }

    /// Verify the session works by issuing a minimal read.
    pub async fn test(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
    ) -> Result<(), CoreError> {
        client
            .list_applications(&ListParams::default().limit(1).offset(0))
            .await?;
        info!(network = %network.name, "network server test passed");
        Ok(())
    }

    // ── Company account ──────────────────────────────────────────────

    /// Fetch (or, when allowed, generate) the remote admin credentials
    /// for a company.
    ///
    /// Generated credentials are stored encrypted: the AES key under the
    /// company's `kd` record, the credentials under `sd`.
    pub async fn company_account(
        &self,
        network: &Network,
        company_id: Uuid,
        generate_if_missing: bool,
    ) -> Result<Option<AccountCredentials>, CoreError> {
        let secret = load_non_empty(
            self.protocol_data(),
            network,
            &keys::company_secret_data(company_id),
        )
        .await?;
        let key = load_non_empty(
            self.protocol_data(),
            network,
            &keys::company_key_data(company_id),
        )
        .await?;

        let (Some(secret), Some(key)) = (secret, key) else {
            if !generate_if_missing {
                error!(%company_id, "company security data is missing");
                return Ok(None);
            }
            info!(%company_id, "generating remote account for company");
            let company = self.inventory().company(company_id).await?;
            // Company name reduced to something username-safe, plus
            // "admin".
            let mut username: String = company
                .name
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect();
            username.push_str("admin");
            let credentials = AccountCredentials {
                username,
                password: crypto::gen_password(12),
            };
            let key = crypto::gen_key();
            let secret = crypto::encrypt(
                &key,
                &serde_json::to_string(&credentials)
                    .map_err(|e| CoreError::Internal(e.to_string()))?,
            )?;
            self.protocol_data()
                .upsert(network, &keys::company_secret_data(company_id), &secret)
                .await?;
            self.protocol_data()
                .upsert(network, &keys::company_key_data(company_id), &key)
                .await?;
            return Ok(Some(credentials));
        };

        let plaintext = crypto::decrypt(&key, &secret)?;
        let credentials: AccountCredentials = serde_json::from_str(&plaintext)
            .map_err(|_| CoreError::Crypto("stored credentials are malformed".into()))?;
        if credentials.username.is_empty() || credentials.password.is_empty() {
            error!(%company_id, "company security data is incomplete");
            return Ok(None);
        }
        Ok(Some(credentials))
    }

    // ── Company lifecycle ────────────────────────────────────────────

    /// Provision a company on the remote: organization, admin user, and
    /// default service profile.
    pub async fn add_company(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        company_id: Uuid,
    ) -> Result<OrganizationSetup, CoreError> {
        let company = self.inventory().company(company_id).await?;
        let organization_id = client
            .create_organization(&convert::new_organization(&company))
            .await?;
        self.protocol_data()
            .upsert(network, &keys::company_org(company.id), &organization_id)
            .await?;

        self.add_default_admin_user(network, client, &company, &organization_id)
            .await?;
        let (service_profile_id, network_server_id) = self
            .add_default_service_profile(network, client, &company, &organization_id)
            .await?;

        Ok(OrganizationSetup {
            organization_id,
            service_profile_id,
            network_server_id,
        })
    }

    async fn add_default_admin_user(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        company: &Company,
        organization_id: &str,
    ) -> Result<(), CoreError> {
        let credentials = self
            .company_account(network, company.id, true)
            .await?
            .ok_or_else(|| CoreError::Internal("company account generation failed".into()))?;
        let user_id = client
            .create_user(&convert::admin_user(&credentials, organization_id))
            .await?;
        self.protocol_data()
            .upsert(network, &keys::company_user(company.id), &user_id)
            .await?;
        Ok(())
    }

    async fn add_default_service_profile(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        company: &Company,
        organization_id: &str,
    ) -> Result<(String, String), CoreError> {
        let network_server = client
            .default_network_server()
            .await?
            .ok_or_else(|| CoreError::not_found("network server", "any"))?;
        let service_profile_id = client
            .create_service_profile(&convert::default_service_profile(
                organization_id,
                &network_server.id,
            ))
            .await?;

        self.protocol_data()
            .upsert(
                network,
                &keys::company_service_profile(company.id),
                &service_profile_id,
            )
            .await?;
        self.protocol_data()
            .upsert(
                network,
                &keys::company_network_server(company.id),
                &network_server.id,
            )
            .await?;
        Ok((service_profile_id, network_server.id))
    }

    /// Load the remote organization for a company.
    pub async fn get_company(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        company_id: Uuid,
    ) -> Result<Organization, CoreError> {
        let organization_id = self
            .protocol_data()
            .load(network, &keys::company_org(company_id))
            .await?;
        Ok(client.get_organization(&organization_id).await?)
    }

    /// Push local company changes to the remote organization.
    pub async fn update_company(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        company_id: Uuid,
    ) -> Result<(), CoreError> {
        let company = self.inventory().company(company_id).await?;
        let organization_id = self
            .protocol_data()
            .load(network, &keys::company_org(company_id))
            .await?;
        client
            .update_organization(&convert::organization(&organization_id, &company))
            .await?;
        Ok(())
    }

    /// Tear down a company's remote footprint: admin user, organization
    /// (the remote cascades its applications and devices), and every
    /// protocol data record for the company.
    pub async fn delete_company(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        company_id: Uuid,
    ) -> Result<(), CoreError> {
        // Without the stored ids there is nothing safe to delete.
        let organization_id = self
            .protocol_data()
            .load(network, &keys::company_org(company_id))
            .await?;
        let user_id = self
            .protocol_data()
            .load(network, &keys::company_user(company_id))
            .await?;

        if let Err(err) = client.delete_user(&user_id).await {
            error!(%company_id, %err, "failed to delete remote admin user");
        }
        client.delete_organization(&organization_id).await?;

        self.protocol_data()
            .remove_prefix(network, &keys::company_prefix(company_id))
            .await?;
        Ok(())
    }

    // ── Application start / stop ─────────────────────────────────────

    /// Point the remote application's http integration at this server's
    /// ingestion endpoint. Creates the integration when absent, updates
    /// it otherwise.
    pub async fn start_application(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        application_id: Uuid,
    ) -> Result<(), CoreError> {
        let url = self.ingest_url(application_id, network.id);
        let remote_app_id = self
            .protocol_data()
            .load(network, &keys::application(application_id))
            .await?;
        let integration = HttpIntegration::all_to(&url);

        match client.get_http_integration(&remote_app_id).await {
            Ok(_) => {
                client
                    .update_http_integration(&remote_app_id, &integration)
                    .await?;
            }
            Err(err) if err.is_not_found() => {
                client
                    .create_http_integration(&remote_app_id, &integration)
                    .await?;
            }
            Err(err) => return Err(err.into()),
        }
        info!(%application_id, network = %network.name, "uplink delivery started");
        Ok(())
    }

    /// Remove the remote application's http integration, stopping
    /// uplink delivery. Already-absent integrations are fine.
    pub async fn stop_application(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        application_id: Uuid,
    ) -> Result<(), CoreError> {
        let remote_app_id = self
            .protocol_data()
            .load(network, &keys::application(application_id))
            .await?;

        match client.get_http_integration(&remote_app_id).await {
            Ok(_) => {}
            Err(err) if err.is_not_found() => return Ok(()),
            Err(err) => return Err(err.into()),
        }
        client.delete_http_integration(&remote_app_id).await?;
        info!(%application_id, network = %network.name, "uplink delivery stopped");
        Ok(())
    }

    pub(crate) fn ingest_url(&self, application_id: Uuid, network_id: Uuid) -> String {
        format!(
            "{}/api/ingest/{application_id}/{network_id}",
            self.public_base_url.trim_end_matches('/')
        )
    }

    // ── Data plane ───────────────────────────────────────────────────

    /// Queue a downlink for a device. Disabled networks drop downlinks
    /// silently.
    pub async fn pass_data_to_device(
        &self,
        network: &Network,
        client: &dyn NetworkClient,
        device_id: Uuid,
        message: &DownlinkMessage,
    ) -> Result<(), CoreError> {
        if !network.enabled {
            warn!(network = %network.name, %device_id, "network disabled, dropping downlink");
            return Ok(());
        }
        let dev_eui = self
            .protocol_data()
            .load(network, &keys::device(device_id))
            .await?;
        client.enqueue_downlink(&dev_eui, message).await?;
        Ok(())
    }

    /// Forward an ingested uplink to the application's destination.
    pub async fn handle_uplink(
        &self,
        application: &Application,
        payload: &serde_json::Value,
    ) -> Result<(), CoreError> {
        if application.base_url.is_empty() {
            warn!(application = %application.name, "no reporting destination, dropping uplink");
            return Ok(());
        }
        self.forwarder
            .forward(&application.base_url, payload)
            .await
    }
}
