// ── Protocol data store ──
//
// Caches the remote-object identifiers a network server assigned to
// local entities, keyed per (network, protocol) so the same entity can
// be synced to several remotes independently. Key strings are part of
// the persisted format; do not change them.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::Network;

/// Key builders for the `"<kind>:<localId>/<purpose>"` format.
pub mod keys {
    use uuid::Uuid;

    /// Remote organization id for a company.
    pub fn company_org(company_id: Uuid) -> String {
        format!("co:{company_id}/coNwkId")
    }

    /// Remote admin-user id for a company.
    pub fn company_user(company_id: Uuid) -> String {
        format!("co:{company_id}/coUsrId")
    }

    /// Remote default service-profile id for a company.
    pub fn company_service_profile(company_id: Uuid) -> String {
        format!("co:{company_id}/coSPId")
    }

    /// Remote network-server id backing the company's service profile.
    pub fn company_network_server(company_id: Uuid) -> String {
        format!("co:{company_id}/coSPNwkId")
    }

    /// Encryption key for the company's stored remote credentials.
    pub fn company_key_data(company_id: Uuid) -> String {
        format!("co:{company_id}/kd")
    }

    /// Encrypted remote credentials for the company's admin user.
    pub fn company_secret_data(company_id: Uuid) -> String {
        format!("co:{company_id}/sd")
    }

    /// Remote application id.
    pub fn application(application_id: Uuid) -> String {
        format!("app:{application_id}/appNwkId")
    }

    /// Remote device id (the devEUI).
    pub fn device(device_id: Uuid) -> String {
        format!("dev:{device_id}/devNwkId")
    }

    /// Remote device-profile id.
    pub fn device_profile(device_profile_id: Uuid) -> String {
        format!("dp:{device_profile_id}/dpNwkId")
    }

    /// Prefix covering every key of a company (cascade cleanup).
    pub fn company_prefix(company_id: Uuid) -> String {
        format!("co:{company_id}/")
    }

    /// Prefix covering every key of an application.
    pub fn application_prefix(application_id: Uuid) -> String {
        format!("app:{application_id}/")
    }

    /// Prefix covering every key of a device.
    pub fn device_prefix(device_id: Uuid) -> String {
        format!("dev:{device_id}/")
    }

    /// Prefix covering every key of a device profile.
    pub fn device_profile_prefix(device_profile_id: Uuid) -> String {
        format!("dp:{device_profile_id}/")
    }

    /// Wildcard pattern matching any application's remote-id key, for
    /// reverse lookups from a remote id to the local application.
    pub const ANY_APPLICATION: &str = "app:%/appNwkId";
}

/// One stored record, returned by reverse lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolDataRecord {
    pub network_id: Uuid,
    pub network_protocol_id: Uuid,
    pub key: String,
    pub value: String,
}

impl ProtocolDataRecord {
    /// The local entity id embedded in the key, if the key is
    /// well-formed.
    pub fn local_id(&self) -> Option<Uuid> {
        let rest = self.key.split_once(':')?.1;
        let id = rest.split_once('/')?.0;
        Uuid::parse_str(id).ok()
    }
}

/// Storage seam for protocol data.
#[async_trait]
pub trait ProtocolDataStore: Send + Sync {
    /// Load a value; `NotFound` when the key has never been stored.
    async fn load(&self, network: &Network, key: &str) -> Result<String, CoreError>;

    /// Store or replace a value.
    async fn upsert(&self, network: &Network, key: &str, value: &str) -> Result<(), CoreError>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, network: &Network, key: &str) -> Result<(), CoreError>;

    /// Remove every key starting with `prefix` for this network.
    async fn remove_prefix(&self, network: &Network, prefix: &str) -> Result<(), CoreError>;

    /// Find records whose value equals `value` and whose key matches
    /// `pattern` (`%` matches any run of characters).
    async fn reverse_lookup(
        &self,
        network: &Network,
        pattern: &str,
        value: &str,
    ) -> Result<Vec<ProtocolDataRecord>, CoreError>;
}

/// Convenience: load a value, treating an empty string as absent.
///
/// An empty stored value is a scar from an interrupted sync; callers
/// route it to the create path, which re-stores the real id.
pub async fn load_non_empty(
    store: &dyn ProtocolDataStore,
    network: &Network,
    key: &str,
) -> Result<Option<String>, CoreError> {
    match store.load(network, key).await {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

// ── In-memory implementation ─────────────────────────────────────────

type StoreKey = (Uuid, Uuid, String);

/// DashMap-backed `ProtocolDataStore`.
#[derive(Debug, Default)]
pub struct MemoryProtocolData {
    records: DashMap<StoreKey, String>,
}

impl MemoryProtocolData {
    pub fn new() -> Self {
        Self::default()
    }

    fn store_key(network: &Network, key: &str) -> StoreKey {
        (network.id, network.network_protocol_id, key.to_owned())
    }
}

#[async_trait]
impl ProtocolDataStore for MemoryProtocolData {
    async fn load(&self, network: &Network, key: &str) -> Result<String, CoreError> {
        self.records
            .get(&Self::store_key(network, key))
            .map(|e| e.clone())
            .ok_or_else(|| CoreError::not_found("protocol data", key))
    }

    async fn upsert(&self, network: &Network, key: &str, value: &str) -> Result<(), CoreError> {
        self.records
            .insert(Self::store_key(network, key), value.to_owned());
        Ok(())
    }

    async fn remove(&self, network: &Network, key: &str) -> Result<(), CoreError> {
        self.records.remove(&Self::store_key(network, key));
        Ok(())
    }

    async fn remove_prefix(&self, network: &Network, prefix: &str) -> Result<(), CoreError> {
        self.records.retain(|(net, proto, key), _| {
            !(*net == network.id
                && *proto == network.network_protocol_id
                && key.starts_with(prefix))
        });
        Ok(())
    }

    async fn reverse_lookup(
        &self,
        network: &Network,
        pattern: &str,
        value: &str,
    ) -> Result<Vec<ProtocolDataRecord>, CoreError> {
        Ok(self
            .records
            .iter()
            .filter(|e| {
                let (net, proto, key) = e.key();
                *net == network.id
                    && *proto == network.network_protocol_id
                    && e.value() == value
                    && wildcard_match(pattern, key)
            })
            .map(|e| {
                let (net, proto, key) = e.key().clone();
                ProtocolDataRecord {
                    network_id: net,
                    network_protocol_id: proto,
                    key,
                    value: e.value().clone(),
                }
            })
            .collect())
    }
}

/// Match `pattern` against `input`, with `%` matching any run of
/// characters (SQL LIKE semantics, the only wildcard we need).
fn wildcard_match(pattern: &str, input: &str) -> bool {
    let mut parts = pattern.split('%');
    let Some(first) = parts.next() else {
        return input.is_empty();
    };
    let Some(mut rest) = input.strip_prefix(first) else {
        return false;
    };
    let mut last: Option<&str> = None;
    for part in parts {
        last = Some(part);
        if part.is_empty() {
            continue;
        }
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    match last {
        // No '%' at all: the whole input must have been consumed.
        None => rest.is_empty(),
        Some(part) => part.is_empty() || input.ends_with(part),
    }
}
