// ── Shared server state ──
//
// One registry entry per configured network, the sync engine, and a
// bounded cache of recently ingested deliveries. Remote network servers
// retry webhook deliveries they consider unacknowledged, so ingestion
// has to tolerate duplicates.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use lorahub_core::inventory::{Inventory, MemoryInventory};
use lorahub_core::model::{Company, CompanyType, Network, NetworkType};
use lorahub_core::protocol_data::MemoryProtocolData;
use lorahub_core::remote::{NetworkClient, client_for};
use lorahub_core::reporting::HttpForwarder;
use lorahub_core::{CoreError, LoraHandler, WriteOrigin};

use lorahub_config::Config;

/// A configured network and its API client.
pub struct NetworkEntry {
    pub network: Network,
    pub client: Arc<dyn NetworkClient>,
}

pub struct AppState {
    pub handler: LoraHandler,
    pub inventory: Arc<MemoryInventory>,
    pub networks: HashMap<Uuid, NetworkEntry>,
    deliveries: DeliveryCache,
}

impl AppState {
    pub fn new(
        handler: LoraHandler,
        inventory: Arc<MemoryInventory>,
        networks: HashMap<Uuid, NetworkEntry>,
    ) -> Self {
        Self {
            handler,
            inventory,
            networks,
            deliveries: DeliveryCache::new(512),
        }
    }

    /// Build the full state from configuration: inventory with the
    /// operator company registered, one client per network profile, and
    /// the sync engine wired to an HTTP uplink forwarder.
    pub async fn from_config(config: &Config) -> Result<Self, CoreError> {
        let inventory = Arc::new(MemoryInventory::new());
        let protocol_data = Arc::new(MemoryProtocolData::new());

        let network_type = NetworkType {
            id: Uuid::new_v4(),
            name: "LoRa".into(),
        };
        inventory.create_network_type(network_type.clone()).await?;
        inventory
            .create_company(
                Company {
                    id: Uuid::new_v4(),
                    name: config.server.operator.clone(),
                    company_type: CompanyType::Admin,
                },
                WriteOrigin::Local,
            )
            .await?;

        // One protocol drives every configured network.
        let network_protocol_id = Uuid::new_v4();
        let mut networks = HashMap::new();
        for (name, profile) in &config.networks {
            let (network, transport) =
                lorahub_config::profile_to_network(profile, name, network_type.id, network_protocol_id)
                    .map_err(|e| CoreError::Config {
                        message: e.to_string(),
                    })?;
            let client = Arc::new(client_for(&network, &transport)?);
            networks.insert(
                network.id,
                NetworkEntry {
                    network,
                    client: client as Arc<dyn NetworkClient>,
                },
            );
        }

        let handler = LoraHandler::new(
            inventory.clone(),
            protocol_data,
            Arc::new(HttpForwarder::default()),
            config.server.public_base_url.clone(),
        );
        Ok(Self::new(handler, inventory, networks))
    }

    /// Record a delivery, returning `true` when it was already seen.
    pub fn seen_delivery(
        &self,
        application_id: Uuid,
        network_id: Uuid,
        payload: &serde_json::Value,
    ) -> bool {
        let mut hasher = DefaultHasher::new();
        application_id.hash(&mut hasher);
        network_id.hash(&mut hasher);
        payload.to_string().hash(&mut hasher);
        self.deliveries.insert(hasher.finish())
    }
}

/// Fixed-capacity set of delivery fingerprints, oldest evicted first.
struct DeliveryCache {
    seen: Mutex<(VecDeque<u64>, HashSet<u64>)>,
    capacity: usize,
}

impl DeliveryCache {
    fn new(capacity: usize) -> Self {
        Self {
            seen: Mutex::new((VecDeque::new(), HashSet::new())),
            capacity,
        }
    }

    /// Insert a fingerprint; returns `true` when it was already present.
    fn insert(&self, fingerprint: u64) -> bool {
        let mut guard = self
            .seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let (order, set) = &mut *guard;
        if !set.insert(fingerprint) {
            return true;
        }
        order.push_back(fingerprint);
        if order.len() > self.capacity {
            if let Some(evicted) = order.pop_front() {
                set.remove(&evicted);
            }
        }
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn delivery_cache_detects_duplicates() {
        let cache = DeliveryCache::new(4);
        assert!(!cache.insert(1));
        assert!(cache.insert(1));
    }

    #[test]
    fn delivery_cache_evicts_oldest() {
        let cache = DeliveryCache::new(2);
        assert!(!cache.insert(1));
        assert!(!cache.insert(2));
        assert!(!cache.insert(3));
        // 1 was evicted, so it reads as fresh again.
        assert!(!cache.insert(1));
        assert!(cache.insert(3));
    }
}
