// ── Networks and network types ──

use secrecy::SecretString;
use uuid::Uuid;

/// A class of LPWAN technology (e.g. "LoRa").
///
/// Link entities hang off a network type rather than a concrete
/// network: one set of LoRa settings serves every LoRa network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkType {
    pub id: Uuid,
    pub name: String,
}

/// Which remote API family a network speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    V1,
    V2,
}

impl ProtocolVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1.0",
            Self::V2 => "2.0",
        }
    }
}

/// A concrete remote network server to synchronize with.
#[derive(Debug, Clone)]
pub struct Network {
    pub id: Uuid,
    pub network_type_id: Uuid,
    /// Identifies the protocol driving this network. Protocol data is
    /// namespaced per (network, protocol) so switching a network to a
    /// new protocol starts from a clean slate.
    pub network_protocol_id: Uuid,
    pub name: String,
    /// Disabled networks accept no pushes and send no downlinks.
    pub enabled: bool,
    pub base_url: String,
    pub version: ProtocolVersion,
    pub username: String,
    pub password: SecretString,
}
