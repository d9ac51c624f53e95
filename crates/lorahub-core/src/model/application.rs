// ── Applications ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tenant application grouping devices that report to one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: String,
    /// Where uplinks for this application are delivered.
    pub base_url: String,
    /// Whether uplink delivery is currently started.
    pub running: bool,
}

/// LoRa-specific settings for an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationLoraSettings {
    pub payload_codec: Option<String>,
    pub payload_decoder_script: Option<String>,
    pub payload_encoder_script: Option<String>,
}

/// Joins an application to a network type it is deployed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationNetworkTypeLink {
    pub id: Uuid,
    pub application_id: Uuid,
    pub network_type_id: Uuid,
    pub settings: ApplicationLoraSettings,
}
