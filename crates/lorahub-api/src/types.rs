// Wire types for the LoRa App Server REST API.
//
// Field names follow the remote API's camelCase JSON, with explicit
// renames where the remote deviates from plain camelCase (devEUI,
// applicationID, maxEIRP, ...). The same structs serve both v1 and v2;
// shape differences between versions live in `version.rs`.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

// ── List plumbing ────────────────────────────────────────────────────

/// Filters accepted by every list endpoint.
///
/// The remote guarantees nothing about pagination beyond honoring
/// `limit`/`offset`.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub organization_id: Option<String>,
    pub application_id: Option<String>,
}

impl ListParams {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn organization(mut self, id: impl Into<String>) -> Self {
        self.organization_id = Some(id.into());
        self
    }

    pub fn application(mut self, id: impl Into<String>) -> Self {
        self.application_id = Some(id.into());
        self
    }

    /// Render as query parameters, omitting unset filters.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(ref search) = self.search {
            query.push(("search", search.clone()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }
        if let Some(ref id) = self.organization_id {
            query.push(("organizationID", id.clone()));
        }
        if let Some(ref id) = self.application_id {
            query.push(("applicationID", id.clone()));
        }
        query
    }
}

/// The `{ "result": [...], "totalCount": ... }` list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
    /// v1 reports a JSON number, v2 a decimal string. Absent on some
    /// endpoints.
    #[serde(
        default,
        rename = "totalCount",
        deserialize_with = "de_string_or_number"
    )]
    pub total_count: Option<u64>,
}

/// Response body of create calls that return a fresh remote id.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResource {
    pub id: String,
}

// ── Organizations / users ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub can_have_gateways: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub name: String,
    pub display_name: String,
    pub can_have_gateways: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationAccess {
    pub is_admin: bool,
    #[serde(rename = "organizationID")]
    pub organization_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub is_active: bool,
    pub is_admin: bool,
    #[serde(rename = "sessionTTL")]
    pub session_ttl: i64,
    pub email: String,
    pub note: String,
    pub organizations: Vec<OrganizationAccess>,
}

// ── Infrastructure ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkServer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "networkServerID")]
    pub network_server_id: String,
    #[serde(rename = "organizationID")]
    pub organization_id: String,
    #[serde(rename = "addGWMetadata", default)]
    pub add_gw_metadata: bool,
    #[serde(default)]
    pub dev_status_req_freq: u32,
    #[serde(default)]
    pub dl_bucket_size: u32,
    #[serde(default)]
    pub ul_rate: u32,
    #[serde(default)]
    pub dl_rate: u32,
    #[serde(default)]
    pub ul_rate_policy: String,
    #[serde(default)]
    pub dl_rate_policy: String,
    #[serde(default)]
    pub dr_max: u8,
    #[serde(default)]
    pub dr_min: u8,
    #[serde(default)]
    pub report_dev_status_battery: bool,
    #[serde(default)]
    pub report_dev_status_margin: bool,
}

// ── Applications ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "organizationID")]
    pub organization_id: String,
    #[serde(rename = "serviceProfileID")]
    pub service_profile_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_decoder_script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_encoder_script: Option<String>,
}

/// Webhook endpoints for an application's "http" integration.
///
/// Every notification class points at the same ingestion URL in
/// practice, but the remote API models them separately.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpIntegration {
    #[serde(rename = "ackNotificationURL", default)]
    pub ack_notification_url: String,
    #[serde(rename = "errorNotificationURL", default)]
    pub error_notification_url: String,
    #[serde(rename = "joinNotificationURL", default)]
    pub join_notification_url: String,
    #[serde(rename = "uplinkDataURL", default)]
    pub uplink_data_url: String,
    #[serde(rename = "statusNotificationURL", default)]
    pub status_notification_url: String,
    #[serde(rename = "locationNotificationURL", default)]
    pub location_notification_url: String,
}

impl HttpIntegration {
    /// Point every notification class at one ingestion URL.
    pub fn all_to(url: &str) -> Self {
        Self {
            ack_notification_url: url.to_owned(),
            error_notification_url: url.to_owned(),
            join_notification_url: url.to_owned(),
            uplink_data_url: url.to_owned(),
            status_notification_url: url.to_owned(),
            location_notification_url: url.to_owned(),
        }
    }
}

// ── Device profiles ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "organizationID")]
    pub organization_id: String,
    #[serde(rename = "networkServerID")]
    pub network_server_id: String,
    pub mac_version: String,
    #[serde(default)]
    pub reg_params_revision: String,
    #[serde(default)]
    pub supports_join: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rf_region: Option<String>,
    #[serde(default)]
    pub supports_class_b: bool,
    #[serde(default)]
    pub supports_class_c: bool,
    #[serde(rename = "maxEIRP", default, skip_serializing_if = "Option::is_none")]
    pub max_eirp: Option<i32>,
    #[serde(rename = "rxDelay1", default, skip_serializing_if = "Option::is_none")]
    pub rx_delay_1: Option<u32>,
    #[serde(
        rename = "rxDROffset1",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rx_dr_offset_1: Option<u32>,
    #[serde(
        rename = "rxDataRate2",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rx_datarate_2: Option<u32>,
    #[serde(rename = "rxFreq2", default, skip_serializing_if = "Option::is_none")]
    pub rx_freq_2: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_preset_freqs: Option<Vec<u64>>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(rename = "devEUI")]
    pub dev_eui: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "applicationID")]
    pub application_id: String,
    #[serde(rename = "deviceProfileID")]
    pub device_profile_id: String,
    #[serde(rename = "skipFCntCheck", default)]
    pub skip_f_cnt_check: bool,
}

/// OTAA join credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceKeys {
    #[serde(rename = "appKey")]
    pub app_key: String,
    /// LoRaWAN 1.1 network root key. v1 servers have no such field;
    /// v2 servers require it (the client substitutes `appKey` when
    /// absent).
    #[serde(rename = "nwkKey", default, skip_serializing_if = "Option::is_none")]
    pub nwk_key: Option<String>,
}

/// ABP session state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceActivation {
    pub dev_addr: String,
    #[serde(rename = "appSKey")]
    pub app_s_key: String,
    /// The sole network session key on v1; the forwarding integrity key
    /// on v2.
    #[serde(rename = "fNwkSIntKey")]
    pub f_nwk_s_int_key: String,
    #[serde(rename = "sNwkSIntKey", default, skip_serializing_if = "Option::is_none")]
    pub s_nwk_s_int_key: Option<String>,
    #[serde(rename = "nwkSEncKey", default, skip_serializing_if = "Option::is_none")]
    pub nwk_s_enc_key: Option<String>,
    #[serde(rename = "fCntUp", default)]
    pub f_cnt_up: u32,
    #[serde(rename = "nFCntDown", default)]
    pub n_f_cnt_down: u32,
}

/// A downlink queued for a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownlinkMessage {
    #[serde(default)]
    pub confirmed: bool,
    #[serde(rename = "fPort")]
    pub f_port: u8,
    /// Base64-encoded payload.
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_object: Option<serde_json::Value>,
}

// ── Deserialization helpers ──────────────────────────────────────────

/// Accept a count encoded as either a JSON number (v1) or a decimal
/// string (v2).
fn de_string_or_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid totalCount: {s:?}"))),
    }
}
