// ── Devices and device profiles ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A radio-parameter template shared by similar devices.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    pub id: Uuid,
    pub company_id: Uuid,
    pub network_type_id: Uuid,
    pub name: String,
    pub settings: DeviceProfileLoraSettings,
}

/// Radio parameters carried by a device profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfileLoraSettings {
    pub mac_version: String,
    pub reg_params_revision: String,
    /// OTAA-capable. ABP devices set this to false and carry a session
    /// on their network link instead of root keys.
    pub supports_join: bool,
    pub rf_region: Option<String>,
    pub supports_class_b: bool,
    pub supports_class_c: bool,
    pub max_eirp: Option<i32>,
    pub rx_delay_1: Option<u32>,
    pub rx_dr_offset_1: Option<u32>,
    pub rx_datarate_2: Option<u32>,
    pub rx_freq_2: Option<u64>,
    pub factory_preset_freqs: Option<Vec<u64>>,
}

impl Default for DeviceProfileLoraSettings {
    fn default() -> Self {
        Self {
            mac_version: "1.0.3".to_owned(),
            reg_params_revision: "A".to_owned(),
            supports_join: false,
            rf_region: None,
            supports_class_b: false,
            supports_class_c: false,
            max_eirp: None,
            rx_delay_1: None,
            rx_dr_offset_1: None,
            rx_datarate_2: None,
            rx_freq_2: None,
            factory_preset_freqs: None,
        }
    }
}

/// An end device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: Uuid,
    pub application_id: Uuid,
    pub name: String,
    pub description: String,
}

/// OTAA root keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtaaKeys {
    pub app_key: String,
    /// LoRaWAN 1.1 network root key; absent for 1.0 devices.
    pub nwk_key: Option<String>,
}

/// A pre-provisioned (ABP) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbpSession {
    pub dev_addr: String,
    pub app_s_key: String,
    pub f_nwk_s_int_key: String,
    pub s_nwk_s_int_key: Option<String>,
    pub nwk_s_enc_key: Option<String>,
    pub f_cnt_up: u32,
    pub n_f_cnt_down: u32,
}

/// LoRa-specific settings for a device.
///
/// A device is OTAA when `otaa_keys` is set, ABP when `abp_session` is
/// set. Setting both is a provisioning error; OTAA wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLoraSettings {
    pub dev_eui: Option<String>,
    pub skip_f_cnt_check: bool,
    pub otaa_keys: Option<OtaaKeys>,
    pub abp_session: Option<AbpSession>,
}

/// Joins a device to a network type, carrying its radio identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceNetworkTypeLink {
    pub id: Uuid,
    pub device_id: Uuid,
    pub network_type_id: Uuid,
    pub device_profile_id: Uuid,
    pub settings: DeviceLoraSettings,
}
