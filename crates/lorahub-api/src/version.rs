// API version strategies.
//
// The v1 and v2 LoRa App Server APIs share most of their surface but
// diverge in authentication headers and in how device credentials are
// framed. Each divergence is a method here; `V1` takes the defaults and
// `V2` overrides only what changed. The client holds a `dyn ApiVersion`
// and never branches on version itself.

use serde_json::{Value, json};

use crate::types::{DeviceActivation, DeviceKeys};

/// Version-specific request and response shaping.
///
/// Default method bodies implement v1 behavior.
pub trait ApiVersion: Send + Sync + std::fmt::Debug {
    /// Short version tag, used in logs.
    fn name(&self) -> &'static str {
        "v1"
    }

    /// Value for the `Grpc-Metadata-Authorization` header.
    fn auth_header(&self, jwt: &str) -> String {
        jwt.to_owned()
    }

    /// Request body for creating OTAA device keys.
    fn device_keys_body(&self, dev_eui: &str, keys: &DeviceKeys) -> Value {
        json!({
            "devEUI": dev_eui,
            "appKey": keys.app_key,
        })
    }

    /// Request body for creating an ABP device activation.
    ///
    /// `mac_version` comes from the device's profile and only matters
    /// on v2, where LoRaWAN 1.0 activations carry a single network
    /// session key fanned out across three fields.
    fn device_activation_body(
        &self,
        dev_eui: &str,
        activation: &DeviceActivation,
        mac_version: &str,
    ) -> Value {
        let _ = mac_version;
        json!({
            "devEUI": dev_eui,
            "devAddr": activation.dev_addr,
            "appSKey": activation.app_s_key,
            "nwkSKey": activation.f_nwk_s_int_key,
            "fCntUp": activation.f_cnt_up,
            "fCntDown": activation.n_f_cnt_down,
            "skipFCntCheck": false,
        })
    }

    /// Path and extra query parameters for listing an application's
    /// devices.
    ///
    /// v1 scopes the collection under the application; v2 exposes a
    /// flat collection filtered by `applicationID`.
    fn device_list_request(&self, application_id: &str) -> (String, Vec<(&'static str, String)>) {
        (format!("applications/{application_id}/devices"), Vec::new())
    }

    /// Request body for creating or updating a resource.
    ///
    /// v1 posts the resource directly; v2 nests it under a key named
    /// after the resource type.
    fn wrap_resource(&self, key: &str, resource: Value) -> Value {
        let _ = key;
        resource
    }

    /// Extract a resource from a GET response body.
    ///
    /// Mirror of [`wrap_resource`](Self::wrap_resource): v1 responses
    /// are the resource itself, v2 responses nest it.
    fn unwrap_resource(&self, body: Value, key: &str) -> Value {
        let _ = key;
        body
    }
}

/// The original (v1) LoRa App Server API.
#[derive(Debug, Clone, Copy, Default)]
pub struct V1;

impl ApiVersion for V1 {}

/// The v2 LoRa App Server API.
///
/// Bearer-prefixed auth, nested request/response bodies, and LoRaWAN
/// 1.1 key fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct V2;

impl ApiVersion for V2 {
    fn name(&self) -> &'static str {
        "v2"
    }

    fn auth_header(&self, jwt: &str) -> String {
        format!("Bearer {jwt}")
    }

    fn device_list_request(&self, application_id: &str) -> (String, Vec<(&'static str, String)>) {
        (
            "devices".to_owned(),
            vec![("applicationID", application_id.to_owned())],
        )
    }

    fn device_keys_body(&self, dev_eui: &str, keys: &DeviceKeys) -> Value {
        // v2 requires nwkKey; devices provisioned before LoRaWAN 1.1
        // have none, so fall back to the app key.
        let nwk_key = keys.nwk_key.as_deref().unwrap_or(&keys.app_key);
        json!({
            "deviceKeys": {
                "devEUI": dev_eui,
                "appKey": keys.app_key,
                "nwkKey": nwk_key,
            }
        })
    }

    fn device_activation_body(
        &self,
        dev_eui: &str,
        activation: &DeviceActivation,
        mac_version: &str,
    ) -> Value {
        let mut inner = json!({
            "devEUI": dev_eui,
            "devAddr": activation.dev_addr,
            "appSKey": activation.app_s_key,
            "fNwkSIntKey": activation.f_nwk_s_int_key,
            "sNwkSIntKey": activation.s_nwk_s_int_key,
            "nwkSEncKey": activation.nwk_s_enc_key,
            "fCntUp": activation.f_cnt_up,
            "nFCntDown": activation.n_f_cnt_down,
        });

        // LoRaWAN 1.0 has a single network session key. The v2 server
        // still expects all three 1.1 fields, each set to that key.
        if mac_version.starts_with("1.0") {
            inner["sNwkSIntKey"] = Value::String(activation.f_nwk_s_int_key.clone());
            inner["nwkSEncKey"] = Value::String(activation.f_nwk_s_int_key.clone());
        }

        json!({ "deviceActivation": inner })
    }

    fn wrap_resource(&self, key: &str, resource: Value) -> Value {
        json!({ key: resource })
    }

    fn unwrap_resource(&self, mut body: Value, key: &str) -> Value {
        match body.get_mut(key) {
            Some(inner) => inner.take(),
            None => body,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn otaa_keys() -> DeviceKeys {
        DeviceKeys {
            app_key: "0123456789abcdef0123456789abcdef".into(),
            nwk_key: None,
        }
    }

    fn abp_activation() -> DeviceActivation {
        DeviceActivation {
            dev_addr: "01dd4aa3".into(),
            app_s_key: "aa".repeat(16),
            f_nwk_s_int_key: "bb".repeat(16),
            s_nwk_s_int_key: None,
            nwk_s_enc_key: None,
            f_cnt_up: 0,
            n_f_cnt_down: 0,
        }
    }

    #[test]
    fn v1_device_keys_are_flat_without_nwk_key() {
        let body = V1.device_keys_body("deadbeef00000001", &otaa_keys());
        assert_eq!(body["devEUI"], "deadbeef00000001");
        assert_eq!(body["appKey"], "0123456789abcdef0123456789abcdef");
        assert!(body.get("nwkKey").is_none());
        assert!(body.get("deviceKeys").is_none());
    }

    #[test]
    fn v2_device_keys_default_nwk_key_to_app_key() {
        let body = V2.device_keys_body("deadbeef00000001", &otaa_keys());
        let keys = &body["deviceKeys"];
        assert_eq!(keys["appKey"], keys["nwkKey"]);
    }

    #[test]
    fn v2_device_keys_keep_explicit_nwk_key() {
        let mut keys = otaa_keys();
        keys.nwk_key = Some("ff".repeat(16));
        let body = V2.device_keys_body("deadbeef00000001", &keys);
        assert_eq!(body["deviceKeys"]["nwkKey"], "ff".repeat(16));
    }

    #[test]
    fn v1_activation_uses_single_session_key() {
        let body = V1.device_activation_body("deadbeef00000001", &abp_activation(), "1.0.3");
        assert_eq!(body["nwkSKey"], "bb".repeat(16));
        assert!(body.get("fNwkSIntKey").is_none());
    }

    #[test]
    fn v2_activation_expands_keys_for_lorawan_1_0() {
        let body = V2.device_activation_body("deadbeef00000001", &abp_activation(), "1.0.3");
        let act = &body["deviceActivation"];
        assert_eq!(act["sNwkSIntKey"], "bb".repeat(16));
        assert_eq!(act["nwkSEncKey"], "bb".repeat(16));
        assert_eq!(act["fNwkSIntKey"], "bb".repeat(16));
    }

    #[test]
    fn v2_activation_keeps_distinct_keys_for_lorawan_1_1() {
        let mut activation = abp_activation();
        activation.s_nwk_s_int_key = Some("cc".repeat(16));
        activation.nwk_s_enc_key = Some("dd".repeat(16));
        let body = V2.device_activation_body("deadbeef00000001", &activation, "1.1.0");
        let act = &body["deviceActivation"];
        assert_eq!(act["sNwkSIntKey"], "cc".repeat(16));
        assert_eq!(act["nwkSEncKey"], "dd".repeat(16));
    }

    #[test]
    fn auth_headers_differ_by_version() {
        assert_eq!(V1.auth_header("tok"), "tok");
        assert_eq!(V2.auth_header("tok"), "Bearer tok");
    }

    #[test]
    fn v2_unwraps_nested_get_responses() {
        let body = serde_json::json!({ "application": { "id": "7" } });
        let inner = V2.unwrap_resource(body, "application");
        assert_eq!(inner["id"], "7");
    }
}
