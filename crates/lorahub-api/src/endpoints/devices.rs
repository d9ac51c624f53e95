// Device endpoints
//
// The most version-sensitive group: OTAA keys, ABP activations, and
// the downlink queue all changed shape between v1 and v2, so their
// request bodies come from the client's `ApiVersion` strategy.

use serde_json::Value;

use crate::client::AppServerClient;
use crate::error::Error;
use crate::types::{
    Device, DeviceActivation, DeviceKeys, DownlinkMessage, ListParams, ListResponse,
};

impl AppServerClient {
    /// List an application's devices.
    pub async fn list_devices(
        &self,
        application_id: &str,
        params: &ListParams,
    ) -> Result<ListResponse<Device>, Error> {
        let (path, mut query) = self.version().device_list_request(application_id);
        query.extend(params.to_query());
        self.get(&path, &query).await
    }

    /// Fetch a single device by EUI.
    pub async fn get_device(&self, dev_eui: &str) -> Result<Device, Error> {
        self.get_resource(&format!("devices/{dev_eui}"), "device")
            .await
    }

    /// Register a device.
    ///
    /// The device's EUI is its remote identifier; nothing new comes
    /// back from the server.
    pub async fn create_device(&self, device: &Device) -> Result<(), Error> {
        self.post_resource("devices", "device", device)
            .await
            .map(|_| ())
    }

    /// Update a device in place.
    pub async fn update_device(&self, dev_eui: &str, device: &Device) -> Result<(), Error> {
        self.put_resource(&format!("devices/{dev_eui}"), "device", device)
            .await
            .map(|_| ())
    }

    /// Delete a device by EUI.
    pub async fn delete_device(&self, dev_eui: &str) -> Result<(), Error> {
        self.delete(&format!("devices/{dev_eui}")).await
    }

    // ── OTAA keys ────────────────────────────────────────────────────

    /// Fetch a device's OTAA root keys.
    pub async fn get_device_keys(&self, dev_eui: &str) -> Result<DeviceKeys, Error> {
        self.get_resource(&format!("devices/{dev_eui}/keys"), "deviceKeys")
            .await
    }

    /// Set a device's OTAA root keys.
    pub async fn create_device_keys(
        &self,
        dev_eui: &str,
        keys: &DeviceKeys,
    ) -> Result<(), Error> {
        let body = self.version().device_keys_body(dev_eui, keys);
        self.post_raw(&format!("devices/{dev_eui}/keys"), &body)
            .await
            .map(|_| ())
    }

    /// Replace a device's OTAA root keys.
    pub async fn update_device_keys(
        &self,
        dev_eui: &str,
        keys: &DeviceKeys,
    ) -> Result<(), Error> {
        let body = self.version().device_keys_body(dev_eui, keys);
        self.put_raw(&format!("devices/{dev_eui}/keys"), &body)
            .await
            .map(|_| ())
    }

    /// Remove a device's OTAA root keys.
    pub async fn delete_device_keys(&self, dev_eui: &str) -> Result<(), Error> {
        self.delete(&format!("devices/{dev_eui}/keys")).await
    }

    // ── ABP activation ───────────────────────────────────────────────

    /// Fetch a device's current activation (session state).
    pub async fn get_device_activation(&self, dev_eui: &str) -> Result<DeviceActivation, Error> {
        self.get_resource(&format!("devices/{dev_eui}/activation"), "deviceActivation")
            .await
    }

    /// Activate a device with a pre-provisioned (ABP) session.
    ///
    /// `mac_version` comes from the device's profile; on v2 it decides
    /// whether the LoRaWAN 1.0 single-session-key expansion applies.
    pub async fn activate_device(
        &self,
        dev_eui: &str,
        activation: &DeviceActivation,
        mac_version: &str,
    ) -> Result<(), Error> {
        let body = self
            .version()
            .device_activation_body(dev_eui, activation, mac_version);
        self.post_raw(&format!("devices/{dev_eui}/activate"), &body)
            .await
            .map(|_| ())
    }

    /// Clear a device's activation.
    pub async fn deactivate_device(&self, dev_eui: &str) -> Result<(), Error> {
        self.delete(&format!("devices/{dev_eui}/activation")).await
    }

    // ── Downlink queue ───────────────────────────────────────────────

    /// Enqueue a downlink for the device.
    pub async fn enqueue_downlink(
        &self,
        dev_eui: &str,
        message: &DownlinkMessage,
    ) -> Result<(), Error> {
        let mut item = serde_json::to_value(message).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })?;
        item["devEUI"] = Value::String(dev_eui.to_owned());
        let body = self.version().wrap_resource("deviceQueueItem", item);
        self.post_raw(&format!("devices/{dev_eui}/queue"), &body)
            .await
            .map(|_| ())
    }

    /// Drop every queued downlink for the device.
    pub async fn flush_downlink_queue(&self, dev_eui: &str) -> Result<(), Error> {
        self.delete(&format!("devices/{dev_eui}/queue")).await
    }
}
