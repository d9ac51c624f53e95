// Conversions between the local domain model and app-server wire
// types, both directions. Pure functions so they stay easy to test.

use lorahub_api::types as wire;

use crate::model::{
    AbpSession, Application, ApplicationLoraSettings, Company, Device, DeviceLoraSettings,
    DeviceNetworkTypeLink, DeviceProfile, DeviceProfileLoraSettings, OtaaKeys,
};

use super::AccountCredentials;

/// Service-profile name used for every default profile this server
/// creates. Also how a profile we created is recognized on pull.
pub const DEFAULT_SERVICE_PROFILE_NAME: &str = "defaultForLPWANServer";

const REMOTE_USER_NOTE: &str = "Created by and for LoRaHub";

// ── Local -> remote ──────────────────────────────────────────────────

pub fn new_organization(company: &Company) -> wire::NewOrganization {
    wire::NewOrganization {
        name: company.name.clone(),
        display_name: company.name.clone(),
        can_have_gateways: false,
    }
}

pub fn organization(remote_id: &str, company: &Company) -> wire::Organization {
    wire::Organization {
        id: remote_id.to_owned(),
        name: company.name.clone(),
        display_name: company.name.clone(),
        can_have_gateways: false,
    }
}

pub fn admin_user(credentials: &AccountCredentials, organization_id: &str) -> wire::NewUser {
    wire::NewUser {
        username: credentials.username.clone(),
        password: credentials.password.clone(),
        is_active: true,
        is_admin: false,
        session_ttl: 0,
        email: "fake@emailaddress.com".to_owned(),
        note: REMOTE_USER_NOTE.to_owned(),
        organizations: vec![wire::OrganizationAccess {
            is_admin: true,
            organization_id: organization_id.to_owned(),
        }],
    }
}

pub fn default_service_profile(
    organization_id: &str,
    network_server_id: &str,
) -> wire::ServiceProfile {
    wire::ServiceProfile {
        id: None,
        name: DEFAULT_SERVICE_PROFILE_NAME.to_owned(),
        network_server_id: network_server_id.to_owned(),
        organization_id: organization_id.to_owned(),
        add_gw_metadata: true,
        dev_status_req_freq: 1,
        dl_bucket_size: 0,
        ul_rate: 100_000,
        dl_rate: 100_000,
        ul_rate_policy: "DROP".to_owned(),
        dl_rate_policy: "DROP".to_owned(),
        dr_max: 3,
        dr_min: 0,
        report_dev_status_battery: true,
        report_dev_status_margin: true,
    }
}

pub fn remote_application(
    application: &Application,
    settings: Option<&ApplicationLoraSettings>,
    service_profile_id: &str,
    organization_id: &str,
) -> wire::Application {
    let settings = settings.cloned().unwrap_or_default();
    wire::Application {
        id: None,
        name: application.name.clone(),
        description: application.description.clone(),
        organization_id: organization_id.to_owned(),
        service_profile_id: service_profile_id.to_owned(),
        // "NONE" means no codec; the remote rejects it as a codec name.
        payload_codec: settings.payload_codec.filter(|c| c != "NONE"),
        payload_decoder_script: settings.payload_decoder_script,
        payload_encoder_script: settings.payload_encoder_script,
    }
}

pub fn remote_device_profile(
    profile: &DeviceProfile,
    network_server_id: &str,
    organization_id: &str,
) -> wire::DeviceProfile {
    let s = &profile.settings;
    wire::DeviceProfile {
        id: None,
        name: profile.name.clone(),
        organization_id: organization_id.to_owned(),
        network_server_id: network_server_id.to_owned(),
        mac_version: s.mac_version.clone(),
        reg_params_revision: s.reg_params_revision.clone(),
        supports_join: s.supports_join,
        rf_region: s.rf_region.clone(),
        supports_class_b: s.supports_class_b,
        supports_class_c: s.supports_class_c,
        max_eirp: s.max_eirp,
        rx_delay_1: s.rx_delay_1,
        rx_dr_offset_1: s.rx_dr_offset_1,
        rx_datarate_2: s.rx_datarate_2,
        rx_freq_2: s.rx_freq_2,
        factory_preset_freqs: s.factory_preset_freqs.clone(),
    }
}

pub fn remote_device(
    device: &Device,
    link: &DeviceNetworkTypeLink,
    dev_eui: &str,
    remote_application_id: &str,
    remote_device_profile_id: &str,
) -> wire::Device {
    wire::Device {
        dev_eui: dev_eui.to_owned(),
        name: device.name.clone(),
        description: device.description.clone(),
        application_id: remote_application_id.to_owned(),
        device_profile_id: remote_device_profile_id.to_owned(),
        skip_f_cnt_check: link.settings.skip_f_cnt_check,
    }
}

pub fn device_keys(keys: &OtaaKeys) -> wire::DeviceKeys {
    wire::DeviceKeys {
        app_key: keys.app_key.clone(),
        nwk_key: keys.nwk_key.clone(),
    }
}

pub fn device_activation(session: &AbpSession) -> wire::DeviceActivation {
    wire::DeviceActivation {
        dev_addr: session.dev_addr.clone(),
        app_s_key: session.app_s_key.clone(),
        f_nwk_s_int_key: session.f_nwk_s_int_key.clone(),
        s_nwk_s_int_key: session.s_nwk_s_int_key.clone(),
        nwk_s_enc_key: session.nwk_s_enc_key.clone(),
        f_cnt_up: session.f_cnt_up,
        n_f_cnt_down: session.n_f_cnt_down,
    }
}

// ── Remote -> local ──────────────────────────────────────────────────

pub fn application_settings_from_remote(app: &wire::Application) -> ApplicationLoraSettings {
    ApplicationLoraSettings {
        payload_codec: app.payload_codec.clone(),
        payload_decoder_script: app.payload_decoder_script.clone(),
        payload_encoder_script: app.payload_encoder_script.clone(),
    }
}

pub fn profile_settings_from_remote(profile: &wire::DeviceProfile) -> DeviceProfileLoraSettings {
    DeviceProfileLoraSettings {
        mac_version: profile.mac_version.clone(),
        reg_params_revision: profile.reg_params_revision.clone(),
        supports_join: profile.supports_join,
        rf_region: profile.rf_region.clone(),
        supports_class_b: profile.supports_class_b,
        supports_class_c: profile.supports_class_c,
        max_eirp: profile.max_eirp,
        rx_delay_1: profile.rx_delay_1,
        rx_dr_offset_1: profile.rx_dr_offset_1,
        rx_datarate_2: profile.rx_datarate_2,
        rx_freq_2: profile.rx_freq_2,
        factory_preset_freqs: profile.factory_preset_freqs.clone(),
    }
}

pub fn device_settings_from_remote(
    device: &wire::Device,
    keys: Option<&wire::DeviceKeys>,
    activation: Option<&wire::DeviceActivation>,
) -> DeviceLoraSettings {
    DeviceLoraSettings {
        dev_eui: Some(device.dev_eui.clone()),
        skip_f_cnt_check: device.skip_f_cnt_check,
        otaa_keys: keys.map(|k| OtaaKeys {
            app_key: k.app_key.clone(),
            nwk_key: k.nwk_key.clone(),
        }),
        abp_session: activation.map(|a| AbpSession {
            dev_addr: a.dev_addr.clone(),
            app_s_key: a.app_s_key.clone(),
            f_nwk_s_int_key: a.f_nwk_s_int_key.clone(),
            s_nwk_s_int_key: a.s_nwk_s_int_key.clone(),
            nwk_s_enc_key: a.nwk_s_enc_key.clone(),
            f_cnt_up: a.f_cnt_up,
            n_f_cnt_down: a.n_f_cnt_down,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::model::CompanyType;

    #[test]
    fn none_codec_is_dropped() {
        let app = Application {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "monitoring".into(),
            description: String::new(),
            base_url: String::new(),
            running: false,
        };
        let settings = ApplicationLoraSettings {
            payload_codec: Some("NONE".into()),
            ..Default::default()
        };
        let remote = remote_application(&app, Some(&settings), "sp-1", "org-1");
        assert_eq!(remote.payload_codec, None);
    }

    #[test]
    fn organizations_never_get_gateways() {
        let company = Company {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            company_type: CompanyType::Vendor,
        };
        assert!(!new_organization(&company).can_have_gateways);
        assert!(!organization("7", &company).can_have_gateways);
    }
}
