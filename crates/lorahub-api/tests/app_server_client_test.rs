#![allow(clippy::unwrap_used)]
// Integration tests for `AppServerClient` using wiremock.

use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use lorahub_api::types::{Device, DeviceActivation, DeviceKeys, ListParams, NewOrganization};
use lorahub_api::{ApiVersion, AppServerClient, Credentials, Error, V1, V2};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(version: Arc<dyn ApiVersion>) -> (MockServer, AppServerClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = AppServerClient::with_client(
        reqwest::Client::new(),
        base_url,
        Credentials::new("admin", "admin"),
        version,
    );
    (server, client)
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/internal/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jwt": "test-jwt" })))
        .mount(server)
        .await;
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup(Arc::new(V1)).await;

    Mock::given(method("POST"))
        .and(path("/api/internal/login"))
        .and(body_json(json!({ "username": "admin", "password": "admin" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jwt": "abc" })))
        .mount(&server)
        .await;

    client.login().await.unwrap();
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup(Arc::new(V1)).await;

    Mock::given(method("POST"))
        .and(path("/api/internal/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid credentials" })),
        )
        .mount(&server)
        .await;

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_v1_sends_raw_jwt_header() {
    let (server, client) = setup(Arc::new(V1)).await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/organizations"))
        .and(header("Grpc-Metadata-Authorization", "test-jwt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": [], "totalCount": 0 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .list_organizations(&ListParams::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_v2_sends_bearer_jwt_header() {
    let (server, client) = setup(Arc::new(V2)).await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/organizations"))
        .and(header("Grpc-Metadata-Authorization", "Bearer test-jwt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": [], "totalCount": "0" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .list_organizations(&ListParams::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_session_expiry_maps_to_error() {
    let (server, client) = setup(Arc::new(V1)).await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/organizations/9"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.get_organization("9").await;
    assert!(matches!(result, Err(Error::SessionExpired)));
    assert!(result.unwrap_err().is_auth_expired());
}

// ── Organizations ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_organizations_with_search() {
    let (server, client) = setup(Arc::new(V1)).await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/organizations"))
        .and(query_param("search", "Acme"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "id": "7", "name": "acme", "displayName": "Acme Corp" }],
            "totalCount": 1
        })))
        .mount(&server)
        .await;

    let resp = client
        .list_organizations(&ListParams::default().search("Acme").limit(1))
        .await
        .unwrap();
    assert_eq!(resp.result.len(), 1);
    assert_eq!(resp.result[0].id, "7");
    assert_eq!(resp.total_count, Some(1));
}

#[tokio::test]
async fn test_create_organization_returns_id() {
    let (server, client) = setup(Arc::new(V1)).await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/organizations"))
        .and(body_json(json!({
            "name": "acme",
            "displayName": "Acme Corp",
            "canHaveGateways": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "12" })))
        .mount(&server)
        .await;

    let id = client
        .create_organization(&NewOrganization {
            name: "acme".into(),
            display_name: "Acme Corp".into(),
            can_have_gateways: false,
        })
        .await
        .unwrap();
    assert_eq!(id, "12");
}

#[tokio::test]
async fn test_v2_wraps_create_bodies() {
    let (server, client) = setup(Arc::new(V2)).await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/organizations"))
        .and(body_json(json!({
            "organization": {
                "name": "acme",
                "displayName": "Acme Corp",
                "canHaveGateways": false
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "12" })))
        .mount(&server)
        .await;

    let id = client
        .create_organization(&NewOrganization {
            name: "acme".into(),
            display_name: "Acme Corp".into(),
            can_have_gateways: false,
        })
        .await
        .unwrap();
    assert_eq!(id, "12");
}

#[tokio::test]
async fn test_v2_unwraps_get_responses() {
    let (server, client) = setup(Arc::new(V2)).await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/organizations/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organization": { "id": "7", "name": "acme", "displayName": "Acme Corp" }
        })))
        .mount(&server)
        .await;

    let org = client.get_organization("7").await.unwrap();
    assert_eq!(org.name, "acme");
}

#[tokio::test]
async fn test_not_found_is_detectable() {
    let (server, client) = setup(Arc::new(V1)).await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/applications/99/integrations/http"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "object does not exist" })),
        )
        .mount(&server)
        .await;

    let err = client.get_http_integration("99").await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
    assert_eq!(err.status(), Some(404));
}

// ── Devices ─────────────────────────────────────────────────────────

fn sample_device() -> Device {
    Device {
        dev_eui: "0004a30b001fbe44".into(),
        name: "soil-probe-7".into(),
        description: String::new(),
        application_id: "31".into(),
        device_profile_id: "dp-1".into(),
        skip_f_cnt_check: false,
    }
}

#[tokio::test]
async fn test_v1_lists_devices_under_application() {
    let (server, client) = setup(Arc::new(V1)).await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/applications/31/devices"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": [], "totalCount": 0 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .list_devices("31", &ListParams::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_v2_lists_devices_by_filter() {
    let (server, client) = setup(Arc::new(V2)).await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .and(query_param("applicationID", "31"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": [], "totalCount": "0" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .list_devices("31", &ListParams::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_v1_device_keys_body_is_flat() {
    let (server, client) = setup(Arc::new(V1)).await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/devices/0004a30b001fbe44/keys"))
        .and(body_json(json!({
            "devEUI": "0004a30b001fbe44",
            "appKey": "00112233445566778899aabbccddeeff"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_device_keys(
            "0004a30b001fbe44",
            &DeviceKeys {
                app_key: "00112233445566778899aabbccddeeff".into(),
                nwk_key: None,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_v2_device_keys_body_is_wrapped_with_nwk_key_fallback() {
    let (server, client) = setup(Arc::new(V2)).await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/devices/0004a30b001fbe44/keys"))
        .and(body_json(json!({
            "deviceKeys": {
                "devEUI": "0004a30b001fbe44",
                "appKey": "00112233445566778899aabbccddeeff",
                "nwkKey": "00112233445566778899aabbccddeeff"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_device_keys(
            "0004a30b001fbe44",
            &DeviceKeys {
                app_key: "00112233445566778899aabbccddeeff".into(),
                nwk_key: None,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_v2_activation_expands_lorawan_1_0_keys() {
    let (server, client) = setup(Arc::new(V2)).await;
    mount_login(&server).await;

    let session_key = "bb".repeat(16);
    let expected = session_key.clone();
    Mock::given(method("POST"))
        .and(path("/api/devices/0004a30b001fbe44/activate"))
        .and(move |req: &Request| {
            let body: serde_json::Value = match serde_json::from_slice(&req.body) {
                Ok(v) => v,
                Err(_) => return false,
            };
            let act = &body["deviceActivation"];
            act["fNwkSIntKey"] == expected.as_str()
                && act["sNwkSIntKey"] == expected.as_str()
                && act["nwkSEncKey"] == expected.as_str()
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .activate_device(
            "0004a30b001fbe44",
            &DeviceActivation {
                dev_addr: "01dd4aa3".into(),
                app_s_key: "aa".repeat(16),
                f_nwk_s_int_key: session_key,
                s_nwk_s_int_key: None,
                nwk_s_enc_key: None,
                f_cnt_up: 0,
                n_f_cnt_down: 0,
            },
            "1.0.3",
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_and_delete_device() {
    let (server, client) = setup(Arc::new(V1)).await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/devices/0004a30b001fbe44"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client.create_device(&sample_device()).await.unwrap();
    client.delete_device("0004a30b001fbe44").await.unwrap();
}
