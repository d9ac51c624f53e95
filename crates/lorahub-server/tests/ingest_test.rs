#![allow(clippy::unwrap_used)]
// Ingestion endpoint tests against the real router with a recording
// forwarder behind it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use tower::ServiceExt;
use uuid::Uuid;

use lorahub_api::{AppServerClient, Credentials, TransportConfig, V1};
use lorahub_core::inventory::{Inventory, MemoryInventory, WriteOrigin};
use lorahub_core::model::{Application, Company, CompanyType, Network, ProtocolVersion};
use lorahub_core::protocol_data::MemoryProtocolData;
use lorahub_core::remote::NetworkClient;
use lorahub_core::reporting::UplinkForwarder;
use lorahub_core::{CoreError, LoraHandler};
use lorahub_server::{AppState, NetworkEntry, router};

#[derive(Default)]
struct RecordingForwarder {
    deliveries: Mutex<Vec<(String, serde_json::Value)>>,
}

#[async_trait]
impl UplinkForwarder for RecordingForwarder {
    async fn forward(
        &self,
        destination: &str,
        payload: &serde_json::Value,
    ) -> Result<(), CoreError> {
        self.deliveries
            .lock()
            .unwrap()
            .push((destination.to_owned(), payload.clone()));
        Ok(())
    }
}

struct Fixture {
    app: Router,
    forwarder: Arc<RecordingForwarder>,
    application_id: Uuid,
    network_id: Uuid,
}

/// A client pointed at a dead address; ingestion never touches it.
fn offline_client(network: &Network) -> Arc<dyn NetworkClient> {
    let client = AppServerClient::new(
        network.base_url.parse().unwrap(),
        Credentials::new(&network.username, "secret"),
        Arc::new(V1),
        &TransportConfig::default(),
    )
    .unwrap();
    Arc::new(client)
}

async fn fixture() -> Fixture {
    let inventory = Arc::new(MemoryInventory::new());
    let company = inventory
        .create_company(
            Company {
                id: Uuid::new_v4(),
                name: "Acme".into(),
                company_type: CompanyType::Admin,
            },
            WriteOrigin::Local,
        )
        .await
        .unwrap();
    let application = inventory
        .create_application(
            Application {
                id: Uuid::new_v4(),
                company_id: company.id,
                name: "monitoring".into(),
                description: String::new(),
                base_url: "http://reports.example/in".into(),
                running: true,
            },
            WriteOrigin::Local,
        )
        .await
        .unwrap();

    let network = Network {
        id: Uuid::new_v4(),
        network_type_id: Uuid::new_v4(),
        network_protocol_id: Uuid::new_v4(),
        name: "lora-v1".into(),
        enabled: true,
        base_url: "http://127.0.0.1:9".into(),
        version: ProtocolVersion::V1,
        username: "admin".into(),
        password: SecretString::from("admin"),
    };
    let client = offline_client(&network);
    let network_id = network.id;
    let mut networks = HashMap::new();
    networks.insert(network_id, NetworkEntry { network, client });

    let forwarder = Arc::new(RecordingForwarder::default());
    let handler = LoraHandler::new(
        inventory.clone(),
        Arc::new(MemoryProtocolData::new()),
        forwarder.clone(),
        "https://lorahub.example",
    );
    let state = Arc::new(AppState::new(handler, inventory, networks));
    Fixture {
        app: router(state),
        forwarder,
        application_id: application.id,
        network_id,
    }
}

fn post_json(uri: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn ingest_forwards_uplink_to_application() {
    let fx = fixture().await;
    let payload = serde_json::json!({ "devEUI": "0004a30b001fbe44", "data": "AQID" });
    let uri = format!("/api/ingest/{}/{}", fx.application_id, fx.network_id);

    let response = fx.app.clone().oneshot(post_json(&uri, &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let deliveries = fx.forwarder.deliveries.lock().unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, "http://reports.example/in");
    assert_eq!(deliveries[0].1, payload);
}

#[tokio::test]
async fn duplicate_deliveries_are_dropped() {
    let fx = fixture().await;
    let payload = serde_json::json!({ "devEUI": "0004a30b001fbe44", "fCnt": 7 });
    let uri = format!("/api/ingest/{}/{}", fx.application_id, fx.network_id);

    let first = fx.app.clone().oneshot(post_json(&uri, &payload)).await.unwrap();
    let second = fx.app.clone().oneshot(post_json(&uri, &payload)).await.unwrap();
    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    assert_eq!(second.status(), StatusCode::NO_CONTENT);

    assert_eq!(fx.forwarder.deliveries.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn distinct_payloads_are_both_forwarded() {
    let fx = fixture().await;
    let uri = format!("/api/ingest/{}/{}", fx.application_id, fx.network_id);

    for f_cnt in [1, 2] {
        let payload = serde_json::json!({ "devEUI": "0004a30b001fbe44", "fCnt": f_cnt });
        let response = fx.app.clone().oneshot(post_json(&uri, &payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    assert_eq!(fx.forwarder.deliveries.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_ids_get_one_generic_not_found() {
    let fx = fixture().await;
    let payload = serde_json::json!({ "data": "AQID" });

    let bad_app = format!("/api/ingest/{}/{}", Uuid::new_v4(), fx.network_id);
    let bad_net = format!("/api/ingest/{}/{}", fx.application_id, Uuid::new_v4());

    let app_resp = fx.app.clone().oneshot(post_json(&bad_app, &payload)).await.unwrap();
    let net_resp = fx.app.clone().oneshot(post_json(&bad_net, &payload)).await.unwrap();
    assert_eq!(app_resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(net_resp.status(), StatusCode::NOT_FOUND);

    // Identical bodies: the endpoint must not reveal which id was wrong.
    assert_eq!(body_json(app_resp).await, body_json(net_resp).await);
    assert!(fx.forwarder.deliveries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn sync_endpoints_reject_unknown_networks() {
    let fx = fixture().await;
    let uri = format!("/api/networks/{}/pull", Uuid::new_v4());

    let response = fx
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn healthz_responds() {
    let fx = fixture().await;
    let response = fx
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));
}
