// ── HTTP routes ──
//
// Ingestion is unauthenticated: the remote network servers POST uplinks
// to URLs this server handed out. Unknown application or network ids
// get one generic 404 so the endpoint does not reveal which half of
// the URL was wrong.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use lorahub_core::{CoreError, Inventory};

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/ingest/{application_id}/{network_id}", post(ingest))
        .route("/api/networks/{network_id}/pull", post(pull_network))
        .route("/api/networks/{network_id}/push", post(push_network))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
}

fn error_response(err: &CoreError) -> Response {
    let status =
        StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

/// Uplink webhook target for remote http integrations.
async fn ingest(
    State(state): State<Arc<AppState>>,
    Path((application_id, network_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<serde_json::Value>,
) -> Response {
    if !state.networks.contains_key(&network_id) {
        warn!(%network_id, "uplink for unknown network");
        return not_found();
    }
    let application = match state.inventory.application(application_id).await {
        Ok(app) => app,
        Err(err) if err.is_not_found() => {
            warn!(%application_id, "uplink for unknown application");
            return not_found();
        }
        Err(err) => return error_response(&err),
    };

    if state.seen_delivery(application_id, network_id, &payload) {
        debug!(%application_id, "duplicate uplink delivery, dropping");
        return StatusCode::NO_CONTENT.into_response();
    }

    match state.handler.handle_uplink(&application, &payload).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(&err),
    }
}

/// Import the remote network's entities into the local inventory.
async fn pull_network(
    State(state): State<Arc<AppState>>,
    Path(network_id): Path<Uuid>,
) -> Response {
    let Some(entry) = state.networks.get(&network_id) else {
        return not_found();
    };
    info!(network = %entry.network.name, "pull requested");
    match state
        .handler
        .pull_network(&entry.network, entry.client.as_ref())
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            warn!(network = %entry.network.name, %err, "pull failed");
            error_response(&err)
        }
    }
}

/// Push every local entity to the remote network.
async fn push_network(
    State(state): State<Arc<AppState>>,
    Path(network_id): Path<Uuid>,
) -> Response {
    let Some(entry) = state.networks.get(&network_id) else {
        return not_found();
    };
    info!(network = %entry.network.name, "push requested");
    match state
        .handler
        .push_network(&entry.network, entry.client.as_ref())
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            warn!(network = %entry.network.name, %err, "push failed");
            error_response(&err)
        }
    }
}
