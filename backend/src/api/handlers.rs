use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::AppState;
use crate::ai::{LayerKind, LayerTypeInfo};
use crate::error::{ApiError, BuilderError};

#[derive(Serialize, Debug)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct AddLayerRequest {
    #[serde(rename = "type")]
    pub layer_type: String,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

#[derive(Deserialize, Debug)]
pub struct ConnectRequest {
    pub source: usize,
    pub target: usize,
}

type Created = (StatusCode, Json<Value>);

fn created(id: impl Serialize) -> Created {
    (StatusCode::CREATED, Json(json!({ "id": id })))
}

// Network ids are opaque path segments; anything that is not a stored id is not found.
fn parse_network_id(segment: Result<Path<String>, PathRejection>) -> Result<u64, ApiError> {
    let Path(raw) = segment?;
    raw.parse().map_err(|_| ApiError::UnknownNetworkId(raw))
}

pub async fn hello_world() -> &'static str {
    "Hello, World!"
}

pub async fn test() -> Json<ApiResponse> {
    Json(ApiResponse {
        status: "success".into(),
        message: "API is working!".into(),
    })
}

pub async fn list_layer_types(State(state): State<AppState>) -> Json<Value> {
    let layer_types = state.catalog.list();
    tracing::debug!("Listing {} layer types", layer_types.len());
    Json(json!({ "layer_types": layer_types }))
}

pub async fn get_layer_type(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<LayerTypeInfo>, ApiError> {
    state
        .catalog
        .lookup(&name)
        .map(Json)
        .ok_or(ApiError::LayerTypeNotFound(name))
}

pub async fn create_network(State(state): State<AppState>) -> Created {
    let id = state.lock_store().create();
    tracing::info!("🧠 Created network {}", id);
    created(id)
}

pub async fn list_networks(State(state): State<AppState>) -> Json<Value> {
    let store = state.lock_store();
    let networks: Vec<Value> = store.iter().map(|network| network.summary()).collect();
    Json(json!({ "networks": networks }))
}

pub async fn get_network(
    State(state): State<AppState>,
    segment: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let network_id = parse_network_id(segment)?;
    let store = state.lock_store();
    Ok(Json(store.get(network_id)?.to_value()))
}

pub async fn delete_network(
    State(state): State<AppState>,
    segment: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let network_id = parse_network_id(segment)?;
    state.lock_store().remove(network_id)?;
    tracing::info!("🗑️ Deleted network {}", network_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_layer(
    State(state): State<AppState>,
    segment: Result<Path<String>, PathRejection>,
    payload: Result<Json<AddLayerRequest>, JsonRejection>,
) -> Result<Created, ApiError> {
    let network_id = parse_network_id(segment)?;
    let Json(payload) = payload?;

    let kind = LayerKind::from_name(&payload.layer_type)
        .ok_or_else(|| BuilderError::UnknownLayerType(payload.layer_type.clone()))?;
    let params = payload.params.unwrap_or_default();
    // Build before locking so a bad request never touches the store
    let layer = kind.instantiate(&params)?;

    let mut store = state.lock_store();
    let layer_id = store.get_mut(network_id)?.add_layer(layer);
    tracing::info!("➕ Added {} as layer {} to network {}", kind, layer_id, network_id);
    Ok(created(layer_id))
}

pub async fn connect_layers(
    State(state): State<AppState>,
    segment: Result<Path<String>, PathRejection>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Created, ApiError> {
    let network_id = parse_network_id(segment)?;
    let Json(payload) = payload?;

    let mut store = state.lock_store();
    let connection_id = store.get_mut(network_id)?.connect(payload.source, payload.target)?;
    tracing::info!(
        "🔗 Connected layer {} -> {} in network {}",
        payload.source,
        payload.target,
        network_id
    );
    Ok(created(connection_id))
}
