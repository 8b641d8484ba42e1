use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::post,
};
use std::sync::Arc;

use super::memory::MemoryCluster;
use super::protocol::{
    CreateRequest, CreateResponse, ENDPOINT_STORE, GetRequest, GetResponse, RemoveRequest,
    ReplaceRequest, SwapResponse,
};

/// Routes that let peers run the conditional primitives on this node's maps.
pub fn store_router(cluster: Arc<MemoryCluster>) -> Router {
    Router::new()
        .route(
            &format!("{}/:map/get", ENDPOINT_STORE),
            post(handle_store_get),
        )
        .route(
            &format!("{}/:map/create", ENDPOINT_STORE),
            post(handle_store_create),
        )
        .route(
            &format!("{}/:map/replace", ENDPOINT_STORE),
            post(handle_store_replace),
        )
        .route(
            &format!("{}/:map/remove", ENDPOINT_STORE),
            post(handle_store_remove),
        )
        .layer(Extension(cluster))
}

pub async fn handle_store_get(
    Extension(cluster): Extension<Arc<MemoryCluster>>,
    Path(map): Path<String>,
    Json(req): Json<GetRequest>,
) -> (StatusCode, Json<GetResponse>) {
    let value = cluster.map(&map).get_local(&req.key);
    tracing::trace!("store get {}/{} -> present={}", map, req.key, value.is_some());
    (StatusCode::OK, Json(GetResponse { value }))
}

pub async fn handle_store_create(
    Extension(cluster): Extension<Arc<MemoryCluster>>,
    Path(map): Path<String>,
    Json(req): Json<CreateRequest>,
) -> (StatusCode, Json<CreateResponse>) {
    let previous = cluster.map(&map).create_local(&req.key, req.value);
    tracing::trace!(
        "store create {}/{} -> applied={}",
        map,
        req.key,
        previous.is_none()
    );
    (StatusCode::OK, Json(CreateResponse { previous }))
}

pub async fn handle_store_replace(
    Extension(cluster): Extension<Arc<MemoryCluster>>,
    Path(map): Path<String>,
    Json(req): Json<ReplaceRequest>,
) -> (StatusCode, Json<SwapResponse>) {
    let applied = cluster
        .map(&map)
        .replace_local(&req.key, &req.expected, req.value);
    tracing::trace!("store replace {}/{} -> applied={}", map, req.key, applied);
    (StatusCode::OK, Json(SwapResponse { applied }))
}

pub async fn handle_store_remove(
    Extension(cluster): Extension<Arc<MemoryCluster>>,
    Path(map): Path<String>,
    Json(req): Json<RemoveRequest>,
) -> (StatusCode, Json<SwapResponse>) {
    let applied = cluster.map(&map).remove_local(&req.key, &req.expected);
    tracing::trace!("store remove {}/{} -> applied={}", map, req.key, applied);
    (StatusCode::OK, Json(SwapResponse { applied }))
}
