use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::protocol::{
    ENDPOINT_REGISTRY, ErrorResponse, KeysResponse, PutParams, PutValueRequest, RemoveResponse,
    ValueResponse, ValuesResponse,
};
use crate::locked::errors::{ErrorType, MapError};
use crate::locked::map::LockedGroupMap;

/// The locked maps this node serves, by name.
pub type RegistryMaps = Arc<HashMap<String, LockedGroupMap>>;

pub fn registry_router(maps: RegistryMaps) -> Router {
    Router::new()
        .route(&format!("{}/:map", ENDPOINT_REGISTRY), get(handle_get_keys))
        .route(
            &format!("{}/:map/:primary", ENDPOINT_REGISTRY),
            get(handle_get_group),
        )
        .route(
            &format!("{}/:map/:primary/:secondary", ENDPOINT_REGISTRY),
            get(handle_get_value)
                .put(handle_put_value)
                .delete(handle_remove_value),
        )
        .layer(Extension(maps))
}

impl IntoResponse for MapError {
    fn into_response(self) -> Response {
        let status = match self.error_type() {
            ErrorType::Internal => {
                tracing::error!("Registry operation failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::User => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

fn lookup<'a>(maps: &'a RegistryMaps, name: &str) -> Result<&'a LockedGroupMap, MapError> {
    maps.get(name)
        .ok_or_else(|| MapError::NotFound(format!("map {}", name)))
}

pub async fn handle_get_keys(
    Extension(maps): Extension<RegistryMaps>,
    Path(map): Path<String>,
) -> Result<Json<KeysResponse>, MapError> {
    let keys = lookup(&maps, &map)?.get_all_keys().await?;
    Ok(Json(KeysResponse { keys }))
}

pub async fn handle_get_group(
    Extension(maps): Extension<RegistryMaps>,
    Path((map, primary)): Path<(String, String)>,
) -> Result<Json<ValuesResponse>, MapError> {
    let values = lookup(&maps, &map)?.get_group_values(&primary).await?;
    Ok(Json(ValuesResponse { values }))
}

pub async fn handle_get_value(
    Extension(maps): Extension<RegistryMaps>,
    Path((map, primary, secondary)): Path<(String, String, String)>,
) -> Result<Json<ValueResponse>, MapError> {
    let value = lookup(&maps, &map)?
        .get_value(&primary, &secondary)
        .await?;
    Ok(Json(ValueResponse { value }))
}

pub async fn handle_put_value(
    Extension(maps): Extension<RegistryMaps>,
    Path((map, primary, secondary)): Path<(String, String, String)>,
    Query(params): Query<PutParams>,
    Json(req): Json<PutValueRequest>,
) -> Result<StatusCode, MapError> {
    lookup(&maps, &map)?
        .add_or_replace(params.replace, &primary, &secondary, &req.value)
        .await?;
    tracing::info!("Stored {}/{} in {}", primary, secondary, map);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_remove_value(
    Extension(maps): Extension<RegistryMaps>,
    Path((map, primary, secondary)): Path<(String, String, String)>,
) -> Result<Json<RemoveResponse>, MapError> {
    let group_deleted = lookup(&maps, &map)?.remove(&primary, &secondary).await?;
    tracing::info!("Removed {}/{} from {}", primary, secondary, map);
    Ok(Json(RemoveResponse { group_deleted }))
}
