//! Store Network Protocol
//!
//! Endpoints and DTOs used by peers to run the conditional primitives
//! against the node that hosts the shared maps.
//!
//! Every request names the map and the key; the conditional ones carry the
//! expected old value verbatim so the comparison happens on the host.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Prefix under which a hosting node exposes its maps.
pub const ENDPOINT_STORE: &str = "/internal/store";
pub const OP_GET: &str = "get";
pub const OP_CREATE: &str = "create";
pub const OP_REPLACE: &str = "replace";
pub const OP_REMOVE: &str = "remove";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct GetRequest {
    pub key: String,
}

/// `value` is `None` when the key is absent.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetResponse {
    pub value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRequest {
    pub key: String,
    pub value: String,
}

/// `previous` is `None` when the create happened, otherwise the value that
/// was already stored.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
    pub previous: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplaceRequest {
    pub key: String,
    pub expected: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub key: String,
    pub expected: String,
}

/// Outcome of a conditional replace or remove.
#[derive(Debug, Serialize, Deserialize)]
pub struct SwapResponse {
    pub applied: bool,
}

/// Map names travel as a single URL path segment, so they are limited to
/// characters that never need escaping there.
pub fn validate_map_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("map name must not be empty".to_string());
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(format!("map name {:?} contains invalid character {:?}", name, c));
    }
    Ok(())
}

pub fn store_path(map: &str, op: &str) -> String {
    format!("{}/{}/{}", ENDPOINT_STORE, map, op)
}
