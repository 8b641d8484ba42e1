//! Registry API DTOs
//!
//! JSON bodies of the node's public registry endpoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const ENDPOINT_REGISTRY: &str = "/registry";

#[derive(Debug, Serialize, Deserialize)]
pub struct KeysResponse {
    pub keys: BTreeSet<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValuesResponse {
    pub values: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValueResponse {
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PutValueRequest {
    pub value: String,
}

/// Query string of a PUT. Replacing is off unless asked for.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PutParams {
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub group_deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
