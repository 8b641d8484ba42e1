use super::protocol::*;
use super::store::{Cluster, ConditionalStore, StoreError};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_millis(2000);
const CONNECT_ATTEMPTS: usize = 3;

/// Client for the maps hosted by a peer node.
pub struct HttpCluster {
    host: SocketAddr,
    http_client: reqwest::Client,
}

impl HttpCluster {
    pub fn new(host: SocketAddr) -> Arc<Self> {
        Arc::new(Self {
            host,
            http_client: reqwest::Client::new(),
        })
    }

    pub fn host(&self) -> SocketAddr {
        self.host
    }
}

#[async_trait]
impl Cluster for HttpCluster {
    async fn shared_map(&self, name: &str) -> Result<Arc<dyn ConditionalStore>, StoreError> {
        validate_map_name(name).map_err(StoreError::InvalidName)?;
        let store = HttpStore {
            host: self.host,
            map: name.to_string(),
            http_client: self.http_client.clone(),
        };
        // Touch the map so an unreachable host fails the binding, not the first write.
        store.get("").await?;
        tracing::info!("Bound shared map {} on {}", name, self.host);
        Ok(Arc::new(store))
    }
}

/// One named map on a remote host.
pub struct HttpStore {
    host: SocketAddr,
    map: String,
    http_client: reqwest::Client,
}

impl HttpStore {
    /// Sends a request, resending only when the connection was never made.
    ///
    /// Once a conditional write has reached the host its outcome is unknown
    /// to us if the response is lost, so those errors are returned as is.
    async fn post_with_retry<T: Serialize, R: DeserializeOwned>(
        &self,
        op: &str,
        payload: &T,
    ) -> Result<R, StoreError> {
        let url = format!("http://{}{}", self.host, store_path(&self.map, op));
        let mut delay_ms = 150u64;

        for attempt in 0..CONNECT_ATTEMPTS {
            let response = self
                .http_client
                .post(url.clone())
                .json(payload)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    if !resp.status().is_success() {
                        return Err(StoreError::Status(resp.status().as_u16()));
                    }
                    return resp
                        .json::<R>()
                        .await
                        .map_err(|e| StoreError::Codec(e.to_string()));
                }
                Err(e) if e.is_connect() && attempt + 1 < CONNECT_ATTEMPTS => {
                    tracing::warn!("Connect to {} failed ({}), retrying", self.host, e);
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
                Err(e) => return Err(StoreError::Transport(e.to_string())),
            }
        }

        Err(StoreError::Transport("connect attempts exhausted".to_string()))
    }
}

#[async_trait]
impl ConditionalStore for HttpStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let response: GetResponse = self
            .post_with_retry(
                OP_GET,
                &GetRequest {
                    key: key.to_string(),
                },
            )
            .await?;
        Ok(response.value)
    }

    async fn create_if_absent(
        &self,
        key: &str,
        value: String,
    ) -> Result<Option<String>, StoreError> {
        let response: CreateResponse = self
            .post_with_retry(
                OP_CREATE,
                &CreateRequest {
                    key: key.to_string(),
                    value,
                },
            )
            .await?;
        Ok(response.previous)
    }

    async fn replace_if_matches(
        &self,
        key: &str,
        expected: &str,
        value: String,
    ) -> Result<bool, StoreError> {
        let response: SwapResponse = self
            .post_with_retry(
                OP_REPLACE,
                &ReplaceRequest {
                    key: key.to_string(),
                    expected: expected.to_string(),
                    value,
                },
            )
            .await?;
        Ok(response.applied)
    }

    async fn remove_if_matches(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let response: SwapResponse = self
            .post_with_retry(
                OP_REMOVE,
                &RemoveRequest {
                    key: key.to_string(),
                    expected: expected.to_string(),
                },
            )
            .await?;
        Ok(response.applied)
    }
}
