//! Ecs API client.
//!
//! One TCP connection per call, HTTP/1.1 via hyper, JSON bodies. Every call
//! is bounded by the configured timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::Method;
use http_body_util::{BodyExt, Full};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use qz_core::EcsConfig;
use qzcloud_state::{LineId, NodeId};

use crate::error::{EcsError, EcsResult};
use crate::types::{CreatedVps, Envelope, NodeChoice, ProvisionRequest};

/// Operations qzcloud needs from the Ecs automation service.
pub trait EcsApi: Send + Sync {
    /// Ask the Ecs scheduler for a node on `line_id`. `None` means no capacity.
    fn get_node_id(&self, line_id: LineId) -> impl Future<Output = EcsResult<Option<NodeId>>> + Send;

    /// Create a VPS.
    fn create_vps(
        &self,
        request: &ProvisionRequest,
    ) -> impl Future<Output = EcsResult<CreatedVps>> + Send;
}

impl<T: EcsApi> EcsApi for Arc<T> {
    fn get_node_id(&self, line_id: LineId) -> impl Future<Output = EcsResult<Option<NodeId>>> + Send {
        (**self).get_node_id(line_id)
    }

    fn create_vps(
        &self,
        request: &ProvisionRequest,
    ) -> impl Future<Output = EcsResult<CreatedVps>> + Send {
        (**self).create_vps(request)
    }
}

/// HTTP implementation of [`EcsApi`].
#[derive(Debug, Clone)]
pub struct HttpEcsClient {
    address: String,
    base_path: String,
    apikey: String,
    timeout: Duration,
}

impl HttpEcsClient {
    pub fn new(
        address: impl Into<String>,
        base_path: impl Into<String>,
        apikey: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self {
            address: address.into(),
            base_path,
            apikey: apikey.into(),
            timeout,
        }
    }

    pub fn from_config(config: &EcsConfig) -> EcsResult<Self> {
        let timeout = config
            .timeout()
            .map_err(|e| EcsError::Config(e.to_string()))?;
        Ok(Self::new(
            config.address.clone(),
            config.base_path.clone(),
            config.apikey.clone(),
            timeout,
        ))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Send one request and unwrap the `{code, msg, data}` envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> EcsResult<T> {
        let uri = format!("{}{}", self.base_path, path);

        let exchange = async {
            let stream = tokio::net::TcpStream::connect(&self.address)
                .await
                .map_err(|e| EcsError::Connect {
                    address: self.address.clone(),
                    reason: e.to_string(),
                })?;

            let io = hyper_util::rt::TokioIo::new(stream);
            let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
                .await
                .map_err(|e| EcsError::Http(e.to_string()))?;

            // Drive the connection in the background.
            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    debug!(error = %e, "ecs connection closed with error");
                }
            });

            let mut builder = http::Request::builder()
                .method(method.clone())
                .uri(&uri)
                .header("host", &self.address)
                .header("apikey", &self.apikey)
                .header("user-agent", "qzcloud-ecs/0.1");
            let body = match body {
                Some(bytes) => {
                    builder = builder.header("content-type", "application/json");
                    Full::new(Bytes::from(bytes))
                }
                None => Full::new(Bytes::new()),
            };
            let req = builder
                .body(body)
                .map_err(|e| EcsError::Http(e.to_string()))?;

            let resp = sender
                .send_request(req)
                .await
                .map_err(|e| EcsError::Http(e.to_string()))?;
            let status = resp.status();
            let bytes = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| EcsError::Http(e.to_string()))?
                .to_bytes();

            if !status.is_success() {
                return Err(EcsError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }

            let envelope: Envelope<T> =
                serde_json::from_slice(&bytes).map_err(|e| EcsError::Decode(e.to_string()))?;
            envelope.into_result()
        };

        let result = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(EcsError::Timeout(self.timeout)),
        };

        if let Err(e) = &result {
            warn!(%method, %uri, error = %e, "ecs call failed");
        }
        result
    }
}

impl EcsApi for HttpEcsClient {
    async fn get_node_id(&self, line_id: LineId) -> EcsResult<Option<NodeId>> {
        let choice: NodeChoice = self
            .call(Method::GET, &format!("/node?line_id={line_id}"), None)
            .await?;
        debug!(line_id, node_id = ?choice.node_id, "ecs chose node");
        Ok(choice.node_id)
    }

    async fn create_vps(&self, request: &ProvisionRequest) -> EcsResult<CreatedVps> {
        let body = encode_body(request)?;
        let created: CreatedVps = self.call(Method::POST, "/vps", Some(body)).await?;
        debug!(
            local_host_id = request.local_host_id,
            ecs_host_id = created.host_id,
            "ecs created vps"
        );
        Ok(created)
    }
}

fn encode_body<T: Serialize>(value: &T) -> EcsResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| EcsError::Encode(e.to_string()))
}
