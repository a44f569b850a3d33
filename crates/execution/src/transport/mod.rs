// crates/execution/src/transport/mod.rs
#![allow(missing_docs)]

pub mod http;
pub mod ipc;
#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};

use crate::config::{ExecutionConfig, NodeEndpoint};

/// A generic transport for sending JSON-RPC requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a JSON-RPC request and returns the response.
    async fn send(&self, req: &JsonRpcRequest) -> eyre::Result<JsonRpcResponse>;
}

/// Builds the transport matching the configured endpoint.
pub fn connect(config: &ExecutionConfig) -> eyre::Result<Arc<dyn Transport>> {
    let transport: Arc<dyn Transport> = match &config.endpoint {
        NodeEndpoint::Http(url) => {
            Arc::new(http::HttpTransport::new(url.clone(), config.request_timeout)?)
        }
        NodeEndpoint::Ipc(path) => {
            Arc::new(ipc::IpcTransport::new(path).with_timeout(config.request_timeout))
        }
    };
    Ok(transport)
}

/// Represents a JSON-RPC request object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: serde_json::Value,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: serde_json::Value) -> Self {
        Self { jsonrpc: "2.0", method: method.into(), params, id: 1 }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }
}

/// Represents a JSON-RPC response object.
///
/// A `null` result deserializes to `None`, which is a legitimate answer for lookups such as
/// `eth_getTransactionReceipt` on a pending transaction.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: u64,
}

impl JsonRpcResponse {
    pub fn success(id: u64, result: serde_json::Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), result: Some(result), error: None, id }
    }

    pub fn failure(id: u64, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data: None }),
            id,
        }
    }
}

/// Represents a JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}
