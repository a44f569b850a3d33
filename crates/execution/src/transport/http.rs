// crates/execution/src/transport/http.rs
#![allow(missing_docs)]

use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre;
use reqwest::{Client, header::CONTENT_TYPE};
use url::Url;

use super::{JsonRpcRequest, JsonRpcResponse, Transport};
use crate::error::ExecutionError;

pub struct HttpTransport {
    client: Client,
    url: Url,
}

impl HttpTransport {
    pub fn new(url: Url, timeout: Duration) -> eyre::Result<Self> {
        let client =
            Client::builder().timeout(timeout).pool_idle_timeout(Duration::from_secs(90)).build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: &JsonRpcRequest) -> eyre::Result<JsonRpcResponse> {
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(req)
            .send()
            .await
            .map_err(|e| ExecutionError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| ExecutionError::Transport(e.to_string()))?;

        let response_bytes = response.bytes().await?;
        serde_json::from_slice(&response_bytes).map_err(|e| {
            ExecutionError::InvalidResponse { method: req.method.clone(), reason: e.to_string() }
                .into()
        })
    }
}
