#![allow(missing_docs)]
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use color_eyre::eyre;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::UnixStream,
};

use super::{JsonRpcRequest, JsonRpcResponse, Transport};
use crate::error::ExecutionError;

// Same default as the HTTP client; a loaded node can take a while to answer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct IpcTransport {
    path: PathBuf,
    timeout: Duration,
}

impl IpcTransport {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), timeout: REQUEST_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn connect(&self) -> eyre::Result<UnixStream> {
        let stream = tokio::time::timeout(self.timeout, UnixStream::connect(&self.path))
            .await?
            .map_err(|e| ExecutionError::Transport(format!("{}: {e}", self.path.display())))?;
        Ok(stream)
    }

    /// Reads until the buffered bytes form one complete JSON document.
    ///
    /// Some servers close after answering and some keep the connection open, so EOF is not a
    /// reliable end-of-response marker.
    async fn read_response(
        &self,
        stream: &mut UnixStream,
        method: &str,
    ) -> eyre::Result<JsonRpcResponse> {
        let mut buf = Vec::with_capacity(4096);
        let mut chunk = [0u8; 4096];

        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(ExecutionError::Transport(format!(
                    "{}: connection closed before a full response to {method}",
                    self.path.display()
                ))
                .into());
            }
            buf.extend_from_slice(&chunk[..n]);

            match serde_json::from_slice(&buf) {
                Ok(response) => return Ok(response),
                Err(e) if e.is_eof() => continue,
                Err(e) => {
                    return Err(ExecutionError::InvalidResponse {
                        method: method.to_string(),
                        reason: e.to_string(),
                    }
                    .into());
                }
            }
        }
    }
}

#[async_trait]
impl Transport for IpcTransport {
    async fn send(&self, req: &JsonRpcRequest) -> eyre::Result<JsonRpcResponse> {
        // One connection per request.
        let mut stream = self.connect().await?;

        let req_bytes = serde_json::to_vec(req)?;
        tokio::time::timeout(self.timeout, stream.write_all(&req_bytes)).await??;

        tokio::time::timeout(self.timeout, self.read_response(&mut stream, &req.method))
            .await
            .map_err(|_| {
                ExecutionError::Transport(format!("{} timed out after {:?}", req.method, self.timeout))
            })?
    }
}
