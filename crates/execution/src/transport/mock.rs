//! A scripted transport for testing the client.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use color_eyre::eyre::{self, eyre};
use serde_json::Value;
use tokio::sync::Mutex;

use super::{JsonRpcRequest, JsonRpcResponse, Transport};

#[derive(Debug)]
pub(crate) enum Reply {
    Result(Value),
    RpcError { code: i64, message: String },
    Transport(String),
}

/// A mock transport programmed with per-method queues of replies.
///
/// Every request is recorded, so tests can assert on what was sent and how often.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<JsonRpcRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn push(&self, method: &str, reply: Reply) {
        self.replies.lock().await.entry(method.to_string()).or_default().push_back(reply);
    }

    pub(crate) async fn push_result(&self, method: &str, result: Value) {
        self.push(method, Reply::Result(result)).await;
    }

    pub(crate) async fn calls(&self) -> Vec<JsonRpcRequest> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &JsonRpcRequest) -> eyre::Result<JsonRpcResponse> {
        self.calls.lock().await.push(request.clone());

        let reply =
            self.replies.lock().await.get_mut(&request.method).and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Result(result)) => Ok(JsonRpcResponse::success(request.id, result)),
            Some(Reply::RpcError { code, message }) => {
                Ok(JsonRpcResponse::failure(request.id, code, message))
            }
            Some(Reply::Transport(message)) => Err(eyre!(message)),
            None => Err(eyre!("MockTransport: unexpected call to method '{}'", request.method)),
        }
    }
}
