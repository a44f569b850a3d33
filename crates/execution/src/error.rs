#![allow(missing_docs)]

use thiserror::Error;

/// Defines the specific error types for the node client.
///
/// Functions throughout the crate return `eyre::Result`; these variants are wrapped into the
/// report so callers can still `downcast_ref` and match on the kind of failure.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON-RPC error (code {code}): {message}")]
    JsonRpc { code: i64, message: String },

    #[error("Invalid response to {method}: {reason}")]
    InvalidResponse { method: String, reason: String },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}
