use std::time::Duration;

use alloy_primitives::TxHash;
use color_eyre::eyre;
use thiserror::Error;

/// Why a probe could not produce a verdict of its own.
///
/// The message of the error becomes the `error` field of the synthesized Error result.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The node call itself failed (connection, JSON-RPC error object, undecodable response).
    #[error("{0:#}")]
    Rpc(eyre::Report),

    /// The node answered, but the answers contradict each other.
    #[error("implementation error: {0}")]
    Invariant(String),

    /// An earlier probe did not establish a fact this probe depends on.
    #[error("{0}")]
    MissingPrerequisite(String),

    #[error("timeout exceeded while waiting for transaction {tx_hash} after {timeout:?}")]
    Timeout { tx_hash: TxHash, timeout: Duration },

    #[error("transaction {0} failed")]
    TransactionFailed(TxHash),

    #[error("failed to sign transaction: {0}")]
    Signing(String),

    #[error("failed to render value: {0}")]
    Encoding(#[from] serde_json::Error),
}

// `eyre::Report` does not implement `std::error::Error`, so `#[from]` is not available.
impl From<eyre::Report> for ProbeError {
    fn from(report: eyre::Report) -> Self {
        Self::Rpc(report)
    }
}

impl ProbeError {
    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingPrerequisite(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;

    use super::*;

    #[test]
    fn messages_are_report_ready() {
        let err = ProbeError::invariant("blockByNumber and blockByHash return different blocks");
        assert_eq!(
            err.to_string(),
            "implementation error: blockByNumber and blockByHash return different blocks"
        );

        let err = ProbeError::Timeout { tx_hash: B256::ZERO, timeout: Duration::from_secs(2) };
        assert!(err.to_string().contains(&B256::ZERO.to_string()));
        assert!(err.to_string().ends_with("after 2s"));

        let err: ProbeError = eyre::eyre!("connection refused").into();
        assert_eq!(err.to_string(), "connection refused");
    }
}
