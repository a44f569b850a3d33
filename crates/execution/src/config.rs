#![allow(missing_docs)]
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use url::Url;

use crate::error::ExecutionError;

/// Where the node under test listens: an HTTP(S) URL or a local IPC socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEndpoint {
    Http(Url),
    Ipc(PathBuf),
}

impl FromStr for NodeEndpoint {
    type Err = ExecutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ExecutionError::InvalidEndpoint("endpoint is empty".into()));
        }

        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s).map_err(|e| ExecutionError::InvalidEndpoint(e.to_string()))?;
            return Ok(Self::Http(url));
        }

        if let Some((scheme, _)) = s.split_once("://") &&
            scheme != "ipc"
        {
            return Err(ExecutionError::InvalidEndpoint(format!("unsupported scheme `{scheme}`")));
        }

        let path = s.strip_prefix("ipc://").unwrap_or(s);
        Ok(Self::Ipc(PathBuf::from(path)))
    }
}

impl fmt::Display for NodeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::Ipc(path) => write!(f, "ipc://{}", path.display()),
        }
    }
}

/// Holds all necessary parameters to connect to the node under test.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    pub endpoint: NodeEndpoint,
    /// Deadline applied to every single request, independently of the mining timeout.
    pub request_timeout: Duration,
}
