use core::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

use crate::method::RpcMethod;

/// Verdict of a single probe.
///
/// Ordered by [`Status::priority`], so the worst status of a run is simply the maximum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Warning,
    Error,
}

impl Status {
    pub const fn priority(&self) -> u8 {
        match self {
            Self::Ok => 1,
            Self::Warning => 2,
            Self::Error => 3,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl Ord for Status {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for Status {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record produced by one probe invocation.
///
/// `value` is already rendered for display: a decimal number, a hex string or a
/// pretty-printed JSON document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResult {
    pub method: RpcMethod,
    pub status: Status,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RpcResult {
    pub fn ok(method: RpcMethod, value: impl Into<String>) -> Self {
        Self { method, status: Status::Ok, value: value.into(), warnings: Vec::new(), error: None }
    }

    /// `Warning` when any warning was raised, `Ok` otherwise. The value is kept either way.
    pub fn with_warnings(
        method: RpcMethod,
        value: impl Into<String>,
        warnings: Vec<String>,
    ) -> Self {
        let status = if warnings.is_empty() { Status::Ok } else { Status::Warning };
        Self { method, status, value: value.into(), warnings, error: None }
    }

    pub fn error(method: RpcMethod, message: impl Into<String>) -> Self {
        Self {
            method,
            status: Status::Error,
            value: String::new(),
            warnings: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}
