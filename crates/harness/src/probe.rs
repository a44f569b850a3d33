use std::sync::Arc;

use async_trait::async_trait;
use ethprobe_types::{RpcMethod, RpcResult};
use tracing::debug;

use crate::{context::TestContext, error::ProbeError};

/// Test logic for one JSON-RPC method.
///
/// `execute` always does the work; callers go through [`resolve`] so that a method proven
/// once is never exercised again.
#[async_trait]
pub trait Probe: Send + Sync {
    fn method(&self) -> RpcMethod;

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError>;
}

/// Returns the verdict for `probe`, running it only if its method has none yet.
///
/// Failures are recorded as Error verdicts as well, so a failed probe is not re-attempted when
/// another probe depends on it later in the run.
pub async fn resolve(
    probe: &dyn Probe,
    ctx: &mut TestContext,
) -> Result<Arc<RpcResult>, ProbeError> {
    let method = probe.method();
    if let Some(cached) = ctx.already_tested(method) {
        debug!(%method, "Reusing earlier verdict");
        return Ok(cached);
    }

    match probe.execute(ctx).await {
        Ok(result) => Ok(ctx.record(result)),
        Err(err) => {
            ctx.record(RpcResult::error(method, err.to_string()));
            Err(err)
        }
    }
}

/// Like [`resolve`], but a cached Error verdict is turned back into a failure.
///
/// Used by probes that need another method to have *succeeded*, not merely to have run.
pub(crate) async fn require(
    probe: &dyn Probe,
    ctx: &mut TestContext,
) -> Result<Arc<RpcResult>, ProbeError> {
    let result = resolve(probe, ctx).await?;
    if let Some(error) = &result.error {
        return Err(ProbeError::missing(format!("{} failed earlier: {error}", result.method)));
    }
    Ok(result)
}
