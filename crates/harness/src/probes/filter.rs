use alloy_rpc_types_eth::Filter;
use async_trait::async_trait;
use ethprobe_types::{RpcMethod, RpcResult};
use tracing::debug;

use super::{pretty, send::transfer_token, warn_if};
use crate::{
    context::TestContext,
    error::ProbeError,
    probe::{Probe, require},
};

/// Installs a log filter for the token's `Transfer` events, starting just before the first
/// block that holds one of our transactions.
pub struct NewFilter;

#[async_trait]
impl Probe for NewFilter {
    fn method(&self) -> RpcMethod {
        RpcMethod::NewFilter
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let contract = ctx.require_contract()?;
        let first_block = ctx.first_block_with_tx()?;

        let query = Filter::new()
            .address(contract)
            .event_signature(ctx.token().transfer_topic())
            .from_block(first_block.saturating_sub(1));

        let id = ctx.client().new_filter(&query).await?;
        debug!(%id, %contract, from_block = first_block.saturating_sub(1), "Log filter installed");
        ctx.install_filter(id.clone(), query);

        Ok(RpcResult::ok(self.method(), id))
    }
}

/// Triggers a fresh token transfer, then reads everything the filter has matched.
pub struct FilterLogs;

#[async_trait]
impl Probe for FilterLogs {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetFilterLogs
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let id = ctx.require_active_filter()?.id.clone();

        transfer_token(ctx).await.map_err(|e| {
            ProbeError::missing(format!(
                "token transfer must succeed before checking filter logs ({e})"
            ))
        })?;

        let logs = ctx.client().filter_logs(&id).await?;
        let warnings = warn_if(logs.is_empty(), "no logs");
        Ok(RpcResult::with_warnings(self.method(), pretty(&logs)?, warnings))
    }
}

pub struct NewBlockFilter;

#[async_trait]
impl Probe for NewBlockFilter {
    fn method(&self) -> RpcMethod {
        RpcMethod::NewBlockFilter
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let id = ctx.client().new_block_filter().await?;
        debug!(%id, "Block filter installed");
        ctx.set_block_filter_id(id.clone());

        Ok(RpcResult::ok(self.method(), id))
    }
}

/// Gives the node time to produce a block, then polls the block filter.
pub struct FilterChanges;

#[async_trait]
impl Probe for FilterChanges {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetFilterChanges
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let id = ctx.require_block_filter()?;

        tokio::time::sleep(ctx.settings().filter_changes_wait).await;

        let hashes = ctx.client().block_filter_changes(&id).await?;
        let warnings = warn_if(hashes.is_empty(), "no new blocks");
        Ok(RpcResult::with_warnings(self.method(), pretty(&hashes)?, warnings))
    }
}

/// Removes the log filter, then removes it again: the second attempt must report `false`.
pub struct UninstallFilter;

#[async_trait]
impl Probe for UninstallFilter {
    fn method(&self) -> RpcMethod {
        RpcMethod::UninstallFilter
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let id = ctx.require_active_filter()?.id.clone();

        if !ctx.client().uninstall_filter(&id).await? {
            return Err(ProbeError::invariant("uninstall filter failed"));
        }
        ctx.mark_filter_uninstalled();

        if ctx.client().uninstall_filter(&id).await? {
            return Err(ProbeError::invariant(
                "uninstall filter should have failed because it was already uninstalled",
            ));
        }

        Ok(RpcResult::ok(self.method(), id))
    }
}

/// Replays the log filter's query through `eth_getLogs` after a fresh token transfer.
pub struct Logs;

#[async_trait]
impl Probe for Logs {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetLogs
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        require(&NewFilter, ctx)
            .await
            .map_err(|_| ProbeError::missing("failed to create a filter"))?;
        let query = ctx.require_filter()?.query.clone();

        transfer_token(ctx).await.map_err(|e| {
            ProbeError::missing(format!("token transfer must succeed before checking logs ({e})"))
        })?;

        let logs = ctx.client().logs(&query).await?;
        let warnings = warn_if(logs.is_empty(), "no logs");
        Ok(RpcResult::with_warnings(self.method(), pretty(&logs)?, warnings))
    }
}
