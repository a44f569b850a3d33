use alloy_rpc_types_eth::BlockNumberOrTag;
use async_trait::async_trait;
use ethprobe_types::{RpcMethod, RpcResult};

use super::warn_if;
use crate::{context::TestContext, contract::mapping_slot_key, error::ProbeError, probe::Probe};

pub struct Code;

#[async_trait]
impl Probe for Code {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetCode
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let contract = ctx.require_contract()?;
        let code = ctx.client().code(contract, BlockNumberOrTag::Latest).await?;

        let warnings = warn_if(code.is_empty(), "code is empty");
        Ok(RpcResult::with_warnings(self.method(), code.to_string(), warnings))
    }
}

/// Reads the funded account's entry in the token's balances mapping.
pub struct StorageAt;

#[async_trait]
impl Probe for StorageAt {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetStorageAt
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let contract = ctx.require_contract()?;
        let key = mapping_slot_key(ctx.account().address(), ctx.settings().balances_slot);
        let value = ctx.client().storage_at(contract, key, BlockNumberOrTag::Latest).await?;

        let warnings = warn_if(value.is_zero(), "storage is zero bytes, should try another slot");
        Ok(RpcResult::with_warnings(self.method(), value.to_string(), warnings))
    }
}
