use alloy_consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy_eips::eip2718::Encodable2718;
use alloy_network::TxSigner;
use alloy_primitives::{Bytes, TxKind, U256};
use alloy_signer_local::PrivateKeySigner;
use ethprobe_types::constants::MAX_FEE_BUMP_WEI;

use crate::error::ProbeError;

/// Chain parameters every fee-market transaction of a run is priced with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FeeParams {
    pub chain_id: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
}

impl FeeParams {
    /// Caps the fee at the suggested gas price plus 1 gwei.
    pub fn from_suggestions(chain_id: u64, gas_price: u128, priority_fee: u128) -> Self {
        Self {
            chain_id,
            max_priority_fee_per_gas: priority_fee,
            max_fee_per_gas: gas_price.saturating_add(MAX_FEE_BUMP_WEI),
        }
    }
}

/// What a probe wants to send; nonce and fees are filled in at submission.
#[derive(Clone, Debug)]
pub struct TxIntent {
    pub to: TxKind,
    pub value: U256,
    pub gas_limit: u64,
    pub input: Bytes,
}

pub(crate) fn make_eip1559_tx(fees: &FeeParams, nonce: u64, intent: TxIntent) -> TxEip1559 {
    TxEip1559 {
        chain_id: fees.chain_id,
        nonce,
        max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
        max_fee_per_gas: fees.max_fee_per_gas,
        gas_limit: intent.gas_limit,
        to: intent.to,
        value: intent.value,
        input: intent.input,
        access_list: Default::default(),
    }
}

pub(crate) async fn make_signed_eip1559_tx(
    signer: &PrivateKeySigner,
    fees: &FeeParams,
    nonce: u64,
    intent: TxIntent,
) -> Result<TxEnvelope, ProbeError> {
    let mut tx = make_eip1559_tx(fees, nonce, intent);

    let signature =
        signer.sign_transaction(&mut tx).await.map_err(|e| ProbeError::Signing(e.to_string()))?;
    Ok(tx.into_signed(signature).into())
}

/// EIP-2718 bytes as submitted through `eth_sendRawTransaction`.
pub(crate) fn raw_bytes(envelope: &TxEnvelope) -> Bytes {
    envelope.encoded_2718().into()
}

#[cfg(test)]
mod tests {
    use alloy_eips::eip2718::Decodable2718;
    use alloy_primitives::{Address, keccak256};

    use super::*;

    fn transfer_intent() -> TxIntent {
        TxIntent {
            to: TxKind::Call(Address::repeat_byte(0x11)),
            value: U256::from(1),
            gas_limit: 21_000,
            input: Bytes::new(),
        }
    }

    #[test]
    fn fee_cap_is_gas_price_plus_one_gwei() {
        let fees = FeeParams::from_suggestions(1337, 7, 2);
        assert_eq!(fees.max_fee_per_gas, 1_000_000_007);
        assert_eq!(fees.max_priority_fee_per_gas, 2);

        let tx = make_eip1559_tx(&fees, 3, transfer_intent());
        assert_eq!(tx.nonce, 3);
        assert_eq!(tx.chain_id, 1337);
        assert_eq!(tx.gas_limit, 21_000);
    }

    #[tokio::test]
    async fn signed_tx_decodes_back_with_matching_hash() {
        let signer = PrivateKeySigner::random();
        let fees = FeeParams::from_suggestions(1, 1_000_000_000, 1_000_000_000);

        let envelope = make_signed_eip1559_tx(&signer, &fees, 0, transfer_intent()).await.unwrap();
        let raw = raw_bytes(&envelope);

        let decoded = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();
        assert_eq!(decoded.tx_hash(), envelope.tx_hash());
        assert_eq!(*envelope.tx_hash(), keccak256(&raw));
    }
}
