//! The ERC-20 token deployed and exercised during a run.

use alloy_primitives::{Address, B256, Bytes, U256, keccak256};
use alloy_sol_types::{SolCall, SolEvent, SolValue, sol};
use thiserror::Error;

sol! {
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address owner) external view returns (uint256 balance);

        event Transfer(address indexed from, address indexed to, uint256 value);
    }
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("token bytecode is empty")]
    Empty,

    #[error("token bytecode is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Deployment bytecode plus the ABI surface the probes need.
///
/// Compilation happens elsewhere; this only holds the artifact.
#[derive(Clone, Debug)]
pub struct TokenContract {
    bytecode: Bytes,
}

impl TokenContract {
    pub fn new(bytecode: Bytes) -> Result<Self, ContractError> {
        if bytecode.is_empty() {
            return Err(ContractError::Empty);
        }
        Ok(Self { bytecode })
    }

    /// Accepts the contents of a `.bin`/`.hex` artifact, `0x` prefix and whitespace tolerated.
    pub fn from_hex(artifact: &str) -> Result<Self, ContractError> {
        let artifact = artifact.trim();
        let bytecode = hex::decode(artifact.strip_prefix("0x").unwrap_or(artifact))?;
        Self::new(bytecode.into())
    }

    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    pub fn transfer_calldata(&self, to: Address, amount: U256) -> Bytes {
        IERC20::transferCall { to, amount }.abi_encode().into()
    }

    pub fn balance_of_calldata(&self, owner: Address) -> Bytes {
        IERC20::balanceOfCall { owner }.abi_encode().into()
    }

    /// Topic0 of `Transfer(address,address,uint256)`.
    pub fn transfer_topic(&self) -> B256 {
        IERC20::Transfer::SIGNATURE_HASH
    }
}

/// Storage key of `mapping(address => _)` entry `holder` declared at `slot`.
pub fn mapping_slot_key(holder: Address, slot: u64) -> B256 {
    keccak256((holder, U256::from(slot)).abi_encode())
}
