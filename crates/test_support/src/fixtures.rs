//! Deterministic chain parameters and accounts the fake node starts from.

use alloy_primitives::{Address, B256, U256, keccak256};
use ethprobe_types::Account;

/// Well-known development key (first Hardhat/Anvil account).
pub const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const CHAIN_ID: u64 = 1337;

/// Suggested gas price, 1 gwei.
pub const GAS_PRICE: u128 = 1_000_000_000;

/// Suggested priority fee, 1 gwei.
pub const PRIORITY_FEE: u128 = 1_000_000_000;

/// Slot of `balances` in the bundled token's storage layout.
pub const BALANCES_SLOT: u64 = 4;

/// Deployment bytecode of a small ERC-20. The fake node only stores it; it never executes it.
pub const TOKEN_BYTECODE: &str = "0x608060405234801561001057600080fd5b50336000908152600460205260409020\
69d3c21bcecceda10000009055610194806100366000396000f3fe608060405234801561001057600080fd5b50600436\
1061003657600035\
60e01c806370a082311461003b578063a9059cbb14610071575b600080fd5b61005f610049366004610119565b6001\
600160a01b031660009081526004602052604090205490565b60405190815260200160405180910390f35b610084610\
07f36600461013b565b610094565b604051901515815260200160405180910390f35b336000908152600460205260408\
120805483919083906100b9908490610165565b90915550506001600160a01b0383166000908152600460205260408120\
80548492906100e9908490610178565b90915550600195945050505050565b80356001600160a01b0381168114610114\
57600080fd5b919050565b60006020828403121561012b57600080fd5b6101348261010b565b9392505050565b5050\
5056fea164736f6c6343000814000a";

/// The account every fake chain pre-funds.
pub fn funded_account() -> Account {
    Account::from_hex_key(DEV_KEY).expect("dev key is valid")
}

pub fn funded_address() -> Address {
    funded_account().address()
}

/// 1000 ether.
pub fn funded_balance() -> U256 {
    U256::from(1_000u64) * U256::from(10u64).pow(U256::from(18u64))
}

/// Token units minted to the deployer.
pub fn token_supply() -> U256 {
    U256::from(1_000_000u64) * U256::from(10u64).pow(U256::from(18u64))
}

/// Storage key of `holder`'s entry in the balances mapping.
pub fn balance_key(holder: Address) -> B256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(holder.into_word().as_slice());
    preimage[32..].copy_from_slice(&U256::from(BALANCES_SLOT).to_be_bytes::<32>());
    keccak256(preimage)
}
