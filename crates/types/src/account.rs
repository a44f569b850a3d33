use core::{fmt, str::FromStr};

use alloy_primitives::{Address, hex::FromHex};
use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("private key is not 32 bytes of hex: {0}")]
    InvalidHex(String),

    #[error("private key is not a valid secp256k1 scalar")]
    InvalidKey,
}

/// The funded account every transaction of a run is sent from.
#[derive(Clone)]
pub struct Account {
    signer: PrivateKeySigner,
}

impl Account {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Parses a hex private key, with or without a `0x` prefix.
    pub fn from_hex_key(key: &str) -> Result<Self, AccountError> {
        let key = key.trim();
        let bytes = <[u8; 32]>::from_hex(key).map_err(|e| AccountError::InvalidHex(e.to_string()))?;
        let signer = PrivateKeySigner::from_slice(&bytes).map_err(|_| AccountError::InvalidKey)?;
        Ok(Self { signer })
    }

    pub fn random() -> Self {
        Self { signer: PrivateKeySigner::random() }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl FromStr for Account {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex_key(s)
    }
}

// Never print key material.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account").field("address", &self.address()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known dev key #0 of anvil/hardhat.
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn parses_key_with_and_without_prefix() {
        let plain = Account::from_hex_key(DEV_KEY).unwrap();
        let prefixed = Account::from_hex_key(&format!("0x{DEV_KEY}")).unwrap();

        assert_eq!(plain.address(), prefixed.address());
        assert_eq!(
            plain.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse::<Address>().unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(Account::from_hex_key("0x1234"), Err(AccountError::InvalidHex(_))));
        assert!(matches!(
            Account::from_hex_key(&"00".repeat(32)),
            Err(AccountError::InvalidKey)
        ));
    }

    #[test]
    fn debug_hides_the_key() {
        let account = Account::from_hex_key(DEV_KEY).unwrap();
        let printed = format!("{account:?}");
        assert!(!printed.contains(DEV_KEY));
    }
}
