//! Constants shared across ethprobe crates.

use std::time::Duration;

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Gas ceiling for contract deployment and token calls.
pub const CONTRACT_GAS_LIMIT: u64 = 10_000_000;

/// Added on top of the suggested gas price to form `max_fee_per_gas` (1 gwei).
pub const MAX_FEE_BUMP_WEI: u128 = 1_000_000_000;

/// Wei moved by the plain transfer probe.
pub const TRANSFER_VALUE_WEI: u64 = 1;

/// Token units moved by the token transfer probe.
pub const TOKEN_TRANSFER_AMOUNT: u64 = 1;

/// Cadence at which the confirmation poller asks for a receipt.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Time given to the node to mine a block before reading block filter changes.
pub const DEFAULT_FILTER_CHANGES_WAIT: Duration = Duration::from_secs(3);

/// Per-request transport deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Mapping slot of the token's `balances` in the bundled ERC-20 layout.
pub const DEFAULT_BALANCES_SLOT: u64 = 4;
