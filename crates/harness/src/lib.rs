//! Conformance harness for Ethereum JSON-RPC nodes.
//!
//! Probes run one at a time against a live node and share a single [`TestContext`]: later
//! probes consume facts produced by earlier ones (a mined transaction, the block it landed
//! in, the deployed token, an installed filter).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                    Runner                    │
//! │   (fixed sequence, per-probe failure         │
//! │    isolation, implicit result collection)    │
//! └──────────────────────┬───────────────────────┘
//!                        │ resolve()
//!               ┌────────▼────────┐
//!               │  Probe (trait)  │──────┐
//!               └────────┬────────┘      │ prerequisites
//!                        │               │ (re-entrant resolve)
//!          ┌─────────────┼───────────────┘
//!          │             │
//!   ┌──────▼──────┐ ┌────▼─────────────────┐
//!   │ TestContext │ │ ConfirmationPoller   │
//!   │ (memo cache)│ │ (interval/deadline)  │
//!   └──────┬──────┘ └──────────────────────┘
//!          │
//!   ┌──────▼───────────┐
//!   │ dyn EthRpc       │
//!   └──────────────────┘
//! ```
//!
//! Every probe is looked up in the memoization cache before it runs, so a prerequisite
//! proven implicitly (chain id, gas price, nonce) is never re-executed when the runner
//! reaches its own entry.

pub mod context;
pub mod contract;
pub mod error;
pub mod poller;
pub mod probe;
pub mod probes;
pub mod runner;
pub mod tx;

#[cfg(test)]
mod test_utils;

pub use context::{InstalledFilter, Settings, TestContext};
pub use contract::TokenContract;
pub use error::ProbeError;
pub use poller::{Confirmation, ConfirmationPoller};
pub use probe::{Probe, resolve};
pub use runner::{Report, Runner};
