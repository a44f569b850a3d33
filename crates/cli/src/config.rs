//! Run configuration: a TOML file plus environment overrides.

use std::{fmt, path::PathBuf, time::Duration};

use ethprobe_execution::{ExecutionConfig, NodeEndpoint};
use ethprobe_harness::Settings;
use ethprobe_types::{
    Account,
    constants::{
        DEFAULT_BALANCES_SLOT, DEFAULT_FILTER_CHANGES_WAIT, DEFAULT_POLL_INTERVAL,
        DEFAULT_REQUEST_TIMEOUT,
    },
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;

pub use crate::file::load_config;

pub const ENV_RPC_ENDPOINT: &str = "ETHPROBE_RPC_ENDPOINT";
pub const ENV_PRIVATE_KEY: &str = "ETHPROBE_PRIVATE_KEY";
pub const ENV_TIMEOUT: &str = "ETHPROBE_TIMEOUT";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// `http(s)://` URL or path to an IPC socket.
    pub rpc_endpoint: String,
    /// Hex key of an account funded on the node under test.
    pub rich_privkey: String,
    /// How long a submitted transaction may take to be mined.
    #[serde(with = "human_duration")]
    pub timeout: Duration,
    #[serde(default = "default_poll_interval", with = "human_duration")]
    pub poll_interval: Duration,
    #[serde(default = "default_filter_changes_wait", with = "human_duration")]
    pub filter_changes_wait: Duration,
    #[serde(default = "default_request_timeout", with = "human_duration")]
    pub request_timeout: Duration,
    /// Hex file with the token's deployment bytecode. Relative paths are resolved against the
    /// config file's directory.
    pub token_bytecode: PathBuf,
    #[serde(default = "default_balances_slot")]
    pub balances_slot: u64,
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_filter_changes_wait() -> Duration {
    DEFAULT_FILTER_CHANGES_WAIT
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_balances_slot() -> u64 {
    DEFAULT_BALANCES_SLOT
}

impl Config {
    /// Apply environment variable overrides.
    ///
    /// Supported variables:
    /// - ETHPROBE_RPC_ENDPOINT
    /// - ETHPROBE_PRIVATE_KEY
    /// - ETHPROBE_TIMEOUT
    ///
    /// `lookup` is `std::env::var` in the binary.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_RPC_ENDPOINT) {
            match v.parse::<NodeEndpoint>() {
                Ok(_) => self.rpc_endpoint = v,
                Err(e) => warn!(value = %v, error = %e, "Invalid ETHPROBE_RPC_ENDPOINT, ignoring"),
            }
        }
        if let Some(v) = get(ENV_PRIVATE_KEY) {
            // Do not log key value.
            match Account::from_hex_key(&v) {
                Ok(_) => self.rich_privkey = v,
                Err(_) => warn!("Invalid ETHPROBE_PRIVATE_KEY, ignoring"),
            }
        }
        if let Some(v) = get(ENV_TIMEOUT) {
            match humantime::parse_duration(&v) {
                Ok(d) => self.timeout = d,
                Err(_) => warn!(value = %v, "Invalid ETHPROBE_TIMEOUT, ignoring"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.rpc_endpoint.trim().is_empty() {
            return Err(Error::InvalidConfig("rpc_endpoint is empty".into()));
        }
        if self.rich_privkey.trim().is_empty() {
            return Err(Error::InvalidConfig("rich_privkey is empty".into()));
        }
        self.endpoint()?;
        self.account()?;

        for (name, value) in [("timeout", self.timeout), ("poll_interval", self.poll_interval)] {
            if value.is_zero() {
                return Err(Error::InvalidConfig(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Result<NodeEndpoint, Error> {
        self.rpc_endpoint
            .parse()
            .map_err(|e| Error::InvalidConfig(format!("rpc_endpoint: {e}")))
    }

    pub fn account(&self) -> Result<Account, Error> {
        Account::from_hex_key(&self.rich_privkey)
            .map_err(|e| Error::InvalidConfig(format!("rich_privkey: {e}")))
    }

    pub fn execution(&self) -> Result<ExecutionConfig, Error> {
        Ok(ExecutionConfig { endpoint: self.endpoint()?, request_timeout: self.request_timeout })
    }

    pub fn settings(&self) -> Settings {
        Settings {
            mining_timeout: self.timeout,
            poll_interval: self.poll_interval,
            filter_changes_wait: self.filter_changes_wait,
            balances_slot: self.balances_slot,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rpc_endpoint", &self.rpc_endpoint)
            .field("rich_privkey", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("filter_changes_wait", &self.filter_changes_wait)
            .field("request_timeout", &self.request_timeout)
            .field("token_bytecode", &self.token_bytecode)
            .field("balances_slot", &self.balances_slot)
            .finish()
    }
}

/// Durations written the way people write them: `"500ms"`, `"5s"`, `"1m 30s"`.
mod human_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw)
            .map_err(|e| D::Error::custom(format!("invalid duration `{raw}`: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn minimal() -> Config {
        toml::from_str(&format!(
            r#"
            rpc_endpoint = "http://127.0.0.1:8545"
            rich_privkey = "{KEY}"
            timeout = "5s"
            token_bytecode = "token.hex"
            "#
        ))
        .unwrap()
    }

    #[test]
    fn optional_fields_take_defaults() {
        let config = minimal();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.filter_changes_wait, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.balances_slot, 4);
        config.validate().unwrap();
    }

    #[test]
    fn human_durations_and_ipc_paths_are_understood() {
        let config: Config = toml::from_str(&format!(
            r#"
            rpc_endpoint = "/tmp/geth.ipc"
            rich_privkey = "{KEY}"
            timeout = "1m 30s"
            poll_interval = "250ms"
            token_bytecode = "token.hex"
            balances_slot = 0
            "#
        ))
        .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.settings().poll_interval, Duration::from_millis(250));
        assert!(matches!(config.endpoint().unwrap(), NodeEndpoint::Ipc(_)));
    }

    #[test]
    fn unparsable_duration_is_a_parse_error() {
        let result = toml::from_str::<Config>(&format!(
            r#"
            rpc_endpoint = "http://127.0.0.1:8545"
            rich_privkey = "{KEY}"
            timeout = "soon"
            token_bytecode = "token.hex"
            "#
        ));
        assert!(result.unwrap_err().to_string().contains("invalid duration `soon`"));
    }

    #[test]
    fn validate_rejects_blank_and_malformed_fields() {
        let mut config = minimal();
        config.rpc_endpoint = "  ".into();
        assert!(config.validate().is_err());

        let mut config = minimal();
        config.rich_privkey = "0x1234".into();
        assert!(config.validate().unwrap_err().to_string().contains("rich_privkey"));

        let mut config = minimal();
        config.timeout = Duration::ZERO;
        assert!(config.validate().unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn env_overrides_replace_valid_values_and_ignore_invalid_ones() {
        let env = HashMap::from([
            (ENV_RPC_ENDPOINT, "ws://127.0.0.1:8546"),
            (ENV_PRIVATE_KEY, "  59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d  "),
            (ENV_TIMEOUT, "2m"),
        ]);
        let mut config = minimal();

        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        // ws:// is not a supported transport.
        assert_eq!(config.rpc_endpoint, "http://127.0.0.1:8545");
        assert_eq!(
            config.rich_privkey,
            "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
        );
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let rendered = format!("{:?}", minimal());
        assert!(!rendered.contains("ac0974"));
        assert!(rendered.contains("<redacted>"));
    }
}
