/*
[INPUT]:  YAML configuration file and TASK_REWARD_* environment variables
[OUTPUT]: Validated client configuration and a ready contract gateway
[POS]:    Configuration layer - node, contract and polling setup
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use task_reward_adapter::rpc::client::DEFAULT_RPC_URL;
use task_reward_adapter::{
    Address, ClientConfig, ConfirmationConfig, RpcClient, TaskRewardContract,
};

/// Prefix of environment overrides, e.g. `TASK_REWARD_RPC_URL`.
pub const ENV_PREFIX: &str = "TASK_REWARD";

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    /// JSON-RPC endpoint of the wallet node
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Deployed TaskRewardPlatform address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    /// Preferred account when the node exposes several
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    #[serde(default = "default_account_poll_interval_ms")]
    pub account_poll_interval_ms: u64,
    /// Periodic resynchronization; 0 disables it
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            contract_address: None,
            account: None,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            account_poll_interval_ms: default_account_poll_interval_ms(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_receipt_poll_interval_ms() -> u64 {
    1000
}

fn default_confirmation_timeout_secs() -> u64 {
    120
}

fn default_account_poll_interval_ms() -> u64 {
    2000
}

fn default_refresh_interval_secs() -> u64 {
    30
}

impl AppConfig {
    /// `<config_dir>/task-reward/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("task-reward").join("config.yaml"))
    }

    /// Layer the YAML file (if any) under `TASK_REWARD_*` environment variables.
    ///
    /// A missing file is an error only when `required` is set.
    pub fn load(path: Option<&Path>, required: bool) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            if required && !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(required),
            );
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("read configuration sources")?;
        let config: Self = settings
            .try_deserialize()
            .context("parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that hold for every command.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.rpc_url)
            .with_context(|| format!("invalid rpc_url: {}", self.rpc_url))?;
        if let Some(address) = &self.contract_address {
            parse_address(address).context("invalid contract_address")?;
        }
        if let Some(account) = &self.account {
            parse_address(account).context("invalid account")?;
        }
        if self.receipt_poll_interval_ms == 0 {
            bail!("receipt_poll_interval_ms must be positive");
        }
        if self.account_poll_interval_ms == 0 {
            bail!("account_poll_interval_ms must be positive");
        }
        Ok(())
    }

    pub fn contract_address(&self) -> Result<Address> {
        let raw = self
            .contract_address
            .as_deref()
            .ok_or_else(|| anyhow!("contract_address is not configured"))?;
        parse_address(raw).context("invalid contract_address")
    }

    pub fn preferred_account(&self) -> Result<Option<Address>> {
        self.account
            .as_deref()
            .map(|raw| parse_address(raw).context("invalid account"))
            .transpose()
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    pub fn confirmation_config(&self) -> ConfirmationConfig {
        ConfirmationConfig {
            poll_interval: Duration::from_millis(self.receipt_poll_interval_ms),
            timeout: Duration::from_secs(self.confirmation_timeout_secs),
        }
    }

    pub fn account_poll_interval(&self) -> Duration {
        Duration::from_millis(self.account_poll_interval_ms)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn rpc_client(&self) -> Result<RpcClient> {
        let client = RpcClient::with_config(self.client_config(), &self.rpc_url)
            .with_context(|| format!("create rpc client for {}", self.rpc_url))?;
        Ok(client.with_confirmation(self.confirmation_config()))
    }

    pub fn build_contract(&self) -> Result<TaskRewardContract> {
        Ok(TaskRewardContract::new(
            self.rpc_client()?,
            self.contract_address()?,
        ))
    }
}

/// Strict address parsing: `0x` followed by exactly 40 hex digits.
///
/// All-lowercase and all-uppercase input is accepted as is; mixed case must
/// be a valid EIP-55 checksum.
pub fn parse_address(raw: &str) -> Result<Address> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("address must start with 0x: {raw}"))?;
    if digits.len() != 40 {
        bail!(
            "address must have 40 hex digits, found {}: {raw}",
            digits.len()
        );
    }
    if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        bail!("address contains non-hex characters: {raw}");
    }

    let has_lower = digits.chars().any(|ch| ch.is_ascii_lowercase());
    let has_upper = digits.chars().any(|ch| ch.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(raw, None)
            .map_err(|_| anyhow!("address checksum mismatch: {raw}"));
    }
    raw.parse::<Address>()
        .map_err(|err| anyhow!("invalid address {raw}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    const HARDHAT_CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    #[rstest]
    #[case(HARDHAT_CONTRACT)]
    #[case("0x5fbdb2315678afecb367f032d93f642f64180aa3")]
    #[case("0x5FBDB2315678AFECB367F032D93F642F64180AA3")]
    fn test_parse_address_accepts(#[case] raw: &str) {
        assert_eq!(
            parse_address(raw).unwrap(),
            parse_address(HARDHAT_CONTRACT).unwrap()
        );
    }

    #[rstest]
    #[case("5FbDB2315678afecb367f032d93F642f64180aa3")]
    #[case("0x5FbDB2315678afecb367f032d93F642f64180aa")]
    #[case("0x5FbDB2315678afecb367f032d93F642f64180aa3f")]
    #[case("0x5FbDB2315678afecb367f032d93F642f64180aZ3")]
    #[case("0x5fbDB2315678afecb367f032d93F642f64180aa3")]
    fn test_parse_address_rejects(#[case] raw: &str) {
        assert!(parse_address(raw).is_err());
    }

    #[test]
    fn test_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(30)));
        assert!(config.contract_address().is_err());
    }

    #[test]
    fn test_refresh_interval_zero_disables() {
        let config = AppConfig {
            refresh_interval_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.refresh_interval(), None);
    }

    #[test]
    fn test_load_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "rpc_url: http://localhost:9545\ncontract_address: \"{HARDHAT_CONTRACT}\"\nreceipt_poll_interval_ms: 250"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path()), true).unwrap();
        assert_eq!(config.rpc_url, "http://localhost:9545");
        assert_eq!(config.receipt_poll_interval_ms, 250);
        assert_eq!(config.confirmation_timeout_secs, 120);
        assert_eq!(
            config.contract_address().unwrap(),
            parse_address(HARDHAT_CONTRACT).unwrap()
        );
    }

    #[test]
    fn test_load_rejects_bad_contract_address() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "contract_address: \"0x5FbDB2315678afecb367f032d93F642f64180aa3aa\"").unwrap();

        assert!(AppConfig::load(Some(file.path()), true).is_err());
    }

    #[test]
    fn test_load_missing_required_file() {
        let path = Path::new("/nonexistent/task-reward/config.yaml");
        assert!(AppConfig::load(Some(path), true).is_err());
    }
}
