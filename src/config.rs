//! Configuration management for the coordination engine
//!
//! Loads configuration from TOML files with environment variable substitution
//! and holds the deployment registry of known networks.

use crate::codec::parse_address;
use crate::error::{CoordinationError, CoordinationResult};
use crate::intent::DEFAULT_TTL_SECS;

use alloy_primitives::{address, Address};
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Env var naming the configuration file
pub const CONFIG_ENV: &str = "ERC8001_CONFIG";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub signer: SignerConfig,
    #[serde(default)]
    pub networks: HashMap<String, NetworkConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub domain_name: String,
    pub domain_version: String,
    pub default_ttl_secs: u64,
    pub network: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            domain_name: "AtomicSwap".to_string(),
            domain_version: "1".to_string(),
            default_ttl_secs: DEFAULT_TTL_SECS,
            network: "base-sepolia".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Env var holding the proposer's private key
    pub proposer_key_env: String,
    /// Env var holding the counterparty's private key
    pub counterparty_key_env: String,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            proposer_key_env: "PROPOSER_PRIVATE_KEY".to_string(),
            counterparty_key_env: "COUNTERPARTY_PRIVATE_KEY".to_string(),
        }
    }
}

/// Raw deployment entry as written in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub atomic_swap: String,
    pub mock_usdc: String,
    pub mock_weth: String,
}

/// Contracts of one deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub chain_id: u64,
    pub atomic_swap: Address,
    pub mock_usdc: Address,
    pub mock_weth: Address,
}

lazy_static! {
    static ref BUILTIN_DEPLOYMENTS: HashMap<&'static str, Deployment> = {
        let mut m = HashMap::new();
        m.insert(
            "base-sepolia",
            Deployment {
                chain_id: 84532,
                atomic_swap: address!("D25FaF692736b74A674c8052F904b5C77f9cb2Ed"),
                mock_usdc: address!("17abd6d0355cB2B933C014133B14245412ca00B6"),
                mock_weth: address!("ddFaC73904FE867B5526510E695826f4968A2357"),
            },
        );
        m
    };
}

impl Deployment {
    /// Look up a network shipped with the crate
    pub fn builtin(network: &str) -> CoordinationResult<Self> {
        BUILTIN_DEPLOYMENTS
            .get(network)
            .copied()
            .ok_or_else(|| CoordinationError::UnknownNetwork(network.to_string()))
    }

    /// Names of the built-in networks
    pub fn builtin_networks() -> Vec<&'static str> {
        let mut names: Vec<_> = BUILTIN_DEPLOYMENTS.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl TryFrom<&NetworkConfig> for Deployment {
    type Error = CoordinationError;

    fn try_from(config: &NetworkConfig) -> CoordinationResult<Self> {
        Ok(Self {
            chain_id: config.chain_id,
            atomic_swap: parse_address(&config.atomic_swap)?,
            mock_usdc: parse_address(&config.mock_usdc)?,
            mock_weth: parse_address(&config.mock_weth)?,
        })
    }
}

impl Settings {
    /// Load settings from `$ERC8001_CONFIG` or `config/default.toml`
    pub fn load() -> Result<Self> {
        let config_path = env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let settings = Self::from_toml(&config_str)?;
        debug!("Loaded configuration from {:?}", config_path);
        Ok(settings)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(config_str: &str) -> Result<Self> {
        // Substitute environment variables
        let config_str = substitute_env_vars(config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.client.domain_name.is_empty() {
            anyhow::bail!("client.domain_name must not be empty");
        }
        if self.client.domain_version.is_empty() {
            anyhow::bail!("client.domain_version must not be empty");
        }
        if self.client.default_ttl_secs == 0 {
            anyhow::bail!("client.default_ttl_secs must be positive");
        }

        for (name, network) in &self.networks {
            Deployment::try_from(network)
                .with_context(|| format!("Network {} has an invalid address", name))?;
        }

        self.deployment(&self.client.network)
            .with_context(|| format!("Default network {} is not configured", self.client.network))?;

        Ok(())
    }

    /// Resolve a network, preferring configured entries over built-in ones
    pub fn deployment(&self, network: &str) -> CoordinationResult<Deployment> {
        match self.networks.get(network) {
            Some(config) => Deployment::try_from(config),
            None => Deployment::builtin(network),
        }
    }

    /// Deployment of the default network
    pub fn default_deployment(&self) -> CoordinationResult<Deployment> {
        self.deployment(&self.client.network)
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    lazy_static! {
        static ref ENV_VAR: regex::Regex = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    }

    ENV_VAR
        .replace_all(input, |cap: &regex::Captures| {
            env::var(&cap[1]).unwrap_or_default()
        })
        .into_owned()
}
