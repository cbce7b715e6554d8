//! Sentinel configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sentinel_chain::RpcConfig;
use sentinel_governance::GovernanceParams;
use sentinel_types::NetworkId;

use crate::NodeError;

/// Configuration for a sentinel daemon.
///
/// Every field has a default, so an empty file is a valid configuration.
/// Load with [`SentinelConfig::from_toml_file`] or build it in code (tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    /// Log format: "human" or "json".
    pub log_format: String,
    /// Log filter directive, e.g. "info" or "info,sentinel_governance=debug".
    pub log_level: String,
    pub governance: GovernanceParams,
    pub scheduler: SchedulerConfig,
    pub chain: ChainConfig,
    pub store: StoreConfig,
}

/// Task cadences, in seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Sleep between scheduler ticks.
    pub loop_quantum_secs: u64,
    /// Minimum interval of the ingest, build superblock, auto-vote sequence.
    pub governance_period_secs: u64,
    /// Minimum interval of the outbox pass. 0 runs it on every tick.
    pub election_period_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            loop_quantum_secs: 5,
            governance_period_secs: 30,
            election_period_secs: 0,
        }
    }
}

/// Which network's address rules apply to proposals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkChoice {
    /// Ask the chain node at startup.
    #[default]
    Auto,
    Main,
    Test,
}

impl NetworkChoice {
    /// The network fixed by configuration, if any.
    pub fn pinned(&self) -> Option<NetworkId> {
        match self {
            Self::Auto => None,
            Self::Main => Some(NetworkId::Main),
            Self::Test => Some(NetworkId::Test),
        }
    }
}

impl FromStr for NetworkChoice {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "main" | "mainnet" => Ok(Self::Main),
            "test" | "testnet" => Ok(Self::Test),
            other => Err(NodeError::Config(format!("unknown network {other:?}"))),
        }
    }
}

/// Connection to the chain node's RPC interface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub rpc_user: String,
    pub rpc_password: String,
    pub timeout_secs: u64,
    pub network: NetworkChoice,
}

impl Default for ChainConfig {
    fn default() -> Self {
        let rpc = RpcConfig::default();
        Self {
            rpc_url: rpc.url,
            rpc_user: rpc.user,
            rpc_password: rpc.password,
            timeout_secs: rpc.timeout_secs,
            network: NetworkChoice::Auto,
        }
    }
}

impl ChainConfig {
    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            url: self.rpc_url.clone(),
            user: self.rpc_user.clone(),
            password: self.rpc_password.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Location and size of the LMDB environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    /// Maximum size of the memory map, in bytes.
    pub map_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./sentinel_data"),
            map_size: 256 * 1024 * 1024,
        }
    }
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            log_format: "human".to_string(),
            log_level: "info".to_string(),
            governance: GovernanceParams::default(),
            scheduler: SchedulerConfig::default(),
            chain: ChainConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl SentinelConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        self.governance.validate()?;
        if self.scheduler.loop_quantum_secs == 0 {
            return Err(NodeError::Config("scheduler.loop_quantum_secs must be positive".into()));
        }
        Ok(())
    }
}
