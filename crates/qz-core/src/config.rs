//! qzcloud.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::duration::parse_duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QzConfig {
    pub store: StoreConfig,
    pub selector: SelectorConfig,
    pub ecs: Option<EcsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/lib/qzcloud/qzcloud.redb"),
        }
    }
}

/// Which node-selection implementation runs for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Weight-ordered scan of the local inventory.
    #[default]
    LocalWeighted,
    /// Ask the Ecs scheduler for a node id.
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub strategy: StrategyKind,
    /// Select and insert the host record in one write transaction.
    pub reserve: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::LocalWeighted,
            reserve: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcsConfig {
    /// `host:port` of the Ecs API.
    pub address: String,
    #[serde(default)]
    pub base_path: String,
    pub apikey: String,
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

fn default_timeout() -> String {
    "10s".to_string()
}

impl EcsConfig {
    pub fn timeout(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.timeout)
            .ok_or_else(|| anyhow::anyhow!("invalid ecs.timeout: {:?}", self.timeout))
    }
}

impl QzConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: QzConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.selector.strategy == StrategyKind::External && self.ecs.is_none() {
            anyhow::bail!("selector.strategy = \"external\" requires an [ecs] section");
        }
        if let Some(ecs) = &self.ecs {
            if ecs.address.is_empty() {
                anyhow::bail!("ecs.address must not be empty");
            }
            ecs.timeout()?;
        }
        Ok(())
    }

    /// The `[ecs]` section, or an error naming the operation that needs it.
    pub fn require_ecs(&self, what: &str) -> anyhow::Result<&EcsConfig> {
        self.ecs
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("{what} requires an [ecs] section in the config"))
    }
}
