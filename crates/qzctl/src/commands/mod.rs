pub mod inventory;
pub mod provision;
pub mod query;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use qz_core::QzConfig;
use qzcloud_ecs::HttpEcsClient;
use qzcloud_placement::NodeSelector;
use qzcloud_state::StateStore;

/// Read `path` if it exists, otherwise fall back to defaults.
pub fn load_config(path: &Path, store_override: Option<&Path>) -> Result<QzConfig> {
    let mut config = if path.is_file() {
        QzConfig::from_file(path).with_context(|| format!("reading {}", path.display()))?
    } else {
        debug!(path = %path.display(), "no config file, using defaults");
        QzConfig::default()
    };
    if let Some(store) = store_override {
        config.store.path = store.to_path_buf();
    }
    Ok(config)
}

pub fn open_store(config: &QzConfig) -> Result<StateStore> {
    let path = &config.store.path;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating store directory {}", dir.display()))?;
    }
    StateStore::open(path).with_context(|| format!("opening store {}", path.display()))
}

/// The Ecs client, when an `[ecs]` section is configured.
pub fn ecs_client(config: &QzConfig) -> Result<Option<HttpEcsClient>> {
    config
        .ecs
        .as_ref()
        .map(HttpEcsClient::from_config)
        .transpose()
        .context("building ecs client")
}

pub fn selector(
    config: &QzConfig,
    store: &StateStore,
    ecs: Option<HttpEcsClient>,
) -> Result<NodeSelector> {
    Ok(NodeSelector::from_kind(
        config.selector.strategy,
        Arc::new(store.clone()),
        ecs,
    )?)
}
