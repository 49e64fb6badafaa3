//! `qzctl seed`: load an inventory TOML file into the store.
//!
//! Areas, lines and nodes are upserted by id. Each `[[hosts]]` entry adds
//! `count` host records on a node, which is how existing load is imported.
//! Every reference is checked before the first write, and all hosts of a
//! file land in one transaction.

use std::collections::HashSet;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::info;

use qz_core::QzConfig;
use qzcloud_state::{Area, HostState, Line, NewHost, Node, NodeId, StateStore};

use super::open_store;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Inventory {
    pub areas: Vec<Area>,
    pub lines: Vec<Line>,
    pub nodes: Vec<Node>,
    pub hosts: Vec<HostSeed>,
}

/// Existing hosts to import onto a node.
#[derive(Debug, Deserialize)]
pub struct HostSeed {
    pub node_id: NodeId,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_state")]
    pub state: HostState,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_count() -> u32 {
    1
}

fn default_state() -> HostState {
    HostState::Running
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub areas: usize,
    pub lines: usize,
    pub nodes: usize,
    pub hosts: usize,
}

impl Inventory {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write everything to `store`. References are checked against both the
    /// file and what the store already holds.
    pub fn apply(&self, store: &StateStore) -> Result<SeedSummary> {
        let area_ids: HashSet<u64> = self.areas.iter().map(|a| a.id).collect();
        let line_ids: HashSet<u64> = self.lines.iter().map(|l| l.id).collect();

        for line in &self.lines {
            if !area_ids.contains(&line.area_id) && store.get_area(line.area_id)?.is_none() {
                bail!("line {} references unknown area {}", line.id, line.area_id);
            }
        }
        for node in &self.nodes {
            if !line_ids.contains(&node.line_id) && store.get_line(node.line_id)?.is_none() {
                bail!("node {} references unknown line {}", node.id, node.line_id);
            }
        }
        let node_ids: HashSet<u64> = self.nodes.iter().map(|n| n.id).collect();
        for seed in &self.hosts {
            if !node_ids.contains(&seed.node_id) && store.get_node(seed.node_id)?.is_none() {
                bail!("hosts entry references unknown node {}", seed.node_id);
            }
        }

        for area in &self.areas {
            store.put_area(area)?;
        }
        for line in &self.lines {
            store.put_line(line)?;
        }
        for node in &self.nodes {
            store.put_node(node)?;
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let mut batch = Vec::new();
        for seed in &self.hosts {
            let Some(node) = store.get_node(seed.node_id)? else {
                bail!("hosts entry references unknown node {}", seed.node_id);
            };
            for i in 0..seed.count {
                let name = match &seed.name {
                    Some(name) => name.clone(),
                    None => format!("{}-seed-{}", node.name, i + 1),
                };
                let new_host = NewHost {
                    name,
                    state: seed.state,
                    created_at: now,
                };
                batch.push((new_host, node.clone()));
            }
        }
        let hosts = store.insert_hosts(batch)?.len();

        Ok(SeedSummary {
            areas: self.areas.len(),
            lines: self.lines.len(),
            nodes: self.nodes.len(),
            hosts,
        })
    }
}

pub fn seed(config: &QzConfig, file: &Path) -> Result<()> {
    let inventory = Inventory::from_file(file)?;
    let store = open_store(config)?;
    let summary = inventory.apply(&store)?;
    info!(
        areas = summary.areas,
        lines = summary.lines,
        nodes = summary.nodes,
        hosts = summary.hosts,
        "inventory seeded"
    );
    println!(
        "Seeded {} areas, {} lines, {} nodes, {} hosts into {}",
        summary.areas,
        summary.lines,
        summary.nodes,
        summary.hosts,
        config.store.path.display()
    );
    Ok(())
}
