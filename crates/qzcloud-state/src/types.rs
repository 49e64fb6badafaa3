//! Domain types for the qzcloud inventory store.
//!
//! Areas, lines and nodes are operator-managed configuration. Hosts are the
//! provisioned VPS records counted against a node's capacity. All types are
//! serializable to/from JSON for storage in redb tables.

use serde::{Deserialize, Serialize};

pub type AreaId = u64;
pub type LineId = u64;
pub type NodeId = u64;
pub type HostId = u64;

// ── Area ──────────────────────────────────────────────────────────

/// A region that groups lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
}

// ── Line ──────────────────────────────────────────────────────────

/// Active/inactive flag shared by lines and nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    #[default]
    Active,
    Inactive,
}

/// Who operates the capacity behind a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    /// Nodes are ours.
    #[default]
    SelfOperated,
    /// Resold from a parent provider; cannot be provisioned locally.
    Upstream,
}

/// A purchasable network/region option grouping physical nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    pub area_id: AreaId,
    #[serde(default)]
    pub state: ResourceState,
    #[serde(default)]
    pub line_type: LineType,
    /// Default snapshot quota for hosts on this line.
    #[serde(default)]
    pub snapshot_num: u32,
    /// Default backup quota.
    #[serde(default)]
    pub backup_num: u32,
    /// Default reinstall limit.
    #[serde(default)]
    pub reinstall_num: u32,
    /// Default forwarded-port quota for NAT hosts.
    #[serde(default)]
    pub port_num: u32,
}

impl Line {
    pub fn is_active(&self) -> bool {
        self.state == ResourceState::Active
    }
}

// ── Node ──────────────────────────────────────────────────────────

/// A virtualization host that runs guest VMs, up to `max_vm_number`.
///
/// Everything after `state` is opaque to placement and is forwarded to the
/// Ecs provisioning call unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub line_id: LineId,
    /// Higher is preferred.
    pub weight: i64,
    pub max_vm_number: u32,
    #[serde(default)]
    pub state: ResourceState,
    #[serde(default)]
    pub virtual_type: String,
    #[serde(default)]
    pub vlan_id1: String,
    #[serde(default)]
    pub vlan_id2: String,
    #[serde(default)]
    pub memory_dynamic: bool,
    /// Starting RAM (MiB) when dynamic memory is on.
    #[serde(default)]
    pub ram_start: u64,
    #[serde(default)]
    pub cpu_limit: u32,
    #[serde(default)]
    pub os_iops_max: u32,
    #[serde(default)]
    pub data_path: String,
    #[serde(default)]
    pub data_iops_max: u32,
}

impl Node {
    pub fn is_active(&self) -> bool {
        self.state == ResourceState::Active
    }
}

// ── Host ──────────────────────────────────────────────────────────

/// Lifecycle state of a provisioned VPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostState {
    Creating,
    Running,
    Stopped,
    Locked,
    Expired,
    /// Terminal. The only state that frees the node slot.
    Removed,
}

impl HostState {
    /// Whether a host in this state occupies a slot on its node.
    pub fn counts_against_capacity(self) -> bool {
        self != HostState::Removed
    }
}

/// A provisioned (or provisioning) VPS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Host {
    pub id: HostId,
    pub name: String,
    pub node_id: NodeId,
    pub line_id: LineId,
    pub state: HostState,
    /// Id assigned by the Ecs API once the VPS exists there.
    #[serde(default)]
    pub ecs_host_id: Option<u64>,
    pub created_at: u64,
    pub updated_at: u64,
}

/// A host record before it has an id or a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHost {
    pub name: String,
    pub state: HostState,
    pub created_at: u64,
}

impl NewHost {
    pub fn creating(name: impl Into<String>, now: u64) -> Self {
        Self {
            name: name.into(),
            state: HostState::Creating,
            created_at: now,
        }
    }

    /// Materialize the record for `node` under the given id.
    pub fn into_host(self, id: HostId, node: &Node) -> Host {
        Host {
            id,
            name: self.name,
            node_id: node.id,
            line_id: node.line_id,
            state: self.state,
            ecs_host_id: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
