//! In-memory `NodeRepository` for tests and dry runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use qzcloud_state::{
    Host, HostId, HostState, LineId, NewHost, Node, NodeId, Reservation, StateResult,
};

use crate::repository::{NodeRepository, Picker};

#[derive(Debug, Default)]
struct Inventory {
    nodes: BTreeMap<NodeId, Node>,
    hosts: BTreeMap<HostId, Host>,
}

impl Inventory {
    fn active_nodes(&self, line_id: LineId) -> Vec<Node> {
        let mut nodes: Vec<Node> = self
            .nodes
            .values()
            .filter(|n| n.line_id == line_id && n.is_active())
            .cloned()
            .collect();
        nodes.sort_by(|a, b| b.weight.cmp(&a.weight));
        nodes
    }

    fn counts(&self) -> HashMap<NodeId, u32> {
        let mut counts = HashMap::new();
        for host in self.hosts.values() {
            if host.state.counts_against_capacity() {
                *counts.entry(host.node_id).or_insert(0) += 1;
            }
        }
        counts
    }

    fn next_host_id(&self) -> HostId {
        self.hosts.keys().next_back().map_or(1, |id| id + 1)
    }
}

/// Mutex-guarded inventory. Reservations hold the lock across pick and insert.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    inner: Mutex<Inventory>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let repo = Self::new();
        for node in nodes {
            repo.put_node(node);
        }
        repo
    }

    fn lock(&self) -> MutexGuard<'_, Inventory> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn put_node(&self, node: Node) {
        self.lock().nodes.insert(node.id, node);
    }

    /// Add `count` hosts in `state` on `node_id`.
    pub fn add_hosts(&self, node_id: NodeId, state: HostState, count: u32) {
        let mut inv = self.lock();
        let line_id = inv.nodes.get(&node_id).map_or(0, |n| n.line_id);
        for _ in 0..count {
            let id = inv.next_host_id();
            inv.hosts.insert(
                id,
                Host {
                    id,
                    name: format!("host-{id}"),
                    node_id,
                    line_id,
                    state,
                    ecs_host_id: None,
                    created_at: 0,
                    updated_at: 0,
                },
            );
        }
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.lock().nodes.values().cloned().collect()
    }

    pub fn hosts(&self) -> Vec<Host> {
        self.lock().hosts.values().cloned().collect()
    }
}

impl NodeRepository for InMemoryRepository {
    fn list_active_nodes_by_line(&self, line_id: LineId) -> StateResult<Vec<Node>> {
        Ok(self.lock().active_nodes(line_id))
    }

    fn count_running_hosts_by_node(&self) -> StateResult<HashMap<NodeId, u32>> {
        Ok(self.lock().counts())
    }

    fn get_node(&self, node_id: NodeId) -> StateResult<Option<Node>> {
        Ok(self.lock().nodes.get(&node_id).cloned())
    }

    fn reserve_host(
        &self,
        line_id: LineId,
        new_host: NewHost,
        pick: Picker,
    ) -> StateResult<Option<Reservation>> {
        let mut inv = self.lock();
        let nodes = inv.active_nodes(line_id);
        let counts = inv.counts();
        let Some(node) = pick(&nodes, &counts).and_then(|idx| nodes.get(idx)) else {
            return Ok(None);
        };
        let id = inv.next_host_id();
        let host = new_host.into_host(id, node);
        inv.hosts.insert(id, host.clone());
        Ok(Some(Reservation {
            node: node.clone(),
            host,
        }))
    }
}
