//! Weight-ordered capacity scan.
//!
//! Given a line, take its active nodes from highest weight down (ties in id
//! order) and return the first whose non-removed host count is strictly
//! below `max_vm_number`. Deterministic for a fixed snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use qzcloud_state::{LineId, NewHost, Node, NodeId, Reservation};

use crate::error::{PlacementError, PlacementResult};
use crate::repository::NodeRepository;

/// Index of the first eligible node in an already weight-ordered list.
///
/// A node missing from `counts` has no hosts. Inactive nodes are never
/// eligible.
pub fn pick_node(nodes: &[Node], counts: &HashMap<NodeId, u32>) -> Option<usize> {
    nodes.iter().position(|node| {
        let running = counts.get(&node.id).copied().unwrap_or(0);
        node.is_active() && running < node.max_vm_number
    })
}

/// Node selection over the local inventory.
#[derive(Clone)]
pub struct LocalWeightedSelection {
    repo: Arc<dyn NodeRepository>,
}

impl LocalWeightedSelection {
    pub fn new(repo: Arc<dyn NodeRepository>) -> Self {
        Self { repo }
    }

    /// Choose a node for `line_id` without reserving it.
    ///
    /// Pure read. Callers that create the host afterwards race with each
    /// other; use [`select_and_reserve`](Self::select_and_reserve) to close
    /// that window.
    pub fn select(&self, line_id: LineId) -> PlacementResult<Node> {
        let nodes = self.repo.list_active_nodes_by_line(line_id)?;
        let counts = self.repo.count_running_hosts_by_node()?;

        debug!(line_id, candidates = nodes.len(), "selecting node");

        match pick_node(&nodes, &counts) {
            Some(idx) => {
                let node = nodes[idx].clone();
                debug!(
                    line_id,
                    node_id = node.id,
                    weight = node.weight,
                    running = counts.get(&node.id).copied().unwrap_or(0),
                    max = node.max_vm_number,
                    "node selected"
                );
                Ok(node)
            }
            None => {
                warn!(line_id, candidates = nodes.len(), "no node with free capacity");
                Err(PlacementError::NoCapacityAvailable { line_id })
            }
        }
    }

    /// Choose a node and insert `new_host` on it atomically.
    pub fn select_and_reserve(
        &self,
        line_id: LineId,
        new_host: NewHost,
    ) -> PlacementResult<Reservation> {
        match self.repo.reserve_host(line_id, new_host, pick_node)? {
            Some(reservation) => {
                debug!(
                    line_id,
                    node_id = reservation.node.id,
                    host_id = reservation.host.id,
                    "node reserved"
                );
                Ok(reservation)
            }
            None => {
                warn!(line_id, "no node with free capacity to reserve");
                Err(PlacementError::NoCapacityAvailable { line_id })
            }
        }
    }
}
