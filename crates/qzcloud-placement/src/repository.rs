//! Read interface node selection runs on.

use std::collections::HashMap;

use qzcloud_state::{LineId, NewHost, Node, NodeId, Reservation, StateResult, StateStore};

/// Chooses an index into a weight-ordered node list given per-node counts.
pub type Picker = fn(&[Node], &HashMap<NodeId, u32>) -> Option<usize>;

/// Inventory access needed by the selectors.
///
/// Implementations must return `list_active_nodes_by_line` highest weight
/// first with ties in id order, and must count every host that is not
/// `Removed`.
pub trait NodeRepository: Send + Sync {
    fn list_active_nodes_by_line(&self, line_id: LineId) -> StateResult<Vec<Node>>;

    fn count_running_hosts_by_node(&self) -> StateResult<HashMap<NodeId, u32>>;

    fn get_node(&self, node_id: NodeId) -> StateResult<Option<Node>>;

    /// Run `pick` over the line's snapshot and insert `new_host` on the
    /// chosen node, with no other reservation interleaving.
    fn reserve_host(
        &self,
        line_id: LineId,
        new_host: NewHost,
        pick: Picker,
    ) -> StateResult<Option<Reservation>>;
}

impl NodeRepository for StateStore {
    fn list_active_nodes_by_line(&self, line_id: LineId) -> StateResult<Vec<Node>> {
        StateStore::list_active_nodes_by_line(self, line_id)
    }

    fn count_running_hosts_by_node(&self) -> StateResult<HashMap<NodeId, u32>> {
        StateStore::count_running_hosts_by_node(self)
    }

    fn get_node(&self, node_id: NodeId) -> StateResult<Option<Node>> {
        StateStore::get_node(self, node_id)
    }

    fn reserve_host(
        &self,
        line_id: LineId,
        new_host: NewHost,
        pick: Picker,
    ) -> StateResult<Option<Reservation>> {
        StateStore::reserve_host(self, line_id, new_host, pick)
    }
}
