//! StateStore: redb-backed inventory persistence for qzcloud.
//!
//! Provides typed CRUD over areas, lines, nodes and hosts, the two read
//! queries node selection is built on, and a reservation transaction that
//! selects a node and inserts its host record atomically. All values are
//! JSON-serialized into redb's `&[u8]` value columns. The store supports
//! both on-disk and in-memory backends (the latter for testing).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

type RecordTable = TableDefinition<'static, u64, &'static [u8]>;

/// A node chosen and its freshly inserted host record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub node: Node,
    pub host: Host,
}

/// Thread-safe inventory store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        for table in [AREAS, LINES, NODES, HOSTS] {
            txn.open_table(table).map_err(map_err!(Table))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Generic record access ──────────────────────────────────────

    fn put_record<T: Serialize>(&self, table: RecordTable, id: u64, record: &T) -> StateResult<()> {
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            table
                .insert(id, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get_record<T: DeserializeOwned>(&self, table: RecordTable, id: u64) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        match table.get(id).map_err(map_err!(Read))? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    fn list_records<T: DeserializeOwned>(&self, table: RecordTable) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        scan(&table)
    }

    fn delete_record(&self, table: RecordTable, id: u64) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            existed = table.remove(id).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(existed)
    }

    // ── Areas ──────────────────────────────────────────────────────

    pub fn put_area(&self, area: &Area) -> StateResult<()> {
        self.put_record(AREAS, area.id, area)?;
        debug!(area_id = area.id, "area stored");
        Ok(())
    }

    pub fn get_area(&self, area_id: AreaId) -> StateResult<Option<Area>> {
        self.get_record(AREAS, area_id)
    }

    pub fn list_areas(&self) -> StateResult<Vec<Area>> {
        self.list_records(AREAS)
    }

    // ── Lines ──────────────────────────────────────────────────────

    pub fn put_line(&self, line: &Line) -> StateResult<()> {
        self.put_record(LINES, line.id, line)?;
        debug!(line_id = line.id, "line stored");
        Ok(())
    }

    pub fn get_line(&self, line_id: LineId) -> StateResult<Option<Line>> {
        self.get_record(LINES, line_id)
    }

    pub fn list_lines(&self) -> StateResult<Vec<Line>> {
        self.list_records(LINES)
    }

    /// Lines that may be offered for new provisioning.
    pub fn list_active_lines(&self) -> StateResult<Vec<Line>> {
        let mut lines = self.list_lines()?;
        lines.retain(Line::is_active);
        Ok(lines)
    }

    pub fn delete_line(&self, line_id: LineId) -> StateResult<bool> {
        self.delete_record(LINES, line_id)
    }

    // ── Nodes ──────────────────────────────────────────────────────

    pub fn put_node(&self, node: &Node) -> StateResult<()> {
        self.put_record(NODES, node.id, node)?;
        debug!(node_id = node.id, line_id = node.line_id, "node stored");
        Ok(())
    }

    pub fn get_node(&self, node_id: NodeId) -> StateResult<Option<Node>> {
        self.get_record(NODES, node_id)
    }

    pub fn list_nodes(&self) -> StateResult<Vec<Node>> {
        self.list_records(NODES)
    }

    pub fn delete_node(&self, node_id: NodeId) -> StateResult<bool> {
        self.delete_record(NODES, node_id)
    }

    /// Active nodes of a line, highest weight first; equal weights keep id order.
    pub fn list_active_nodes_by_line(&self, line_id: LineId) -> StateResult<Vec<Node>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(NODES).map_err(map_err!(Table))?;
        active_nodes_in(&table, line_id)
    }

    // ── Hosts ──────────────────────────────────────────────────────

    /// Insert or overwrite a host record under its own id.
    pub fn put_host(&self, host: &Host) -> StateResult<()> {
        self.put_record(HOSTS, host.id, host)
    }

    pub fn get_host(&self, host_id: HostId) -> StateResult<Option<Host>> {
        self.get_record(HOSTS, host_id)
    }

    pub fn list_hosts(&self) -> StateResult<Vec<Host>> {
        self.list_records(HOSTS)
    }

    pub fn list_hosts_for_node(&self, node_id: NodeId) -> StateResult<Vec<Host>> {
        let mut hosts = self.list_hosts()?;
        hosts.retain(|h| h.node_id == node_id);
        Ok(hosts)
    }

    /// Host counts per node, skipping hosts in the terminal `Removed` state.
    ///
    /// Nodes without any counted host are absent from the map.
    pub fn count_running_hosts_by_node(&self) -> StateResult<HashMap<NodeId, u32>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(HOSTS).map_err(map_err!(Table))?;
        running_counts_in(&table)
    }

    /// Insert a host on `node` with the next free id. No capacity check.
    pub fn insert_host(&self, new_host: NewHost, node: &Node) -> StateResult<Host> {
        let mut hosts = self.insert_hosts(vec![(new_host, node.clone())])?;
        hosts.pop().ok_or_else(|| StateError::Write("host batch came back empty".to_string()))
    }

    /// Insert a batch of hosts in one write transaction: all or none.
    pub fn insert_hosts(&self, batch: Vec<(NewHost, Node)>) -> StateResult<Vec<Host>> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let hosts = {
            let mut table = txn.open_table(HOSTS).map_err(map_err!(Table))?;
            let mut id = next_id(&table)?;
            let mut hosts = Vec::with_capacity(batch.len());
            for (new_host, node) in batch {
                let host = new_host.into_host(id, &node);
                let value = serde_json::to_vec(&host).map_err(map_err!(Serialize))?;
                table
                    .insert(id, value.as_slice())
                    .map_err(map_err!(Write))?;
                hosts.push(host);
                id += 1;
            }
            hosts
        };
        txn.commit().map_err(map_err!(Transaction))?;
        for host in &hosts {
            debug!(host_id = host.id, node_id = host.node_id, "host inserted");
        }
        Ok(hosts)
    }

    /// Pick a node of `line_id` and insert its host record in one write
    /// transaction.
    ///
    /// `pick` sees the active nodes of the line (highest weight first) and
    /// the current per-node host counts, and returns the index of the chosen
    /// node. redb serializes write transactions, so no other reservation can
    /// observe the snapshot between the pick and the insert. Returns `None`
    /// (and writes nothing) when `pick` declines.
    pub fn reserve_host<F>(
        &self,
        line_id: LineId,
        new_host: NewHost,
        pick: F,
    ) -> StateResult<Option<Reservation>>
    where
        F: FnOnce(&[Node], &HashMap<NodeId, u32>) -> Option<usize>,
    {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let reservation = {
            let nodes_table = txn.open_table(NODES).map_err(map_err!(Table))?;
            let mut hosts_table = txn.open_table(HOSTS).map_err(map_err!(Table))?;

            let nodes = active_nodes_in(&nodes_table, line_id)?;
            let counts = running_counts_in(&hosts_table)?;

            match pick(&nodes, &counts).and_then(|idx| nodes.get(idx)) {
                Some(node) => {
                    let id = next_id(&hosts_table)?;
                    let host = new_host.into_host(id, node);
                    let value = serde_json::to_vec(&host).map_err(map_err!(Serialize))?;
                    hosts_table
                        .insert(id, value.as_slice())
                        .map_err(map_err!(Write))?;
                    Some(Reservation {
                        node: node.clone(),
                        host,
                    })
                }
                None => None,
            }
        };

        match &reservation {
            Some(r) => {
                txn.commit().map_err(map_err!(Transaction))?;
                debug!(line_id, node_id = r.node.id, host_id = r.host.id, "host reserved");
            }
            None => {
                txn.abort().map_err(map_err!(Transaction))?;
                debug!(line_id, "reservation declined");
            }
        }
        Ok(reservation)
    }

    /// Move a host to `state`. Errors if the host does not exist.
    pub fn set_host_state(&self, host_id: HostId, state: HostState, now: u64) -> StateResult<Host> {
        self.update_host(host_id, |host| {
            host.state = state;
            host.updated_at = now;
        })
    }

    /// Record the Ecs id of a created VPS and mark it running.
    pub fn mark_host_running(&self, host_id: HostId, ecs_host_id: u64, now: u64) -> StateResult<Host> {
        self.update_host(host_id, |host| {
            host.state = HostState::Running;
            host.ecs_host_id = Some(ecs_host_id);
            host.updated_at = now;
        })
    }

    fn update_host(&self, host_id: HostId, apply: impl FnOnce(&mut Host)) -> StateResult<Host> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let host = {
            let mut table = txn.open_table(HOSTS).map_err(map_err!(Table))?;
            let mut host: Host = match table.get(host_id).map_err(map_err!(Read))? {
                Some(guard) => decode(guard.value())?,
                None => return Err(StateError::HostNotFound(host_id)),
            };
            apply(&mut host);
            let value = serde_json::to_vec(&host).map_err(map_err!(Serialize))?;
            table
                .insert(host_id, value.as_slice())
                .map_err(map_err!(Write))?;
            host
        };
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(host_id, state = ?host.state, "host updated");
        Ok(host)
    }
}

// ── Table helpers (shared by read and write transactions) ──────────

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StateResult<T> {
    serde_json::from_slice(bytes).map_err(map_err!(Deserialize))
}

fn scan<T, R>(table: &R) -> StateResult<Vec<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<u64, &'static [u8]>,
{
    let mut results = Vec::new();
    for entry in table.iter().map_err(map_err!(Read))? {
        let (_, value) = entry.map_err(map_err!(Read))?;
        results.push(decode(value.value())?);
    }
    Ok(results)
}

fn active_nodes_in<R>(table: &R, line_id: LineId) -> StateResult<Vec<Node>>
where
    R: ReadableTable<u64, &'static [u8]>,
{
    let mut nodes: Vec<Node> = scan(table)?;
    nodes.retain(|n| n.line_id == line_id && n.is_active());
    // Table iteration is in id order and sort_by is stable.
    nodes.sort_by(|a, b| b.weight.cmp(&a.weight));
    Ok(nodes)
}

fn running_counts_in<R>(table: &R) -> StateResult<HashMap<NodeId, u32>>
where
    R: ReadableTable<u64, &'static [u8]>,
{
    let hosts: Vec<Host> = scan(table)?;
    let mut counts = HashMap::new();
    for host in hosts.iter().filter(|h| h.state.counts_against_capacity()) {
        *counts.entry(host.node_id).or_insert(0) += 1;
    }
    Ok(counts)
}

fn next_id<R>(table: &R) -> StateResult<u64>
where
    R: ReadableTable<u64, &'static [u8]>,
{
    let last = table.last().map_err(map_err!(Read))?;
    Ok(last.map(|(key, _)| key.value() + 1).unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_line(id: LineId) -> Line {
        Line {
            id,
            name: format!("line-{id}"),
            area_id: 1,
            state: ResourceState::Active,
            line_type: LineType::SelfOperated,
            snapshot_num: 2,
            backup_num: 1,
            reinstall_num: 5,
            port_num: 10,
        }
    }

    fn test_node(id: NodeId, line_id: LineId, weight: i64, max: u32) -> Node {
        Node {
            id,
            name: format!("node-{id}"),
            line_id,
            weight,
            max_vm_number: max,
            state: ResourceState::Active,
            virtual_type: "kvm".to_string(),
            vlan_id1: "100".to_string(),
            vlan_id2: String::new(),
            memory_dynamic: false,
            ram_start: 0,
            cpu_limit: 100,
            os_iops_max: 2000,
            data_path: "/data".to_string(),
            data_iops_max: 1000,
        }
    }

    fn test_host(id: HostId, node_id: NodeId, state: HostState) -> Host {
        Host {
            id,
            name: format!("vps-{id}"),
            node_id,
            line_id: 1,
            state,
            ecs_host_id: None,
            created_at: 1000,
            updated_at: 1000,
        }
    }

    fn first_with_room(nodes: &[Node], counts: &HashMap<NodeId, u32>) -> Option<usize> {
        nodes
            .iter()
            .position(|n| counts.get(&n.id).copied().unwrap_or(0) < n.max_vm_number)
    }

    // ── CRUD ───────────────────────────────────────────────────────

    #[test]
    fn area_put_and_get() {
        let store = StateStore::open_in_memory().unwrap();
        let area = Area {
            id: 7,
            name: "Hong Kong".to_string(),
        };
        store.put_area(&area).unwrap();
        assert_eq!(store.get_area(7).unwrap(), Some(area));
        assert_eq!(store.list_areas().unwrap().len(), 1);
    }

    #[test]
    fn line_put_get_delete() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_line(&test_line(1)).unwrap();

        assert_eq!(store.get_line(1).unwrap(), Some(test_line(1)));
        assert!(store.delete_line(1).unwrap());
        assert!(!store.delete_line(1).unwrap());
        assert!(store.get_line(1).unwrap().is_none());
    }

    #[test]
    fn inactive_lines_are_not_offered() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_line(&test_line(1)).unwrap();
        let mut closed = test_line(2);
        closed.state = ResourceState::Inactive;
        store.put_line(&closed).unwrap();

        let active = store.list_active_lines().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, 1);
        assert_eq!(store.list_lines().unwrap().len(), 2);
    }

    #[test]
    fn node_update_in_place() {
        let store = StateStore::open_in_memory().unwrap();
        let mut node = test_node(1, 1, 10, 5);
        store.put_node(&node).unwrap();

        node.max_vm_number = 8;
        store.put_node(&node).unwrap();

        assert_eq!(store.get_node(1).unwrap().unwrap().max_vm_number, 8);
        assert_eq!(store.list_nodes().unwrap().len(), 1);
    }

    #[test]
    fn node_delete() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_node(&test_node(1, 1, 10, 5)).unwrap();
        assert!(store.delete_node(1).unwrap());
        assert!(store.get_node(1).unwrap().is_none());
    }

    // ── Selection queries ──────────────────────────────────────────

    #[test]
    fn active_nodes_ordered_by_weight_desc() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_node(&test_node(1, 1, 5, 5)).unwrap();
        store.put_node(&test_node(2, 1, 20, 5)).unwrap();
        store.put_node(&test_node(3, 1, 10, 5)).unwrap();

        let ids: Vec<NodeId> = store
            .list_active_nodes_by_line(1)
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn equal_weights_keep_id_order() {
        let store = StateStore::open_in_memory().unwrap();
        // Insert out of id order; ties must still come back by id.
        store.put_node(&test_node(9, 1, 10, 5)).unwrap();
        store.put_node(&test_node(4, 1, 10, 5)).unwrap();
        store.put_node(&test_node(6, 1, 10, 5)).unwrap();

        let ids: Vec<NodeId> = store
            .list_active_nodes_by_line(1)
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![4, 6, 9]);
    }

    #[test]
    fn active_nodes_skip_inactive_and_other_lines() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_node(&test_node(1, 1, 10, 5)).unwrap();
        let mut off = test_node(2, 1, 50, 5);
        off.state = ResourceState::Inactive;
        store.put_node(&off).unwrap();
        store.put_node(&test_node(3, 2, 99, 5)).unwrap();

        let nodes = store.list_active_nodes_by_line(1).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, 1);
    }

    #[test]
    fn counts_exclude_removed_hosts() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_host(&test_host(1, 10, HostState::Running)).unwrap();
        store.put_host(&test_host(2, 10, HostState::Stopped)).unwrap();
        store.put_host(&test_host(3, 10, HostState::Removed)).unwrap();
        store.put_host(&test_host(4, 20, HostState::Creating)).unwrap();
        store.put_host(&test_host(5, 30, HostState::Removed)).unwrap();

        let counts = store.count_running_hosts_by_node().unwrap();
        assert_eq!(counts.get(&10), Some(&2));
        assert_eq!(counts.get(&20), Some(&1));
        assert_eq!(counts.get(&30), None);
    }

    #[test]
    fn hosts_for_node() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_host(&test_host(1, 10, HostState::Running)).unwrap();
        store.put_host(&test_host(2, 20, HostState::Running)).unwrap();
        store.put_host(&test_host(3, 10, HostState::Removed)).unwrap();

        assert_eq!(store.list_hosts_for_node(10).unwrap().len(), 2);
        assert_eq!(store.list_hosts().unwrap().len(), 3);
    }

    // ── Host writes ────────────────────────────────────────────────

    #[test]
    fn insert_host_allocates_sequential_ids() {
        let store = StateStore::open_in_memory().unwrap();
        let node = test_node(1, 1, 10, 5);

        let a = store.insert_host(NewHost::creating("a", 1000), &node).unwrap();
        let b = store.insert_host(NewHost::creating("b", 1000), &node).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(b.node_id, 1);
        assert_eq!(b.line_id, 1);
        assert_eq!(b.state, HostState::Creating);
    }

    #[test]
    fn insert_host_continues_after_highest_id() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_host(&test_host(41, 1, HostState::Running)).unwrap();
        let host = store
            .insert_host(NewHost::creating("next", 1000), &test_node(1, 1, 1, 1))
            .unwrap();
        assert_eq!(host.id, 42);
    }

    #[test]
    fn insert_hosts_writes_batch_with_consecutive_ids() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_host(&test_host(7, 1, HostState::Running)).unwrap();
        let (a, b) = (test_node(1, 1, 1, 9), test_node(2, 1, 1, 9));

        let hosts = store
            .insert_hosts(vec![
                (NewHost::creating("x", 5), a.clone()),
                (NewHost::creating("y", 5), b),
                (NewHost::creating("z", 5), a),
            ])
            .unwrap();
        let ids: Vec<HostId> = hosts.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![8, 9, 10]);
        assert_eq!(hosts[1].node_id, 2);
        assert_eq!(store.list_hosts().unwrap().len(), 4);
    }

    #[test]
    fn insert_hosts_empty_batch_is_noop() {
        let store = StateStore::open_in_memory().unwrap();
        assert!(store.insert_hosts(Vec::new()).unwrap().is_empty());
        assert!(store.list_hosts().unwrap().is_empty());
    }

    #[test]
    fn set_host_state_updates_record() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_host(&test_host(1, 10, HostState::Running)).unwrap();

        let host = store.set_host_state(1, HostState::Removed, 2000).unwrap();
        assert_eq!(host.state, HostState::Removed);
        assert_eq!(host.updated_at, 2000);
        assert_eq!(store.get_host(1).unwrap().unwrap().state, HostState::Removed);
    }

    #[test]
    fn set_host_state_missing_host() {
        let store = StateStore::open_in_memory().unwrap();
        let err = store.set_host_state(99, HostState::Removed, 0).unwrap_err();
        assert!(matches!(err, StateError::HostNotFound(99)));
        assert_eq!(err.to_string(), "host 99 does not exist");
    }

    #[test]
    fn mark_host_running_records_ecs_id() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_host(&test_host(1, 10, HostState::Creating)).unwrap();

        let host = store.mark_host_running(1, 5001, 3000).unwrap();
        assert_eq!(host.state, HostState::Running);
        assert_eq!(host.ecs_host_id, Some(5001));
    }

    // ── Reservation ────────────────────────────────────────────────

    #[test]
    fn reserve_inserts_host_on_picked_node() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_node(&test_node(1, 1, 10, 1)).unwrap();
        store.put_node(&test_node(2, 1, 5, 3)).unwrap();
        store.put_host(&test_host(1, 1, HostState::Running)).unwrap();

        let reservation = store
            .reserve_host(1, NewHost::creating("new", 1000), first_with_room)
            .unwrap()
            .unwrap();

        assert_eq!(reservation.node.id, 2);
        assert_eq!(reservation.host.id, 2);
        assert_eq!(store.get_host(2).unwrap(), Some(reservation.host));
        assert_eq!(store.count_running_hosts_by_node().unwrap().get(&2), Some(&1));
    }

    #[test]
    fn declined_reservation_writes_nothing() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_node(&test_node(1, 1, 10, 1)).unwrap();
        store.put_host(&test_host(1, 1, HostState::Running)).unwrap();

        let reservation = store
            .reserve_host(1, NewHost::creating("new", 1000), first_with_room)
            .unwrap();

        assert!(reservation.is_none());
        assert_eq!(store.list_hosts().unwrap().len(), 1);
    }

    #[test]
    fn reserve_ignores_out_of_range_pick() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_node(&test_node(1, 1, 10, 1)).unwrap();

        let reservation = store
            .reserve_host(1, NewHost::creating("new", 1000), |_, _| Some(5))
            .unwrap();

        assert!(reservation.is_none());
        assert!(store.list_hosts().unwrap().is_empty());
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = StateStore::open(&db_path).unwrap();
            store.put_line(&test_line(3)).unwrap();
            store.put_node(&test_node(1, 3, 10, 5)).unwrap();
        }

        let store = StateStore::open(&db_path).unwrap();
        assert_eq!(store.get_line(3).unwrap().unwrap().name, "line-3");
        assert_eq!(store.list_active_nodes_by_line(3).unwrap().len(), 1);
    }

    #[test]
    fn empty_store_operations() {
        let store = StateStore::open_in_memory().unwrap();

        assert!(store.list_lines().unwrap().is_empty());
        assert!(store.list_nodes().unwrap().is_empty());
        assert!(store.list_hosts().unwrap().is_empty());
        assert!(store.list_active_nodes_by_line(1).unwrap().is_empty());
        assert!(store.count_running_hosts_by_node().unwrap().is_empty());
        assert!(!store.delete_node(1).unwrap());
    }
}
