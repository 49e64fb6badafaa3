//! Read-only commands: `lines`, `nodes`, `select`.

use anyhow::Result;

use qz_core::QzConfig;
use qzcloud_placement::PlacementError;
use qzcloud_state::{Line, LineType, Node, ResourceState, StateStore};

use super::{ecs_client, open_store, selector};

pub fn lines(config: &QzConfig, all: bool) -> Result<()> {
    let store = open_store(config)?;
    let lines = visible_lines(&store, all)?;
    if lines.is_empty() {
        println!("No lines.");
        return Ok(());
    }
    println!("{:>6}  {:<20} {:>6}  {:<8} TYPE", "ID", "NAME", "AREA", "STATE");
    for line in &lines {
        println!("{}", format_line(line));
    }
    Ok(())
}

pub fn nodes(config: &QzConfig, line_id: u64) -> Result<()> {
    let store = open_store(config)?;
    let counts = store.count_running_hosts_by_node()?;
    let mut nodes: Vec<Node> = store
        .list_nodes()?
        .into_iter()
        .filter(|n| n.line_id == line_id)
        .collect();
    nodes.sort_by(|a, b| b.weight.cmp(&a.weight));

    if nodes.is_empty() {
        println!("No nodes on line {line_id}.");
        return Ok(());
    }
    println!("{:>6}  {:<20} {:>6}  {:>9}  STATE", "ID", "NAME", "WEIGHT", "LOAD");
    for node in &nodes {
        let running = counts.get(&node.id).copied().unwrap_or(0);
        println!("{}", format_node(node, running));
    }
    Ok(())
}

/// Run the configured strategy once and report the node it would use.
pub async fn select(config: &QzConfig, line_id: u64, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let selector = selector(config, &store, ecs_client(config)?)?;

    match selector.select(line_id).await {
        Ok(node) if json => println!("{}", serde_json::to_string_pretty(&node)?),
        Ok(node) => {
            println!(
                "Selected node {} ({}) weight={} virtual_type={}",
                node.id, node.name, node.weight, node.virtual_type
            );
        }
        Err(PlacementError::NoCapacityAvailable { .. }) => println!("No nodes available"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Active lines only, unless `all`.
fn visible_lines(store: &StateStore, all: bool) -> Result<Vec<Line>> {
    let lines = if all {
        store.list_lines()?
    } else {
        store.list_active_lines()?
    };
    Ok(lines)
}

fn state_label(state: ResourceState) -> &'static str {
    match state {
        ResourceState::Active => "active",
        ResourceState::Inactive => "inactive",
    }
}

fn format_line(line: &Line) -> String {
    let kind = match line.line_type {
        LineType::SelfOperated => "self",
        LineType::Upstream => "upstream",
    };
    format!(
        "{:>6}  {:<20} {:>6}  {:<8} {}",
        line.id,
        line.name,
        line.area_id,
        state_label(line.state),
        kind
    )
}

fn format_node(node: &Node, running: u32) -> String {
    format!(
        "{:>6}  {:<20} {:>6}  {:>9}  {}",
        node.id,
        node.name,
        node.weight,
        format!("{running}/{}", node.max_vm_number),
        state_label(node.state)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Node {
        Node {
            id: 7,
            name: "sg-07".to_string(),
            line_id: 2,
            weight: 30,
            max_vm_number: 40,
            state: ResourceState::Inactive,
            virtual_type: "kvm".to_string(),
            vlan_id1: String::new(),
            vlan_id2: String::new(),
            memory_dynamic: false,
            ram_start: 0,
            cpu_limit: 0,
            os_iops_max: 0,
            data_path: String::new(),
            data_iops_max: 0,
        }
    }

    #[test]
    fn node_row_shows_load_and_state() {
        let row = format_node(&node(), 12);
        assert!(row.contains("sg-07"));
        assert!(row.contains("12/40"));
        assert!(row.ends_with("inactive"));
    }

    fn line(id: u64, state: ResourceState) -> Line {
        Line {
            id,
            name: "CN2 GIA".to_string(),
            area_id: 1,
            state,
            line_type: LineType::Upstream,
            snapshot_num: 0,
            backup_num: 0,
            reinstall_num: 0,
            port_num: 0,
        }
    }

    #[test]
    fn inactive_lines_hidden_by_default() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_line(&line(1, ResourceState::Active)).unwrap();
        store.put_line(&line(2, ResourceState::Inactive)).unwrap();

        let shown: Vec<u64> = visible_lines(&store, false).unwrap().iter().map(|l| l.id).collect();
        assert_eq!(shown, vec![1]);
        assert_eq!(visible_lines(&store, true).unwrap().len(), 2);
    }

    #[test]
    fn line_row_shows_type() {
        let line = line(2, ResourceState::Active);
        let row = format_line(&line);
        assert!(row.contains("CN2 GIA"));
        assert!(row.contains("active"));
        assert!(row.ends_with("upstream"));
    }
}
