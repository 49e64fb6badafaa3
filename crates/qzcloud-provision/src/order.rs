//! Provisioning orders and the Ecs request built from them.

use qzcloud_ecs::ProvisionRequest;
use qzcloud_state::{Area, Host, Line, LineId, Node, NodeId};

/// What the customer (or operator) asked for.
///
/// Quota fields left as `None` fall back to the line's defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOrder {
    pub line_id: LineId,
    /// Skip selection and place on this node.
    pub node_id: Option<NodeId>,
    pub host_name: String,
    pub cpu: u32,
    /// MiB.
    pub memory: u64,
    /// GiB.
    pub hard_disks: u64,
    /// Mbit/s.
    pub bandwidth: u32,
    /// Public IPv4 count. Zero means a NAT host.
    pub ipnum: u32,
    pub traffic: u64,
    pub os_name: String,
    pub os_password: String,
    pub vnc_password: String,
    pub snapshot_num: Option<u32>,
    pub backup_num: Option<u32>,
    /// Zero is treated as unset.
    pub max_reinstall_num: Option<u32>,
    pub port_num: Option<u32>,
    pub end_time: String,
}

impl ProvisionOrder {
    /// A minimal order on `line_id`; callers fill in the rest.
    pub fn on_line(line_id: LineId) -> Self {
        Self {
            line_id,
            node_id: None,
            host_name: String::new(),
            cpu: 1,
            memory: 1024,
            hard_disks: 20,
            bandwidth: 1,
            ipnum: 0,
            traffic: 0,
            os_name: String::new(),
            os_password: String::new(),
            vnc_password: String::new(),
            snapshot_num: None,
            backup_num: None,
            max_reinstall_num: None,
            port_num: None,
            end_time: String::new(),
        }
    }
}

/// Assemble the Ecs create request for `host` on `node`.
pub fn build_request(
    order: &ProvisionOrder,
    line: &Line,
    area: &Area,
    node: &Node,
    host: &Host,
    now: u64,
) -> ProvisionRequest {
    ProvisionRequest {
        local_host_id: host.id,
        host_name: order.host_name.clone(),

        cpu: order.cpu,
        memory: order.memory,
        hard_disks: order.hard_disks,
        bandwidth: order.bandwidth,
        ipnum: order.ipnum,
        traffic: order.traffic,
        is_nat: order.ipnum == 0,
        port_num: order.port_num.unwrap_or(line.port_num),
        snapshot_num: order.snapshot_num.unwrap_or(line.snapshot_num),
        backup_num: order.backup_num.unwrap_or(line.backup_num),
        max_reinstall_num: order
            .max_reinstall_num
            .filter(|&n| n > 0)
            .unwrap_or(line.reinstall_num),

        os_name: order.os_name.clone(),
        os_password: order.os_password.clone(),
        vnc_password: order.vnc_password.clone(),

        area_id: area.id,
        area_name: area.name.clone(),
        line_id: line.id,
        line_name: line.name.clone(),
        node_id: node.id,
        node_name: node.name.clone(),

        virtual_type: node.virtual_type.clone(),
        vlanid1: node.vlan_id1.clone(),
        vlanid2: node.vlan_id2.clone(),
        memory_dynamic: node.memory_dynamic,
        ram_start: if node.memory_dynamic { node.ram_start } else { 0 },
        cpu_limit: node.cpu_limit,
        os_disk_maxiops: node.os_iops_max,
        data_disk_path: node.data_path.clone(),
        data_disk_maxiops: node.data_iops_max,

        buy_time: now,
        end_time: order.end_time.clone(),
    }
}
