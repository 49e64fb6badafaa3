//! Wire types exchanged with the Ecs API.

use serde::{Deserialize, Serialize};

use qzcloud_state::{AreaId, HostId, LineId, NodeId};

use crate::error::{EcsError, EcsResult};

/// Envelope around every Ecs answer. `code == 1` means success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub const SUCCESS: i64 = 1;

    pub fn into_result(self) -> EcsResult<T> {
        if self.code != Self::SUCCESS {
            return Err(EcsError::Rejected(self.msg));
        }
        self.data
            .ok_or_else(|| EcsError::Decode("success envelope without data".to_string()))
    }
}

/// Answer to a node-selection query. `None` means no capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeChoice {
    pub node_id: Option<NodeId>,
}

/// Answer to a create-VPS call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedVps {
    pub host_id: u64,
}

/// Everything Ecs needs to create a VPS.
///
/// Node fields (`virtual_type` through `data_disk_maxiops`) are copied from
/// the selected node unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    /// Local host record this VPS belongs to.
    pub local_host_id: HostId,
    pub host_name: String,

    pub cpu: u32,
    /// MiB.
    pub memory: u64,
    /// GiB.
    pub hard_disks: u64,
    /// Mbit/s.
    pub bandwidth: u32,
    pub ipnum: u32,
    pub traffic: u64,
    pub is_nat: bool,
    pub port_num: u32,
    pub snapshot_num: u32,
    pub backup_num: u32,
    pub max_reinstall_num: u32,

    pub os_name: String,
    pub os_password: String,
    pub vnc_password: String,

    pub area_id: AreaId,
    pub area_name: String,
    pub line_id: LineId,
    pub line_name: String,
    pub node_id: NodeId,
    pub node_name: String,

    pub virtual_type: String,
    pub vlanid1: String,
    pub vlanid2: String,
    pub memory_dynamic: bool,
    pub ram_start: u64,
    pub cpu_limit: u32,
    pub os_disk_maxiops: u32,
    pub data_disk_path: String,
    pub data_disk_maxiops: u32,

    /// Unix timestamp (seconds).
    pub buy_time: u64,
    /// Expiry as given by the order, passed through verbatim.
    pub end_time: String,
}
