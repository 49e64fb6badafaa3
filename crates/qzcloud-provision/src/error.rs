//! Provisioning error types.

use thiserror::Error;

use qzcloud_placement::PlacementError;
use qzcloud_state::{AreaId, LineId, NodeId};

/// Errors that can occur on the provisioning path.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("line not found: {0}")]
    LineNotFound(LineId),

    #[error("line {0} is not open for provisioning")]
    LineInactive(LineId),

    #[error("line {0} resells upstream capacity and cannot be provisioned here")]
    UpstreamLineUnsupported(LineId),

    #[error("area not found: {0}")]
    AreaNotFound(AreaId),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("node {node_id} does not belong to line {line_id}")]
    NodeNotOnLine { node_id: NodeId, line_id: LineId },

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("ecs error: {0}")]
    Ecs(#[from] qzcloud_ecs::EcsError),

    #[error("state store error: {0}")]
    State(#[from] qzcloud_state::StateError),
}

impl ProvisionError {
    /// The line has no node with a free slot.
    pub fn is_no_capacity(&self) -> bool {
        matches!(
            self,
            ProvisionError::Placement(PlacementError::NoCapacityAvailable { .. })
        )
    }
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;
