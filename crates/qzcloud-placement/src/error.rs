//! Placement error types.

use thiserror::Error;

use qzcloud_state::{LineId, NodeId};

/// Errors that can occur while choosing a node.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// No active node of the line has a free slot. Not retryable without an
    /// inventory change.
    #[error("no nodes available on line {line_id}")]
    NoCapacityAvailable { line_id: LineId },

    #[error("ecs chose node {node_id} for line {line_id}, but {reason}")]
    InvalidExternalChoice {
        line_id: LineId,
        node_id: NodeId,
        reason: String,
    },

    #[error("external strategy configured without an ecs client")]
    MissingEcsClient,

    #[error("state store error: {0}")]
    State(#[from] qzcloud_state::StateError),

    #[error("ecs error: {0}")]
    Ecs(#[from] qzcloud_ecs::EcsError),
}

pub type PlacementResult<T> = Result<T, PlacementError>;
