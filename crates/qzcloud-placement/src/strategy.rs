//! Selection strategies, chosen once at startup.
//!
//! `LocalWeighted` scans the local inventory. `External` hands the decision
//! to the Ecs scheduler and only checks that its answer is a usable node of
//! the requested line.

use std::sync::Arc;

use tracing::{debug, info, warn};

use qz_core::StrategyKind;
use qzcloud_ecs::{EcsApi, HttpEcsClient};
use qzcloud_state::{LineId, Node};

use crate::error::{PlacementError, PlacementResult};
use crate::repository::NodeRepository;
use crate::selector::LocalWeightedSelection;

/// Delegates node choice to the Ecs scheduler.
pub struct ExternalSchedulerDelegate<E> {
    ecs: E,
    repo: Arc<dyn NodeRepository>,
}

impl<E: EcsApi> ExternalSchedulerDelegate<E> {
    pub fn new(ecs: E, repo: Arc<dyn NodeRepository>) -> Self {
        Self { ecs, repo }
    }

    pub async fn select(&self, line_id: LineId) -> PlacementResult<Node> {
        let Some(node_id) = self.ecs.get_node_id(line_id).await? else {
            warn!(line_id, "ecs scheduler reports no capacity");
            return Err(PlacementError::NoCapacityAvailable { line_id });
        };

        let invalid = |reason: &str| PlacementError::InvalidExternalChoice {
            line_id,
            node_id,
            reason: reason.to_string(),
        };

        let node = self
            .repo
            .get_node(node_id)?
            .ok_or_else(|| invalid("it is not in the inventory"))?;
        if node.line_id != line_id {
            return Err(invalid("it belongs to another line"));
        }
        if !node.is_active() {
            return Err(invalid("it is inactive"));
        }

        debug!(line_id, node_id, "external scheduler selected node");
        Ok(node)
    }
}

/// The node-selection strategy in force for this process.
pub enum NodeSelector<E = HttpEcsClient> {
    LocalWeighted(LocalWeightedSelection),
    External(ExternalSchedulerDelegate<E>),
}

impl<E: EcsApi> NodeSelector<E> {
    /// Build the strategy named by `kind`. `External` needs an Ecs client.
    pub fn from_kind(
        kind: StrategyKind,
        repo: Arc<dyn NodeRepository>,
        ecs: Option<E>,
    ) -> PlacementResult<Self> {
        let selector = match kind {
            StrategyKind::LocalWeighted => {
                Self::LocalWeighted(LocalWeightedSelection::new(repo))
            }
            StrategyKind::External => {
                let ecs = ecs.ok_or(PlacementError::MissingEcsClient)?;
                Self::External(ExternalSchedulerDelegate::new(ecs, repo))
            }
        };
        info!(strategy = ?kind, "node selector configured");
        Ok(selector)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::LocalWeighted(_) => StrategyKind::LocalWeighted,
            Self::External(_) => StrategyKind::External,
        }
    }

    /// Choose a node for `line_id` (no reservation).
    pub async fn select(&self, line_id: LineId) -> PlacementResult<Node> {
        match self {
            Self::LocalWeighted(local) => local.select(line_id),
            Self::External(external) => external.select(line_id).await,
        }
    }

    /// The local strategy, when it is the one in force.
    pub fn as_local(&self) -> Option<&LocalWeightedSelection> {
        match self {
            Self::LocalWeighted(local) => Some(local),
            Self::External(_) => None,
        }
    }
}
