//! Provisioner: turns a `ProvisionOrder` into a running VPS.
//!
//! Flow per order:
//! 1. Load and check the line, then its area
//! 2. Place the host (explicit node, atomic reservation, or select + insert)
//! 3. Build the Ecs request and call `create_vps`
//! 4. Mark the host running, or release it if Ecs refused

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use qzcloud_ecs::{EcsApi, HttpEcsClient, ProvisionRequest};
use qzcloud_state::{
    Area, Host, HostId, HostState, Line, LineType, NewHost, Node, StateStore,
};
use qzcloud_placement::NodeSelector;

use crate::error::{ProvisionError, ProvisionResult};
use crate::order::{ProvisionOrder, build_request};

/// Result of a successful provisioning call.
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    /// The host record, now `Running`.
    pub host: Host,
    pub node: Node,
    pub request: ProvisionRequest,
    pub ecs_host_id: u64,
}

/// Drives the provisioning path against the store and Ecs.
pub struct Provisioner<E = HttpEcsClient> {
    store: StateStore,
    selector: NodeSelector<E>,
    ecs: E,
    reserve: bool,
}

impl<E: EcsApi> Provisioner<E> {
    /// `reserve` makes the local strategy pick and insert in one transaction.
    /// It has no effect on the external strategy.
    pub fn new(store: StateStore, selector: NodeSelector<E>, ecs: E, reserve: bool) -> Self {
        Self {
            store,
            selector,
            ecs,
            reserve,
        }
    }

    pub fn selector(&self) -> &NodeSelector<E> {
        &self.selector
    }

    pub async fn provision(&self, order: &ProvisionOrder) -> ProvisionResult<ProvisionOutcome> {
        let line = self.open_line(order)?;
        let area = self.area_of(&line)?;

        let now = epoch_secs();
        let (node, host) = self.place(order, NewHost::creating(&order.host_name, now)).await?;
        info!(
            line_id = line.id,
            node_id = node.id,
            host_id = host.id,
            "host placed"
        );

        let request = build_request(order, &line, &area, &node, &host, now);
        let created = match self.ecs.create_vps(&request).await {
            Ok(created) => created,
            Err(e) => {
                warn!(host_id = host.id, node_id = node.id, error = %e, "ecs create failed, releasing host");
                if let Err(release_err) =
                    self.store
                        .set_host_state(host.id, HostState::Removed, epoch_secs())
                {
                    warn!(host_id = host.id, error = %release_err, "failed to release host");
                }
                return Err(e.into());
            }
        };

        let host = self
            .store
            .mark_host_running(host.id, created.host_id, epoch_secs())?;
        info!(
            host_id = host.id,
            ecs_host_id = created.host_id,
            node_id = node.id,
            "vps provisioned"
        );

        Ok(ProvisionOutcome {
            host,
            node,
            request,
            ecs_host_id: created.host_id,
        })
    }

    pub fn release(&self, host_id: HostId) -> ProvisionResult<Host> {
        release_host(&self.store, host_id)
    }

    fn open_line(&self, order: &ProvisionOrder) -> ProvisionResult<Line> {
        let line = self
            .store
            .get_line(order.line_id)?
            .ok_or(ProvisionError::LineNotFound(order.line_id))?;
        if !line.is_active() {
            return Err(ProvisionError::LineInactive(line.id));
        }
        if line.line_type == LineType::Upstream {
            return Err(ProvisionError::UpstreamLineUnsupported(line.id));
        }
        Ok(line)
    }

    fn area_of(&self, line: &Line) -> ProvisionResult<Area> {
        self.store
            .get_area(line.area_id)?
            .ok_or(ProvisionError::AreaNotFound(line.area_id))
    }

    async fn place(&self, order: &ProvisionOrder, new_host: NewHost) -> ProvisionResult<(Node, Host)> {
        if let Some(node_id) = order.node_id {
            let node = self
                .store
                .get_node(node_id)?
                .ok_or(ProvisionError::NodeNotFound(node_id))?;
            if node.line_id != order.line_id {
                return Err(ProvisionError::NodeNotOnLine {
                    node_id,
                    line_id: order.line_id,
                });
            }
            debug!(node_id, "explicit node requested, skipping selection");
            let host = self.store.insert_host(new_host, &node)?;
            return Ok((node, host));
        }

        if let (true, Some(local)) = (self.reserve, self.selector.as_local()) {
            let reservation = local.select_and_reserve(order.line_id, new_host)?;
            return Ok((reservation.node, reservation.host));
        }

        let node = self.selector.select(order.line_id).await?;
        let host = self.store.insert_host(new_host, &node)?;
        Ok((node, host))
    }
}

/// Mark a host removed so its slot counts as free again.
///
/// Needs no Ecs client, so operator tooling can call it directly.
pub fn release_host(store: &StateStore, host_id: HostId) -> ProvisionResult<Host> {
    let host = store.set_host_state(host_id, HostState::Removed, epoch_secs())?;
    info!(host_id, node_id = host.node_id, "host released");
    Ok(host)
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
