//! qzcloud-provision: the VPS provisioning request path.
//!
//! A `ProvisionOrder` names a line and the host shape. The provisioner:
//!
//! - Rejects missing, inactive and upstream lines
//! - Picks a node (explicit id, or the configured `NodeSelector`)
//! - Writes the host record, atomically with the pick when reservation is on
//! - Builds the Ecs `ProvisionRequest` from order, line, area and node fields
//! - Calls Ecs, then marks the host running or releases it
//!
//! ```text
//! Provisioner
//!   ├── StateStore (lines, areas, nodes, host records)
//!   ├── NodeSelector (LocalWeighted | External)
//!   └── EcsApi (create_vps)
//! ```

pub mod error;
pub mod order;
pub mod provisioner;

pub use error::{ProvisionError, ProvisionResult};
pub use order::{ProvisionOrder, build_request};
pub use provisioner::{ProvisionOutcome, Provisioner, release_host};
