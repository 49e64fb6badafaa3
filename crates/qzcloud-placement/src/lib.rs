//! qzcloud node selection.
//!
//! Decides which node of a line receives a new VPS. The policy is
//! capacity-only: scan the line's active nodes from highest weight down and
//! take the first one whose host count is below its `max_vm_number`.
//!
//! # Components
//!
//! - **`selector`**: the scan itself (`pick_node`) and `LocalWeightedSelection`
//! - **`repository`**: `NodeRepository`, the read interface the scan runs on,
//!   implemented for `StateStore`
//! - **`memory`**: `InMemoryRepository`, a lock-guarded fake for tests
//! - **`strategy`**: `ExternalSchedulerDelegate` and the `NodeSelector`
//!   strategy chosen once at startup
//!
//! # Concurrency
//!
//! [`LocalWeightedSelection::select`] is a point-in-time read. Two callers
//! that select before either creates its host can both get the same node
//! and push it past its maximum. [`LocalWeightedSelection::select_and_reserve`]
//! runs the scan and the host insert as one transaction and cannot
//! over-subscribe.

pub mod error;
pub mod memory;
pub mod repository;
pub mod selector;
pub mod strategy;

pub use error::{PlacementError, PlacementResult};
pub use memory::InMemoryRepository;
pub use repository::{NodeRepository, Picker};
pub use selector::{LocalWeightedSelection, pick_node};
pub use strategy::{ExternalSchedulerDelegate, NodeSelector};
