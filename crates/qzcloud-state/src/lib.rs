//! qzcloud-state: embedded inventory store for qzcloud.
//!
//! Backed by [redb](https://docs.rs/redb), holds the operator-managed
//! inventory (areas, lines, nodes) and the host records whose counts decide
//! node capacity.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns,
//! keyed by their `u64` id. Per-node host counts are derived on every call
//! by scanning the hosts table; nothing is cached.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across threads and async tasks. Write transactions are
//! serialized by redb, which is what [`StateStore::reserve_host`] relies on.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::{Reservation, StateStore};
pub use types::*;
