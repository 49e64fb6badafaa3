//! redb table definitions for the inventory store.
//!
//! Every table is keyed by the record's numeric id and stores the record
//! as JSON. Key order doubles as insertion order for tie-breaking.

use redb::TableDefinition;

/// Areas (regions) keyed by area id.
pub const AREAS: TableDefinition<u64, &[u8]> = TableDefinition::new("areas");

/// Lines keyed by line id.
pub const LINES: TableDefinition<u64, &[u8]> = TableDefinition::new("lines");

/// Physical nodes keyed by node id.
pub const NODES: TableDefinition<u64, &[u8]> = TableDefinition::new("nodes");

/// Host (VPS) records keyed by host id.
pub const HOSTS: TableDefinition<u64, &[u8]> = TableDefinition::new("hosts");
