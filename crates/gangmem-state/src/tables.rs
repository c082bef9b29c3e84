//! redb table definitions for the gangmem state store.
//!
//! Both tables use `&str` keys and `&[u8]` values (JSON-serialized domain types).

use redb::TableDefinition;

/// Workload units keyed by `{name}`.
pub const UNITS: TableDefinition<&str, &[u8]> = TableDefinition::new("units");

/// Node resource snapshots keyed by `{node_id}`.
pub const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");
