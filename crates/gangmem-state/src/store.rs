//! StateStore — redb-backed unit and node storage.
//!
//! Values are JSON-serialized into redb's `&[u8]` columns. The store
//! supports both on-disk and in-memory backends (the latter for testing and
//! for one-shot cycles driven from a cluster file).

use std::path::Path;
use std::sync::Arc;

use gangmem_core::{
    HostError, LabelSelector, NodeResourceState, NodeSnapshot, UnitLister, WorkloadUnit,
};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store.
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(UNITS).map_err(map_err!(Table))?;
        txn.open_table(NODES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Units ──────────────────────────────────────────────────────

    /// Insert or update a workload unit.
    pub fn put_unit(&self, unit: &WorkloadUnit) -> StateResult<()> {
        self.put_entry(UNITS, &unit.name, unit)?;
        debug!(unit = %unit.name, "unit stored");
        Ok(())
    }

    pub fn get_unit(&self, name: &str) -> StateResult<Option<WorkloadUnit>> {
        self.get_entry(UNITS, name)
    }

    pub fn list_units(&self) -> StateResult<Vec<WorkloadUnit>> {
        self.list_entries(UNITS)
    }

    /// Delete a unit by name. Returns true if it existed.
    pub fn delete_unit(&self, name: &str) -> StateResult<bool> {
        self.delete_entry(UNITS, name)
    }

    // ── Nodes ──────────────────────────────────────────────────────

    /// Insert or update a node snapshot.
    pub fn put_node(&self, node: &NodeResourceState) -> StateResult<()> {
        self.put_entry(NODES, &node.node_id, node)?;
        debug!(node = %node.node_id, "node stored");
        Ok(())
    }

    pub fn get_node(&self, node_id: &str) -> StateResult<Option<NodeResourceState>> {
        self.get_entry(NODES, node_id)
    }

    pub fn list_nodes(&self) -> StateResult<Vec<NodeResourceState>> {
        self.list_entries(NODES)
    }

    /// Delete a node by ID. Returns true if it existed.
    pub fn delete_node(&self, node_id: &str) -> StateResult<bool> {
        self.delete_entry(NODES, node_id)
    }

    // ── Table helpers ──────────────────────────────────────────────

    fn put_entry<T: Serialize>(&self, table: JsonTable, key: &str, value: &T) -> StateResult<()> {
        let value = serde_json::to_vec(value).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            table
                .insert(key, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get_entry<T: DeserializeOwned>(&self, table: JsonTable, key: &str) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let value: T =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn list_entries<T: DeserializeOwned>(&self, table: JsonTable) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let item: T = serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(item);
        }
        Ok(results)
    }

    fn delete_entry(&self, table: JsonTable, key: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, existed, "entry deleted");
        Ok(existed)
    }
}

impl UnitLister for StateStore {
    fn list(&self, selector: &LabelSelector) -> Result<Vec<WorkloadUnit>, HostError> {
        let units = self.list_units()?;
        Ok(units
            .into_iter()
            .filter(|unit| selector.matches(&unit.labels))
            .collect())
    }
}

impl NodeSnapshot for StateStore {
    fn node_resources(&self, node_id: &str) -> Result<NodeResourceState, HostError> {
        self.get_node(node_id)?
            .ok_or_else(|| HostError::NotFound(format!("node {node_id}")))
    }
}
