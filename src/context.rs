use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::Record;
use crate::types::{PluginName, TableName};

/// Accumulated fetch result for one table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableFetch {
    /// Records accumulated in page order. On a partial fetch these are the
    /// pages that arrived before the failure.
    pub records: Vec<Record>,
    /// Set when pagination stopped early because a page fetch failed.
    pub partial: bool,
    /// The error that stopped pagination, when `partial` is set.
    pub error: Option<String>,
}

impl TableFetch {
    /// A complete fetch holding the given records.
    pub fn complete(records: Vec<Record>) -> Self {
        Self {
            records,
            partial: false,
            error: None,
        }
    }

    /// A fetch cut short by `error`, keeping the records already received.
    pub fn partial(records: Vec<Record>, error: impl Into<String>) -> Self {
        Self {
            records,
            partial: true,
            error: Some(error.into()),
        }
    }
}

/// Per-run cache written by the acquisition stage and read by the
/// normalization stage.
///
/// Table order is configuration order; record order within a table is the
/// source page order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginContext {
    /// Fetched tables, keyed by table name.
    pub tables: IndexMap<TableName, TableFetch>,
    /// When the acquisition run finished.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PluginContext {
    /// Number of cached tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Total number of cached records across all tables.
    pub fn record_count(&self) -> usize {
        self.tables.values().map(|fetch| fetch.records.len()).sum()
    }

    /// Returns `true` when no tables are cached.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns `true` when any table's pagination stopped early.
    pub fn has_partial_tables(&self) -> bool {
        self.tables.values().any(|fetch| fetch.partial)
    }

    /// Whether two contexts hold the same table data, ignoring fetch time.
    pub fn same_tables(&self, other: &PluginContext) -> bool {
        self.tables == other.tables
    }
}

/// Host-owned store of plugin contexts, keyed by plugin identity.
///
/// Handles are cheap clones over shared state. Each plugin's context has a
/// single writer (its acquisition stage) and is read once per pipeline
/// cycle (its normalization stage); the lock exists so watch tasks can
/// publish refreshed contexts safely.
#[derive(Clone, Default)]
pub struct ContextStore {
    inner: Arc<RwLock<HashMap<PluginName, PluginContext>>>,
}

impl ContextStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a cloned snapshot of the named plugin's context.
    pub fn get(&self, plugin: &str) -> Option<PluginContext> {
        let inner = self.inner.read().expect("context store poisoned");
        inner.get(plugin).cloned()
    }

    /// Replace the named plugin's context.
    pub fn set(&self, plugin: impl Into<PluginName>, context: PluginContext) {
        let mut inner = self.inner.write().expect("context store poisoned");
        inner.insert(plugin.into(), context);
    }

    /// Drop the named plugin's context, forcing the next run to refetch.
    pub fn clear(&self, plugin: &str) {
        let mut inner = self.inner.write().expect("context store poisoned");
        inner.remove(plugin);
    }

    /// Returns `true` when the named plugin has a stored context.
    pub fn contains(&self, plugin: &str) -> bool {
        let inner = self.inner.read().expect("context store poisoned");
        inner.contains_key(plugin)
    }
}
