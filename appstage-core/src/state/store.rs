//! In-memory, schema-aware table set simulating persistence.
//!
//! `TableSet` is a plain value: handlers snapshot it, apply whole-table
//! operations on the owned copy, and hand the result back to `DataStore`
//! in one replacement. Absence is never an error here — a missing table
//! reads as empty, a missing record makes the operation a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::types::{AppDocument, DatabaseSchema};

const EMPTY_TABLE: &[Value] = &[];

/// App id that ships with demo rows; see [`seed_demo_rows`].
pub const DEMO_SEED_APP_ID: &str = "demo-task-tracker";

/// One app's tables: `tableName -> records`.
///
/// Records are loosely-typed JSON objects expected to carry a unique `id`;
/// extra or missing fields are tolerated — type enforcement belongs to the
/// external entity-validation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSet {
    tables: HashMap<String, Vec<Value>>,
}

impl TableSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All tables, keyed by name.
    #[must_use]
    pub fn tables(&self) -> &HashMap<String, Vec<Value>> {
        &self.tables
    }

    /// Records of one table; an absent table reads as empty.
    #[must_use]
    pub fn records(&self, table: &str) -> &[Value] {
        self.tables.get(table).map_or(EMPTY_TABLE, Vec::as_slice)
    }

    /// Find one record by `id`.
    #[must_use]
    pub fn find_record(&self, table: &str, id: &str) -> Option<&Value> {
        self.records(table)
            .iter()
            .find(|record| record.get("id").and_then(Value::as_str) == Some(id))
    }

    /// Whether every table is empty (or no table exists at all).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.values().all(Vec::is_empty)
    }

    /// Create the table if absent, initialized empty.
    pub fn ensure_table(&mut self, table: &str) {
        if !self.tables.contains_key(table) {
            self.tables.insert(table.to_string(), Vec::new());
        }
    }

    /// Append a record to the end of the table, creating the table first if
    /// needed. The caller is responsible for having put a unique `id` on
    /// the record.
    pub fn append_record(&mut self, table: &str, record: Value) {
        self.tables.entry(table.to_string()).or_default().push(record);
    }

    /// Replace the record whose `id` matches with `{..record, ..patch}`.
    /// No matching record leaves the table unchanged.
    pub fn update_record(&mut self, table: &str, id: &str, patch: &Value) {
        self.ensure_table(table);
        if let Some(rows) = self.tables.get_mut(table) {
            for record in rows.iter_mut() {
                if record.get("id").and_then(Value::as_str) != Some(id) {
                    continue;
                }
                if let (Value::Object(target), Value::Object(fields)) = (&mut *record, patch) {
                    for (key, value) in fields {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    }

    /// Remove the record whose `id` matches. An absent id or table is a
    /// no-op.
    pub fn delete_record(&mut self, table: &str, id: &str) {
        self.ensure_table(table);
        if let Some(rows) = self.tables.get_mut(table) {
            rows.retain(|record| record.get("id").and_then(Value::as_str) != Some(id));
        }
    }

    /// Create, empty, every schema table the store does not know yet.
    /// Existing tables and their records are untouched.
    pub fn sync_with_schema(&mut self, schema: &DatabaseSchema) {
        for table in schema.tables.keys() {
            self.ensure_table(table);
        }
    }
}

/// Owning container for the active app's tables.
///
/// Handlers never mutate through this type: they `snapshot`, transform the
/// owned `TableSet`, and `replace` — one atomic swap per handler call.
#[derive(Clone)]
pub struct DataStore {
    tables: Arc<RwLock<TableSet>>,
}

impl DataStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(TableSet::new())),
        }
    }

    /// Clone the full table set.
    pub async fn snapshot(&self) -> TableSet {
        self.tables.read().await.clone()
    }

    /// Swap in a fully-computed table set.
    pub async fn replace(&self, tables: TableSet) {
        *self.tables.write().await = tables;
    }

    /// Reset to an empty store.
    pub async fn clear(&self) {
        *self.tables.write().await = TableSet::new();
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a new record for `table`: schema defaults first, then the given
/// fields on top, then a fresh unique id.
#[must_use]
pub fn build_record(
    schema: Option<&DatabaseSchema>,
    table: &str,
    fields: impl IntoIterator<Item = (String, Value)>,
) -> Value {
    let mut record = serde_json::Map::new();
    if let Some(table_schema) = schema.and_then(|s| s.tables.get(table)) {
        for (name, spec) in &table_schema.fields {
            if let Some(default) = &spec.default {
                record.insert(name.clone(), default.clone());
            }
        }
    }
    for (name, value) in fields {
        record.insert(name, value);
    }
    record.insert("id".to_string(), Value::String(generate_record_id()));
    Value::Object(record)
}

/// Fresh unique record id.
#[must_use]
pub fn generate_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Bootstrap rule for one legacy demo app: the first time the whole store
/// is empty, its task table is seeded with fixed rows so the preview has
/// something to show. Not a general feature — every other app starts from
/// the schema's empty tables.
pub fn seed_demo_rows(document: &AppDocument, tables: &mut TableSet) -> bool {
    if document.id != DEMO_SEED_APP_ID || !tables.is_empty() {
        return false;
    }
    let today = Utc::now().format("%Y-%m-%d").to_string();
    for (title, done) in [
        ("Review the launch checklist", true),
        ("Invite the beta testers", false),
        ("Draft the release notes", false),
    ] {
        tables.append_record(
            "tasks",
            json!({
                "id": generate_record_id(),
                "title": title,
                "done": done,
                "createdAt": today,
            }),
        );
    }
    log::info!("Seeded demo rows for app '{DEMO_SEED_APP_ID}'");
    true
}
