//! Pending form field values.
//!
//! One flat `fieldId -> value` map for whatever screen is active. Handlers
//! read a snapshot and write back whole fields; submit resets exactly the
//! fields it consumed.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

/// Owning container for pending form values.
#[derive(Clone)]
pub struct FormState {
    fields: Arc<RwLock<HashMap<String, Value>>>,
}

impl FormState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clone the full field map.
    pub async fn snapshot(&self) -> HashMap<String, Value> {
        self.fields.read().await.clone()
    }

    /// Current value of one field.
    pub async fn value(&self, field_id: &str) -> Option<Value> {
        self.fields.read().await.get(field_id).cloned()
    }

    /// Set one field.
    pub async fn set_field(&self, field_id: impl Into<String>, value: Value) {
        self.fields.write().await.insert(field_id.into(), value);
    }

    /// Merge a set of fields in one write.
    pub async fn set_fields(&self, values: HashMap<String, Value>) {
        self.fields.write().await.extend(values);
    }

    /// Reset the named fields to the empty string, leaving others untouched.
    pub async fn reset_fields<I, S>(&self, field_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = self.fields.write().await;
        for id in field_ids {
            fields.insert(id.into(), Value::String(String::new()));
        }
    }

    /// Drop every pending value.
    pub async fn clear(&self) {
        self.fields.write().await.clear();
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}
