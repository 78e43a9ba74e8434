//! `deleteRecord`.

use async_trait::async_trait;
use serde_json::Value;

use crate::dispatch::{ActionContext, ActionHandler};
use crate::error::CoreResult;
use crate::handlers::parse_payload;
use crate::types::{kind, DeleteRecordAction};

/// Remove one record from a store table. A missing id or table is a no-op,
/// never an error — absence means "already gone" in a preview store.
pub struct DeleteRecordHandler;

#[async_trait]
impl ActionHandler for DeleteRecordHandler {
    async fn handle(&self, action: &Value, ctx: &ActionContext) -> CoreResult<()> {
        let payload: DeleteRecordAction = parse_payload(kind::DELETE_RECORD, action)?;

        let mut tables = ctx.store.snapshot().await;
        tables.delete_record(&payload.table, &payload.record_id);
        ctx.store.replace(tables).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_context;
    use serde_json::json;

    #[tokio::test]
    async fn deletes_the_matching_record() {
        let (ctx, _mocks) = create_test_context().await;
        let mut tables = ctx.store.snapshot().await;
        tables.append_record("tasks", json!({"id": "t1", "title": "a"}));
        tables.append_record("tasks", json!({"id": "t2", "title": "b"}));
        ctx.store.replace(tables).await;

        ctx.dispatch(&json!({"type": "deleteRecord", "table": "tasks", "recordId": "t1"}))
            .await;

        let tables = ctx.store.snapshot().await;
        assert_eq!(tables.records("tasks").len(), 1);
        assert!(tables.find_record("tasks", "t2").is_some());
    }

    #[tokio::test]
    async fn missing_id_leaves_table_and_siblings_untouched() {
        let (ctx, _mocks) = create_test_context().await;
        let mut tables = ctx.store.snapshot().await;
        tables.append_record("tasks", json!({"id": "t1"}));
        tables.append_record("notes", json!({"id": "n1"}));
        ctx.store.replace(tables).await;

        ctx.dispatch(&json!({"type": "deleteRecord", "table": "tasks", "recordId": "ghost"}))
            .await;

        let tables = ctx.store.snapshot().await;
        assert_eq!(tables.records("tasks").len(), 1);
        assert_eq!(tables.records("notes").len(), 1);
    }

    #[tokio::test]
    async fn missing_table_is_a_noop() {
        let (ctx, _mocks) = create_test_context().await;
        ctx.dispatch(&json!({"type": "deleteRecord", "table": "ghosts", "recordId": "1"}))
            .await;
        assert!(ctx.store.snapshot().await.records("ghosts").is_empty());
    }
}
