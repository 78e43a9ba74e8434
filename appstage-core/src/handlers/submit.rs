//! `submit` — to the in-memory store or to an app-author endpoint.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use appstage_gateway::ApiSubmitRequest;

use crate::dispatch::{ActionContext, ActionHandler};
use crate::error::{CoreError, CoreResult};
use crate::handlers::parse_payload;
use crate::state::build_record;
use crate::types::{kind, SubmitAction};

/// Persist the named form fields.
///
/// `table` targets the in-memory store; `endpoint` targets an external API
/// through the gateway. Either way, the consumed form fields are reset to
/// the empty string on success and `onSuccess` runs afterwards; the api
/// path routes failures through `onError` instead.
pub struct SubmitHandler;

#[async_trait]
impl ActionHandler for SubmitHandler {
    async fn handle(&self, action: &Value, ctx: &ActionContext) -> CoreResult<()> {
        let payload: SubmitAction = parse_payload(kind::SUBMIT, action)?;

        if payload.table.is_some() {
            submit_to_store(&payload, ctx).await
        } else if payload.endpoint.is_some() {
            submit_to_api(&payload, ctx).await
        } else {
            Err(CoreError::ValidationError(
                "submit action needs a 'table' or an 'endpoint'".to_string(),
            ))
        }
    }
}

/// Collect `destinationField -> value` for every mapped form field that
/// currently holds a value.
async fn collect_fields(
    payload: &SubmitAction,
    ctx: &ActionContext,
) -> BTreeMap<String, Value> {
    let form = ctx.form.snapshot().await;
    payload
        .fields
        .iter()
        .filter_map(|(field, form_field_id)| {
            form.get(form_field_id)
                .map(|value| (field.clone(), value.clone()))
        })
        .collect()
}

async fn submit_to_store(payload: &SubmitAction, ctx: &ActionContext) -> CoreResult<()> {
    let Some(table) = payload.table.as_deref() else {
        return Ok(());
    };
    let schema = ctx
        .document
        .as_deref()
        .and_then(|doc| doc.database.as_ref());

    let record = build_record(schema, table, collect_fields(payload, ctx).await);

    let mut tables = ctx.store.snapshot().await;
    tables.append_record(table, record);
    ctx.store.replace(tables).await;

    ctx.form.reset_fields(payload.fields.values().cloned()).await;
    ctx.dispatch_chained(payload.on_success.as_ref()).await;
    Ok(())
}

async fn submit_to_api(payload: &SubmitAction, ctx: &ActionContext) -> CoreResult<()> {
    let Some(endpoint) = payload.endpoint.clone() else {
        return Ok(());
    };
    let body = Value::Object(collect_fields(payload, ctx).await.into_iter().collect());
    let request = ApiSubmitRequest {
        endpoint,
        method: payload.method.clone(),
        headers: payload.headers.clone(),
        body,
    };

    match ctx.api.submit(&request).await {
        Ok(()) => {
            ctx.form.reset_fields(payload.fields.values().cloned()).await;
            ctx.dispatch_chained(payload.on_success.as_ref()).await;
            Ok(())
        }
        Err(e) => match payload.on_error.as_ref() {
            Some(on_error) => {
                log::warn!("submit to '{}' failed: {e}", request.endpoint);
                ctx.dispatch(on_error).await;
                Ok(())
            }
            None => Err(e.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_context;
    use appstage_gateway::GatewayError;
    use serde_json::json;

    #[tokio::test]
    async fn store_submit_appends_one_record_and_resets_its_fields() {
        let (ctx, _mocks) = create_test_context().await;
        ctx.form.set_field("nameField", json!("Ada")).await;
        ctx.form.set_field("unrelated", json!("keep")).await;

        ctx.dispatch(&json!({
            "type": "submit",
            "table": "people",
            "fields": {"name": "nameField"}
        }))
        .await;

        let tables = ctx.store.snapshot().await;
        let rows = tables.records("people");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Ada");
        assert!(rows[0]["id"].is_string());
        assert_eq!(
            rows[0].as_object().map(serde_json::Map::len),
            Some(2),
            "record must carry exactly id + name"
        );

        assert_eq!(ctx.form.value("nameField").await, Some(json!("")));
        assert_eq!(ctx.form.value("unrelated").await, Some(json!("keep")));
    }

    #[tokio::test]
    async fn store_submit_applies_schema_defaults() {
        let (ctx, _mocks) = create_test_context().await;
        ctx.form.set_field("titleField", json!("ship it")).await;

        ctx.dispatch(&json!({
            "type": "submit",
            "table": "tasks",
            "fields": {"title": "titleField"}
        }))
        .await;

        let tables = ctx.store.snapshot().await;
        let row = &tables.records("tasks")[0];
        assert_eq!(row["title"], "ship it");
        // "status" defaults to "open" in the test document's schema
        assert_eq!(row["status"], "open");
    }

    #[tokio::test]
    async fn store_submit_runs_on_success_chain() {
        let (ctx, _mocks) = create_test_context().await;
        ctx.dispatch(&json!({
            "type": "submit",
            "table": "tasks",
            "fields": {},
            "onSuccess": {"type": "navigate", "target": "done"}
        }))
        .await;
        assert_eq!(ctx.navigation.current().await.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn api_submit_success_clears_fields_and_chains() {
        let (ctx, mocks) = create_test_context().await;
        ctx.form.set_field("emailField", json!("a@b.c")).await;

        ctx.dispatch(&json!({
            "type": "submit",
            "endpoint": "https://example.com/subscribe",
            "method": "put",
            "headers": {"x-api-key": "k"},
            "fields": {"email": "emailField"},
            "onSuccess": {"type": "navigate", "target": "thanks"}
        }))
        .await;

        let sent = mocks.api.requests().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].endpoint, "https://example.com/subscribe");
        assert_eq!(sent[0].method.as_deref(), Some("put"));
        assert_eq!(sent[0].headers.get("x-api-key").map(String::as_str), Some("k"));
        assert_eq!(sent[0].body["email"], "a@b.c");

        assert_eq!(ctx.form.value("emailField").await, Some(json!("")));
        assert_eq!(ctx.navigation.current().await.as_deref(), Some("thanks"));
    }

    #[tokio::test]
    async fn api_submit_failure_routes_on_error_and_keeps_fields() {
        let (ctx, mocks) = create_test_context().await;
        mocks
            .api
            .fail_with(GatewayError::Status {
                endpoint: "https://example.com/subscribe".into(),
                status: 500,
                body: String::new(),
            })
            .await;
        ctx.form.set_field("emailField", json!("a@b.c")).await;

        ctx.dispatch(&json!({
            "type": "submit",
            "endpoint": "https://example.com/subscribe",
            "fields": {"email": "emailField"},
            "onError": {"type": "popup", "message": "could not subscribe"}
        }))
        .await;

        assert_eq!(ctx.form.value("emailField").await, Some(json!("a@b.c")));
        let presented = mocks.popups.presented();
        assert_eq!(presented.len(), 1);
        assert_eq!(presented[0].message, "could not subscribe");
    }

    #[tokio::test]
    async fn api_submit_failure_without_on_error_is_swallowed() {
        let (ctx, mocks) = create_test_context().await;
        mocks
            .api
            .fail_with(GatewayError::NetworkError {
                endpoint: "https://example.com/hook".into(),
                detail: "connection refused".into(),
            })
            .await;
        ctx.form.set_field("emailField", json!("a@b.c")).await;

        // No onError declared: the failure ends at the dispatcher's log
        ctx.dispatch(&json!({
            "type": "submit",
            "endpoint": "https://example.com/hook",
            "fields": {"email": "emailField"}
        }))
        .await;

        assert_eq!(ctx.form.value("emailField").await, Some(json!("a@b.c")));
        assert!(mocks.popups.presented().is_empty());
    }

    #[tokio::test]
    async fn submit_without_destination_mutates_nothing() {
        let (ctx, mocks) = create_test_context().await;
        ctx.form.set_field("f", json!("v")).await;
        ctx.dispatch(&json!({"type": "submit", "fields": {"a": "f"}}))
            .await;

        assert!(ctx.store.snapshot().await.is_empty());
        assert!(mocks.api.requests().await.is_empty());
        assert_eq!(ctx.form.value("f").await, Some(json!("v")));
    }
}
