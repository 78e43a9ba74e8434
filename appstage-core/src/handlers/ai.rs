//! `ai`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use appstage_gateway::AiExecutionRequest;

use crate::dispatch::{ActionContext, ActionHandler};
use crate::error::CoreResult;
use crate::handlers::parse_payload;
use crate::template::{extract_template_variables, interpolate};
use crate::types::{kind, AiAction, PopupDescriptor, PopupVariant};

/// Shown when an `ai` action fails and declares no `onError` branch.
const DEFAULT_AI_ERROR_MESSAGE: &str =
    "Something went wrong while generating a response. Please try again.";

/// Run a prompt through the AI execution collaborator.
///
/// Every `{{fieldId}}` occurrence in the prompt is substituted with the
/// current form value for that field, and the referenced fields travel
/// along in the request's context map. The response text lands in
/// `saveToField` of form state.
pub struct AiHandler;

#[async_trait]
impl ActionHandler for AiHandler {
    async fn handle(&self, action: &Value, ctx: &ActionContext) -> CoreResult<()> {
        let payload: AiAction = parse_payload(kind::AI, action)?;
        // Without a document there is no app to run the prompt for: no-op,
        // no call issued.
        let Some(document) = ctx.document.as_deref() else {
            return Ok(());
        };

        let form = ctx.form.snapshot().await;
        let form_context = Value::Object(form.iter().map(|(k, v)| (k.clone(), v.clone())).collect());

        let mut context: BTreeMap<String, Value> = match payload.context.as_ref() {
            Some(Value::Object(declared)) => declared
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => BTreeMap::new(),
        };
        for field_id in extract_template_variables(&payload.prompt) {
            if let Some(value) = form.get(&field_id) {
                context.insert(field_id, value.clone());
            }
        }

        let request = AiExecutionRequest {
            app_id: document.id.clone(),
            ai_action: payload.ai_action.clone(),
            prompt: interpolate(&payload.prompt, &form_context),
            persona: payload.persona.clone(),
            context,
        };

        let outcome = match ctx.ai.as_ref() {
            Some(executor) => executor.execute(&request).await,
            None => {
                // Treated like any other execution failure so the action's
                // own error branch still runs.
                Err(appstage_gateway::GatewayError::ExecutionFailed {
                    message: "no AI executor configured".to_string(),
                })
            }
        };

        match outcome {
            Ok(text) => {
                if let Some(field) = payload.save_to_field.as_ref() {
                    ctx.form.set_field(field.clone(), Value::String(text)).await;
                }
                ctx.dispatch_chained(payload.on_success.as_ref()).await;
            }
            Err(e) => {
                log::warn!("ai action '{}' failed: {e}", payload.ai_action);
                if payload.on_error.is_some() {
                    ctx.dispatch_chained(payload.on_error.as_ref()).await;
                } else {
                    ctx.present_popup(PopupDescriptor {
                        title: Some("AI".to_string()),
                        message: DEFAULT_AI_ERROR_MESSAGE.to_string(),
                        variant: PopupVariant::Error,
                        buttons: Vec::new(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DEFAULT_AI_ERROR_MESSAGE;
    use crate::test_utils::create_test_context;
    use crate::types::PopupVariant;
    use appstage_gateway::GatewayError;
    use serde_json::json;

    #[tokio::test]
    async fn prompt_is_interpolated_and_context_collected() {
        let (ctx, mocks) = create_test_context().await;
        mocks.ai.succeed_with("A fine haiku").await;
        ctx.form.set_field("topic", json!("autumn rain")).await;

        ctx.dispatch(&json!({
            "type": "ai",
            "aiAction": "haiku",
            "prompt": "Write a haiku about {{topic}}.",
            "saveToField": "result"
        }))
        .await;

        let sent = mocks.ai.requests().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].prompt, "Write a haiku about autumn rain.");
        assert_eq!(sent[0].ai_action, "haiku");
        assert_eq!(sent[0].app_id, "test-app");
        assert_eq!(sent[0].context.get("topic"), Some(&json!("autumn rain")));

        assert_eq!(ctx.form.value("result").await, Some(json!("A fine haiku")));
    }

    #[tokio::test]
    async fn declared_context_merges_with_referenced_fields() {
        let (ctx, mocks) = create_test_context().await;
        mocks.ai.succeed_with("ok").await;
        ctx.form.set_field("notes", json!("remember the milk")).await;

        ctx.dispatch(&json!({
            "type": "ai",
            "aiAction": "summarize",
            "prompt": "Summarize {{notes}}",
            "context": {"tone": "friendly"}
        }))
        .await;

        let sent = mocks.ai.requests().await;
        assert_eq!(sent[0].context.get("tone"), Some(&json!("friendly")));
        assert_eq!(sent[0].context.get("notes"), Some(&json!("remember the milk")));
    }

    #[tokio::test]
    async fn success_runs_on_success_chain() {
        let (ctx, mocks) = create_test_context().await;
        mocks.ai.succeed_with("done").await;

        ctx.dispatch(&json!({
            "type": "ai",
            "aiAction": "draft",
            "prompt": "Draft something",
            "onSuccess": {"type": "navigate", "target": "review"}
        }))
        .await;

        assert_eq!(ctx.navigation.current().await.as_deref(), Some("review"));
    }

    #[tokio::test]
    async fn failure_without_on_error_shows_default_popup() {
        let (ctx, mocks) = create_test_context().await;
        mocks
            .ai
            .fail_with(GatewayError::ExecutionFailed {
                message: "quota exceeded".into(),
            })
            .await;

        ctx.dispatch(&json!({"type": "ai", "aiAction": "draft", "prompt": "x"}))
            .await;

        let presented = mocks.popups.presented();
        assert_eq!(presented.len(), 1);
        assert_eq!(presented[0].message, DEFAULT_AI_ERROR_MESSAGE);
        assert_eq!(presented[0].variant, PopupVariant::Error);
    }

    #[tokio::test]
    async fn failure_with_on_error_runs_the_chain_instead() {
        let (ctx, mocks) = create_test_context().await;
        mocks
            .ai
            .fail_with(GatewayError::ExecutionFailed { message: "x".into() })
            .await;

        ctx.dispatch(&json!({
            "type": "ai",
            "aiAction": "draft",
            "prompt": "x",
            "onError": {"type": "navigate", "target": "sorry"}
        }))
        .await;

        assert_eq!(ctx.navigation.current().await.as_deref(), Some("sorry"));
        assert!(mocks.popups.presented().is_empty());
    }

    #[tokio::test]
    async fn no_document_means_no_call() {
        let (mut ctx, mocks) = create_test_context().await;
        ctx.document = None;
        ctx.dispatch(&json!({"type": "ai", "aiAction": "draft", "prompt": "x"}))
            .await;
        assert!(mocks.ai.requests().await.is_empty());
        assert!(mocks.popups.presented().is_empty());
    }
}
