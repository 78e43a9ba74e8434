//! `navigate` and `goBack`.

use async_trait::async_trait;
use serde_json::Value;

use crate::dispatch::{ActionContext, ActionHandler};
use crate::error::CoreResult;
use crate::handlers::parse_payload;
use crate::types::{kind, NavigateAction};

/// Unconditionally switch the active screen to the action's target.
pub struct NavigateHandler;

#[async_trait]
impl ActionHandler for NavigateHandler {
    async fn handle(&self, action: &Value, ctx: &ActionContext) -> CoreResult<()> {
        let payload: NavigateAction = parse_payload(kind::NAVIGATE, action)?;
        ctx.navigation.navigate(payload.target).await;
        Ok(())
    }
}

/// Return to the document's initial screen.
///
/// A single-level "back", not a history stack: the interpreter keeps no
/// trail of visited screens. No document loaded means nothing to go back
/// to, which is a no-op.
pub struct GoBackHandler;

#[async_trait]
impl ActionHandler for GoBackHandler {
    async fn handle(&self, _action: &Value, ctx: &ActionContext) -> CoreResult<()> {
        let Some(document) = ctx.document.as_deref() else {
            return Ok(());
        };
        if let Some(initial) = document.initial_screen_id() {
            ctx.navigation.navigate(initial).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_context;
    use serde_json::json;

    #[tokio::test]
    async fn navigate_sets_the_screen_and_nothing_else() {
        let (ctx, mocks) = create_test_context().await;
        ctx.dispatch(&json!({"type": "navigate", "target": "home"}))
            .await;

        assert_eq!(ctx.navigation.current().await.as_deref(), Some("home"));
        assert!(ctx.form.snapshot().await.is_empty());
        assert!(ctx.session.snapshot().await.is_none());
        assert!(ctx.store.snapshot().await.is_empty());
        assert!(mocks.popups.presented().is_empty());
    }

    #[tokio::test]
    async fn navigate_without_target_is_dropped() {
        let (ctx, _mocks) = create_test_context().await;
        ctx.navigation.navigate("start").await;
        ctx.dispatch(&json!({"type": "navigate"})).await;
        assert_eq!(ctx.navigation.current().await.as_deref(), Some("start"));
    }

    #[tokio::test]
    async fn go_back_returns_to_initial_screen() {
        let (ctx, _mocks) = create_test_context().await;
        ctx.navigation.navigate("detail").await;
        ctx.dispatch(&json!({"type": "goBack"})).await;
        assert_eq!(ctx.navigation.current().await.as_deref(), Some("home"));
    }

    #[tokio::test]
    async fn go_back_without_document_is_a_noop() {
        let (mut ctx, _mocks) = create_test_context().await;
        ctx.document = None;
        ctx.navigation.navigate("somewhere").await;
        ctx.dispatch(&json!({"type": "goBack"})).await;
        assert_eq!(ctx.navigation.current().await.as_deref(), Some("somewhere"));
    }
}
