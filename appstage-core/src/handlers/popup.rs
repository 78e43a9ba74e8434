//! `popup`.

use async_trait::async_trait;
use serde_json::Value;

use crate::dispatch::{ActionContext, ActionHandler};
use crate::error::CoreResult;
use crate::handlers::parse_payload;
use crate::types::{kind, PopupAction, PopupDescriptor};

/// Hand a normalized dialog descriptor to the presentation layer.
///
/// Headless hosts register no popup sink; the handler then does nothing,
/// silently.
pub struct PopupHandler;

#[async_trait]
impl ActionHandler for PopupHandler {
    async fn handle(&self, action: &Value, ctx: &ActionContext) -> CoreResult<()> {
        let payload: PopupAction = parse_payload(kind::POPUP, action)?;
        ctx.present_popup(PopupDescriptor {
            title: payload.title,
            message: payload.message,
            variant: payload.variant,
            buttons: payload.buttons,
        });
        Ok(())
    }
}
