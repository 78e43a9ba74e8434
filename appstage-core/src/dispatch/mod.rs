//! Action dispatch.
//!
//! A mutable `kind -> handler` registry plus one entry point, `dispatch`.
//! The dispatcher is the error boundary of the interpreter: malformed
//! actions, unknown kinds, and handler failures are all logged and
//! swallowed here, so no action content can take the hosting UI down.

mod context;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::action_kind;

pub use context::ActionContext;

/// One action kind's behavior.
///
/// Handlers receive the raw action value and deserialize their own typed
/// payload, so registering a new kind never touches the dispatch core.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Execute the action. Errors are caught and logged by the dispatcher;
    /// expected business failures should flow through the action's own
    /// `onError` branch instead.
    async fn handle(&self, action: &Value, ctx: &ActionContext) -> CoreResult<()>;
}

/// `kind -> handler` registry.
pub struct ActionDispatcher {
    handlers: RwLock<HashMap<String, Arc<dyn ActionHandler>>>,
}

impl ActionDispatcher {
    /// Create an empty dispatcher. Hosts usually follow up with
    /// [`crate::handlers::register_builtin_handlers`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register (or replace) the handler for an action kind.
    pub async fn register(&self, kind: impl Into<String>, handler: Arc<dyn ActionHandler>) {
        self.handlers.write().await.insert(kind.into(), handler);
    }

    /// Whether a handler is registered for the kind. Exact string match, no
    /// case folding.
    pub async fn has_action_handler(&self, kind: &str) -> bool {
        self.handlers.read().await.contains_key(kind)
    }

    /// Route one action to its handler.
    ///
    /// Never panics and never propagates a handler failure: a null or
    /// typeless action, an unknown kind, and a failing handler all end at
    /// the log.
    pub async fn dispatch(&self, action: &Value, ctx: &ActionContext) {
        let Some(kind) = action_kind(action) else {
            log::warn!("Dropping action without a 'type': {action}");
            return;
        };

        let handler = { self.handlers.read().await.get(kind).cloned() };
        let Some(handler) = handler else {
            log::warn!("No handler registered for action kind '{kind}'");
            return;
        };

        log::debug!("Dispatching '{kind}' action");
        if let Err(e) = handler.handle(action, ctx).await {
            if e.is_expected() {
                log::warn!("Action '{kind}' did not complete: {e}");
            } else {
                log::error!("Action '{kind}' failed: {e}");
            }
        }
    }
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
