//! Per-dispatch dependency bag.

use std::sync::Arc;

use serde_json::Value;

use appstage_gateway::{AiExecutor, ApiTransport};

use crate::dispatch::ActionDispatcher;
use crate::error::{CoreError, CoreResult};
use crate::state::{DataStore, FormState, NavigationState, SessionState};
use crate::types::{AppDocument, PopupDescriptor, PopupSink};

/// Everything a handler may touch, threaded explicitly through every
/// dispatch call.
///
/// The context is rebuilt for each dispatch; all handles are cheap clones
/// of containers owned by the hosting `PreviewApp`. Handlers never reach
/// for ambient state, which keeps the core testable without a surrounding
/// render layer.
#[derive(Clone)]
pub struct ActionContext {
    /// The declarative document, when one is loaded.
    pub document: Option<Arc<AppDocument>>,
    /// Pending form field values.
    pub form: FormState,
    /// Authenticated-user session.
    pub session: SessionState,
    /// The active app's in-memory tables.
    pub store: DataStore,
    /// Current screen + pending redirect.
    pub navigation: NavigationState,
    /// Dialog presentation seam; absent in headless hosts.
    pub popups: Option<Arc<dyn PopupSink>>,
    /// AI execution collaborator; absent when the host wired none.
    pub ai: Option<Arc<dyn AiExecutor>>,
    /// App-author API collaborator for `submit` actions.
    pub api: Arc<dyn ApiTransport>,
    /// The dispatcher itself, so a handler can trigger follow-up actions
    /// (`onSuccess` / `onError` / chained popup buttons).
    pub dispatcher: Arc<ActionDispatcher>,
}

impl ActionContext {
    /// Dispatch a follow-up action through the owning dispatcher.
    pub async fn dispatch(&self, action: &Value) {
        self.dispatcher.dispatch(action, self).await;
    }

    /// Dispatch a follow-up action when one is declared.
    pub async fn dispatch_chained(&self, action: Option<&Value>) {
        if let Some(action) = action {
            self.dispatch(action).await;
        }
    }

    /// The loaded document, or the no-document error handlers map to a
    /// no-op.
    pub fn document(&self) -> CoreResult<&AppDocument> {
        self.document
            .as_deref()
            .ok_or(CoreError::MissingDocument)
    }

    /// Hand a dialog descriptor to the presentation layer, if one exists.
    pub fn present_popup(&self, popup: PopupDescriptor) {
        if let Some(sink) = &self.popups {
            sink.present(popup);
        }
    }
}
