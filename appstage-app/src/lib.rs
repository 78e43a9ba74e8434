//! Platform-agnostic application bootstrap for AppStage.
//!
//! Provides `PreviewApp` (the container owning the document and the four
//! state containers) and `PreviewAppBuilder` (collaborator injection).
//! Every frontend — web preview, desktop shell, headless test harness —
//! constructs one `PreviewApp` at startup and talks to it through
//! `handle_action`, `active_screen`, and `binding_context`.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use appstage_core::dispatch::{ActionContext, ActionDispatcher};
use appstage_core::error::{CoreError, CoreResult};
use appstage_core::handlers::register_builtin_handlers;
use appstage_core::state::{
    seed_demo_rows, ActiveScreen, DataStore, FormState, NavigationState, SessionState,
};
use appstage_core::template::{resolve_all_tokens, resolve_template};
use appstage_core::types::{AppDocument, PopupSink, Screen};
use appstage_gateway::{AiExecutor, ApiTransport};

/// The hosting container for one live preview.
///
/// Owns the declarative document and all mutable preview state. Handlers
/// never see this type — each dispatch gets a fresh `ActionContext` of
/// cheap container handles instead.
pub struct PreviewApp {
    document: RwLock<Option<Arc<AppDocument>>>,
    form: FormState,
    session: SessionState,
    store: DataStore,
    navigation: NavigationState,
    dispatcher: Arc<ActionDispatcher>,
    popups: Option<Arc<dyn PopupSink>>,
    ai: Option<Arc<dyn AiExecutor>>,
    api: Arc<dyn ApiTransport>,
}

impl PreviewApp {
    /// Load (or hot-swap) the declarative document.
    ///
    /// Syncs the store with the document's schema — every schema table not
    /// yet present is created empty — and runs the one legacy demo-seed
    /// rule. Existing preview state survives a document edit; only an app
    /// with no screen resolved yet is pointed at the initial screen.
    pub async fn load_document(&self, document: AppDocument) {
        let mut tables = self.store.snapshot().await;
        if let Some(schema) = document.database.as_ref() {
            tables.sync_with_schema(schema);
        }
        seed_demo_rows(&document, &mut tables);
        self.store.replace(tables).await;

        if self.navigation.current().await.is_none() {
            self.navigation
                .reset(document.initial_screen_id().map(str::to_string))
                .await;
        }

        log::info!("Loaded app document '{}'", document.id);
        *self.document.write().await = Some(Arc::new(document));
    }

    /// The loaded document, if any.
    pub async fn document(&self) -> Option<Arc<AppDocument>> {
        self.document.read().await.clone()
    }

    /// Throw away all preview state and restart from the initial screen.
    pub async fn reset_preview(&self) {
        self.form.clear().await;
        self.session.clear().await;
        self.store.clear().await;
        let initial = self
            .document()
            .await
            .and_then(|doc| doc.initial_screen_id().map(str::to_string));
        self.navigation.reset(initial).await;

        // Re-run schema sync and seeding against the now-empty store
        if let Some(document) = self.document().await {
            let mut tables = self.store.snapshot().await;
            if let Some(schema) = document.database.as_ref() {
                tables.sync_with_schema(schema);
            }
            seed_demo_rows(&document, &mut tables);
            self.store.replace(tables).await;
        }
    }

    /// Dispatch one UI-produced action. Never fails: every failure mode
    /// ends at the dispatcher's log.
    pub async fn handle_action(&self, action: &Value) {
        let ctx = self.action_context().await;
        self.dispatcher.dispatch(action, &ctx).await;
    }

    /// Resolve what the current render pass should show.
    ///
    /// May yield [`ActiveScreen::None`] while parking a corrective
    /// transition (auth gating, unknown screen); call
    /// [`apply_pending_redirect`](Self::apply_pending_redirect) after the
    /// pass to commit it.
    pub async fn active_screen(&self) -> ActiveScreen {
        let Some(document) = self.document().await else {
            return ActiveScreen::None;
        };
        self.navigation
            .resolve_active_screen(&document, &self.session)
            .await
    }

    /// Commit a parked redirect. Returns `true` when a transition happened
    /// and the host should resolve again.
    pub async fn apply_pending_redirect(&self) -> bool {
        self.navigation.apply_pending_redirect().await
    }

    /// The three binding scopes, assembled for template resolution:
    /// `formState` (pending field values), `user` (session user or null),
    /// `data` (the full table set).
    pub async fn binding_context(&self) -> Value {
        let mut context = Map::new();
        context.insert(
            "formState".to_string(),
            Value::Object(self.form.snapshot().await.into_iter().collect()),
        );
        context.insert(
            "user".to_string(),
            self.session.user().await.unwrap_or(Value::Null),
        );
        let tables = self.store.snapshot().await;
        context.insert(
            "data".to_string(),
            serde_json::to_value(&tables).unwrap_or(Value::Null),
        );
        Value::Object(context)
    }

    /// Run a screen's component tree through design-token and template
    /// resolution, ready for the render layer.
    pub async fn resolve_screen_components(&self, screen: &Screen) -> Vec<Value> {
        let tokens = self
            .document()
            .await
            .map(|doc| doc.design_tokens.clone())
            .unwrap_or_default();
        let context = self.binding_context().await;
        screen
            .components
            .iter()
            .map(|component| {
                let with_tokens = resolve_all_tokens(component, &tokens);
                resolve_template(&with_tokens, &context)
            })
            .collect()
    }

    /// The dispatcher, for registering app-specific action kinds.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<ActionDispatcher> {
        &self.dispatcher
    }

    #[must_use]
    pub fn form(&self) -> &FormState {
        &self.form
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    #[must_use]
    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    /// Build the per-dispatch dependency bag from the current containers.
    async fn action_context(&self) -> ActionContext {
        ActionContext {
            document: self.document().await,
            form: self.form.clone(),
            session: self.session.clone(),
            store: self.store.clone(),
            navigation: self.navigation.clone(),
            popups: self.popups.clone(),
            ai: self.ai.clone(),
            api: self.api.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

/// Builder for constructing `PreviewApp` with platform-specific
/// collaborators.
///
/// # Required
/// - `api_transport` — delivery of `submit` actions targeting external
///   endpoints
///
/// # Optional
/// - `ai_executor` — without one, `ai` actions fail into their error branch
/// - `popup_sink` — without one, `popup` actions are silently dropped
pub struct PreviewAppBuilder {
    api: Option<Arc<dyn ApiTransport>>,
    ai: Option<Arc<dyn AiExecutor>>,
    popups: Option<Arc<dyn PopupSink>>,
}

impl PreviewAppBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            api: None,
            ai: None,
            popups: None,
        }
    }

    #[must_use]
    pub fn api_transport(mut self, api: Arc<dyn ApiTransport>) -> Self {
        self.api = Some(api);
        self
    }

    #[must_use]
    pub fn ai_executor(mut self, ai: Arc<dyn AiExecutor>) -> Self {
        self.ai = Some(ai);
        self
    }

    #[must_use]
    pub fn popup_sink(mut self, popups: Arc<dyn PopupSink>) -> Self {
        self.popups = Some(popups);
        self
    }

    /// Build the `PreviewApp` with all built-in action handlers registered.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required collaborators are
    /// missing.
    pub async fn build(self) -> CoreResult<PreviewApp> {
        let api = self
            .api
            .ok_or_else(|| CoreError::ValidationError("api_transport is required".to_string()))?;

        let dispatcher = Arc::new(ActionDispatcher::new());
        register_builtin_handlers(&dispatcher).await;

        Ok(PreviewApp {
            document: RwLock::new(None),
            form: FormState::new(),
            session: SessionState::new(),
            store: DataStore::new(),
            navigation: NavigationState::new(),
            dispatcher,
            popups: self.popups,
            ai: self.ai,
            api,
        })
    }
}

impl Default for PreviewAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
