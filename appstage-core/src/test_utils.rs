//! Test helper module
//!
//! Provides mock collaborators and convenient factory methods.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{Mutex as AsyncMutex, RwLock};

use appstage_gateway::{
    AiExecutionRequest, AiExecutor, ApiSubmitRequest, ApiTransport, GatewayError, GatewayResult,
};

use crate::dispatch::{ActionContext, ActionDispatcher};
use crate::handlers::register_builtin_handlers;
use crate::state::{DataStore, FormState, NavigationState, SessionState};
use crate::types::{AppDocument, PopupDescriptor, PopupSink};

// ===== MockPopupSink =====

/// Records every descriptor handed to the presentation seam.
#[derive(Default)]
pub struct MockPopupSink {
    presented: Mutex<Vec<PopupDescriptor>>,
}

impl MockPopupSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::expect_used)]
    pub fn presented(&self) -> Vec<PopupDescriptor> {
        self.presented.lock().expect("popup mutex").clone()
    }
}

impl PopupSink for MockPopupSink {
    #[allow(clippy::expect_used)]
    fn present(&self, popup: PopupDescriptor) {
        self.presented.lock().expect("popup mutex").push(popup);
    }
}

// ===== MockAiExecutor =====

/// Scripted AI collaborator: records requests, answers with whatever the
/// test configured.
pub struct MockAiExecutor {
    outcome: RwLock<GatewayResult<String>>,
    requests: AsyncMutex<Vec<AiExecutionRequest>>,
}

impl MockAiExecutor {
    pub fn new() -> Self {
        Self {
            outcome: RwLock::new(Ok(String::new())),
            requests: AsyncMutex::new(Vec::new()),
        }
    }

    pub async fn succeed_with(&self, text: &str) {
        *self.outcome.write().await = Ok(text.to_string());
    }

    pub async fn fail_with(&self, error: GatewayError) {
        *self.outcome.write().await = Err(error);
    }

    pub async fn requests(&self) -> Vec<AiExecutionRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockAiExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiExecutor for MockAiExecutor {
    async fn execute(&self, request: &AiExecutionRequest) -> GatewayResult<String> {
        self.requests.lock().await.push(request.clone());
        self.outcome.read().await.clone()
    }
}

// ===== MockApiTransport =====

/// Scripted API collaborator: records requests, succeeds unless told to
/// fail.
pub struct MockApiTransport {
    error: RwLock<Option<GatewayError>>,
    requests: AsyncMutex<Vec<ApiSubmitRequest>>,
}

impl MockApiTransport {
    pub fn new() -> Self {
        Self {
            error: RwLock::new(None),
            requests: AsyncMutex::new(Vec::new()),
        }
    }

    pub async fn fail_with(&self, error: GatewayError) {
        *self.error.write().await = Some(error);
    }

    pub async fn requests(&self) -> Vec<ApiSubmitRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockApiTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiTransport for MockApiTransport {
    async fn submit(&self, request: &ApiSubmitRequest) -> GatewayResult<()> {
        self.requests.lock().await.push(request.clone());
        match self.error.read().await.as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

// ===== Factory methods =====

/// Handles to every mock wired into a test context.
pub struct TestMocks {
    pub popups: Arc<MockPopupSink>,
    pub ai: Arc<MockAiExecutor>,
    pub api: Arc<MockApiTransport>,
}

/// A small but complete app document: three screens (one auth-gated), an
/// auth config, and a schema with one defaulted field.
#[allow(clippy::expect_used)]
pub fn test_document() -> AppDocument {
    serde_json::from_value(json!({
        "id": "test-app",
        "name": "Test App",
        "initialScreen": "home",
        "designTokens": {"primaryColor": "#4f46e5"},
        "screens": [
            {"id": "home", "name": "Home"},
            {"id": "dashboard", "name": "Dashboard", "requiresAuth": true},
            {"id": "welcome", "name": "Welcome"}
        ],
        "auth": {
            "userTable": "users",
            "emailField": "email",
            "passwordField": "password",
            "postLoginScreen": "dashboard"
        },
        "database": {
            "tasks": {
                "fields": {
                    "title": {"type": "text"},
                    "status": {"type": "text", "default": "open"}
                }
            },
            "users": {
                "fields": {
                    "email": {"type": "text"},
                    "password": {"type": "text"},
                    "name": {"type": "text"}
                }
            }
        }
    }))
    .expect("test document")
}

/// Create a fully-wired `ActionContext` with all built-in handlers and
/// scripted mocks.
pub async fn create_test_context() -> (ActionContext, TestMocks) {
    let popups = Arc::new(MockPopupSink::new());
    let ai = Arc::new(MockAiExecutor::new());
    let api = Arc::new(MockApiTransport::new());

    let dispatcher = Arc::new(ActionDispatcher::new());
    register_builtin_handlers(&dispatcher).await;

    let ctx = ActionContext {
        document: Some(Arc::new(test_document())),
        form: FormState::new(),
        session: SessionState::new(),
        store: DataStore::new(),
        navigation: NavigationState::new(),
        popups: Some(popups.clone()),
        ai: Some(ai.clone()),
        api: api.clone(),
        dispatcher,
    };

    (ctx, TestMocks { popups, ai, api })
}

/// Append a user record the auth handlers can match against.
pub async fn seed_user(ctx: &ActionContext, email: &str, password: &str) {
    let mut tables = ctx.store.snapshot().await;
    tables.append_record(
        "users",
        json!({
            "id": crate::state::generate_record_id(),
            "email": email,
            "password": password
        }),
    );
    ctx.store.replace(tables).await;
}

/// A well-formed `auth:login` action against the test document's form
/// field ids.
pub fn login_action(on_error: Option<Value>) -> Value {
    let mut action = json!({
        "type": "auth:login",
        "fields": {"email": "emailField", "password": "passwordField"}
    });
    if let Some(on_error) = on_error {
        action["onError"] = on_error;
    }
    action
}
