//! Built-in action handlers, one per action kind.

mod ai;
mod auth;
mod delete_record;
mod navigate;
mod popup;
mod submit;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::dispatch::ActionDispatcher;
use crate::error::{CoreError, CoreResult};
use crate::types::kind;

pub use ai::AiHandler;
pub use auth::{LoginHandler, LogoutHandler, SignupHandler};
pub use delete_record::DeleteRecordHandler;
pub use navigate::{GoBackHandler, NavigateHandler};
pub use popup::PopupHandler;
pub use submit::SubmitHandler;

/// Register every built-in handler on the dispatcher.
///
/// Hosts call this once at startup; additional kinds can be registered on
/// top, and a built-in can be swapped out by re-registering its kind.
pub async fn register_builtin_handlers(dispatcher: &ActionDispatcher) {
    dispatcher
        .register(kind::NAVIGATE, Arc::new(NavigateHandler))
        .await;
    dispatcher.register(kind::GO_BACK, Arc::new(GoBackHandler)).await;
    dispatcher.register(kind::POPUP, Arc::new(PopupHandler)).await;
    dispatcher.register(kind::SUBMIT, Arc::new(SubmitHandler)).await;
    dispatcher
        .register(kind::DELETE_RECORD, Arc::new(DeleteRecordHandler))
        .await;
    dispatcher
        .register(kind::AUTH_LOGIN, Arc::new(LoginHandler))
        .await;
    dispatcher
        .register(kind::AUTH_SIGNUP, Arc::new(SignupHandler))
        .await;
    dispatcher
        .register(kind::AUTH_LOGOUT, Arc::new(LogoutHandler))
        .await;
    dispatcher.register(kind::AI, Arc::new(AiHandler)).await;
}

/// Deserialize a kind's payload out of the raw action value.
fn parse_payload<T: DeserializeOwned>(kind: &str, action: &Value) -> CoreResult<T> {
    serde_json::from_value(action.clone()).map_err(|e| CoreError::MalformedAction {
        kind: kind.to_string(),
        detail: e.to_string(),
    })
}
