//! Action payload types.
//!
//! An action arrives from the UI as raw JSON with a `type` discriminator.
//! The dispatcher routes on the discriminator alone; each handler then
//! deserializes the payload struct for its kind, so a payload carries only
//! the fields its kind needs and unknown kinds can be registered without
//! touching any type in this module.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Built-in action kind discriminators.
pub mod kind {
    pub const NAVIGATE: &str = "navigate";
    pub const GO_BACK: &str = "goBack";
    pub const POPUP: &str = "popup";
    pub const SUBMIT: &str = "submit";
    pub const DELETE_RECORD: &str = "deleteRecord";
    pub const AUTH_LOGIN: &str = "auth:login";
    pub const AUTH_SIGNUP: &str = "auth:signup";
    pub const AUTH_LOGOUT: &str = "auth:logout";
    pub const AI: &str = "ai";
}

/// Extract the kind discriminator from a raw action value.
///
/// Returns `None` for null/non-object actions and for a missing or
/// non-string `type` field — the malformed cases the dispatcher logs and
/// drops.
#[must_use]
pub fn action_kind(action: &Value) -> Option<&str> {
    action.get("type").and_then(Value::as_str)
}

/// `navigate` — switch the active screen.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateAction {
    /// Screen id to switch to; may be a built-in `auth:` id
    pub target: String,
}

/// `popup` — present a dialog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopupAction {
    pub title: Option<String>,
    pub message: String,
    pub variant: super::popup::PopupVariant,
    pub buttons: Vec<super::popup::PopupButton>,
}

/// `submit` — persist form fields to a store table or an external endpoint.
///
/// Exactly one of `table` / `endpoint` selects the destination. `fields`
/// maps destination field names to the form field ids they are read from.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAction {
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub on_success: Option<Value>,
    #[serde(default)]
    pub on_error: Option<Value>,
}

/// `deleteRecord` — remove one record from a store table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordAction {
    pub table: String,
    pub record_id: String,
}

/// `auth:login` — match submitted credentials against the user table.
///
/// `fields` maps the logical credential names (`email`, `password`) to the
/// form field ids holding the submitted values.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAction {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub on_error: Option<Value>,
}

/// `auth:signup` — create a user record and start a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupAction {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub on_error: Option<Value>,
}

/// `auth:logout` — clear the session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoutAction {
    pub on_success: Option<Value>,
}

/// `ai` — run a prompt through the AI execution collaborator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAction {
    pub prompt: String,
    pub ai_action: String,
    #[serde(default)]
    pub persona: Option<String>,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub save_to_field: Option<String>,
    #[serde(default)]
    pub on_success: Option<Value>,
    #[serde(default)]
    pub on_error: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_of_well_formed_action() {
        assert_eq!(action_kind(&json!({"type": "navigate"})), Some("navigate"));
    }

    #[test]
    fn kind_of_malformed_actions() {
        assert_eq!(action_kind(&Value::Null), None);
        assert_eq!(action_kind(&json!({})), None);
        assert_eq!(action_kind(&json!({"type": 7})), None);
        assert_eq!(action_kind(&json!("navigate")), None);
    }

    #[test]
    fn submit_action_tolerates_missing_optionals() {
        let action: SubmitAction =
            serde_json::from_value(json!({"type": "submit", "table": "tasks"})).unwrap();
        assert_eq!(action.table.as_deref(), Some("tasks"));
        assert!(action.endpoint.is_none());
        assert!(action.fields.is_empty());
        assert!(action.on_success.is_none());
    }

    #[test]
    fn delete_record_requires_its_fields() {
        let err = serde_json::from_value::<DeleteRecordAction>(json!({"type": "deleteRecord"}));
        assert!(err.is_err());
    }
}
