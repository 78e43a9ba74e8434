//! Declarative app document types.
//!
//! The document is read-only input to the interpreter: a flow builder or
//! generator produces it, this crate only consumes it. Every field carries a
//! serde default so a partially-written document still deserializes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A declarative app: screens, design tokens, database schema, auth config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppDocument {
    /// App id (slug)
    pub id: String,
    /// Display name
    pub name: String,
    /// Screen list, in authoring order
    pub screens: Vec<Screen>,
    /// Id of the screen shown first; falls back to the first declared screen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_screen: Option<String>,
    /// Flat `$name -> value` token map referenced throughout the document
    pub design_tokens: HashMap<String, Value>,
    /// Theme payload, passed through to the render layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Value>,
    /// Database schema driving table creation and record defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseSchema>,
    /// Authentication config; absent means the app has no auth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

impl AppDocument {
    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> crate::error::CoreResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::error::CoreError::SerializationError(e.to_string()))
    }

    /// Look up a declared screen by id.
    #[must_use]
    pub fn screen(&self, id: &str) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id == id)
    }

    /// The id of the screen the app starts on: the declared `initialScreen`
    /// when present, otherwise the first screen in authoring order.
    #[must_use]
    pub fn initial_screen_id(&self) -> Option<&str> {
        self.initial_screen
            .as_deref()
            .or_else(|| self.screens.first().map(|s| s.id.as_str()))
    }
}

/// One screen of the app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Screen {
    /// Screen id, unique within the document
    pub id: String,
    /// Display name
    pub name: String,
    /// Whether the screen is reachable only with an active session
    pub requires_auth: bool,
    /// Component tree; opaque to the interpreter, resolved for the renderer
    pub components: Vec<Value>,
}

/// Authentication config for the two built-in auth screens.
///
/// Credentials are matched in plaintext against the simulated user table.
/// This is a deliberate preview/demo simplification — nothing here is
/// suitable for real credential handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    /// Store table holding user records
    pub user_table: String,
    /// Record field compared against the submitted email
    pub email_field: String,
    /// Record field compared against the submitted password
    pub password_field: String,
    /// Screen to navigate to after login/signup; falls back to the initial screen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_login_screen: Option<String>,
    /// Screen an unauthenticated user is redirected to from a gated screen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_redirect_screen: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_table: "users".to_string(),
            email_field: "email".to_string(),
            password_field: "password".to_string(),
            post_login_screen: None,
            auth_redirect_screen: None,
        }
    }
}

/// Database schema: `tableName -> { fields }`.
///
/// Authoritative for which tables *should* exist; the data store itself
/// tolerates records with extra or missing fields. Type enforcement belongs
/// to the external entity-validation service, not this interpreter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseSchema {
    /// Table schemas keyed by table name
    pub tables: HashMap<String, TableSchema>,
}

/// Schema of one table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    /// Field specs keyed by field name
    pub fields: HashMap<String, FieldSpec>,
}

/// Schema of one field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldSpec {
    /// Declared field type ("text", "number", "boolean", ...); drives
    /// input-widget selection in the builder, not enforced here
    #[serde(rename = "type")]
    pub field_type: String,
    /// Whether the field is the table's primary key
    pub primary_key: bool,
    /// Default value applied when a submitted record omits the field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Authoring-time description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
