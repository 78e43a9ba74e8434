//! Popup descriptor types.
//!
//! The interpreter never renders dialogs itself; it hands a normalized
//! descriptor to whatever presentation layer the frontend registered.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dialog flavor, for presentation only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupVariant {
    #[default]
    Alert,
    Confirm,
    Error,
    Success,
}

/// One dialog button. `action` is a raw action value dispatched when the
/// button is pressed, enabling chained flows from a confirmation dialog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopupButton {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,
}

/// Normalized dialog descriptor handed to the presentation layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopupDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: String,
    pub variant: PopupVariant,
    pub buttons: Vec<PopupButton>,
}

/// Popup presentation seam implemented by the frontend.
pub trait PopupSink: Send + Sync {
    /// Present the dialog. Must not block.
    fn present(&self, popup: PopupDescriptor);
}
