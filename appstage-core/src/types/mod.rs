//! Type definition module

mod action;
mod document;
mod popup;

pub use action::{
    action_kind, kind, AiAction, DeleteRecordAction, LoginAction, LogoutAction, NavigateAction,
    PopupAction, SignupAction, SubmitAction,
};
pub use document::{AppDocument, AuthConfig, DatabaseSchema, FieldSpec, Screen, TableSchema};
pub use popup::{PopupButton, PopupDescriptor, PopupSink, PopupVariant};
